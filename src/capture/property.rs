//! Device property (node) access.
//!
//! Acquisition backends expose their tunable settings as named
//! properties. The analysis core never touches these; they exist for the
//! stream layer and whatever UI sits on top of it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised while reading or writing properties.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyError {
    /// No property with that name.
    #[error("unknown property: {0}")]
    Unknown(String),
    /// The device refused the value.
    #[error("cannot set value {value} on property {name}: {reason}")]
    Rejected {
        name: String,
        value: String,
        reason: String,
    },
}

/// A property value as carried in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// A flag.
    Bool(bool),
    /// An integer, also used for select options.
    Int(i64),
    /// A real number.
    Float(f64),
    /// Free text.
    Text(String),
}

impl PropertyValue {
    fn as_f64(&self) -> Option<f64> {
        match *self {
            PropertyValue::Int(v) => Some(v as f64),
            PropertyValue::Float(v) => Some(v),
            _ => None,
        }
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Bool(v) => write!(f, "{v}"),
            PropertyValue::Int(v) => write!(f, "{v}"),
            PropertyValue::Float(v) => write!(f, "{v}"),
            PropertyValue::Text(v) => write!(f, "{v:?}"),
        }
    }
}

/// One entry of an enumerated property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Human-readable label.
    pub display_name: String,
    /// Raw value written to the device.
    pub value: i64,
}

/// Value domain of a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PropertyKind {
    /// One of a fixed set of options.
    Select { options: Vec<SelectOption> },
    /// A number within `min..=max`.
    Number { min: f64, max: f64, unit: String },
}

/// Property description handed to the caller after a stream starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Machine name used by `get` and `set`.
    pub name: String,
    /// Human-readable label.
    pub display_name: String,
    /// Help text shown by a UI.
    pub tooltip: String,
    /// Current value.
    pub value: PropertyValue,
    /// Accepted values.
    #[serde(flatten)]
    pub kind: PropertyKind,
}

/// Generic key/value configuration surface of a device.
pub trait PropertyStore {
    /// Reads the current value.
    fn get(&self, name: &str) -> Result<PropertyValue, PropertyError>;

    /// Writes a value, validating it against the property domain.
    fn set(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError>;

    /// Describes a property including its current value.
    fn describe(&self, name: &str) -> Result<PropertyDescriptor, PropertyError>;
}

/// Applies every value, logging and skipping those the store refuses.
pub fn apply_lenient<S: PropertyStore + ?Sized>(
    store: &mut S,
    values: &BTreeMap<String, PropertyValue>,
) -> usize {
    let mut applied = 0;
    for (name, value) in values {
        match store.set(name, value.clone()) {
            Ok(()) => applied += 1,
            Err(e) => tracing::warn!(property = %name, error = %e, "Property not applied"),
        }
    }
    applied
}

/// Describes the named properties, skipping (and logging) unknown ones.
pub fn describe_all<S: PropertyStore + ?Sized>(store: &S, names: &[String]) -> Vec<PropertyDescriptor> {
    names
        .iter()
        .filter_map(|name| match store.describe(name) {
            Ok(d) => Some(d),
            Err(e) => {
                tracing::warn!(property = %name, error = %e, "Cannot describe property");
                None
            }
        })
        .collect()
}

/// Sets one property strictly and returns the refreshed descriptors.
pub fn update_property<S: PropertyStore + ?Sized>(
    store: &mut S,
    name: &str,
    value: PropertyValue,
    visible: &[String],
) -> Result<Vec<PropertyDescriptor>, PropertyError> {
    store.set(name, value)?;
    Ok(describe_all(store, visible))
}

#[derive(Debug, Clone)]
struct Node {
    display_name: String,
    tooltip: String,
    kind: PropertyKind,
    value: PropertyValue,
}

/// Property store backed by a map; used by the synthetic source.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPropertyStore {
    nodes: BTreeMap<String, Node>,
}

impl InMemoryPropertyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a numeric property.
    pub fn with_number(
        mut self,
        name: &str,
        display_name: &str,
        (min, max): (f64, f64),
        unit: &str,
        value: PropertyValue,
    ) -> Self {
        self.nodes.insert(
            name.to_string(),
            Node {
                display_name: display_name.to_string(),
                tooltip: String::new(),
                kind: PropertyKind::Number {
                    min,
                    max,
                    unit: unit.to_string(),
                },
                value,
            },
        );
        self
    }

    /// Registers an enumerated property.
    pub fn with_select(mut self, name: &str, display_name: &str, options: &[(&str, i64)], value: i64) -> Self {
        let options = options
            .iter()
            .map(|&(display_name, value)| SelectOption {
                display_name: display_name.to_string(),
                value,
            })
            .collect();
        self.nodes.insert(
            name.to_string(),
            Node {
                display_name: display_name.to_string(),
                tooltip: String::new(),
                kind: PropertyKind::Select { options },
                value: PropertyValue::Int(value),
            },
        );
        self
    }

    /// Reads a numeric property, falling back to `default` when absent or non-numeric.
    pub fn number_or(&self, name: &str, default: f64) -> f64 {
        self.nodes
            .get(name)
            .and_then(|n| n.value.as_f64())
            .unwrap_or(default)
    }
}

impl PropertyStore for InMemoryPropertyStore {
    fn get(&self, name: &str) -> Result<PropertyValue, PropertyError> {
        self.nodes
            .get(name)
            .map(|n| n.value.clone())
            .ok_or_else(|| PropertyError::Unknown(name.to_string()))
    }

    fn set(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
        let node = self
            .nodes
            .get_mut(name)
            .ok_or_else(|| PropertyError::Unknown(name.to_string()))?;
        let reject = |reason: &str| PropertyError::Rejected {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        match &node.kind {
            PropertyKind::Number { min, max, .. } => {
                let v = value.as_f64().ok_or_else(|| reject("not a number"))?;
                if v < *min || v > *max {
                    return Err(reject("out of range"));
                }
            }
            PropertyKind::Select { options } => {
                let v = match value {
                    PropertyValue::Int(v) => v,
                    _ => return Err(reject("not an option value")),
                };
                if !options.iter().any(|o| o.value == v) {
                    return Err(reject("no such option"));
                }
            }
        }

        tracing::debug!(property = %name, value = %value, "Property set");
        node.value = value;
        Ok(())
    }

    fn describe(&self, name: &str) -> Result<PropertyDescriptor, PropertyError> {
        let node = self
            .nodes
            .get(name)
            .ok_or_else(|| PropertyError::Unknown(name.to_string()))?;
        Ok(PropertyDescriptor {
            name: name.to_string(),
            display_name: node.display_name.clone(),
            tooltip: node.tooltip.clone(),
            value: node.value.clone(),
            kind: node.kind.clone(),
        })
    }
}
