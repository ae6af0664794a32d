//! Frame sources.
//!
//! This module provides a trait-based abstraction over acquisition
//! hardware, allowing for both real camera input and synthetic frames for
//! testing. Acquisition cadence, threading and retries all live behind
//! this boundary; the analysis pipeline only ever sees complete frames.

use super::config::{DeviceSelector, StreamConfig, SyntheticConfig};
use super::frame::{Frame, PixelFormat};
use super::property::{
    apply_lenient, describe_all, update_property, InMemoryPropertyStore, PropertyDescriptor,
    PropertyError, PropertyStore, PropertyValue,
};
use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during source operations.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No device matched the selector.
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    /// The device could not be opened.
    #[error("failed to open device: {0}")]
    OpenFailed(String),
    /// The device rejected its configuration.
    #[error("failed to configure device: {0}")]
    ConfigFailed(String),
    /// Acquisition failed mid-stream.
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    /// No frame arrived within the timeout.
    #[error("no frame within {0:?}")]
    Timeout(Duration),
    /// `next_frame` was called before `start_stream`.
    #[error("stream not started")]
    NotStreaming,
    /// A property update was refused.
    #[error(transparent)]
    Property(#[from] PropertyError),
}

/// Reported accessibility of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessStatus {
    /// The backend reported no status.
    Unknown,
    /// Can be opened.
    Ready,
    /// Can be opened for reading only.
    ReadOnly,
    /// Enumerated but not reachable.
    Unreachable,
    /// Opened by another process.
    Busy,
}

impl AccessStatus {
    /// Maps a transport-layer status code.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => AccessStatus::Ready,
            2 => AccessStatus::ReadOnly,
            3 => AccessStatus::Unreachable,
            4 => AccessStatus::Busy,
            _ => AccessStatus::Unknown,
        }
    }

    /// True if a stream can be opened.
    pub fn is_openable(self) -> bool {
        matches!(self, AccessStatus::Ready | AccessStatus::ReadOnly)
    }
}

/// Description of an enumerable device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Model name as reported by the device.
    pub model: String,
    /// Serial number, unique per device.
    pub serial_number: String,
    /// Name shown in device lists.
    pub display_name: String,
    /// Manufacturer.
    pub vendor: String,
    /// Whether the device can be opened now.
    pub access_status: AccessStatus,
}

/// Trait for acquisition backends.
///
/// Frames are delivered by pull: callers loop on `next_frame` at whatever
/// cadence suits them.
pub trait FrameSource {
    /// Enumerates attached devices.
    fn list_devices(&mut self) -> Result<Vec<DeviceInfo>, SourceError>;

    /// Opens the selected device and applies the configured properties.
    ///
    /// Returns descriptors of the properties listed in
    /// `config.user_properties`.
    fn start_stream(
        &mut self,
        device: &DeviceSelector,
        config: &StreamConfig,
    ) -> Result<Vec<PropertyDescriptor>, SourceError>;

    /// Waits up to `timeout` for the next complete frame.
    fn next_frame(&mut self, timeout: Duration) -> Result<Frame, SourceError>;

    /// Sets one property; failure is an error. Returns refreshed descriptors.
    fn update_property(
        &mut self,
        name: &str,
        value: PropertyValue,
    ) -> Result<Vec<PropertyDescriptor>, SourceError>;

    /// Checks if a stream is running.
    fn is_streaming(&self) -> bool;

    /// Stops the stream and releases the device.
    fn stop_stream(&mut self);
}

/// Reference exposure at which `SyntheticConfig::peak` is reached.
const REFERENCE_EXPOSURE_US: f64 = 10_000.0;

#[derive(Debug)]
struct ActiveStream {
    device: DeviceInfo,
    synthetic: SyntheticConfig,
    visible: Vec<String>,
}

/// Synthetic source producing a Gaussian beam with speckle noise.
///
/// Frame `n` is a pure function of the configuration, the device
/// properties and `n`, so runs are reproducible.
#[derive(Debug)]
pub struct MockSource {
    devices: Vec<DeviceInfo>,
    properties: InMemoryPropertyStore,
    active: Option<ActiveStream>,
    sequence: u64,
    latest: Option<Frame>,
}

impl MockSource {
    /// Creates a source with the default synthetic beam.
    pub fn new() -> Self {
        let devices = vec![
            DeviceInfo {
                model: "MOCK-BEAM".to_string(),
                serial_number: "0001".to_string(),
                display_name: "Synthetic beam camera".to_string(),
                vendor: "beam-profiler".to_string(),
                access_status: AccessStatus::Ready,
            },
            DeviceInfo {
                model: "MOCK-BEAM".to_string(),
                serial_number: "0002".to_string(),
                display_name: "Synthetic beam camera (in use)".to_string(),
                vendor: "beam-profiler".to_string(),
                access_status: AccessStatus::Busy,
            },
        ];
        Self {
            devices,
            properties: Self::default_properties(),
            active: None,
            sequence: 0,
            latest: None,
        }
    }

    fn default_properties() -> InMemoryPropertyStore {
        InMemoryPropertyStore::new()
            .with_number(
                "ExposureTime",
                "Exposure time",
                (10.0, 1_000_000.0),
                "us",
                PropertyValue::Float(REFERENCE_EXPOSURE_US),
            )
            .with_number("Gain", "Gain", (0.0, 16.0), "x", PropertyValue::Float(1.0))
            .with_select("PixelFormat", "Pixel format", &[("Mono8", 0), ("BGR8", 1)], 1)
    }

    /// Copy of the most recently delivered frame.
    pub fn latest(&self) -> Option<Frame> {
        self.latest.clone()
    }

    /// Read access to the device properties.
    pub fn properties(&self) -> &InMemoryPropertyStore {
        &self.properties
    }

    fn render(&self, synthetic: &SyntheticConfig, sequence: u64) -> Frame {
        let exposure = self.properties.number_or("ExposureTime", REFERENCE_EXPOSURE_US);
        let gain = self.properties.number_or("Gain", 1.0);
        let mono = matches!(self.properties.get("PixelFormat"), Ok(PropertyValue::Int(0)));
        let scale = exposure / REFERENCE_EXPOSURE_US * gain;

        let (w, h) = (synthetic.width as usize, synthetic.height as usize);
        let mut rng = ChaCha8Rng::seed_from_u64(synthetic.seed.wrapping_add(sequence));
        let w2 = synthetic.beam_radius_px * synthetic.beam_radius_px;

        let mut gray = Vec::with_capacity(w * h);
        for y in 0..h {
            let dy = y as f64 - synthetic.beam_y;
            for x in 0..w {
                let dx = x as f64 - synthetic.beam_x;
                let beam = synthetic.peak * scale * (-2.0 * (dx * dx + dy * dy) / w2).exp();
                let u = rng.next_u32() as f64 / u32::MAX as f64 - 0.5;
                let v = synthetic.background + beam + synthetic.noise * u;
                gray.push(v.round().clamp(0.0, 255.0) as u8);
            }
        }

        if mono {
            Frame::new(gray, synthetic.width, synthetic.height, PixelFormat::Mono8, sequence)
        } else {
            let mut bgr = Vec::with_capacity(gray.len() * 3);
            for v in gray {
                bgr.extend_from_slice(&[v, v, v]);
            }
            Frame::new(bgr, synthetic.width, synthetic.height, PixelFormat::Bgr8, sequence)
        }
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for MockSource {
    fn list_devices(&mut self) -> Result<Vec<DeviceInfo>, SourceError> {
        Ok(self.devices.clone())
    }

    fn start_stream(
        &mut self,
        device: &DeviceSelector,
        config: &StreamConfig,
    ) -> Result<Vec<PropertyDescriptor>, SourceError> {
        config
            .validate()
            .map_err(|e| SourceError::ConfigFailed(e.to_string()))?;
        if self.active.is_some() {
            self.stop_stream();
        }

        let info = self
            .devices
            .iter()
            .find(|d| device.matches(&d.model, &d.serial_number) && d.access_status.is_openable())
            .or_else(|| {
                self.devices
                    .iter()
                    .find(|d| device.matches(&d.model, &d.serial_number))
            })
            .cloned()
            .ok_or_else(|| SourceError::DeviceNotFound(format!("{device:?}")))?;
        if !info.access_status.is_openable() {
            return Err(SourceError::OpenFailed(format!(
                "{} {} is {:?}",
                info.model, info.serial_number, info.access_status
            )));
        }

        apply_lenient(&mut self.properties, &config.default_properties);
        apply_lenient(&mut self.properties, &config.property_overrides);

        tracing::info!(
            model = %info.model,
            serial = %info.serial_number,
            "MockSource stream started"
        );
        self.active = Some(ActiveStream {
            device: info,
            synthetic: config.synthetic.clone(),
            visible: config.user_properties.clone(),
        });
        self.sequence = 0;

        Ok(describe_all(&self.properties, &config.user_properties))
    }

    fn next_frame(&mut self, _timeout: Duration) -> Result<Frame, SourceError> {
        let active = self.active.as_ref().ok_or(SourceError::NotStreaming)?;
        self.sequence += 1;
        let frame = self.render(&active.synthetic, self.sequence);
        tracing::trace!(sequence = self.sequence, "Synthetic frame rendered");
        self.latest = Some(frame.clone());
        Ok(frame)
    }

    fn update_property(
        &mut self,
        name: &str,
        value: PropertyValue,
    ) -> Result<Vec<PropertyDescriptor>, SourceError> {
        let active = self.active.as_ref().ok_or(SourceError::NotStreaming)?;
        Ok(update_property(&mut self.properties, name, value, &active.visible)?)
    }

    fn is_streaming(&self) -> bool {
        self.active.is_some()
    }

    fn stop_stream(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::info!(model = %active.device.model, "MockSource stream stopped");
        }
        self.latest = None;
    }
}
