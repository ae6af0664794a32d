//! Frame acquisition and device handling.
//!
//! This module provides the collaborators around the analysis core:
//! the `Frame` value type, the `FrameSource` acquisition capability and the
//! `PropertyStore` device-settings capability. Nothing in here is needed to
//! analyse a frame that is already in memory.

mod config;
mod frame;
mod property;
mod source;
#[cfg(feature = "camera")]
mod webcam;

pub use config::{DeviceSelector, StreamConfig, SyntheticConfig};
pub use frame::{Frame, FrameError, PixelFormat};
pub use property::{
    apply_lenient, describe_all, update_property, InMemoryPropertyStore, PropertyDescriptor,
    PropertyError, PropertyKind, PropertyStore, PropertyValue, SelectOption,
};
pub use source::{AccessStatus, DeviceInfo, FrameSource, MockSource, SourceError};
#[cfg(feature = "camera")]
pub use webcam::WebcamSource;
