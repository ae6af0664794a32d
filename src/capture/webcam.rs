//! UVC/platform camera source built on `nokhwa`.
//!
//! Webcams expose no node map compatible with the device properties used
//! by machine-vision cameras, so property updates are refused.

use super::config::{DeviceSelector, StreamConfig};
use super::frame::{Frame, PixelFormat};
use super::property::{PropertyDescriptor, PropertyError, PropertyValue};
use super::source::{AccessStatus, DeviceInfo, FrameSource, SourceError};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraInfo, RequestedFormat, RequestedFormatType};
use nokhwa::Camera as NokhwaCamera;
use std::time::Duration;

/// Frame source reading from a platform camera.
pub struct WebcamSource {
    camera: Option<NokhwaCamera>,
    sequence: u64,
}

impl WebcamSource {
    /// Creates a source; no device is opened until `start_stream`.
    pub fn new() -> Self {
        Self {
            camera: None,
            sequence: 0,
        }
    }

    fn query() -> Result<Vec<CameraInfo>, SourceError> {
        nokhwa::query(ApiBackend::Auto).map_err(|e| SourceError::DeviceNotFound(e.to_string()))
    }

    fn describe(info: &CameraInfo) -> DeviceInfo {
        DeviceInfo {
            model: info.human_name(),
            serial_number: info.index().to_string(),
            display_name: info.description().to_string(),
            vendor: info.misc(),
            access_status: AccessStatus::Unknown,
        }
    }
}

impl Default for WebcamSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for WebcamSource {
    fn list_devices(&mut self) -> Result<Vec<DeviceInfo>, SourceError> {
        Ok(Self::query()?.iter().map(Self::describe).collect())
    }

    fn start_stream(
        &mut self,
        device: &DeviceSelector,
        config: &StreamConfig,
    ) -> Result<Vec<PropertyDescriptor>, SourceError> {
        config
            .validate()
            .map_err(|e| SourceError::ConfigFailed(e.to_string()))?;
        self.stop_stream();

        let info = Self::query()?
            .into_iter()
            .find(|info| device.matches(&info.human_name(), &info.index().to_string()))
            .ok_or_else(|| SourceError::DeviceNotFound(format!("{device:?}")))?;

        let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = NokhwaCamera::new(info.index().clone(), format)
            .map_err(|e| SourceError::OpenFailed(e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| SourceError::OpenFailed(e.to_string()))?;

        if !config.default_properties.is_empty() || !config.property_overrides.is_empty() {
            tracing::warn!("Webcam source ignores device properties");
        }
        tracing::info!(camera = %info.human_name(), "Webcam stream started");

        self.camera = Some(camera);
        self.sequence = 0;
        Ok(Vec::new())
    }

    fn next_frame(&mut self, _timeout: Duration) -> Result<Frame, SourceError> {
        let camera = self.camera.as_mut().ok_or(SourceError::NotStreaming)?;
        let buffer = camera
            .frame()
            .map_err(|e| SourceError::CaptureFailed(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| SourceError::CaptureFailed(e.to_string()))?;

        self.sequence += 1;
        let (width, height) = (decoded.width(), decoded.height());
        Ok(Frame::new(
            decoded.into_raw(),
            width,
            height,
            PixelFormat::Rgb8,
            self.sequence,
        ))
    }

    fn update_property(
        &mut self,
        name: &str,
        _value: PropertyValue,
    ) -> Result<Vec<PropertyDescriptor>, SourceError> {
        Err(PropertyError::Unknown(name.to_string()).into())
    }

    fn is_streaming(&self) -> bool {
        self.camera.is_some()
    }

    fn stop_stream(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop_stream() {
                tracing::warn!(error = %e, "Failed to stop webcam stream");
            }
            tracing::info!("Webcam stream stopped");
        }
    }
}
