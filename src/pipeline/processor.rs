//! Per-frame measurement and rendering.

use super::calibration::CalibrationParams;
use super::report::FrameReport;
use super::PipelineError;
use crate::analysis::{
    BeamExtent, BeamExtentScanner, Centroid, CentroidLocator, Metrics, Preprocessed, Preprocessor,
    VolumeIntegrator,
};
use crate::capture::Frame;
use crate::config::ConfigError;
use crate::overlay::{OverlayConfig, OverlayRenderer};
use crate::raster::BgrImage;

/// Everything measured on one frame, before rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Smoothed image and threshold map.
    pub preprocessed: Preprocessed,
    /// Moment centroid.
    pub centroid: Centroid,
    /// Beam rectangle.
    pub extent: BeamExtent,
    /// Assembled metrics.
    pub metrics: Metrics,
}

/// The measurement stages plus the overlay renderer, bound to one
/// calibration.
///
/// A pipeline holds no per-frame state: any number of frames can be fed
/// through it, from any number of threads, and a failed frame does not
/// affect later ones.
#[derive(Debug, Clone)]
pub struct BeamPipeline {
    calibration: CalibrationParams,
    preprocessor: Preprocessor,
    locator: CentroidLocator,
    scanner: BeamExtentScanner,
    integrator: VolumeIntegrator,
    renderer: OverlayRenderer,
}

impl BeamPipeline {
    /// Creates a pipeline after validating `calibration`.
    pub fn new(calibration: CalibrationParams, overlay: OverlayConfig) -> Result<Self, ConfigError> {
        calibration.validate()?;
        Ok(Self::with_valid_calibration(calibration, overlay))
    }

    fn with_valid_calibration(calibration: CalibrationParams, overlay: OverlayConfig) -> Self {
        Self {
            calibration,
            preprocessor: Preprocessor::new(),
            locator: CentroidLocator::new(),
            scanner: BeamExtentScanner::new(),
            integrator: VolumeIntegrator::new(),
            renderer: OverlayRenderer::new(overlay),
        }
    }

    /// Replaces the default preprocessing stage.
    pub fn with_preprocessor(mut self, preprocessor: Preprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    /// Returns the calibration in use.
    pub fn calibration(&self) -> &CalibrationParams {
        &self.calibration
    }

    /// Returns the overlay renderer.
    pub fn renderer(&self) -> &OverlayRenderer {
        &self.renderer
    }

    /// Runs stages 1 to 4 on `frame`.
    pub fn measure(&self, frame: &Frame) -> Result<Measurement, PipelineError> {
        let image = frame.to_bgr_image()?;
        self.measure_image(&image)
    }

    /// Runs stages 1 to 4 on an already normalized image.
    pub fn measure_image(&self, image: &BgrImage) -> Result<Measurement, PipelineError> {
        let preprocessed = self
            .preprocessor
            .preprocess(image, self.calibration.threshold_percent)?;
        let smoothed = &preprocessed.smoothed;

        let centroid = self.locator.locate(&preprocessed.threshold_map);
        let extent = self.scanner.scan(smoothed, centroid);
        let volume = self.integrator.integrate(smoothed, &extent);
        let metrics =
            Metrics::from_stages(smoothed.width(), smoothed.height(), centroid, &extent, volume);

        match centroid.position() {
            Some((x, y)) => tracing::debug!(
                x,
                y,
                width = extent.width,
                height = extent.height,
                volume,
                "Beam measured"
            ),
            None => tracing::debug!("No beam in frame"),
        }

        Ok(Measurement {
            preprocessed,
            centroid,
            extent,
            metrics,
        })
    }

    /// Draws the overlay for a finished measurement.
    pub fn render(&self, measurement: &Measurement) -> BgrImage {
        self.renderer.render(
            &measurement.preprocessed.smoothed,
            &measurement.metrics,
            &measurement.extent,
            &self.calibration,
        )
    }

    /// Measures and renders one frame.
    ///
    /// The frame is only borrowed; the returned image is freshly allocated.
    pub fn process(&self, frame: &Frame) -> Result<(BgrImage, Metrics), PipelineError> {
        let measurement = self.measure(frame)?;
        let output = self.render(&measurement);
        Ok((output, measurement.metrics))
    }

    /// Like [`process`](Self::process), with a serializable report.
    pub fn process_with_report(
        &self,
        frame: &Frame,
    ) -> Result<(BgrImage, FrameReport), PipelineError> {
        let (output, metrics) = self.process(frame)?;
        let report = FrameReport::new(frame, metrics, &self.calibration, &output);
        Ok((output, report))
    }
}

impl Default for BeamPipeline {
    fn default() -> Self {
        Self::with_valid_calibration(CalibrationParams::default(), OverlayConfig::default())
    }
}
