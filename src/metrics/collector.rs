//! Metrics collection and registry.

use crate::analysis::Metrics;
use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// State of the stream after one frame, for a registry update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    /// Whether the latest frame contained a beam.
    pub beam_found: bool,
    /// Centroid column, 0 without a beam.
    pub centroid_x_px: usize,
    /// Centroid row, 0 without a beam.
    pub centroid_y_px: usize,
    /// Horizontal distance from the frame center.
    pub dist_x_px: f64,
    /// Vertical distance from the frame center.
    pub dist_y_px: f64,
    /// Beam width in pixels.
    pub width_px: usize,
    /// Beam height in pixels.
    pub height_px: usize,
    /// Summed intensity over the beam rectangle.
    pub volume: u64,
    /// Frames measured so far.
    pub frames_processed: u64,
    /// Frames dropped as invalid so far.
    pub frames_skipped: u64,
}

impl MetricsSnapshot {
    /// Snapshot from the latest frame's metrics and the running counts.
    pub fn from_metrics(metrics: &Metrics, frames_processed: u64, frames_skipped: u64) -> Self {
        Self {
            beam_found: metrics.beam_found(),
            centroid_x_px: metrics.centroid_x_px(),
            centroid_y_px: metrics.centroid_y_px(),
            dist_x_px: metrics.dist_x_px,
            dist_y_px: metrics.dist_y_px,
            width_px: metrics.width_px,
            height_px: metrics.height_px,
            volume: metrics.volume,
            frames_processed,
            frames_skipped,
        }
    }
}

/// Prometheus registry for beam measurements.
pub struct MetricsRegistry {
    registry: Registry,

    beam_found: IntGauge,
    centroid_x: IntGauge,
    centroid_y: IntGauge,
    dist_x: Gauge,
    dist_y: Gauge,
    width: IntGauge,
    height: IntGauge,
    volume: Gauge,

    frames_processed: IntCounter,
    frames_skipped: IntCounter,
}

impl MetricsRegistry {
    /// Creates a registry with every beam metric registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let beam_found = IntGauge::new(
            "beam_profiler_beam_found",
            "Whether the latest frame contained a beam (1=yes, 0=no)",
        )?;
        let centroid_x = IntGauge::new("beam_profiler_centroid_x_px", "Centroid column in pixels")?;
        let centroid_y = IntGauge::new("beam_profiler_centroid_y_px", "Centroid row in pixels")?;
        let dist_x = Gauge::new(
            "beam_profiler_dist_x_px",
            "Horizontal distance of the centroid from the frame center",
        )?;
        let dist_y = Gauge::new(
            "beam_profiler_dist_y_px",
            "Vertical distance of the centroid from the frame center",
        )?;
        let width = IntGauge::new("beam_profiler_width_px", "Beam width in pixels")?;
        let height = IntGauge::new("beam_profiler_height_px", "Beam height in pixels")?;
        let volume = Gauge::new(
            "beam_profiler_volume",
            "Smoothed intensity summed over the beam rectangle",
        )?;

        let frames_processed = IntCounter::new(
            "beam_profiler_frames_processed_total",
            "Total number of frames measured",
        )?;
        let frames_skipped = IntCounter::new(
            "beam_profiler_frames_skipped_total",
            "Total number of invalid frames skipped",
        )?;

        registry.register(Box::new(beam_found.clone()))?;
        registry.register(Box::new(centroid_x.clone()))?;
        registry.register(Box::new(centroid_y.clone()))?;
        registry.register(Box::new(dist_x.clone()))?;
        registry.register(Box::new(dist_y.clone()))?;
        registry.register(Box::new(width.clone()))?;
        registry.register(Box::new(height.clone()))?;
        registry.register(Box::new(volume.clone()))?;
        registry.register(Box::new(frames_processed.clone()))?;
        registry.register(Box::new(frames_skipped.clone()))?;

        Ok(Self {
            registry,
            beam_found,
            centroid_x,
            centroid_y,
            dist_x,
            dist_y,
            width,
            height,
            volume,
            frames_processed,
            frames_skipped,
        })
    }

    /// Updates all metrics from a snapshot.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.beam_found.set(i64::from(snapshot.beam_found));
        self.centroid_x.set(snapshot.centroid_x_px as i64);
        self.centroid_y.set(snapshot.centroid_y_px as i64);
        self.dist_x.set(snapshot.dist_x_px);
        self.dist_y.set(snapshot.dist_y_px);
        self.width.set(snapshot.width_px as i64);
        self.height.set(snapshot.height_px as i64);
        self.volume.set(snapshot.volume as f64);
        self.update_counters(snapshot.frames_processed, snapshot.frames_skipped);
    }

    /// Advances the frame counters without touching the beam gauges.
    ///
    /// Used for frames that were dropped before any measurement existed.
    pub fn update_counters(&self, frames_processed: u64, frames_skipped: u64) {
        // Counters only move forward; add the difference.
        let processed = self.frames_processed.get();
        if frames_processed > processed {
            self.frames_processed.inc_by(frames_processed - processed);
        }
        let skipped = self.frames_skipped.get();
        if frames_skipped > skipped {
            self.frames_skipped.inc_by(frames_skipped - skipped);
        }
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{BeamExtent, Centroid};

    #[test]
    fn test_registry_creation() {
        assert!(MetricsRegistry::new().is_ok());
    }

    #[test]
    fn test_update_from_metrics() {
        let registry = MetricsRegistry::new().unwrap();
        let extent = BeamExtent {
            left: 10,
            top: 20,
            width: 30,
            height: 12,
        };
        let metrics = Metrics::from_stages(100, 80, Centroid::Present { x: 25, y: 26 }, &extent, 777);
        registry.update(&MetricsSnapshot::from_metrics(&metrics, 3, 1));

        let output = registry.encode().unwrap();
        assert!(output.contains("beam_profiler_beam_found 1"));
        assert!(output.contains("beam_profiler_centroid_x_px 25"));
        assert!(output.contains("beam_profiler_width_px 30"));
        assert!(output.contains("beam_profiler_volume 777"));
        assert!(output.contains("beam_profiler_frames_processed_total 3"));
        assert!(output.contains("beam_profiler_frames_skipped_total 1"));
    }

    #[test]
    fn test_counters_never_decrease() {
        let registry = MetricsRegistry::new().unwrap();
        registry.update(&MetricsSnapshot {
            frames_processed: 5,
            ..Default::default()
        });
        registry.update(&MetricsSnapshot {
            frames_processed: 2,
            ..Default::default()
        });
        let output = registry.encode().unwrap();
        assert!(output.contains("beam_profiler_frames_processed_total 5"));
        assert!(output.contains("beam_profiler_beam_found 0"));
    }

    #[test]
    fn test_skipped_frames_counted_without_measurement() {
        let registry = MetricsRegistry::new().unwrap();
        let extent = BeamExtent {
            left: 0,
            top: 0,
            width: 4,
            height: 4,
        };
        let metrics = Metrics::from_stages(10, 10, Centroid::Present { x: 2, y: 2 }, &extent, 99);
        registry.update(&MetricsSnapshot::from_metrics(&metrics, 1, 0));

        registry.update_counters(1, 1);
        registry.update_counters(1, 2);

        let output = registry.encode().unwrap();
        assert!(output.contains("beam_profiler_frames_skipped_total 2"));
        assert!(output.contains("beam_profiler_frames_processed_total 1"));
        // The last measurement stays visible.
        assert!(output.contains("beam_profiler_volume 99"));
    }

    #[test]
    fn test_all_frames_skipped() {
        let registry = MetricsRegistry::new().unwrap();
        for skipped in 1..=3 {
            registry.update_counters(0, skipped);
        }
        let output = registry.encode().unwrap();
        assert!(output.contains("beam_profiler_frames_skipped_total 3"));
        assert!(output.contains("beam_profiler_frames_processed_total 0"));
    }
}
