//! Prometheus exporter for beam measurements.
//!
//! # Metrics Exposed
//!
//! ## Latest frame
//! - `beam_profiler_beam_found` - 1 when the latest frame contained a beam
//! - `beam_profiler_centroid_x_px`, `beam_profiler_centroid_y_px` - Centroid position
//! - `beam_profiler_dist_x_px`, `beam_profiler_dist_y_px` - Offset from the frame center
//! - `beam_profiler_width_px`, `beam_profiler_height_px` - Beam extent
//! - `beam_profiler_volume` - Integrated intensity
//!
//! ## Stream
//! - `beam_profiler_frames_processed_total` - Frames measured
//! - `beam_profiler_frames_skipped_total` - Invalid frames dropped
//!
//! The HTTP endpoint is only built with the `metrics` feature.
//!
//! # Example
//!
//! ```no_run
//! use beam_profiler::analysis::Metrics;
//! use beam_profiler::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//! registry.update(&MetricsSnapshot::from_metrics(&Metrics::empty(), 1, 0));
//! println!("{}", registry.encode().unwrap());
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, MetricsState, ServerError};
