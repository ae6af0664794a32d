//! Diagnostic overlay rendering.
//!
//! `OverlayRenderer` draws through the [`Canvas`] trait, so a frame's
//! overlay can be rasterized with [`RasterCanvas`] or inspected as
//! primitives with [`PrimitiveRecorder`].

mod canvas;
mod colormap;
mod config;
mod font;
mod grid;
mod renderer;

pub use canvas::{Canvas, Point, Primitive, PrimitiveRecorder, RasterCanvas, TextStyle};
pub use colormap::{colorize, false_color, false_color_lut, hsv_to_bgr};
pub use config::OverlayConfig;
pub use font::{measure as measure_text, pixel_scale};
pub use grid::{MajorTick, MinorTick, RulerAxis, RulerGrid, EMPHASIZED_MINOR};
pub use renderer::{metrics_rows, InfoRow, OverlayRenderer, BEAM_NOT_FOUND};
