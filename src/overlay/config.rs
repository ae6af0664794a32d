//! Overlay styling.

use crate::raster::Bgr;
use serde::{Deserialize, Serialize};

/// Line widths, font sizes, colors and tick lengths of the overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Width of the crosshair and ruler lines.
    pub line_width: u32,
    /// Width of intensity cuts and the beam rectangle.
    pub line_width_bold: u32,
    /// Ruler and info panel text.
    pub font_scale: f64,
    /// Brush size for ruler and panel text.
    pub font_thickness: u32,
    /// "Beam not found" text.
    pub status_font_scale: f64,
    /// Brush size for the status text.
    pub status_thickness: u32,
    /// Caption in the bottom-left corner.
    pub caption_font_scale: f64,

    /// Centroid crosshair.
    pub crosshair_color: Bgr,
    /// Intensity cuts.
    pub cut_color: Bgr,
    /// Beam rectangle.
    pub box_color: Bgr,
    /// Ruler ticks, labels and the optical-zero cross.
    pub ruler_color: Bgr,
    /// "Beam not found" text.
    pub status_color: Bgr,

    /// Half-length of the cross marking the optical zero.
    pub center_cross_half_len: i64,
    /// Length of labeled ticks and of the emphasized minor tick.
    pub major_tick_len: i64,
    /// Length of the other minor ticks.
    pub minor_tick_len: i64,
    /// Distance of ruler labels from the frame edge.
    pub label_offset: i64,

    /// Draw the metrics table in the top-right corner.
    pub show_info_panel: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            line_width: 1,
            line_width_bold: 2,
            font_scale: 0.6,
            font_thickness: 1,
            status_font_scale: 1.0,
            status_thickness: 2,
            caption_font_scale: 0.4,
            crosshair_color: Bgr::GRAY,
            cut_color: Bgr::YELLOW,
            box_color: Bgr::WHITE,
            ruler_color: Bgr::WHITE,
            status_color: Bgr::RED,
            center_cross_half_len: 20,
            major_tick_len: 20,
            minor_tick_len: 10,
            label_offset: 30,
            show_info_panel: false,
        }
    }
}
