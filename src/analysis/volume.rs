//! Integrated intensity over the beam rectangle.

use super::extent::BeamExtent;
use crate::raster::GrayImage;

/// Sums smoothed intensities inside a `BeamExtent`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VolumeIntegrator;

impl VolumeIntegrator {
    /// Creates an integrator.
    pub fn new() -> Self {
        Self
    }

    /// Raw intensity sum over `[top, top+height) x [left, left+width)`.
    ///
    /// The rectangle is clipped to the image.
    pub fn integrate(&self, smoothed: &GrayImage, extent: &BeamExtent) -> u64 {
        let x0 = extent.left.min(smoothed.width());
        let x1 = extent.right().min(smoothed.width());
        let y0 = extent.top.min(smoothed.height());
        let y1 = extent.bottom().min(smoothed.height());

        (y0..y1)
            .map(|y| {
                smoothed.row(y)[x0..x1]
                    .iter()
                    .map(|&v| v as u64)
                    .sum::<u64>()
            })
            .sum()
    }
}
