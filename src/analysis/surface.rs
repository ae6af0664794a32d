//! Coarse intensity surface for 3-D plotting.

use crate::raster::GrayImage;

/// Default side length of the surface grid.
pub const SURFACE_GRID_SIZE: usize = 60;

/// Bilinear resample of `image` onto a `size`×`size` grid, row-major.
///
/// Sample positions use pixel-center alignment.
pub fn surface_grid(image: &GrayImage, size: usize) -> Vec<Vec<u8>> {
    if image.is_empty() || size == 0 {
        return Vec::new();
    }
    let sx = image.width() as f64 / size as f64;
    let sy = image.height() as f64 / size as f64;
    let max_x = image.width() - 1;
    let max_y = image.height() - 1;

    let axis = |i: usize, scale: f64, max: usize| -> (usize, usize, f64) {
        let f = ((i as f64 + 0.5) * scale - 0.5).max(0.0);
        let i0 = (f.floor() as usize).min(max);
        let i1 = (i0 + 1).min(max);
        (i0, i1, f - i0 as f64)
    };

    (0..size)
        .map(|gy| {
            let (y0, y1, fy) = axis(gy, sy, max_y);
            (0..size)
                .map(|gx| {
                    let (x0, x1, fx) = axis(gx, sx, max_x);
                    let top = image.get(x0, y0) as f64 * (1.0 - fx) + image.get(x1, y0) as f64 * fx;
                    let bottom =
                        image.get(x0, y1) as f64 * (1.0 - fx) + image.get(x1, y1) as f64 * fx;
                    (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8
                })
                .collect()
        })
        .collect()
}
