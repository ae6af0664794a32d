//! Beam width and height by walking outward from the centroid.

use super::centroid::Centroid;
use crate::raster::GrayImage;
use serde::{Deserialize, Serialize};

/// Fixed intensity below which a pixel is outside the beam (half of full scale).
pub const EXTENT_CUTOFF: u8 = 128;

/// Axis-aligned beam bounds in pixels.
///
/// `left`/`top` are the first retained column/row; `width`/`height`
/// count retained pixels including the centroid pixel exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeamExtent {
    /// First column inside the beam.
    pub left: usize,
    /// First row inside the beam.
    pub top: usize,
    /// Columns spanned, both ends inclusive.
    pub width: usize,
    /// Rows spanned, both ends inclusive.
    pub height: usize,
}

impl BeamExtent {
    /// True if no pixel was retained.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// One past the last retained column.
    #[inline]
    pub fn right(&self) -> usize {
        self.left + self.width
    }

    /// One past the last retained row.
    #[inline]
    pub fn bottom(&self) -> usize {
        self.top + self.height
    }
}

/// Scans the smoothed image along the centroid row and column.
#[derive(Debug, Clone, Copy)]
pub struct BeamExtentScanner {
    cutoff: u8,
}

impl BeamExtentScanner {
    /// Creates a scanner with the default cutoff.
    pub fn new() -> Self {
        Self {
            cutoff: EXTENT_CUTOFF,
        }
    }

    /// Creates a scanner with a custom cutoff.
    pub fn with_cutoff(cutoff: u8) -> Self {
        Self { cutoff }
    }

    /// Returns the intensity a pixel must exceed to count as beam.
    #[inline]
    pub fn cutoff(&self) -> u8 {
        self.cutoff
    }

    /// Measures the extent around `centroid`.
    ///
    /// An absent centroid, or one whose own pixel is below the cutoff,
    /// yields a zero-sized extent anchored at the centroid.
    pub fn scan(&self, smoothed: &GrayImage, centroid: Centroid) -> BeamExtent {
        let Some((cx, cy)) = centroid.position() else {
            return BeamExtent::default();
        };
        if cx >= smoothed.width() || cy >= smoothed.height() {
            return BeamExtent::default();
        }
        if smoothed.get(cx, cy) < self.cutoff {
            return BeamExtent {
                left: cx,
                top: cy,
                width: 0,
                height: 0,
            };
        }

        let (left, width) = self.run(cx, smoothed.width(), |x| smoothed.get(x, cy));
        let (top, height) = self.run(cy, smoothed.height(), |y| smoothed.get(cx, y));

        let extent = BeamExtent {
            left,
            top,
            width,
            height,
        };
        tracing::trace!(?extent, "Extent scanned");
        extent
    }

    /// First retained index and retained count along one axis.
    fn run(&self, start: usize, len: usize, sample: impl Fn(usize) -> u8) -> (usize, usize) {
        let first = (0..start)
            .rev()
            .take_while(|&i| sample(i) >= self.cutoff)
            .last()
            .unwrap_or(start);
        let last = (start + 1..len)
            .take_while(|&i| sample(i) >= self.cutoff)
            .last()
            .unwrap_or(start);
        (first, last - first + 1)
    }
}

impl Default for BeamExtentScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_image(w: usize, h: usize, x0: usize, y0: usize, rw: usize, rh: usize) -> GrayImage {
        let mut img = GrayImage::new_fill(w, h, 20);
        for y in y0..y0 + rh {
            for x in x0..x0 + rw {
                img.set(x, y, 200);
            }
        }
        img
    }

    #[test]
    fn test_rectangle_extent() {
        let img = rect_image(50, 40, 10, 5, 21, 13);
        let extent = BeamExtentScanner::new().scan(&img, Centroid::Present { x: 20, y: 11 });
        assert_eq!(
            extent,
            BeamExtent {
                left: 10,
                top: 5,
                width: 21,
                height: 13
            }
        );
        assert_eq!(extent.right(), 31);
        assert_eq!(extent.bottom(), 18);
    }

    #[test]
    fn test_off_center_centroid_counts_once() {
        let img = rect_image(50, 40, 10, 5, 21, 13);
        let extent = BeamExtentScanner::new().scan(&img, Centroid::Present { x: 11, y: 17 });
        assert_eq!(extent.width, 21);
        assert_eq!(extent.height, 13);
    }

    #[test]
    fn test_border_centroid_stops_at_edge() {
        let img = GrayImage::new_fill(8, 6, 255);
        let extent = BeamExtentScanner::new().scan(&img, Centroid::Present { x: 0, y: 5 });
        assert_eq!(
            extent,
            BeamExtent {
                left: 0,
                top: 0,
                width: 8,
                height: 6
            }
        );
    }

    #[test]
    fn test_dim_centroid_gives_empty_extent() {
        let img = GrayImage::new_fill(8, 6, 127);
        let extent = BeamExtentScanner::new().scan(&img, Centroid::Present { x: 3, y: 2 });
        assert!(extent.is_empty());
        assert_eq!((extent.left, extent.top), (3, 2));
    }

    #[test]
    fn test_absent_centroid() {
        let img = GrayImage::new_fill(8, 6, 255);
        assert_eq!(
            BeamExtentScanner::new().scan(&img, Centroid::Absent),
            BeamExtent::default()
        );
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let img = GrayImage::from_vec(5, 1, vec![127, 128, 200, 128, 127]).unwrap();
        let extent = BeamExtentScanner::new().scan(&img, Centroid::Present { x: 2, y: 0 });
        assert_eq!((extent.left, extent.width), (1, 3));
    }
}
