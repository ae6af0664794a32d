//! Intensity-weighted centroid from raw image moments.

use super::threshold::ThresholdMap;
use crate::raster::GrayImage;
use serde::{Deserialize, Serialize};

/// Raw zeroth and first moments of an 8-bit image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Moments {
    /// Sum of intensities.
    pub m00: u64,
    /// Sum of `x * intensity`.
    pub m10: u64,
    /// Sum of `y * intensity`.
    pub m01: u64,
}

impl Moments {
    /// Computes the moments of `image`.
    pub fn of(image: &GrayImage) -> Self {
        let mut m = Moments::default();
        for y in 0..image.height() {
            let mut row_sum = 0u64;
            let mut row_m10 = 0u64;
            for (x, &v) in image.row(y).iter().enumerate() {
                let v = v as u64;
                row_sum += v;
                row_m10 += x as u64 * v;
            }
            m.m00 += row_sum;
            m.m10 += row_m10;
            m.m01 += y as u64 * row_sum;
        }
        m
    }
}

/// Beam center in integer pixel coordinates, or its absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Centroid {
    /// Floor of the first moments over the zeroth moment.
    Present { x: usize, y: usize },
    /// The threshold map summed to zero.
    Absent,
}

impl Centroid {
    /// Returns true for `Present`.
    #[inline]
    pub fn is_present(&self) -> bool {
        matches!(self, Centroid::Present { .. })
    }

    /// `(x, y)` when present.
    #[inline]
    pub fn position(&self) -> Option<(usize, usize)> {
        match *self {
            Centroid::Present { x, y } => Some((x, y)),
            Centroid::Absent => None,
        }
    }
}

/// Locates the center of mass of a threshold map.
#[derive(Debug, Clone, Copy, Default)]
pub struct CentroidLocator;

impl CentroidLocator {
    /// Creates a locator.
    pub fn new() -> Self {
        Self
    }

    /// `floor(m10 / m00), floor(m01 / m00)`; absent when `m00 == 0`.
    pub fn locate(&self, map: &ThresholdMap) -> Centroid {
        let m = Moments::of(map.image());
        if m.m00 == 0 {
            tracing::debug!("No foreground mass");
            return Centroid::Absent;
        }
        let centroid = Centroid::Present {
            x: (m.m10 / m.m00) as usize,
            y: (m.m01 / m.m00) as usize,
        };
        tracing::trace!(?centroid, m00 = m.m00, "Centroid located");
        centroid
    }
}
