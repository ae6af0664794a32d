//! Denoising and dynamic clip-to-zero thresholding.
//!
//! The cutoff tracks the brightest smoothed pixel of each frame, so the
//! moment computation sees only the top `threshold_percent` of the
//! intensity range regardless of exposure.

use super::AnalysisError;
use crate::raster::{bgr_to_gray, gaussian_blur, median_blur, BgrImage, GrayImage};

/// Median window applied to the color frame.
pub const MEDIAN_KSIZE: usize = 5;

/// Gaussian window applied to the grayscale frame.
pub const GAUSSIAN_KSIZE: usize = 25;

/// Cutoff for a given peak: `peak - peak * percent / 100`.
#[inline]
pub fn cutoff_for(peak: u8, threshold_percent: f64) -> f64 {
    let peak = peak as f64;
    peak - peak * threshold_percent / 100.0
}

/// Grayscale map where every pixel below the cutoff is zero.
///
/// Retained pixels keep their smoothed intensity so they still weight the
/// moments.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdMap {
    image: GrayImage,
    peak: u8,
    cutoff: f64,
}

impl ThresholdMap {
    /// Clips `gray` to zero below `cutoff`; pixels at or above it are kept.
    pub fn clip_to_zero(gray: &GrayImage, cutoff: f64) -> Self {
        let mut image = gray.clone();
        for v in image.data_mut() {
            if (*v as f64) < cutoff {
                *v = 0;
            }
        }
        Self {
            image,
            peak: gray.max_value(),
            cutoff,
        }
    }

    /// Returns the clipped image.
    #[inline]
    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    /// Brightest pixel of the source image.
    #[inline]
    pub fn peak(&self) -> u8 {
        self.peak
    }

    /// Returns the threshold value below which pixels were zeroed.
    #[inline]
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }
}

/// Output of the preprocessing stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Preprocessed {
    /// Denoised, blurred grayscale frame.
    pub smoothed: GrayImage,
    /// Clip-to-zero map used for moments.
    pub threshold_map: ThresholdMap,
}

/// Denoise, grayscale, blur, threshold.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    median_ksize: usize,
    gaussian_ksize: usize,
}

impl Preprocessor {
    /// Creates a preprocessor with the default kernel sizes.
    pub fn new() -> Self {
        Self {
            median_ksize: MEDIAN_KSIZE,
            gaussian_ksize: GAUSSIAN_KSIZE,
        }
    }

    /// Creates a preprocessor with custom filter windows.
    pub fn with_kernels(median_ksize: usize, gaussian_ksize: usize) -> Self {
        Self {
            median_ksize: median_ksize.max(1),
            gaussian_ksize: gaussian_ksize.max(1),
        }
    }

    /// Runs the stage on a BGR frame.
    pub fn preprocess(
        &self,
        frame: &BgrImage,
        threshold_percent: f64,
    ) -> Result<Preprocessed, AnalysisError> {
        if frame.is_empty() {
            return Err(AnalysisError::InvalidFrame(format!(
                "zero area {}x{}",
                frame.width(),
                frame.height()
            )));
        }

        let denoised = median_blur(frame, self.median_ksize);
        let gray = bgr_to_gray(&denoised);
        let smoothed = gaussian_blur(&gray, self.gaussian_ksize, 0.0);

        let peak = smoothed.max_value();
        let cutoff = cutoff_for(peak, threshold_percent);
        tracing::debug!(peak, cutoff, "Threshold computed");

        let threshold_map = ThresholdMap::clip_to_zero(&smoothed, cutoff);
        Ok(Preprocessed {
            smoothed,
            threshold_map,
        })
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Bgr;

    #[test]
    fn test_cutoff_formula() {
        assert_eq!(cutoff_for(200, 15.0), 170.0);
        assert_eq!(cutoff_for(200, 0.0), 200.0);
        assert_eq!(cutoff_for(200, 100.0), 0.0);
    }

    #[test]
    fn test_clip_keeps_values_at_cutoff() {
        let gray = GrayImage::from_vec(4, 1, vec![10, 169, 170, 200]).unwrap();
        let map = ThresholdMap::clip_to_zero(&gray, 170.0);
        assert_eq!(map.image().data(), &[0, 0, 170, 200]);
        assert_eq!(map.peak(), 200);
    }

    #[test]
    fn test_zero_area_is_invalid() {
        let frame = BgrImage::new_fill(0, 5, Bgr::BLACK);
        assert!(matches!(
            Preprocessor::new().preprocess(&frame, 15.0),
            Err(AnalysisError::InvalidFrame(_))
        ));
    }

    #[test]
    fn test_black_frame_maps_to_zero() {
        let frame = BgrImage::new_fill(40, 30, Bgr::BLACK);
        let out = Preprocessor::new().preprocess(&frame, 15.0).unwrap();
        assert_eq!(out.threshold_map.peak(), 0);
        assert!(out.threshold_map.image().data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_uniform_frame_fully_retained() {
        let frame = BgrImage::new_fill(40, 30, Bgr(90, 90, 90));
        let out = Preprocessor::new().preprocess(&frame, 15.0).unwrap();
        assert!(out.smoothed.data().iter().all(|&v| v == 90));
        assert_eq!(out.threshold_map.image(), &out.smoothed);
    }
}
