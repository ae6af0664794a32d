//! Pixel buffers and the neighbourhood filters used by the preprocessor.
//!
//! Everything here is 8-bit: frames arrive normalized to 3-channel BGR or
//! single-channel gray, and the analysis stages never need more depth.

mod border;
mod filter;
mod image;

pub use border::{map_index, BorderMode};
pub use filter::{auto_sigma, bgr_to_gray, gaussian_blur, gaussian_kernel, median_blur};
pub use image::{Bgr, BgrImage, GrayImage, RasterError};
