//! Denoising, color conversion and smoothing filters.

use super::border::{map_index, BorderMode};
use super::image::{BgrImage, GrayImage};
use ::image::RgbImage;

/// Per-channel median filter over a `ksize`×`ksize` window.
///
/// `ksize` must be odd; even sizes are bumped to the next odd value.
/// Edges replicate the border pixel.
pub fn median_blur(src: &BgrImage, ksize: usize) -> BgrImage {
    let ksize = ksize | 1;
    if ksize == 1 || src.is_empty() {
        return src.clone();
    }
    let (w, h) = (src.width(), src.height());
    // Channels are filtered independently, so BGR bytes pass through an
    // `Rgb` buffer unchanged.
    let Some(buffer) = RgbImage::from_raw(w as u32, h as u32, src.data().to_vec()) else {
        return src.clone();
    };
    let r = (ksize / 2) as u32;
    let filtered = imageproc::filter::median_filter(&buffer, r, r);
    BgrImage::from_raw(w, h, filtered.into_raw())
}

/// Luma conversion with ITU-R BT.601 weights in 14-bit fixed point.
pub fn bgr_to_gray(src: &BgrImage) -> GrayImage {
    const SHIFT: u32 = 14;
    const B: u32 = 1868;
    const G: u32 = 9617;
    const R: u32 = 4899;

    let data: Vec<u8> = src
        .data()
        .chunks_exact(3)
        .map(|px| {
            let y = px[0] as u32 * B + px[1] as u32 * G + px[2] as u32 * R + (1 << (SHIFT - 1));
            (y >> SHIFT) as u8
        })
        .collect();

    GrayImage::from_raw(src.width(), src.height(), data)
}

/// Sigma derived from the kernel size when none is given explicitly.
pub fn auto_sigma(ksize: usize) -> f64 {
    0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1D Gaussian kernel of length `ksize`.
pub fn gaussian_kernel(ksize: usize, sigma: f64) -> Vec<f32> {
    let ksize = ksize | 1;
    let sigma = if sigma > 0.0 { sigma } else { auto_sigma(ksize) };
    let r = (ksize / 2) as f64;
    let mut k: Vec<f64> = (0..ksize)
        .map(|i| {
            let x = i as f64 - r;
            (-(x * x) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = k.iter().sum();
    for v in &mut k {
        *v /= sum;
    }
    k.into_iter().map(|v| v as f32).collect()
}

/// Separable Gaussian blur with reflect-101 borders.
///
/// A non-positive `sigma` is derived from `ksize`.
pub fn gaussian_blur(src: &GrayImage, ksize: usize, sigma: f64) -> GrayImage {
    if src.is_empty() {
        return src.clone();
    }
    let kernel = gaussian_kernel(ksize, sigma);
    let r = (kernel.len() / 2) as isize;
    let (w, h) = (src.width(), src.height());
    let data = src.data();

    let mut tmp = vec![0f32; w * h];
    for y in 0..h {
        let row = &data[y * w..(y + 1) * w];
        for x in 0..w {
            let mut acc = 0f32;
            for (k, &kv) in kernel.iter().enumerate() {
                let xx = map_index(x as isize + k as isize - r, w, BorderMode::Reflect101);
                acc += row[xx] as f32 * kv;
            }
            tmp[y * w + x] = acc;
        }
    }

    let mut out = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0f32;
            for (k, &kv) in kernel.iter().enumerate() {
                let yy = map_index(y as isize + k as isize - r, h, BorderMode::Reflect101);
                acc += tmp[yy * w + x] * kv;
            }
            out[y * w + x] = acc.round().clamp(0.0, 255.0) as u8;
        }
    }

    GrayImage::from_raw(w, h, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Bgr;

    #[test]
    fn test_median_removes_salt() {
        let mut img = BgrImage::new_fill(9, 9, Bgr(10, 20, 30));
        img.set(4, 4, Bgr::WHITE);
        let out = median_blur(&img, 5);
        assert_eq!(out.get(4, 4), Bgr(10, 20, 30));
    }

    #[test]
    fn test_median_replicates_border() {
        let mut img = BgrImage::new_fill(5, 5, Bgr(10, 10, 10));
        for y in 0..5 {
            img.set(0, y, Bgr(200, 100, 50));
        }
        let out = median_blur(&img, 5);
        // Columns -2 and -1 replicate column 0: 15 of 25 samples are bright.
        assert_eq!(out.get(0, 2), Bgr(200, 100, 50));
        assert_eq!(out.get(2, 2), Bgr(10, 10, 10));
    }

    #[test]
    fn test_median_keeps_channel_order() {
        let img = BgrImage::new_fill(7, 4, Bgr(1, 2, 3));
        assert_eq!(median_blur(&img, 5), img);
    }

    #[test]
    fn test_gray_weights() {
        let img = BgrImage::from_vec(3, 1, vec![255, 0, 0, 0, 255, 0, 0, 0, 255]).unwrap();
        let gray = bgr_to_gray(&img);
        assert_eq!(gray.data(), &[29, 150, 76]);
    }

    #[test]
    fn test_gray_of_white_is_white() {
        let img = BgrImage::new_fill(2, 2, Bgr::WHITE);
        assert!(bgr_to_gray(&img).data().iter().all(|&v| v == 255));
    }

    #[test]
    fn test_auto_sigma_for_25() {
        assert!((auto_sigma(25) - 4.1).abs() < 1e-9);
    }

    #[test]
    fn test_kernel_normalized_and_symmetric() {
        let k = gaussian_kernel(25, 0.0);
        assert_eq!(k.len(), 25);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        for i in 0..12 {
            assert!((k[i] - k[24 - i]).abs() < 1e-7);
        }
    }

    #[test]
    fn test_blur_preserves_constant() {
        let img = GrayImage::new_fill(30, 20, 77);
        let out = gaussian_blur(&img, 25, 0.0);
        assert!(out.data().iter().all(|&v| v == 77));
    }

    #[test]
    fn test_blur_spreads_impulse() {
        let mut img = GrayImage::new_fill(31, 31, 0);
        img.set(15, 15, 255);
        let out = gaussian_blur(&img, 7, 1.0);
        assert!(out.get(15, 15) < 255);
        assert!(out.get(16, 15) > 0);
        assert_eq!(out.get(16, 15), out.get(14, 15));
    }
}
