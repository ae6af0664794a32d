//! False-color rendering of the smoothed intensity image.
//!
//! Hue follows inverted intensity and value follows its square root, which
//! stretches contrast in the dim wings of the beam.

use crate::raster::{Bgr, BgrImage, GrayImage};

/// HSV (hue in `0..180`) to BGR, 8-bit.
pub fn hsv_to_bgr(h: u8, s: u8, v: u8) -> Bgr {
    const SECTORS: [[usize; 3]; 6] = [[1, 3, 0], [1, 0, 2], [3, 0, 1], [0, 2, 1], [0, 1, 3], [2, 1, 0]];

    let s = s as f32 / 255.0;
    let v = v as f32 / 255.0;
    let to_u8 = |x: f32| (x * 255.0).round().clamp(0.0, 255.0) as u8;
    if s == 0.0 {
        let g = to_u8(v);
        return Bgr(g, g, g);
    }

    let mut h = h as f32 * (6.0 / 180.0);
    let mut sector = h.floor() as i32;
    h -= sector as f32;
    sector = sector.rem_euclid(6);

    let tab = [v, v * (1.0 - s), v * (1.0 - s * h), v * (1.0 - s * (1.0 - h))];
    let idx = SECTORS[sector as usize];
    Bgr(to_u8(tab[idx[0]]), to_u8(tab[idx[1]]), to_u8(tab[idx[2]]))
}

/// Color assigned to one gray level.
pub fn false_color(gray: u8) -> Bgr {
    let inverted = (255 - gray) as f64;
    let hue = ((inverted * 160.0 / 256.0 + 150.0) % 180.0).floor() as u8;
    let value = ((gray as f64).sqrt() * 16.0).floor().min(255.0) as u8;
    hsv_to_bgr(hue, 255, value)
}

/// Builds the 256-entry lookup table.
pub fn false_color_lut() -> [Bgr; 256] {
    let mut lut = [Bgr::BLACK; 256];
    for (g, entry) in lut.iter_mut().enumerate() {
        *entry = false_color(g as u8);
    }
    lut
}

/// Colorizes a whole image.
pub fn colorize(gray: &GrayImage) -> BgrImage {
    let lut = false_color_lut();
    let mut data = Vec::with_capacity(gray.data().len() * 3);
    for &g in gray.data() {
        data.extend_from_slice(&lut[g as usize].to_array());
    }
    BgrImage::from_raw(gray.width(), gray.height(), data)
}
