//! Owned 8-bit pixel buffers.

use thiserror::Error;

/// Errors raised when building raster buffers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RasterError {
    /// Buffer length does not match the dimensions.
    #[error("buffer length {actual} does not match dimensions (expected {expected})")]
    SizeMismatch { expected: usize, actual: usize },
    /// Width or height is zero.
    #[error("image has zero area")]
    Empty,
}

/// A color in BGR channel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct Bgr(pub u8, pub u8, pub u8);

impl Bgr {
    /// Black.
    pub const BLACK: Bgr = Bgr(0, 0, 0);
    /// White.
    pub const WHITE: Bgr = Bgr(255, 255, 255);
    /// Red.
    pub const RED: Bgr = Bgr(0, 0, 255);
    /// Yellow.
    pub const YELLOW: Bgr = Bgr(0, 255, 255);
    /// Light gray.
    pub const GRAY: Bgr = Bgr(170, 170, 170);

    /// Returns the channels as a `[b, g, r]` array.
    #[inline]
    pub fn to_array(self) -> [u8; 3] {
        [self.0, self.1, self.2]
    }
}

fn checked_len(width: usize, height: usize, channels: usize) -> Result<usize, RasterError> {
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(RasterError::SizeMismatch {
            expected: usize::MAX,
            actual: 0,
        })
}

/// Single-channel 8-bit image, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct GrayImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GrayImage {
    /// Wraps an existing buffer, checking its length against the dimensions.
    pub fn from_vec(width: usize, height: usize, data: Vec<u8>) -> Result<Self, RasterError> {
        let expected = checked_len(width, height, 1)?;
        if data.len() != expected {
            return Err(RasterError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub(crate) fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            width,
            height,
            data,
        }
    }

    /// Creates an image filled with a constant value.
    pub fn new_fill(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Returns the width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns true if the image has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the row-major pixel bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the pixel bytes for in-place edits.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Pixel at column `x`, row `y`. Panics when out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Sets the pixel at column `x`, row `y`. Panics when out of bounds.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.data[y * self.width + x] = value;
    }

    /// Row `y` as a slice.
    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// Maximum pixel value, or 0 for an empty image.
    pub fn max_value(&self) -> u8 {
        self.data.iter().copied().max().unwrap_or(0)
    }

    /// Replicates the gray channel into a 3-channel image.
    pub fn to_bgr(&self) -> BgrImage {
        let mut data = Vec::with_capacity(self.data.len() * 3);
        for &v in &self.data {
            data.extend_from_slice(&[v, v, v]);
        }
        BgrImage {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

impl std::fmt::Debug for GrayImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrayImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Three-channel 8-bit image, interleaved in BGR order.
#[derive(Clone, PartialEq, Eq)]
pub struct BgrImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BgrImage {
    /// Wraps an interleaved BGR buffer.
    pub fn from_vec(width: usize, height: usize, data: Vec<u8>) -> Result<Self, RasterError> {
        let expected = checked_len(width, height, 3)?;
        if data.len() != expected {
            return Err(RasterError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub(crate) fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height * 3);
        Self {
            width,
            height,
            data,
        }
    }

    /// Creates an image filled with `color`.
    pub fn new_fill(width: usize, height: usize, color: Bgr) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&color.to_array());
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Returns the width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns true if the image has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the row-major pixel bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the image, returning its BGR bytes.
    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Pixel at column `x`, row `y`. Panics when out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Bgr {
        let i = (y * self.width + x) * 3;
        Bgr(self.data[i], self.data[i + 1], self.data[i + 2])
    }

    /// Sets the pixel at column `x`, row `y`. Panics when out of bounds.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, color: Bgr) {
        let i = (y * self.width + x) * 3;
        self.data[i..i + 3].copy_from_slice(&color.to_array());
    }

    /// Returns the buffer with R and B swapped, i.e. in RGB order.
    pub fn to_rgb_vec(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(3) {
            px.swap(0, 2);
        }
        out
    }

    /// BLAKE3 digest of the pixel buffer and dimensions.
    pub fn digest(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.width as u64).to_le_bytes());
        hasher.update(&(self.height as u64).to_le_bytes());
        hasher.update(&self.data);
        hasher.finalize()
    }
}

impl std::fmt::Debug for BgrImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BgrImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_size_mismatch() {
        let err = GrayImage::from_vec(4, 4, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            RasterError::SizeMismatch {
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn test_gray_to_bgr_replicates() {
        let gray = GrayImage::from_vec(2, 1, vec![10, 200]).unwrap();
        let bgr = gray.to_bgr();
        assert_eq!(bgr.get(1, 0), Bgr(200, 200, 200));
    }

    #[test]
    fn test_digest_depends_on_pixels() {
        let a = BgrImage::new_fill(4, 4, Bgr::BLACK);
        let mut b = a.clone();
        assert_eq!(a.digest(), b.digest());
        b.set(0, 0, Bgr::WHITE);
        assert_ne!(a.digest(), b.digest());
    }
}
