//! Frame type representing a captured image with metadata.

use crate::raster::{BgrImage, GrayImage};
use std::time::Instant;
use thiserror::Error;

/// Channel layout of a frame's pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PixelFormat {
    /// Single-channel 8-bit intensity.
    Mono8,
    /// Interleaved 8-bit blue, green, red.
    Bgr8,
    /// Interleaved 8-bit red, green, blue.
    Rgb8,
}

impl PixelFormat {
    /// Bytes per pixel.
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Mono8 => 1,
            PixelFormat::Bgr8 | PixelFormat::Rgb8 => 3,
        }
    }
}

/// Reasons a frame cannot enter the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Width or height is zero.
    #[error("frame has zero area ({width}x{height})")]
    ZeroArea { width: u32, height: u32 },
    /// Pixel buffer does not match the dimensions.
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferLength { expected: usize, actual: usize },
}

/// A single captured frame.
///
/// Frames are immutable once built; the analysis pipeline only ever
/// borrows them.
#[derive(Clone)]
pub struct Frame {
    /// Raw pixel data in `format` layout, row-major.
    pixels: Vec<u8>,
    /// Frame width in pixels.
    width: u32,
    /// Frame height in pixels.
    height: u32,
    /// Channel layout.
    format: PixelFormat,
    /// Capture timestamp.
    timestamp: Instant,
    /// Monotonic sequence number.
    sequence: u64,
}

impl Frame {
    /// Creates a new frame with the given parameters.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, format: PixelFormat, sequence: u64) -> Self {
        Self {
            pixels,
            width,
            height,
            format,
            timestamp: Instant::now(),
            sequence,
        }
    }

    /// Creates a BGR frame.
    pub fn bgr(pixels: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self::new(pixels, width, height, PixelFormat::Bgr8, sequence)
    }

    /// Creates a single-channel frame.
    pub fn mono(pixels: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self::new(pixels, width, height, PixelFormat::Mono8, sequence)
    }

    /// Wraps an already-normalized BGR image.
    pub fn from_bgr_image(image: BgrImage, sequence: u64) -> Self {
        let (w, h) = (image.width() as u32, image.height() as u32);
        Self::bgr(image.into_vec(), w, h, sequence)
    }

    /// Returns the raw pixel bytes.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the pixel layout.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Returns the capture time.
    #[inline]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Returns the frame sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Checks area and buffer length.
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.width == 0 || self.height == 0 {
            return Err(FrameError::ZeroArea {
                width: self.width,
                height: self.height,
            });
        }
        // Overflow can only come from bogus dimensions; report it as an
        // impossible buffer length.
        let expected = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(self.format.channels()))
            .unwrap_or(usize::MAX);
        if self.pixels.len() != expected {
            return Err(FrameError::BufferLength {
                expected,
                actual: self.pixels.len(),
            });
        }
        Ok(())
    }

    /// Validates that the pixel buffer size matches dimensions.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Normalizes the frame to a 3-channel BGR image.
    ///
    /// Mono frames are promoted by replicating the channel; RGB frames have
    /// their red and blue channels swapped. The frame itself is untouched.
    pub fn to_bgr_image(&self) -> Result<BgrImage, FrameError> {
        self.validate()?;
        let (w, h) = (self.width as usize, self.height as usize);
        let image = match self.format {
            PixelFormat::Bgr8 => BgrImage::from_raw(w, h, self.pixels.clone()),
            PixelFormat::Mono8 => GrayImage::from_raw(w, h, self.pixels.clone()).to_bgr(),
            PixelFormat::Rgb8 => {
                let mut swapped = self.pixels.clone();
                for px in swapped.chunks_exact_mut(3) {
                    px.swap(0, 2);
                }
                BgrImage::from_raw(w, h, swapped)
            }
        };
        Ok(image)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("sequence", &self.sequence)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}
