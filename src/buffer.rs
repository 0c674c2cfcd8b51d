//! Caller-owned 8-bit pixel buffers.
//!
//! Layout is `(height, width, channels)` like every array in this crate:
//! - **Grayscale**: 1 channel
//! - **RGB**: 3 channels
//! - **RGBA**: 4 channels, straight (non-premultiplied) alpha

use ndarray::{Array3, ArrayView3};

use crate::error::{FilterError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    pixels: Array3<u8>,
}

impl ImageBuffer {
    /// Wrap an `(height, width, channels)` array.
    pub fn from_array(pixels: Array3<u8>) -> Result<Self> {
        let (height, width, channels) = pixels.dim();
        check_shape(width, height, channels)?;
        Ok(Self { pixels })
    }

    /// Build from flat interleaved bytes (row-major, `width * height * channels` long).
    pub fn from_raw(width: usize, height: usize, channels: usize, data: Vec<u8>) -> Result<Self> {
        let expected = check_shape(width, height, channels)?;
        if data.len() != expected {
            return Err(FilterError::invalid_source(format!(
                "expected {expected} bytes for {width}x{height}x{channels}, got {}",
                data.len()
            )));
        }
        let pixels = Array3::from_shape_vec((height, width, channels), data)
            .map_err(|e| FilterError::invalid_source(e.to_string()))?;
        Ok(Self { pixels })
    }

    /// A buffer filled with one color; `color.len()` sets the channel count.
    pub fn solid(width: usize, height: usize, color: &[u8]) -> Result<Self> {
        let channels = color.len();
        check_shape(width, height, channels)?;
        let pixels = Array3::from_shape_fn((height, width, channels), |(_, _, c)| color[c]);
        Ok(Self { pixels })
    }

    pub fn width(&self) -> usize {
        self.pixels.dim().1
    }

    pub fn height(&self) -> usize {
        self.pixels.dim().0
    }

    pub fn channels(&self) -> usize {
        self.pixels.dim().2
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.pixels.view()
    }

    /// Channel values of the pixel at `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Vec<u8>> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some((0..self.channels()).map(|c| self.pixels[[y, x, c]]).collect())
    }

    pub fn into_array(self) -> Array3<u8> {
        self.pixels
    }

    /// Flat interleaved bytes, row-major.
    pub fn into_raw(self) -> Vec<u8> {
        match self.pixels.as_slice() {
            Some(data) => data.to_vec(),
            None => self.pixels.iter().copied().collect(),
        }
    }

    /// Re-check the invariants; buffers built through the constructors always pass.
    pub fn validate(&self) -> Result<()> {
        check_shape(self.width(), self.height(), self.channels()).map(|_| ())
    }
}

/// Validate a shape and return its byte count.
fn check_shape(width: usize, height: usize, channels: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(FilterError::invalid_source(format!(
            "zero-sized image {width}x{height}"
        )));
    }
    if !matches!(channels, 1 | 3 | 4) {
        return Err(FilterError::invalid_source(format!(
            "unsupported channel count {channels} (expected 1, 3 or 4)"
        )));
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .filter(|&n| n <= isize::MAX as usize)
        .ok_or_else(|| {
            FilterError::invalid_source(format!("image {width}x{height}x{channels} is too large"))
        })
}
