//! Conversion between caller buffers and the linear-light working representation.
//!
//! Color channels are sRGB-encoded in [`ImageBuffer`] and linear f32 (0.0-1.0)
//! in the working array. Alpha is never gamma-encoded and is only rescaled.

use ndarray::{Array3, ArrayView3};

use crate::buffer::ImageBuffer;
use crate::error::{FilterError, Result};

/// Decode one sRGB-encoded value (0.0-1.0) to linear light.
#[inline]
pub fn srgb_to_linear(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Encode one linear value (0.0-1.0) as sRGB.
#[inline]
pub fn linear_to_srgb(linear: f32) -> f32 {
    if linear <= 0.0031308 {
        linear * 12.92
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

/// Number of gamma-encoded channels (alpha excluded).
#[inline]
pub fn color_channels(channels: usize) -> usize {
    if channels == 4 {
        3
    } else {
        channels
    }
}

/// Channel count of the working copy: gray is promoted to RGB.
#[inline]
pub fn working_channels(channels: usize) -> usize {
    if channels == 1 {
        3
    } else {
        channels
    }
}

/// Convert a u8 buffer to linear f32.
///
/// RGB and RGBA keep their shape. A gray source is replicated into three
/// color channels so every filter sees color input.
pub fn to_working(source: &ImageBuffer) -> Array3<f32> {
    // 256-entry table: decoding is the same for every pixel.
    let lut: Vec<f32> = (0..=255u8)
        .map(|v| srgb_to_linear(v as f32 / 255.0))
        .collect();
    let channels = source.channels();
    let color = color_channels(channels);

    let input = source.view();
    let (height, width, _) = input.dim();
    Array3::from_shape_fn((height, width, working_channels(channels)), |(y, x, c)| {
        let v = input[[y, x, c.min(channels - 1)]];
        if c < color || channels == 1 {
            lut[v as usize]
        } else {
            v as f32 / 255.0
        }
    })
}

/// Encode a linear f32 array back into a u8 buffer.
///
/// Fails if any sample is NaN or infinite; values outside 0.0-1.0 are clipped.
pub fn render(working: ArrayView3<f32>) -> Result<ImageBuffer> {
    if let Some(bad) = working.iter().find(|v| !v.is_finite()) {
        return Err(FilterError::render(format!(
            "working image contains non-finite sample {bad}"
        )));
    }
    let color = color_channels(working.dim().2);

    let pixels = Array3::from_shape_fn(working.dim(), |(y, x, c)| {
        let v = working[[y, x, c]].clamp(0.0, 1.0);
        let encoded = if c < color { linear_to_srgb(v) } else { v };
        (encoded * 255.0).round().clamp(0.0, 255.0) as u8
    });
    ImageBuffer::from_array(pixels).map_err(|e| FilterError::render(e.to_string()))
}
