//! Exposure adjustment.
//!
//! Works on linear-light f32 images (0.0-1.0) with 1, 3, or 4 channels.
//! Values are left unclipped so the render step decides how highlights clip.
//! Alpha channel (if present) is always preserved unchanged.

use ndarray::{Array3, ArrayView3};

use super::core::map_pixels;
use crate::convert::color_channels;

/// Adjust image exposure.
///
/// # Arguments
/// * `input` - Linear image with 1, 3, or 4 channels (height, width, channels)
/// * `ev` - Exposure stops: negative darkens, positive brightens, 0.0 = no change
///
/// # Returns
/// Exposure-adjusted image with same channel count
pub fn exposure_f32(input: ArrayView3<f32>, ev: f32) -> Array3<f32> {
    let multiplier = 2.0_f32.powf(ev);
    let color = color_channels(input.dim().2);

    map_pixels(input, |src, mut dst| {
        for c in 0..src.len() {
            dst[c] = if c < color { src[c] * multiplier } else { src[c] };
        }
    })
}
