//! Stylize filters: Vignette.
//!
//! Works on linear f32 images with 1, 3, or 4 channels; alpha preserved.

use ndarray::{Array3, ArrayView3};

use super::core::map_rows;
use crate::convert::color_channels;

/// Fraction of the radius over which the vignette fades in.
const VIGNETTE_FALLOFF: f32 = 0.5;

#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x >= edge1 { 1.0 } else { 0.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Darken (or, with negative intensity, brighten) the image outside a circle
/// centred on the image.
///
/// # Arguments
/// * `input` - Linear image with 1, 3, or 4 channels (height, width, channels)
/// * `intensity` - -1.0 to 1.0; 1.0 fades fully to black, 0.0 = no change
/// * `radius` - Radius in pixels where the effect reaches full strength
///
/// # Returns
/// Vignetted image with same channel count
pub fn vignette_f32(input: ArrayView3<f32>, intensity: f32, radius: f32) -> Array3<f32> {
    let (height, width, channels) = input.dim();
    let color = color_channels(channels);

    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let radius = radius.max(0.0);
    let inner = radius * (1.0 - VIGNETTE_FALLOFF);

    map_rows(input, |y, mut row| {
        let dy = y as f32 + 0.5 - cy;
        for x in 0..width {
            let dx = x as f32 + 0.5 - cx;
            let dist = (dx * dx + dy * dy).sqrt();
            let mask = smoothstep(inner, radius, dist);
            let factor = (1.0 - intensity * mask).max(0.0);

            for c in 0..channels {
                let v = input[[y, x, c]];
                row[[x, c]] = if c < color { v * factor } else { v };
            }
        }
    })
}
