//! Color science filters: Vibrance, Sepia Tone.
//!
//! ## Supported Formats
//!
//! - **Grayscale (1 channel)**: No-op (color operations require RGB)
//! - **RGB (3 channels)**: Full color processing
//! - **RGBA (4 channels)**: RGB processed, alpha preserved

use ndarray::{Array3, ArrayView3};

use super::core::{luminosity, map_pixels};

// ============================================================================
// Vibrance
// ============================================================================

/// Adjust image vibrance.
///
/// Vibrance boosts less-saturated colors while protecting skin tones.
/// Neutral grays are unchanged for any amount. 1-channel input is returned
/// as is; the pipeline promotes gray sources to RGB before filtering.
///
/// # Arguments
/// * `input` - Linear image with 1, 3, or 4 channels (height, width, channels)
/// * `amount` - Vibrance adjustment: -1.0 to 1.0, 0.0 = no change
pub fn vibrance_f32(input: ArrayView3<f32>, amount: f32) -> Array3<f32> {
    if input.dim().2 == 1 {
        return input.to_owned();
    }

    map_pixels(input, |src, mut dst| {
        let (r, g, b) = (src[0], src[1], src[2]);

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let sat = if max > 0.0 { (max - min) / max } else { 0.0 };

        let is_skin_like = r > g && g > b && r > 0.4 && g > 0.2;
        let skin_factor = if is_skin_like { 0.5 } else { 1.0 };

        let sat_factor = 1.0 + (1.0 - sat) * amount * skin_factor;
        let gray = luminosity(r, g, b);

        dst[0] = (gray + (r - gray) * sat_factor).max(0.0);
        dst[1] = (gray + (g - gray) * sat_factor).max(0.0);
        dst[2] = (gray + (b - gray) * sat_factor).max(0.0);
        if src.len() == 4 {
            dst[3] = src[3];
        }
    })
}

// ============================================================================
// Sepia Tone
// ============================================================================

/// Classic sepia matrix, rows produce R, G, B.
const SEPIA: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Tint toward sepia.
///
/// 1-channel input has no room for a tint and is returned as is.
///
/// # Arguments
/// * `input` - Linear image with 1, 3, or 4 channels (height, width, channels)
/// * `intensity` - Blend toward the sepia tone: 0.0 = no change, 1.0 = full sepia
pub fn sepia_f32(input: ArrayView3<f32>, intensity: f32) -> Array3<f32> {
    if input.dim().2 == 1 {
        return input.to_owned();
    }
    let t = intensity.clamp(0.0, 1.0);

    map_pixels(input, |src, mut dst| {
        let rgb = [src[0], src[1], src[2]];
        for (c, row) in SEPIA.iter().enumerate() {
            let toned = row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2];
            dst[c] = rgb[c] + (toned - rgb[c]) * t;
        }
        if src.len() == 4 {
            dst[3] = src[3];
        }
    })
}
