//! Motion blur for linear f32 images.
//!
//! ## Alpha Handling
//!
//! For RGBA images the blur is premultiplied:
//! 1. Weight each sample's RGB by its alpha
//! 2. Average premultiplied RGB and alpha along the blur line
//! 3. Divide RGB by the averaged alpha
//!
//! This prevents transparent pixels from bleeding color into the result.

use ndarray::{Array3, ArrayView3};

use super::core::{clamp_coord, map_rows};

/// Number of taps for a blur of `radius` pixels (always odd, at least 1).
#[inline]
pub fn motion_blur_taps(radius: f32) -> usize {
    2 * (radius.max(0.0).ceil() as usize) + 1
}

/// Apply a linear motion blur.
///
/// # Arguments
/// * `input` - Linear image with 1, 3, or 4 channels (height, width, channels)
/// * `radius` - Half-length of the blur line in pixels, 0.0 = no change
/// * `angle` - Direction of motion in radians, counter-clockwise from the +x axis with y up
///   (0 = horizontal)
///
/// # Returns
/// Blurred image with same dimensions
pub fn motion_blur_f32(input: ArrayView3<f32>, radius: f32, angle: f32) -> Array3<f32> {
    let (height, width, channels) = input.dim();
    let radius = radius.max(0.0);
    let taps = motion_blur_taps(radius);
    if taps == 1 {
        return input.to_owned();
    }

    // Rows grow downward, so a counter-clockwise angle moves toward smaller y.
    let dx = angle.cos();
    let dy = -angle.sin();
    let step = 2.0 * radius / (taps - 1) as f32;
    let weight = 1.0 / taps as f32;
    let has_alpha = channels == 4;

    // Sample offsets along the line, centred on the pixel.
    let offsets: Vec<(isize, isize)> = (0..taps)
        .map(|i| {
            let t = -radius + i as f32 * step;
            ((dx * t).round() as isize, (dy * t).round() as isize)
        })
        .collect();

    map_rows(input, |y, mut row| {
        let mut sum = [0.0f32; 4];
        for x in 0..width {
            sum.fill(0.0);
            for &(ox, oy) in &offsets {
                let sx = clamp_coord(x as isize + ox, width);
                let sy = clamp_coord(y as isize + oy, height);

                if has_alpha {
                    let a = input[[sy, sx, 3]];
                    for c in 0..3 {
                        sum[c] += input[[sy, sx, c]] * a;
                    }
                    sum[3] += a;
                } else {
                    for c in 0..channels {
                        sum[c] += input[[sy, sx, c]];
                    }
                }
            }

            if has_alpha {
                let alpha = sum[3] * weight;
                row[[x, 3]] = alpha;
                for c in 0..3 {
                    row[[x, c]] = if alpha > 1e-6 {
                        sum[c] * weight / alpha
                    } else {
                        0.0
                    };
                }
            } else {
                for c in 0..channels {
                    row[[x, c]] = sum[c] * weight;
                }
            }
        }
    })
}
