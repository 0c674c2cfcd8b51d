//! Resampling helpers.
//!
//! [`resample_bilinear`] backs the pipeline's render step (working size back to
//! source size). [`scale_to_fit`] is the caller-side helper that prepares a
//! display-sized source before filtering; the pipeline itself never calls it.

use ndarray::{s, Array3, ArrayView3};

use crate::buffer::ImageBuffer;
use crate::convert::{render, to_working};
use crate::error::{FilterError, Result};
use crate::filters::core::{clamp_coord, fill_rows};

/// Resample a working image to `(new_width, new_height)` with bilinear filtering.
///
/// Pixel centres are aligned, edges clamp. RGBA is interpolated premultiplied.
/// Same-size requests return an exact copy.
pub fn resample_bilinear(input: ArrayView3<f32>, new_width: usize, new_height: usize) -> Array3<f32> {
    let (height, width, channels) = input.dim();
    if (new_width, new_height) == (width, height) {
        return input.to_owned();
    }
    let scale_x = width as f32 / new_width as f32;
    let scale_y = height as f32 / new_height as f32;
    let has_alpha = channels == 4;

    fill_rows((new_height, new_width, channels), |y, mut row| {
        let fy = ((y as f32 + 0.5) * scale_y - 0.5).max(0.0);
        let y0 = fy.floor() as isize;
        let ty = fy - fy.floor();
        let (y0, y1) = (clamp_coord(y0, height), clamp_coord(y0 + 1, height));

        for x in 0..new_width {
            let fx = ((x as f32 + 0.5) * scale_x - 0.5).max(0.0);
            let x0 = fx.floor() as isize;
            let tx = fx - fx.floor();
            let (x0, x1) = (clamp_coord(x0, width), clamp_coord(x0 + 1, width));

            let taps = [
                (y0, x0, (1.0 - tx) * (1.0 - ty)),
                (y0, x1, tx * (1.0 - ty)),
                (y1, x0, (1.0 - tx) * ty),
                (y1, x1, tx * ty),
            ];

            if has_alpha {
                let mut sum = [0.0f32; 4];
                for &(sy, sx, w) in &taps {
                    let a = input[[sy, sx, 3]];
                    for c in 0..3 {
                        sum[c] += input[[sy, sx, c]] * a * w;
                    }
                    sum[3] += a * w;
                }
                row[[x, 3]] = sum[3];
                for c in 0..3 {
                    row[[x, c]] = if sum[3] > 1e-6 { sum[c] / sum[3] } else { 0.0 };
                }
            } else {
                for c in 0..channels {
                    row[[x, c]] = taps
                        .iter()
                        .map(|&(sy, sx, w)| input[[sy, sx, c]] * w)
                        .sum::<f32>();
                }
            }
        }
    })
}

/// Largest size with the source's aspect ratio that fits in `max_width` x `max_height`.
///
/// Never upscales; each side is at least one pixel.
pub fn fit_dimensions(
    width: usize,
    height: usize,
    max_width: usize,
    max_height: usize,
) -> (usize, usize) {
    let scale = (max_width as f64 / width as f64)
        .min(max_height as f64 / height as f64)
        .min(1.0);
    let w = ((width as f64 * scale).round() as usize).max(1);
    let h = ((height as f64 * scale).round() as usize).max(1);
    (w, h)
}

/// Pixel size of a view measured in points on a screen with the given scale (1x, 2x, 3x).
pub fn display_pixels(width_points: f64, height_points: f64, screen_scale: f64) -> (usize, usize) {
    let w = (width_points * screen_scale).round().max(0.0) as usize;
    let h = (height_points * screen_scale).round().max(0.0) as usize;
    (w, h)
}

/// Scale `source` down to fit the target size, preserving aspect ratio.
///
/// Resampling happens in linear light. A source that already fits is cloned.
pub fn scale_to_fit(source: &ImageBuffer, max_width: usize, max_height: usize) -> Result<ImageBuffer> {
    if max_width == 0 || max_height == 0 {
        return Err(FilterError::invalid_parameter(format!(
            "target size {max_width}x{max_height} is empty"
        )));
    }
    let (w, h) = fit_dimensions(source.width(), source.height(), max_width, max_height);
    if (w, h) == source.dimensions() {
        return Ok(source.clone());
    }
    let working = to_working(source);
    let scaled = render(resample_bilinear(working.view(), w, h).view())?;
    if source.channels() == 1 {
        // Promoted gray channels are identical; keep one.
        return ImageBuffer::from_array(scaled.into_array().slice_move(s![.., .., 0..1]));
    }
    Ok(scaled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_dimensions() {
        assert_eq!(fit_dimensions(400, 200, 100, 100), (100, 50));
        assert_eq!(fit_dimensions(200, 400, 100, 100), (50, 100));
        assert_eq!(fit_dimensions(50, 40, 100, 100), (50, 40));
        assert_eq!(fit_dimensions(1000, 1, 10, 10), (10, 1));
    }

    #[test]
    fn test_display_pixels() {
        assert_eq!(display_pixels(375.0, 300.0, 3.0), (1125, 900));
        assert_eq!(display_pixels(10.5, 4.0, 2.0), (21, 8));
    }

    #[test]
    fn test_resample_same_size_is_copy() {
        let img = Array3::from_shape_fn((3, 5, 3), |(y, x, c)| (y + x + c) as f32 / 10.0);
        assert_eq!(resample_bilinear(img.view(), 5, 3), img);
    }

    #[test]
    fn test_resample_solid_stays_solid() {
        let img = Array3::from_shape_fn((10, 10, 4), |(_, _, c)| if c == 3 { 1.0 } else { 0.3 });
        let down = resample_bilinear(img.view(), 3, 7);
        assert_eq!(down.dim(), (7, 3, 4));
        assert!(down.iter().enumerate().all(|(i, v)| {
            let expected = if i % 4 == 3 { 1.0 } else { 0.3 };
            (v - expected).abs() < 1e-5
        }));

        let up = resample_bilinear(img.view(), 25, 25);
        assert_eq!(up.dim(), (25, 25, 4));
        assert!((up[[12, 12, 1]] - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_scale_to_fit() {
        let src = ImageBuffer::solid(400, 300, &[200, 100, 50]).unwrap();
        let scaled = scale_to_fit(&src, 100, 100).unwrap();
        assert_eq!(scaled.dimensions(), (100, 75));
        assert_eq!(scaled.pixel(50, 40), Some(vec![200, 100, 50]));

        let small = ImageBuffer::solid(20, 10, &[1]).unwrap();
        assert_eq!(scale_to_fit(&small, 100, 100).unwrap(), small);
        assert!(scale_to_fit(&small, 0, 100).is_err());

        let gray = ImageBuffer::solid(40, 20, &[90]).unwrap();
        let scaled = scale_to_fit(&gray, 10, 10).unwrap();
        assert_eq!(scaled.dimensions(), (10, 5));
        assert_eq!(scaled.pixel(3, 2), Some(vec![90]));
    }
}
