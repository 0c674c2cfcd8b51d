//! Shared helpers for the working-space filters.
//!
//! - Row-parallel dispatch (rayon above [`PARALLEL_THRESHOLD`] pixels)
//! - Luminosity and clamped sampling utilities
//!
//! Every row is computed independently, so the parallel and sequential paths
//! produce bit-identical output.

use ndarray::{s, Array3, ArrayView1, ArrayView3, ArrayViewMut1, ArrayViewMut2, Axis};
use rayon::prelude::*;

/// Images with at least this many pixels are processed across rayon workers.
pub const PARALLEL_THRESHOLD: usize = 65_536;

/// ITU-R BT.709 luminosity coefficients
pub const LUMA_R: f32 = 0.2126;
pub const LUMA_G: f32 = 0.7152;
pub const LUMA_B: f32 = 0.0722;

#[inline]
pub fn luminosity(r: f32, g: f32, b: f32) -> f32 {
    LUMA_R * r + LUMA_G * g + LUMA_B * b
}

/// Clamp a signed coordinate into `0..len`.
#[inline]
pub fn clamp_coord(v: isize, len: usize) -> usize {
    v.clamp(0, len as isize - 1) as usize
}

/// Allocate a `(height, width, channels)` output and fill it row by row.
///
/// `f` receives the row index and a `(width, channels)` view of that output row.
pub fn fill_rows<F>(shape: (usize, usize, usize), f: F) -> Array3<f32>
where
    F: Fn(usize, ArrayViewMut2<f32>) + Sync + Send,
{
    let (height, width, channels) = shape;
    let mut output = Array3::<f32>::zeros((height, width, channels));

    if height * width >= PARALLEL_THRESHOLD {
        output
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    } else {
        for (y, row) in output.axis_iter_mut(Axis(0)).enumerate() {
            f(y, row);
        }
    }
    output
}

/// [`fill_rows`] with an output shaped like `input`.
pub fn map_rows<F>(input: ArrayView3<f32>, f: F) -> Array3<f32>
where
    F: Fn(usize, ArrayViewMut2<f32>) + Sync + Send,
{
    fill_rows(input.dim(), f)
}

/// Pixel-wise variant of [`map_rows`]: `f(source_pixel, output_pixel)`.
pub fn map_pixels<F>(input: ArrayView3<f32>, f: F) -> Array3<f32>
where
    F: Fn(ArrayView1<f32>, ArrayViewMut1<f32>) + Sync + Send,
{
    map_rows(input, |y, mut row| {
        for (x, out_px) in row.outer_iter_mut().enumerate() {
            f(input.slice(s![y, x, ..]), out_px);
        }
    })
}
