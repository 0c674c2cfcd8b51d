//! The filter engine seam.
//!
//! The pipeline only needs "apply this named transform with these parameters".
//! [`CpuEngine`] satisfies that with the rayon-backed filters in
//! [`crate::filters`]; other engines (GPU, test doubles) plug in through
//! [`FilterEngine`].

use ndarray::{Array3, ArrayView3};

use crate::error::{FilterError, Result};
use crate::filters::{blur, color_adjust, color_science, stylize};
use crate::registry::{lookup, FilterKind};

pub trait FilterEngine: Send + Sync {
    /// Apply `kind` to a linear working image.
    ///
    /// `params` holds exactly the filter's arity of already-clamped values, in
    /// registry order. Implementations return an image of the same shape.
    fn apply_named_transform(
        &self,
        kind: FilterKind,
        input: ArrayView3<f32>,
        params: &[f32],
    ) -> Result<Array3<f32>>;
}

/// Signature shared by every CPU transform.
pub type TransformFn = fn(ArrayView3<f32>, &[f32]) -> Array3<f32>;

fn exposure(input: ArrayView3<f32>, p: &[f32]) -> Array3<f32> {
    color_adjust::exposure_f32(input, p[0])
}

fn vibrance(input: ArrayView3<f32>, p: &[f32]) -> Array3<f32> {
    color_science::vibrance_f32(input, p[0])
}

fn vignette(input: ArrayView3<f32>, p: &[f32]) -> Array3<f32> {
    stylize::vignette_f32(input, p[0], p[1])
}

fn sepia_tone(input: ArrayView3<f32>, p: &[f32]) -> Array3<f32> {
    color_science::sepia_f32(input, p[0])
}

fn motion_blur(input: ArrayView3<f32>, p: &[f32]) -> Array3<f32> {
    blur::motion_blur_f32(input, p[0], p[1])
}

/// Dispatch table, indexed like [`FilterKind::ALL`].
const TRANSFORMS: [(FilterKind, TransformFn); 5] = [
    (FilterKind::Exposure, exposure),
    (FilterKind::Vibrance, vibrance),
    (FilterKind::Vignette, vignette),
    (FilterKind::SepiaTone, sepia_tone),
    (FilterKind::MotionBlur, motion_blur),
];

pub fn transform_for(kind: FilterKind) -> TransformFn {
    TRANSFORMS[kind.index()].1
}

/// In-process CPU implementation of every registered filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuEngine;

impl FilterEngine for CpuEngine {
    fn apply_named_transform(
        &self,
        kind: FilterKind,
        input: ArrayView3<f32>,
        params: &[f32],
    ) -> Result<Array3<f32>> {
        let arity = lookup(kind).arity();
        if params.len() != arity {
            return Err(FilterError::render(format!(
                "{kind} expects {arity} parameter(s), got {}",
                params.len()
            )));
        }
        Ok(transform_for(kind)(input, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_kinds() {
        for (i, (kind, _)) in TRANSFORMS.iter().enumerate() {
            assert_eq!(*kind, FilterKind::ALL[i]);
        }
    }

    #[test]
    fn test_cpu_engine_checks_arity() {
        let img = Array3::<f32>::zeros((2, 2, 3));
        let engine = CpuEngine;
        assert!(engine
            .apply_named_transform(FilterKind::Vignette, img.view(), &[0.5])
            .is_err());
        assert!(engine
            .apply_named_transform(FilterKind::Exposure, img.view(), &[1.0])
            .is_ok());
    }

    #[test]
    fn test_dispatch_reaches_named_filter() {
        let img = Array3::from_elem((2, 2, 3), 0.25f32);
        let out = CpuEngine
            .apply_named_transform(FilterKind::Exposure, img.view(), &[1.0])
            .unwrap();
        assert!((out[[1, 1, 2]] - 0.5).abs() < 1e-6);
    }
}
