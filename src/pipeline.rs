//! The filter pipeline: resolve, clamp, convert, transform, render.
//!
//! Every call is independent. The pipeline keeps no per-call state and never
//! holds on to the caller's buffer after returning, so one pipeline can serve
//! any number of threads at once.

use tracing::{debug, warn};

use crate::buffer::ImageBuffer;
use crate::config::PipelineOptions;
use crate::convert::{render, to_working};
use crate::engine::{CpuEngine, FilterEngine};
use crate::error::{FilterError, Result};
use crate::registry::{self, FilterDefinition, FilterKind, ParameterUnit};
use crate::scale::{fit_dimensions, resample_bilinear};

/// One filter invocation. Borrowed, built per call.
#[derive(Debug, Clone, Copy)]
pub struct FilterRequest<'a> {
    pub kind: FilterKind,
    pub source: &'a ImageBuffer,
    pub param1: f64,
    pub param2: Option<f64>,
}

impl<'a> FilterRequest<'a> {
    pub fn new(kind: FilterKind, source: &'a ImageBuffer, param1: f64) -> Self {
        Self {
            kind,
            source,
            param1,
            param2: None,
        }
    }

    pub fn with_param2(mut self, value: f64) -> Self {
        self.param2 = Some(value);
        self
    }
}

pub struct FilterPipeline<E = CpuEngine> {
    engine: E,
    options: PipelineOptions,
    pool: Option<rayon::ThreadPool>,
}

impl FilterPipeline<CpuEngine> {
    pub fn new() -> Self {
        Self {
            engine: CpuEngine,
            options: PipelineOptions::default(),
            pool: None,
        }
    }

    pub fn with_options(options: PipelineOptions) -> Result<Self> {
        Self::with_engine(CpuEngine, options)
    }
}

impl Default for FilterPipeline<CpuEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: FilterEngine> FilterPipeline<E> {
    pub fn with_engine(engine: E, options: PipelineOptions) -> Result<Self> {
        options.validate()?;
        let pool = match options.threads {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("filteredit-{i}"))
                    .build()
                    .map_err(|e| FilterError::invalid_options(e.to_string()))?,
            ),
            None => None,
        };
        Ok(Self {
            engine,
            options,
            pool,
        })
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Filter definitions for building selection UI, in display order.
    pub fn list_filters(&self) -> &'static [FilterDefinition] {
        registry::list_filters()
    }

    /// Filter `source` with `kind`. Out-of-range parameters are clamped.
    ///
    /// The output has the source's dimensions. Gray sources come back as RGB.
    pub fn apply(
        &self,
        kind: FilterKind,
        source: &ImageBuffer,
        param1: f64,
        param2: Option<f64>,
    ) -> Result<ImageBuffer> {
        self.apply_request(&FilterRequest {
            kind,
            source,
            param1,
            param2,
        })
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(
            kind = %request.kind,
            width = request.source.width(),
            height = request.source.height()
        )
    )]
    pub fn apply_request(&self, request: &FilterRequest<'_>) -> Result<ImageBuffer> {
        match &self.pool {
            Some(pool) => pool.install(|| self.run(request)),
            None => self.run(request),
        }
    }

    fn run(&self, request: &FilterRequest<'_>) -> Result<ImageBuffer> {
        let definition = registry::lookup(request.kind);
        let source = request.source;
        source.validate()?;

        let params = definition.clamp_params(request.param1, request.param2);
        let given = [Some(request.param1), request.param2];
        for ((spec, used), given) in definition.parameters.iter().zip(&params).zip(given) {
            if let Some(given) = given {
                if given.to_bits() != used.to_bits() {
                    debug!(parameter = spec.name, given, used = *used, "parameter clamped");
                }
            }
        }

        let (width, height) = source.dimensions();
        let mut working = to_working(source);
        let mut pixel_scale = 1.0f64;

        if let Some(max_dim) = self.options.max_working_dimension {
            let longest = width.max(height);
            if longest > max_dim {
                let (w, h) = fit_dimensions(width, height, max_dim, max_dim);
                pixel_scale = w.max(h) as f64 / longest as f64;
                debug!(
                    working_width = w,
                    working_height = h,
                    "filtering at reduced resolution"
                );
                working = resample_bilinear(working.view(), w, h);
            }
        }

        let engine_params: Vec<f32> = definition
            .parameters
            .iter()
            .zip(&params)
            .map(|(spec, &v)| match spec.unit {
                ParameterUnit::Pixels => (v * pixel_scale) as f32,
                _ => v as f32,
            })
            .collect();

        let output = self
            .engine
            .apply_named_transform(request.kind, working.view(), &engine_params)
            .map_err(|e| {
                warn!(error = %e, "filter engine failed");
                match e {
                    FilterError::RenderFailure(_) => e,
                    other => FilterError::render(other.to_string()),
                }
            })?;

        let (out_h, out_w, out_c) = output.dim();
        if out_c != working.dim().2 || out_w == 0 || out_h == 0 {
            warn!(out_w, out_h, out_c, "filter engine returned an unusable image");
            return Err(FilterError::render(format!(
                "engine produced a {out_w}x{out_h}x{out_c} image for a {}-channel working image",
                working.dim().2
            )));
        }

        let output = if (out_w, out_h) == (width, height) {
            output
        } else {
            resample_bilinear(output.view(), width, height)
        };

        render(output.view()).inspect_err(|e| warn!(error = %e, "render failed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, ArrayView3};
    use std::f64::consts::PI;

    /// 100x100 RGBA with a diagonal gradient and a little color.
    fn gradient_rgba() -> ImageBuffer {
        let pixels = Array3::from_shape_fn((100, 100, 4), |(y, x, c)| match c {
            0 => (30 + x + y / 2) as u8,
            1 => (40 + y) as u8,
            2 => (60 + (x + y) / 3) as u8,
            _ => 255,
        });
        ImageBuffer::from_array(pixels).unwrap()
    }

    fn mean_color(buf: &ImageBuffer) -> f64 {
        let view = buf.view();
        let color = buf.channels().min(3);
        let mut sum = 0.0;
        for ((_, _, c), v) in view.indexed_iter() {
            if c < color {
                sum += *v as f64;
            }
        }
        sum / (buf.width() * buf.height() * color) as f64
    }

    fn max_abs_diff(a: &ImageBuffer, b: &ImageBuffer) -> u8 {
        a.view()
            .iter()
            .zip(b.view().iter())
            .map(|(x, y)| x.abs_diff(*y))
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_defaults_never_fail() {
        let pipeline = FilterPipeline::new();
        let src = gradient_rgba();
        for def in pipeline.list_filters() {
            let defaults = def.defaults();
            let out = pipeline
                .apply(def.kind, &src, defaults[0], defaults.get(1).copied())
                .unwrap();
            assert_eq!(out.dimensions(), src.dimensions());
        }
    }

    #[test]
    fn test_out_of_range_matches_clamped_boundary() {
        let pipeline = FilterPipeline::new();
        let src = gradient_rgba();
        let cases = [
            (FilterKind::Exposure, (42.0, None), (10.0, None)),
            (FilterKind::Exposure, (-42.0, None), (-10.0, None)),
            (FilterKind::Vibrance, (3.0, None), (1.0, None)),
            (FilterKind::Vignette, (-5.0, Some(9000.0)), (-1.0, Some(2000.0))),
            (FilterKind::SepiaTone, (-1.0, None), (0.0, None)),
            (FilterKind::MotionBlur, (4.0, Some(10.0)), (4.0, Some(PI))),
            (FilterKind::MotionBlur, (-3.0, Some(-10.0)), (0.0, Some(-PI))),
        ];
        for (kind, (p1, p2), (c1, c2)) in cases {
            let wild = pipeline.apply(kind, &src, p1, p2).unwrap();
            let bounded = pipeline.apply(kind, &src, c1, c2).unwrap();
            assert_eq!(wild, bounded, "{kind} with {p1}/{p2:?}");
        }
    }

    #[test]
    fn test_deterministic() {
        let pipeline = FilterPipeline::new();
        let src = gradient_rgba();
        for kind in FilterKind::ALL {
            let a = pipeline.apply(kind, &src, 0.7, Some(1.3)).unwrap();
            let b = pipeline.apply(kind, &src, 0.7, Some(1.3)).unwrap();
            assert_eq!(a, b, "{kind} is not deterministic");
        }
    }

    #[test]
    fn test_sepia_on_gray() {
        let pipeline = FilterPipeline::new();
        let src = ImageBuffer::solid(100, 100, &[128, 128, 128, 255]).unwrap();
        let out = pipeline.apply(FilterKind::SepiaTone, &src, 1.0, None).unwrap();

        assert_eq!(out.dimensions(), (100, 100));
        assert_ne!(out, src);
        let px = out.pixel(50, 50).unwrap();
        assert!(px[0] > px[1] && px[1] > px[2], "not warm: {px:?}");
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_vignette_zero_is_identity() {
        let pipeline = FilterPipeline::new();
        let src = gradient_rgba();
        let out = pipeline.apply(FilterKind::Vignette, &src, 0.0, Some(0.0)).unwrap();
        assert!(max_abs_diff(&out, &src) <= 1);
    }

    #[test]
    fn test_motion_blur_zero_radius_is_identity() {
        let pipeline = FilterPipeline::new();
        let src = gradient_rgba();
        let out = pipeline.apply(FilterKind::MotionBlur, &src, 0.0, Some(1.0)).unwrap();
        assert!(max_abs_diff(&out, &src) <= 1);
    }

    #[test]
    fn test_exposure_monotonic_from_same_source() {
        let pipeline = FilterPipeline::new();
        let src = gradient_rgba();
        let before = src.clone();

        let means: Vec<f64> = [-3.0, -1.0, 0.0, 1.0, 2.0]
            .iter()
            .map(|&ev| mean_color(&pipeline.apply(FilterKind::Exposure, &src, ev, None).unwrap()))
            .collect();
        for pair in means.windows(2) {
            assert!(pair[1] > pair[0], "not monotonic: {means:?}");
        }
        // The source is never modified.
        assert_eq!(src, before);
    }

    #[test]
    fn test_output_dimensions_with_reduced_working_size() {
        let options = PipelineOptions {
            max_working_dimension: Some(32),
            threads: None,
        };
        let pipeline = FilterPipeline::with_options(options).unwrap();
        let src = ImageBuffer::solid(100, 60, &[90, 120, 200, 255]).unwrap();
        for kind in FilterKind::ALL {
            let out = pipeline.apply(kind, &src, 0.5, Some(0.5)).unwrap();
            assert_eq!(out.dimensions(), (100, 60), "{kind}");
        }
        // A flat image survives the down/up round trip.
        let out = pipeline.apply(FilterKind::Exposure, &src, 0.0, None).unwrap();
        assert!(max_abs_diff(&out, &src) <= 1);
    }

    #[test]
    fn test_dedicated_pool_matches_global() {
        let src = gradient_rgba();
        let global = FilterPipeline::new();
        let pooled = FilterPipeline::with_options(PipelineOptions {
            max_working_dimension: None,
            threads: Some(2),
        })
        .unwrap();
        let a = global.apply(FilterKind::MotionBlur, &src, 6.0, Some(0.3)).unwrap();
        let b = pooled.apply(FilterKind::MotionBlur, &src, 6.0, Some(0.3)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_grayscale_source() {
        let pipeline = FilterPipeline::new();
        let src = ImageBuffer::solid(8, 8, &[100]).unwrap();
        let out = pipeline.apply(FilterKind::Exposure, &src, 1.0, None).unwrap();
        assert_eq!(out.channels(), 3);
        let px = out.pixel(0, 0).unwrap();
        assert!(px[0] > 100);
        assert!(px[0] == px[1] && px[1] == px[2]);

        let neutral = pipeline.apply(FilterKind::Exposure, &src, 0.0, None).unwrap();
        assert_eq!(neutral.pixel(3, 3).unwrap(), vec![100, 100, 100]);
    }

    #[test]
    fn test_sepia_tones_single_channel_gray() {
        let pipeline = FilterPipeline::new();
        let src = ImageBuffer::solid(100, 100, &[128]).unwrap();
        let out = pipeline.apply(FilterKind::SepiaTone, &src, 1.0, None).unwrap();

        assert_eq!(out.dimensions(), (100, 100));
        assert_eq!(out.channels(), 3);
        let px = out.pixel(10, 90).unwrap();
        assert!(px[0] > px[1] && px[1] > px[2], "not warm: {px:?}");
    }

    struct FailingEngine;

    impl FilterEngine for FailingEngine {
        fn apply_named_transform(
            &self,
            _kind: FilterKind,
            _input: ArrayView3<f32>,
            _params: &[f32],
        ) -> Result<Array3<f32>> {
            Err(FilterError::invalid_parameter("engine refused"))
        }
    }

    struct BrokenShapeEngine;

    impl FilterEngine for BrokenShapeEngine {
        fn apply_named_transform(
            &self,
            _kind: FilterKind,
            input: ArrayView3<f32>,
            _params: &[f32],
        ) -> Result<Array3<f32>> {
            let (h, w, _) = input.dim();
            Ok(Array3::zeros((h, w, 2)))
        }
    }

    struct NanEngine;

    impl FilterEngine for NanEngine {
        fn apply_named_transform(
            &self,
            _kind: FilterKind,
            input: ArrayView3<f32>,
            _params: &[f32],
        ) -> Result<Array3<f32>> {
            Ok(input.mapv(|_| f32::NAN))
        }
    }

    #[test]
    fn test_engine_failures_are_render_failures() {
        let src = gradient_rgba();
        let failing = FilterPipeline::with_engine(FailingEngine, PipelineOptions::default()).unwrap();
        assert!(matches!(
            failing.apply(FilterKind::Exposure, &src, 1.0, None),
            Err(FilterError::RenderFailure(_))
        ));

        let broken =
            FilterPipeline::with_engine(BrokenShapeEngine, PipelineOptions::default()).unwrap();
        assert!(matches!(
            broken.apply(FilterKind::Vibrance, &src, 0.2, None),
            Err(FilterError::RenderFailure(_))
        ));

        let nan = FilterPipeline::with_engine(NanEngine, PipelineOptions::default()).unwrap();
        assert!(matches!(
            nan.apply(FilterKind::SepiaTone, &src, 0.2, None),
            Err(FilterError::RenderFailure(_))
        ));
    }

    #[test]
    fn test_request_builder() {
        let src = gradient_rgba();
        let request = FilterRequest::new(FilterKind::MotionBlur, &src, 3.0).with_param2(0.5);
        let pipeline = FilterPipeline::new();
        let via_request = pipeline.apply_request(&request).unwrap();
        let direct = pipeline.apply(FilterKind::MotionBlur, &src, 3.0, Some(0.5)).unwrap();
        assert_eq!(via_request, direct);
    }
}
