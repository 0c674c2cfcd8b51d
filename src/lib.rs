//! filteredit Rust core
//!
//! Parametric image filters for an interactive photo editor: pick one of a
//! fixed set of filters, move one or two sliders, get a rendered image back.
//! Python bindings via PyO3 and WASM bindings for JavaScript are optional.
//!
//! ## Image Format
//! [`ImageBuffer`] holds sRGB-encoded u8 pixels shaped `(height, width, channels)`:
//! - **Grayscale**: 1 channel
//! - **RGB**: 3 channels
//! - **RGBA**: 4 channels, straight alpha
//!
//! Filtering happens on a linear-light f32 copy and is rendered back to u8 at
//! the source's size.
//!
//! ## Filters
//!
//! | Filter | Parameters |
//! |--------|------------|
//! | Exposure | ev (-10..10) |
//! | Vibrance | amount (-1..1) |
//! | Vignette | intensity (-1..1), radius (0..2000 px) |
//! | Sepia Tone | intensity (0..1) |
//! | Motion Blur | radius (0..100 px), angle (-pi..pi rad) |
//!
//! Out-of-range parameters are clamped, never rejected.
//!
//! ```no_run
//! use filteredit_rust::{FilterKind, FilterPipeline, ImageBuffer};
//!
//! let pipeline = FilterPipeline::new();
//! let photo = ImageBuffer::solid(640, 480, &[120, 110, 100, 255])?;
//! let toned = pipeline.apply(FilterKind::SepiaTone, &photo, 0.8, None)?;
//! assert_eq!(toned.dimensions(), photo.dimensions());
//! # Ok::<(), filteredit_rust::FilterError>(())
//! ```

pub mod buffer;
pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod filters;
pub mod pipeline;
#[cfg(not(target_arch = "wasm32"))]
pub mod preview;
pub mod registry;
pub mod scale;
pub mod session;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use buffer::ImageBuffer;
pub use config::PipelineOptions;
pub use engine::{CpuEngine, FilterEngine};
pub use error::{FilterError, Result};
pub use pipeline::{FilterPipeline, FilterRequest};
#[cfg(not(target_arch = "wasm32"))]
pub use preview::{PreviewJob, PreviewResult, PreviewWorker};
pub use registry::{
    list_filters, lookup, lookup_index, lookup_name, FilterDefinition, FilterKind, ParameterSpec,
    ParameterUnit,
};
pub use session::{EditSession, Selection};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::{PyRuntimeError, PyValueError};
    use pyo3::prelude::*;

    use crate::buffer::ImageBuffer;
    use crate::error::FilterError;
    use crate::pipeline::FilterPipeline;
    use crate::registry::{self, FilterKind};

    fn to_py_err(e: FilterError) -> PyErr {
        match e {
            FilterError::RenderFailure(_) => PyRuntimeError::new_err(e.to_string()),
            _ => PyValueError::new_err(e.to_string()),
        }
    }

    /// Describe every filter as `(id, display_name, [(name, min, max, default)])`.
    #[pyfunction]
    pub fn list_filters() -> Vec<(String, String, Vec<(String, f64, f64, f64)>)> {
        registry::list_filters()
            .iter()
            .map(|def| {
                let params = def
                    .parameters
                    .iter()
                    .map(|p| (p.name.to_string(), p.minimum, p.maximum, p.default))
                    .collect();
                (def.kind.as_str().to_string(), def.display_name.to_string(), params)
            })
            .collect()
    }

    /// Apply a filter to a uint8 image with 1, 3, or 4 channels.
    ///
    /// `kind` accepts ids (`"sepia_tone"`) or display names (`"Sepia Tone"`).
    /// The GIL is released while filtering.
    #[pyfunction]
    #[pyo3(signature = (image, kind, param1, param2=None))]
    pub fn apply_filter<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        kind: &str,
        param1: f64,
        param2: Option<f64>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let kind: FilterKind = kind.parse().map_err(to_py_err)?;
        let source = ImageBuffer::from_array(image.as_array().to_owned()).map_err(to_py_err)?;
        let result = py
            .allow_threads(|| FilterPipeline::new().apply(kind, &source, param1, param2))
            .map_err(to_py_err)?;
        Ok(result.into_array().into_pyarray(py))
    }

    /// filteredit Rust extension module
    #[pymodule]
    pub fn filteredit_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(list_filters, m)?)?;
        m.add_function(wrap_pyfunction!(apply_filter, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::filteredit_rust;
