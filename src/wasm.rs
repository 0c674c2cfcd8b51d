//! WebAssembly exports.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Images cross
//! the boundary as flat RGBA bytes (length = width * height * 4), the layout
//! of canvas `ImageData`.

use wasm_bindgen::prelude::*;

use crate::buffer::ImageBuffer;
use crate::error::FilterError;
use crate::pipeline::FilterPipeline;
use crate::registry::{self, FilterKind};

fn to_js(e: FilterError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// All filter definitions as a JSON array (ids, display names, parameter ranges).
#[wasm_bindgen]
pub fn list_filters_json() -> Result<String, JsValue> {
    serde_json::to_string(registry::list_filters()).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Apply a filter to an RGBA image.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `kind` - Filter id or display name, e.g. `"motion_blur"`
/// * `param1` - First slider value (clamped to the filter's range)
/// * `param2` - Second slider value for two-parameter filters
///
/// # Returns
/// Flat array of filtered RGBA bytes, or an error message
#[wasm_bindgen]
pub fn apply_filter_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    kind: &str,
    param1: f64,
    param2: Option<f64>,
) -> Result<Vec<u8>, JsValue> {
    let kind: FilterKind = kind.parse().map_err(to_js)?;
    let source = ImageBuffer::from_raw(width, height, 4, data.to_vec()).map_err(to_js)?;

    FilterPipeline::new()
        .apply(kind, &source, param1, param2)
        .map(ImageBuffer::into_raw)
        .map_err(to_js)
}
