//! Caller-side editing state for one image.
//!
//! An [`EditSession`] keeps the untouched original, a display-sized source
//! derived from it, and the image currently on screen. Slider changes always
//! re-filter the source, never the displayed output, so adjustments don't
//! compound. Committing the displayed image as the new source is an explicit
//! [`EditSession::checkpoint`].

use std::sync::Arc;

use tracing::{debug, warn};

use crate::buffer::ImageBuffer;
use crate::engine::{CpuEngine, FilterEngine};
use crate::error::{FilterError, Result};
use crate::pipeline::FilterPipeline;
use crate::registry::{lookup, FilterDefinition, FilterKind};
use crate::scale::{display_pixels, scale_to_fit};

/// The selected filter and its current (clamped) parameter values.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub kind: FilterKind,
    pub params: Vec<f64>,
}

impl Selection {
    fn with_defaults(kind: FilterKind) -> Self {
        Self {
            kind,
            params: lookup(kind).defaults(),
        }
    }

    pub fn definition(&self) -> &'static FilterDefinition {
        lookup(self.kind)
    }
}

pub struct EditSession<E: FilterEngine = CpuEngine> {
    pipeline: Arc<FilterPipeline<E>>,
    original: ImageBuffer,
    scaled_original: ImageBuffer,
    source: ImageBuffer,
    displayed: ImageBuffer,
    selection: Option<Selection>,
}

impl<E: FilterEngine> EditSession<E> {
    /// Start editing `original`, scaled down to fit `display` (in pixels) if given.
    pub fn new(
        pipeline: Arc<FilterPipeline<E>>,
        original: ImageBuffer,
        display: Option<(usize, usize)>,
    ) -> Result<Self> {
        original.validate()?;
        let scaled_original = match display {
            Some((w, h)) => scale_to_fit(&original, w, h)?,
            None => original.clone(),
        };
        debug!(
            width = scaled_original.width(),
            height = scaled_original.height(),
            "edit session started"
        );
        Ok(Self {
            pipeline,
            original,
            source: scaled_original.clone(),
            displayed: scaled_original.clone(),
            scaled_original,
            selection: None,
        })
    }

    /// Like [`EditSession::new`] with the display size given in points and a screen scale.
    pub fn for_display(
        pipeline: Arc<FilterPipeline<E>>,
        original: ImageBuffer,
        width_points: f64,
        height_points: f64,
        screen_scale: f64,
    ) -> Result<Self> {
        let size = display_pixels(width_points, height_points, screen_scale);
        Self::new(pipeline, original, Some(size))
    }

    pub fn original(&self) -> &ImageBuffer {
        &self.original
    }

    /// The image filters are applied to.
    pub fn source(&self) -> &ImageBuffer {
        &self.source
    }

    /// The last successfully rendered image.
    pub fn displayed(&self) -> &ImageBuffer {
        &self.displayed
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Select a filter. Parameters reset to their defaults and the unfiltered
    /// source is shown.
    pub fn select(&mut self, kind: FilterKind) -> &'static FilterDefinition {
        self.selection = Some(Selection::with_defaults(kind));
        self.displayed = self.source.clone();
        lookup(kind)
    }

    pub fn set_param1(&mut self, value: f64) -> Result<&ImageBuffer> {
        self.set_param(0, value)
    }

    pub fn set_param2(&mut self, value: f64) -> Result<&ImageBuffer> {
        self.set_param(1, value)
    }

    /// Update one parameter and re-render from the source.
    ///
    /// The new value is kept only if the render succeeds; on failure the
    /// selection and the displayed image are left as they were.
    pub fn set_param(&mut self, index: usize, value: f64) -> Result<&ImageBuffer> {
        let selection = self
            .selection
            .as_ref()
            .ok_or_else(|| FilterError::invalid_parameter("no filter selected"))?;
        let definition = selection.definition();
        let spec = definition.parameter(index).ok_or_else(|| {
            FilterError::invalid_parameter(format!(
                "{} has no parameter #{}",
                definition.display_name,
                index + 1
            ))
        })?;
        let kind = selection.kind;
        let mut params = selection.params.clone();
        params[index] = spec.clamp(value);

        match self
            .pipeline
            .apply(kind, &self.source, params[0], params.get(1).copied())
        {
            Ok(image) => {
                self.displayed = image;
                self.selection = Some(Selection { kind, params });
                Ok(&self.displayed)
            }
            Err(e) => {
                warn!(error = %e, %kind, "keeping previous image");
                Err(e)
            }
        }
    }

    /// Commit the displayed image as the source for further edits.
    ///
    /// The original stays available through [`EditSession::revert`].
    pub fn checkpoint(&mut self) {
        self.source = self.displayed.clone();
        if let Some(selection) = self.selection.as_mut() {
            *selection = Selection::with_defaults(selection.kind);
        }
        debug!("checkpoint committed");
    }

    /// Drop all checkpoints and start again from the original.
    pub fn revert(&mut self) {
        self.source = self.scaled_original.clone();
        self.displayed = self.source.clone();
        if let Some(selection) = self.selection.as_mut() {
            *selection = Selection::with_defaults(selection.kind);
        }
    }
}
