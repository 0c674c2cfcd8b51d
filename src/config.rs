//! Pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};

/// Tuning knobs for [`crate::pipeline::FilterPipeline`].
///
/// Every field is optional in JSON; omitted fields take the defaults below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineOptions {
    /// Cap on the longest side of the working copy. Larger sources are
    /// filtered at reduced resolution and resampled back to their own size.
    pub max_working_dimension: Option<usize>,
    /// Worker count for a dedicated rayon pool. `None` uses the global pool.
    pub threads: Option<usize>,
}

impl PipelineOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| FilterError::invalid_options(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_working_dimension == Some(0) {
            return Err(FilterError::invalid_options(
                "max_working_dimension must be at least 1",
            ));
        }
        if self.threads == Some(0) {
            return Err(FilterError::invalid_options("threads must be at least 1"));
        }
        Ok(())
    }
}
