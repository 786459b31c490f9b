use std::fs::File;
use std::path::Path;

use crate::foundation::error::{CompositeError, CompositeResult};
use crate::pattern::cache::PatternCacheOpts;

/// Configuration of a [`PageSession`](crate::PageSession).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOpts {
    /// Budget of the session's tiling pattern cache.
    pub pattern_cache: PatternCacheOpts,
    /// Largest pattern cell edge, in scaled pattern units, before the cell is clamped.
    pub max_tile_edge: f64,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            pattern_cache: PatternCacheOpts::default(),
            max_tile_edge: 3000.0,
        }
    }
}

impl RenderOpts {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        opts.pattern_cache = opts.pattern_cache.with_env_overrides();
        opts
    }

    /// Parse options from JSON; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> CompositeResult<Self> {
        let opts: Self = serde_json::from_str(s)
            .map_err(|e| CompositeError::serde(format!("parse render options JSON: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Parse options from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> CompositeResult<Self> {
        let opts: Self = serde_json::from_reader(r)
            .map_err(|e| CompositeError::serde(format!("parse render options JSON: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Parse options from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> CompositeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CompositeError::validation(format!(
                "open render options '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_reader(std::io::BufReader::new(f))
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> CompositeResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CompositeError::serde(format!("serialize render options: {e}")))
    }

    /// Check value ranges.
    pub fn validate(&self) -> CompositeResult<()> {
        if !self.max_tile_edge.is_finite() || self.max_tile_edge < 1.0 {
            return Err(CompositeError::validation(format!(
                "max_tile_edge must be finite and >= 1, got {}",
                self.max_tile_edge
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/opts.rs"]
mod tests;
