/// Convenience result type used across the compositing core.
pub type CompositeResult<T> = Result<T, CompositeError>;

/// Top-level error taxonomy.
///
/// Numeric degeneracies (zero alpha, zero scale, zero pattern step) never surface here; they
/// are resolved locally with a defined fallback. Lookup failures of external collaborators
/// (fonts, transfer functions, color spaces) are logged and degraded. What remains are
/// precondition violations and hard raster/configuration failures.
#[derive(thiserror::Error, Debug)]
pub enum CompositeError {
    /// A caller broke an API contract (mismatched buffers, missing pattern bbox, ...).
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// Invalid user-provided values (negative sizes, non-finite parameters).
    #[error("validation error: {0}")]
    Validation(String),

    /// Raster allocation or encoding failed.
    #[error("raster error: {0}")]
    Raster(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CompositeError {
    /// Build a [`CompositeError::Precondition`] value.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Build a [`CompositeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CompositeError::Raster`] value.
    pub fn raster(msg: impl Into<String>) -> Self {
        Self::Raster(msg.into())
    }

    /// Build a [`CompositeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for errors that terminate the current render.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
