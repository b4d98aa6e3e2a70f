/// Convenience result type used across the staticizer.
pub type StaticizeResult<T> = Result<T, StaticizeError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum StaticizeError {
    /// Structural problems in the animation document (missing layers, assets, transforms).
    #[error("document error: {0}")]
    Document(String),

    /// Position algebra failures: unsupported merges, mismatched split channels.
    #[error("position error: {0}")]
    Position(String),

    /// Errors while cropping or encoding rendered pixel buffers.
    #[error("raster error: {0}")]
    Raster(String),

    /// Errors surfaced by the document exporter.
    #[error("export error: {0}")]
    Export(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StaticizeError {
    /// Build a [`StaticizeError::Document`] value.
    pub fn document(msg: impl Into<String>) -> Self {
        Self::Document(msg.into())
    }

    /// Build a [`StaticizeError::Position`] value.
    pub fn position(msg: impl Into<String>) -> Self {
        Self::Position(msg.into())
    }

    /// Build a [`StaticizeError::Raster`] value.
    pub fn raster(msg: impl Into<String>) -> Self {
        Self::Raster(msg.into())
    }

    /// Build a [`StaticizeError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }
}
