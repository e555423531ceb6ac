/// Convenience result type used across subrast.
pub type SubResult<T> = Result<T, SubError>;

/// Top-level error taxonomy used by decoder and configuration APIs.
///
/// Per-frame work (region building, rasterization) never returns these: failures there degrade
/// to fewer or zero regions for the frame.
#[derive(thiserror::Error, Debug)]
pub enum SubError {
    /// The track is not something this decoder handles.
    #[error("unsupported track: {0}")]
    Unsupported(String),

    /// The layout engine could not be created or configured.
    #[error("setup error: {0}")]
    Setup(String),

    /// Invalid user-provided configuration or fixture data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SubError {
    /// Build a [`SubError::Unsupported`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Build a [`SubError::Setup`] value.
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::Setup(msg.into())
    }

    /// Build a [`SubError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SubError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
