use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NetError>;

/// Every failure the engine can report. None of these are retried internally.
#[derive(Error, Debug)]
pub enum NetError {
    /// Input, weight or layer arity disagreement.
    #[error("shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Backward or gradient call on a layer variant that has no trainable state.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// `backward`/`apply_gradient` called without a preceding forward pass.
    #[error("no forward pass has been run on this network")]
    NoForwardPass,

    #[error("label {label} is out of range for {classes} output classes")]
    LabelOutOfRange { label: usize, classes: usize },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("cannot parse '{value}' in {path}")]
    Parse { path: String, value: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NetError {
    pub(crate) fn shape(context: &'static str, expected: usize, actual: usize) -> Self {
        NetError::ShapeMismatch { context, expected, actual }
    }

    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        NetError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
