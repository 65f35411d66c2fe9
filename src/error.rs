use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading data or building a tree.
///
/// All variants are terminal for the current build invocation; a caller
/// wishing to retry must restart the whole build.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration, detected before any training starts.
    #[error("configuration error: {0}")]
    Config(String),

    /// Inconsistent data shapes or out-of-range class labels.
    #[error("data mismatch: expected {expected}, got {actual}")]
    DataMismatch { expected: String, actual: String },

    /// The underlying binary classifier failed to train, which is fatal to
    /// the enclosing node and aborts the whole build.
    #[error("classifier training failed: {0}")]
    Training(String),

    /// A data file could not be parsed.
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub(crate) fn mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Error::DataMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
