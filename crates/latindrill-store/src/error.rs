//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the file-backed progress store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading, writing or creating directories failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The progress record could not be serialized.
    #[error("failed to serialize progress: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The temporary file could not be moved over the target.
    #[error("failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
