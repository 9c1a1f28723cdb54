//! Error types shared by the JSON file storage implementation.

use std::path::PathBuf;

use thiserror::Error;

use crate::dao::storage::StorageError;

/// Convenient result alias returning [`JsonStoreError`] failures.
pub type JsonStoreResult<T> = Result<T, JsonStoreError>;

/// Failures that can occur while reading or replacing the JSON document.
#[derive(Debug, Error)]
pub enum JsonStoreError {
    /// Reading the document from disk failed.
    #[error("failed to read document `{path}`")]
    Read {
        /// File being read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The document on disk is not a valid store document.
    #[error("failed to parse document `{path}`")]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
    /// Serializing the in-memory document failed.
    #[error("failed to encode document for `{path}`")]
    Encode {
        /// File being encoded.
        path: PathBuf,
        /// Underlying encode error.
        #[source]
        source: serde_json::Error,
    },
    /// Writing, syncing or renaming the staged document failed.
    #[error("failed to write document `{path}`")]
    Write {
        /// File being written.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl From<JsonStoreError> for StorageError {
    fn from(err: JsonStoreError) -> Self {
        let message = err.to_string();
        match err {
            JsonStoreError::Parse { .. } => StorageError::corrupt(message, err),
            _ => StorageError::unavailable(message, err),
        }
    }
}
