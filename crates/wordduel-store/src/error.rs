//! Error types for win persistence.

use std::path::PathBuf;

/// Errors a [`WinStore`](crate::WinStore) can report.
///
/// The session server never lets these reach a client: a failed write
/// is logged, a failed read reads as "no wins".
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing file couldn't be read or written.
    #[error("win store I/O failed on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but isn't a valid win table.
    #[error("win store {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The win table couldn't be serialized.
    #[error("failed to encode win table: {0}")]
    Encode(#[source] serde_json::Error),

    /// The store refused the operation.
    #[error("win store unavailable: {0}")]
    Unavailable(String),
}
