//! Error types for the word source.

use std::path::PathBuf;

/// Errors that can occur while loading or validating word lists.
#[derive(Debug, thiserror::Error)]
pub enum WordError {
    /// A word-list file could not be read.
    #[error("failed to read word list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A supported mode has no usable secret words. This is a fatal
    /// configuration error: rooms for that mode could never draw a word.
    #[error("no {0}-letter secret words available")]
    EmptyPool(u8),
}
