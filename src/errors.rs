use std::io;

use thiserror::Error;

/// Error type for query, transform, subsetting, and extraction failures.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("key '{key}' not found at '{path}'")]
    MissingKey { key: String, path: String },
    #[error("cannot look up key '{key}' in a non-map value at '{path}'")]
    NotIndexable { key: String, path: String },
    #[error("no target data named '{0}' exists in the corpus")]
    UnknownField(String),
    #[error("invalid value transform: {0}")]
    InvalidTransform(String),
    #[error("index {index} out of bounds for {axis} axis of length {len}")]
    IndexOutOfBounds {
        index: usize,
        len: usize,
        axis: &'static str,
    },
    #[error("index {index} repeated on {axis} axis")]
    DuplicateIndex { index: usize, axis: &'static str },
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("malformed JSON on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl CorpusError {
    /// True for the structural errors a query may choose to swallow.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::MissingKey { .. } | Self::NotIndexable { .. })
    }
}
