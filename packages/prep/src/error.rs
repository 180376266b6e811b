//! Error types for dataset preparation.
//!
//! Fatal conditions abort a command before any output is written.
//! `DegenerateStratum` is the one recoverable variant: the splitter records
//! it on its outcome and falls back to an unstratified split.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Stratum;

/// Main error type for the preparation library.
#[derive(Debug, Error)]
pub enum PrepError {
    /// Malformed or empty dataset, or an out-of-range parameter.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A stratum is too small to contribute to both partitions.
    #[error("Stratum '{stratum}' has {documents} document(s); at least 2 are needed to stratify")]
    DegenerateStratum { stratum: Stratum, documents: usize },

    /// A document ended up in both partitions, or in neither.
    #[error("Document leakage between partitions: {0}")]
    Leakage(String),

    /// Required feature structure missing from a CAS export.
    #[error("Missing required feature structure: {feature} in {context}")]
    MissingFeature { feature: String, context: String },

    /// Reading or writing a file failed.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON could not be parsed or serialized.
    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PrepError {
    /// Wrap an IO error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a JSON error with the path of the file being processed.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for preparation operations.
pub type Result<T> = std::result::Result<T, PrepError>;
