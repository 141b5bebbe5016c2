//! Error types for data ingestion.

use ledger_mm_domain::DomainError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading marketplace exports.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The JSON document has no recognizable listing array.
    #[error("Unsupported listing layout: expected an array or object, found {found}")]
    UnsupportedLayout { found: String },

    /// The resulting series violates a domain invariant.
    #[error("Invalid series: {0}")]
    Domain(#[from] DomainError),
}

impl IngestError {
    /// Create an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a JSON error for `path`.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    /// Create an unsupported layout error.
    pub fn unsupported_layout(found: impl Into<String>) -> Self {
        Self::UnsupportedLayout {
            found: found.into(),
        }
    }
}
