//! Ingestion error types.

use std::path::PathBuf;

/// Errors that stop a schedule file from being read at all.
///
/// Problems with individual rows are not errors: they are counted in the
/// [`LoadReport`](super::LoadReport) and the row is skipped.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Reading a directory failed
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader failed
    #[error("failed to parse {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The header lacks a required column
    #[error("{path}: {reason}")]
    Header { path: PathBuf, reason: String },
}

impl IngestError {
    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn header(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Header {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
