//! Error types for the relic core library.

use serde::Serialize;

/// Per-file extraction failure. Every variant is recoverable at file
/// granularity: the orchestrator records it and moves on.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Unreadable file {path}: {source}")]
    UnreadableFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No type declaration found in {path}")]
    UnparsableUnit { path: String },

    #[error("Malformed routing config {path}: {reason}")]
    MalformedConfigDocument { path: String, reason: String },

    #[error("Malformed interface definition {path}: {reason}")]
    MalformedInterfaceDocument { path: String, reason: String },

    #[error("Scan cancelled before {path} was parsed")]
    Cancelled { path: String },
}

/// Serializable discriminant of [`ExtractError`], kept on the model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UnreadableFile,
    UnparsableUnit,
    MalformedConfigDocument,
    MalformedInterfaceDocument,
    Cancelled,
}

impl ExtractError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ExtractError::UnreadableFile { .. } => FailureKind::UnreadableFile,
            ExtractError::UnparsableUnit { .. } => FailureKind::UnparsableUnit,
            ExtractError::MalformedConfigDocument { .. } => FailureKind::MalformedConfigDocument,
            ExtractError::MalformedInterfaceDocument { .. } => {
                FailureKind::MalformedInterfaceDocument
            }
            ExtractError::Cancelled { .. } => FailureKind::Cancelled,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            ExtractError::UnreadableFile { path, .. }
            | ExtractError::UnparsableUnit { path }
            | ExtractError::MalformedConfigDocument { path, .. }
            | ExtractError::MalformedInterfaceDocument { path, .. }
            | ExtractError::Cancelled { path } => path,
        }
    }
}

pub type ExtractResult<T> = Result<T, ExtractError>;
