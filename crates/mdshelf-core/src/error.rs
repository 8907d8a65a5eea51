//! Error types for mdshelf.
//!
//! Call-level precondition failures (bad pattern, bad numbers, name collisions,
//! empty undo history) are raised before anything on disk is touched. Per-file and
//! per-reference problems are not errors at the batch level; they are recorded as
//! outcomes and logged.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the mdshelf library.
#[derive(Debug, Error)]
pub enum MdShelfError {
    // Document errors
    #[error("Document not found: {0}")]
    DocumentNotFound(PathBuf),

    #[error("No Markdown files found in {0}")]
    NoMarkdownFiles(PathBuf),

    #[error("Invalid image reference: {token:?}")]
    InvalidReference { token: String },

    // Network errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Download failed for {url}: {message}")]
    DownloadFailed { url: String, message: String },

    // Rename errors
    #[error("Invalid rename pattern: {message}")]
    InvalidPattern { message: String },

    #[error("Invalid number for {field}: {value:?}")]
    InvalidNumber { field: String, value: String },

    #[error("Rename would produce duplicate name: {name}")]
    NameCollision { name: String },

    #[error("No rename history to undo")]
    NoHistory,

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Another operation is already running on {0}")]
    FolderBusy(PathBuf),

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Invalid params: {message}")]
    InvalidParams { message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for mdshelf operations.
pub type Result<T> = std::result::Result<T, MdShelfError>;

impl From<std::io::Error> for MdShelfError {
    fn from(err: std::io::Error) -> Self {
        MdShelfError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for MdShelfError {
    fn from(err: serde_json::Error) -> Self {
        MdShelfError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for MdShelfError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MdShelfError::Timeout(crate::config::NetworkConfig::FETCH_TIMEOUT)
        } else {
            MdShelfError::Network {
                message: err.to_string(),
                source: Some(err),
            }
        }
    }
}

impl From<tokio::task::JoinError> for MdShelfError {
    fn from(err: tokio::task::JoinError) -> Self {
        MdShelfError::Other(format!("Background task failed: {}", err))
    }
}

impl MdShelfError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        MdShelfError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Convert to a JSON-RPC error code.
    ///
    /// Custom error codes (application-defined, -32000 to -32099):
    /// - -32000: Network/connectivity error
    /// - -32002: Document or directory not found
    /// - -32004: Nothing to undo
    /// - -32005: Validation error
    /// - -32006: Folder busy
    pub fn to_rpc_error_code(&self) -> i32 {
        match self {
            MdShelfError::Network { .. }
            | MdShelfError::Timeout(_)
            | MdShelfError::DownloadFailed { .. } => -32000,

            MdShelfError::DocumentNotFound(_)
            | MdShelfError::NoMarkdownFiles(_)
            | MdShelfError::NotADirectory(_) => -32002,

            MdShelfError::NoHistory => -32004,

            MdShelfError::InvalidReference { .. }
            | MdShelfError::InvalidPattern { .. }
            | MdShelfError::InvalidNumber { .. }
            | MdShelfError::NameCollision { .. } => -32005,

            MdShelfError::FolderBusy(_) => -32006,

            MdShelfError::InvalidParams { .. } => -32602,

            _ => -32603,
        }
    }

    /// Whether this error rejects a whole call before any mutation happened.
    pub fn is_fatal_precondition(&self) -> bool {
        matches!(
            self,
            MdShelfError::InvalidReference { .. }
                | MdShelfError::InvalidPattern { .. }
                | MdShelfError::InvalidNumber { .. }
                | MdShelfError::NameCollision { .. }
                | MdShelfError::NoHistory
                | MdShelfError::FolderBusy(_)
        )
    }
}
