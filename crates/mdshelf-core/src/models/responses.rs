//! Session API response types.

use crate::audit::AuditReport;
use crate::migrate::{InplaceDocument, MigratedDocument};
use crate::rename::{RenamePreviewEntry, RenamedFile};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A file that could not be processed within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

impl FileFailure {
    pub fn new(path: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self {
            path: path.into(),
            error: error.to_string(),
        }
    }
}

/// Migration response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationResponse {
    pub success: bool,
    pub message: String,
    /// Documents migrated without a document-level error.
    pub processed: usize,
    pub failures: Vec<FileFailure>,
    pub documents: Vec<MigratedDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged_output: Option<PathBuf>,
    /// Unreferenced images under the target, when `cleanup_after` was set.
    pub unused: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

/// Audit response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: AuditReport,
    pub redundant_count: usize,
}

impl From<AuditReport> for AuditResponse {
    fn from(report: AuditReport) -> Self {
        Self {
            success: true,
            redundant_count: report.redundant_count(),
            report,
        }
    }
}

/// Cleanup response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupResponse {
    pub success: bool,
    pub message: String,
    pub removed: usize,
    pub skipped: usize,
    pub failures: Vec<FileFailure>,
    /// `false` when files were moved to `unused_backup` instead of deleted.
    pub permanent: bool,
}

/// Rename preview response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamePreviewResponse {
    pub success: bool,
    pub entries: Vec<RenamePreviewEntry>,
}

/// Rename apply response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameResponse {
    pub success: bool,
    pub message: String,
    pub renamed: Vec<RenamedFile>,
    pub history_depth: usize,
}

/// Undo response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoResponse {
    pub success: bool,
    pub message: String,
    pub restored: usize,
    pub skipped: Vec<PathBuf>,
    pub history_depth: usize,
}

/// Undo availability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoStatusResponse {
    pub success: bool,
    pub can_undo: bool,
    pub history_depth: usize,
}

/// In-place reorganize response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InplaceResponse {
    pub success: bool,
    pub message: String,
    pub processed: usize,
    pub moved_count: usize,
    pub missing_count: usize,
    pub documents: Vec<InplaceDocument>,
    pub failures: Vec<FileFailure>,
    pub unused: Vec<PathBuf>,
}
