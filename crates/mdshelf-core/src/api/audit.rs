//! Audit and cleanup methods on MdShelf.

use std::path::{Path, PathBuf};

use crate::audit::AuditEngine;
use crate::error::Result;
use crate::models::{self, FileFailure, Operation};
use crate::MdShelf;

impl MdShelf {
    /// Report images in the documents' asset directories that nothing references.
    pub async fn audit(&self, path: &Path) -> Result<models::AuditResponse> {
        let path = path.to_path_buf();
        let report = tokio::task::spawn_blocking(move || AuditEngine::audit(&path)).await??;
        self.emit(
            Operation::Audit,
            report.markdown_files,
            report.markdown_files,
            format!("{} redundant image(s)", report.redundant_count()),
        );
        Ok(report.into())
    }

    /// Remove audited files, either permanently or into an `unused_backup` folder
    /// next to each file. Missing files are skipped.
    pub async fn cleanup(&self, paths: Vec<PathBuf>, permanent: bool) -> Result<models::CleanupResponse> {
        let total = paths.len();
        let report =
            tokio::task::spawn_blocking(move || AuditEngine::cleanup(&paths, permanent)).await?;
        self.emit(
            Operation::Cleanup,
            total,
            total,
            format!("{} file(s) removed", report.removed),
        );

        let verb = if permanent { "Deleted" } else { "Backed up" };
        Ok(models::CleanupResponse {
            success: report.failures.is_empty(),
            message: format!("{} {} of {} file(s)", verb, report.removed, total),
            removed: report.removed,
            skipped: report.skipped,
            failures: report
                .failures
                .into_iter()
                .map(|(path, error)| FileFailure::new(path, error))
                .collect(),
            permanent,
        })
    }
}
