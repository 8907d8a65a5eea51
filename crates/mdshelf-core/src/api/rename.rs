//! Rename and undo methods on MdShelf.

use std::path::Path;

use crate::error::{MdShelfError, Result};
use crate::markdown::absolute;
use crate::models::{self, Operation};
use crate::rename::{revert, RenameEngine, RenamePattern};
use crate::MdShelf;

impl MdShelf {
    // ========================================
    // Rename
    // ========================================

    /// Planned renames for the `.md` files directly inside `folder`.
    pub async fn rename_preview(
        &self,
        folder: &Path,
        pattern: &RenamePattern,
    ) -> Result<models::RenamePreviewResponse> {
        let folder = absolute(folder);
        let pattern = pattern.clone();
        let entries =
            tokio::task::spawn_blocking(move || RenameEngine::new().preview(&folder, &pattern))
                .await??;
        Ok(models::RenamePreviewResponse {
            success: true,
            entries,
        })
    }

    /// Rename the documents in `folder` and record the transaction for undo.
    pub async fn rename_apply(
        &self,
        folder: &Path,
        pattern: &RenamePattern,
    ) -> Result<models::RenameResponse> {
        let folder = absolute(folder);
        let _lease = self.inner.guard.acquire(&folder)?;
        let mut history = self.inner.history.lock().await;

        let pattern = pattern.clone();
        let transaction =
            tokio::task::spawn_blocking(move || RenameEngine::new().apply(&folder, &pattern))
                .await??;

        let total = transaction.len();
        for (index, file) in transaction.renamed.iter().enumerate() {
            self.emit(
                Operation::Rename,
                index + 1,
                total,
                file.new_path.display().to_string(),
            );
        }

        let renamed = transaction.renamed.clone();
        history.push(transaction);
        Ok(models::RenameResponse {
            success: true,
            message: format!("Renamed {} file(s)", renamed.len()),
            renamed,
            history_depth: history.len(),
        })
    }

    /// Revert the most recent rename transaction.
    pub async fn rename_undo(&self) -> Result<models::UndoResponse> {
        let mut history = self.inner.history.lock().await;
        let folder = history
            .last()
            .ok_or(MdShelfError::NoHistory)?
            .folder()
            .map(Path::to_path_buf);
        let _lease = match &folder {
            Some(folder) => Some(self.inner.guard.acquire(folder)?),
            None => None,
        };
        let transaction = history.pop().ok_or(MdShelfError::NoHistory)?;

        let outcome = tokio::task::spawn_blocking(move || revert(&transaction)).await?;
        self.emit(
            Operation::Undo,
            outcome.restored,
            outcome.restored + outcome.skipped.len(),
            format!("{} file(s) restored", outcome.restored),
        );

        Ok(models::UndoResponse {
            success: true,
            message: format!(
                "Restored {} file(s), skipped {}",
                outcome.restored,
                outcome.skipped.len()
            ),
            restored: outcome.restored,
            skipped: outcome.skipped,
            history_depth: history.len(),
        })
    }

    pub async fn can_undo(&self) -> bool {
        !self.inner.history.lock().await.is_empty()
    }

    pub async fn history_depth(&self) -> usize {
        self.inner.history.lock().await.len()
    }

    pub async fn undo_status(&self) -> models::UndoStatusResponse {
        let depth = self.history_depth().await;
        models::UndoStatusResponse {
            success: true,
            can_undo: depth > 0,
            history_depth: depth,
        }
    }
}
