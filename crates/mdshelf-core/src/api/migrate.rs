//! Migration and in-place reorganization methods on MdShelf.

use std::path::{Path, PathBuf};

use crate::audit::AuditEngine;
use crate::config::MigrationConfig;
use crate::error::{MdShelfError, Result};
use crate::markdown::{absolute, discover_markdown};
use crate::migrate::{AssetMigrator, InplaceOrganizer, MergeAssembler, ReferenceOutcome, RunLog};
use crate::models::{self, FileFailure, Operation};
use crate::MdShelf;

impl MdShelf {
    // ========================================
    // Migration
    // ========================================

    /// Migrate a document, or every `.md` file under a directory, into `target`.
    ///
    /// Documents are processed one after another. With a directory source a
    /// failing document is recorded and the batch continues; with a single file the
    /// error is returned.
    pub async fn migrate(
        &self,
        source: &Path,
        target: &Path,
        config: &MigrationConfig,
    ) -> Result<models::MigrationResponse> {
        let target = absolute(target);
        let _lease = self.inner.guard.acquire(&target)?;

        let single_file = source.is_file();
        let mut documents = discover_markdown(source, true)?;
        let merger = MergeAssembler::new(&target);
        if config.merge {
            documents = merger.exclude_output(documents);
        }
        if documents.is_empty() {
            return Err(MdShelfError::NoMarkdownFiles(source.to_path_buf()));
        }

        let mut log = if config.write_run_log {
            RunLog::open(&target)?
        } else {
            RunLog::disabled()
        };
        log.info(format!(
            "Migrating {} document(s) from {} to {}",
            documents.len(),
            source.display(),
            target.display()
        ));

        let migrator = AssetMigrator::new(self.inner.fetcher.clone());
        let total = documents.len();
        let mut migrated = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for (index, document) in documents.iter().enumerate() {
            match migrator.migrate(document, &target, config).await {
                Ok(result) => {
                    for outcome in &result.outcomes {
                        record_outcome(&mut log, outcome);
                    }
                    log.info(format!(
                        "{}: {} image(s) relocated",
                        result.file_name,
                        result.relocated_count()
                    ));
                    migrated.push(result);
                }
                Err(e) if single_file => {
                    log.error(format!("{}: {}", document.display(), e));
                    return Err(e);
                }
                Err(e) => {
                    log.error(format!("{}: {}", document.display(), e));
                    failures.push(FileFailure::new(document, &e));
                }
            }
            self.emit(
                Operation::Migrate,
                index + 1,
                total,
                document.display().to_string(),
            );
        }

        let merged_output = if config.merge && !migrated.is_empty() {
            let parts = migrated
                .iter()
                .map(|doc| (doc.file_name.as_str(), doc.text.as_str()));
            let output = merger.write(parts)?;
            log.info(format!("Merged {} document(s) into {}", migrated.len(), output.display()));
            Some(output)
        } else {
            None
        };

        let unused = if config.cleanup_after {
            let unused = AuditEngine::scan_unused(migrated.iter().map(|d| d.text.as_str()), &target);
            for path in &unused {
                log.warn(format!("Unused image: {}", path.display()));
            }
            unused
        } else {
            Vec::new()
        };

        let processed = migrated.len();
        let message = format!(
            "Migrated {} of {} document(s), {} image(s) relocated",
            processed,
            total,
            migrated.iter().map(|d| d.relocated_count()).sum::<usize>()
        );
        log.info(&message);

        Ok(models::MigrationResponse {
            success: processed > 0,
            message,
            processed,
            failures,
            documents: migrated,
            merged_output,
            unused,
            log_file: log.path().map(Path::to_path_buf),
        })
    }

    // ========================================
    // In-place reorganization
    // ========================================

    /// Pull every image referenced by the `.md` files directly inside `folder` into
    /// `<folder>/images/`, renaming them after the document.
    pub async fn inplace(&self, folder: &Path, cleanup: bool) -> Result<models::InplaceResponse> {
        let folder = absolute(folder);
        if !folder.is_dir() {
            return Err(MdShelfError::NotADirectory(folder));
        }
        let lease = self.inner.guard.acquire(&folder)?;
        let shelf = self.clone();

        tokio::task::spawn_blocking(move || {
            let _lease = lease;
            let documents = discover_markdown(&folder, false)?;
            if documents.is_empty() {
                return Err(MdShelfError::NoMarkdownFiles(folder));
            }

            let total = documents.len();
            let mut organized = Vec::with_capacity(total);
            let mut failures = Vec::new();
            for (index, document) in documents.iter().enumerate() {
                match InplaceOrganizer::reorganize_document(document) {
                    Ok(result) => organized.push(result),
                    Err(e) => {
                        tracing::warn!("{}: {}", document.display(), e);
                        failures.push(FileFailure::new(document, &e));
                    }
                }
                shelf.emit(
                    Operation::Inplace,
                    index + 1,
                    total,
                    document.display().to_string(),
                );
            }

            let unused: Vec<PathBuf> = if cleanup {
                AuditEngine::scan_unused(organized.iter().map(|d| d.text.as_str()), &folder)
            } else {
                Vec::new()
            };

            let moved_count = organized.iter().map(|d| d.moved.len()).sum();
            let missing_count = organized.iter().map(|d| d.missing.len()).sum();
            let processed = organized.len();
            Ok(models::InplaceResponse {
                success: processed > 0,
                message: format!(
                    "Reorganized {} of {} document(s), {} image(s) moved, {} missing",
                    processed, total, moved_count, missing_count
                ),
                processed,
                moved_count,
                missing_count,
                documents: organized,
                failures,
                unused,
            })
        })
        .await?
    }
}

fn record_outcome(log: &mut RunLog, outcome: &ReferenceOutcome) {
    match outcome {
        ReferenceOutcome::Copied {
            source,
            destination,
            ..
        } => log.info(format!("Copied {} -> {}", source.display(), destination.display())),
        ReferenceOutcome::Downloaded {
            token, destination, ..
        } => log.info(format!("Downloaded {} -> {}", token, destination.display())),
        ReferenceOutcome::SkippedRemote { token } => {
            log.info(format!("Remote image left unchanged: {}", token))
        }
        ReferenceOutcome::MissingSource { token, resolved } => log.warn(format!(
            "Image not found: {} (referenced as {:?})",
            resolved.display(),
            token
        )),
        ReferenceOutcome::Failed { token, reason } => {
            log.error(format!("Could not relocate {:?}: {}", token, reason))
        }
    }
}
