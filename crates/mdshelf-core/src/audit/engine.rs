//! Redundant-asset auditing and cleanup.
//!
//! # Asset directory selection
//!
//! For each document, the first existing candidate wins:
//! 1. `<doc dir>/images/<doc stem>` (always accepted when present)
//! 2. `<doc dir>/images`
//! 3. `<doc dir>/assets`
//! 4. `<doc dir>`
//!
//! Candidates 2-4 are only accepted if at least one of their files is referenced.
//! Documents that resolve to the same directory share one referenced set, so a
//! file used by any of them is never reported, and each directory is counted once.

use crate::config::PathsConfig;
use crate::markdown::{discover_markdown, extract_tokens, is_markdown, Document, ReferenceKind};
use crate::paths::{allocate_unique_path, basename, classify, move_file};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Outcome of one audit call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Markdown documents scanned.
    pub markdown_files: usize,
    /// Distinct referenced image basenames across all documents.
    pub referenced: usize,
    /// Files found in the selected asset directories.
    pub physical: usize,
    /// Unreferenced, non-Markdown files (absolute paths).
    pub redundant: Vec<PathBuf>,
}

impl AuditReport {
    pub fn redundant_count(&self) -> usize {
        self.redundant.len()
    }
}

/// Outcome of a cleanup call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    pub removed: usize,
    /// Paths that were already gone.
    pub skipped: usize,
    /// Paths that could not be removed, with the reason.
    pub failures: Vec<(PathBuf, String)>,
}

#[derive(Default)]
struct AssetDirUsage {
    files: Vec<String>,
    referenced: HashSet<String>,
}

/// Compares referenced images against what is on disk.
pub struct AuditEngine;

impl AuditEngine {
    /// Audit one document or every `.md` file under a directory (recursive).
    pub fn audit(path: &Path) -> Result<AuditReport> {
        let documents = discover_markdown(path, true)?;
        info!("Auditing {} document(s) under {}", documents.len(), path.display());

        let mut all_referenced: HashSet<String> = HashSet::new();
        let mut dirs: BTreeMap<PathBuf, AssetDirUsage> = BTreeMap::new();

        for document in &documents {
            let doc = match Document::load_lossy(document) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!("Skipping {}: {}", document.display(), e);
                    continue;
                }
            };

            let referenced = referenced_basenames(doc.text());
            all_referenced.extend(referenced.iter().cloned());

            match select_asset_dir(doc.dir(), &doc.stem(), &referenced) {
                Some((dir, files)) => {
                    debug!("{} -> assets in {}", doc.path().display(), dir.display());
                    let usage = dirs.entry(dir).or_default();
                    usage.files = files;
                    usage.referenced.extend(referenced);
                }
                None => debug!("{}: no asset directory", doc.path().display()),
            }
        }

        let mut report = AuditReport {
            markdown_files: documents.len(),
            referenced: all_referenced.len(),
            ..Default::default()
        };
        for (dir, usage) in &dirs {
            report.physical += usage.files.len();
            report.redundant.extend(
                usage
                    .files
                    .iter()
                    .filter(|name| !usage.referenced.contains(*name))
                    .filter(|name| !is_markdown(Path::new(name)))
                    .map(|name| dir.join(name)),
            );
        }

        info!(
            "Audit: {} documents, {} referenced, {} physical, {} redundant",
            report.markdown_files,
            report.referenced,
            report.physical,
            report.redundant.len()
        );
        Ok(report)
    }

    /// Delete `paths`, or move each into an `unused_backup` folder beside it.
    pub fn cleanup(paths: &[PathBuf], permanent: bool) -> CleanupReport {
        let mut report = CleanupReport::default();

        for path in paths {
            if !path.exists() {
                debug!("Already gone: {}", path.display());
                report.skipped += 1;
                continue;
            }

            let result = if permanent {
                fs::remove_file(path).map_err(|e| e.to_string())
            } else {
                Self::backup(path).map_err(|e| e.to_string())
            };

            match result {
                Ok(()) => {
                    info!(
                        "{} {}",
                        if permanent { "Deleted" } else { "Backed up" },
                        path.display()
                    );
                    report.removed += 1;
                }
                Err(e) => {
                    warn!("Failed to clean up {}: {}", path.display(), e);
                    report.failures.push((path.clone(), e));
                }
            }
        }

        report
    }

    /// Files under `<root>/images` not referenced by any of `texts`.
    ///
    /// Anything inside an `unused_backup` folder is ignored.
    pub fn scan_unused<'a, I>(texts: I, root: &Path) -> Vec<PathBuf>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let referenced: HashSet<String> = texts
            .into_iter()
            .flat_map(extract_tokens)
            .map(|token| basename(&token))
            .collect();

        let images_root = root.join(PathsConfig::IMAGES_DIR_NAME);
        if !images_root.is_dir() {
            return Vec::new();
        }

        WalkDir::new(&images_root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != PathsConfig::UNUSED_BACKUP_DIR_NAME)
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| !referenced.contains(&*entry.file_name().to_string_lossy()))
            .map(|entry| entry.into_path())
            .collect()
    }

    fn backup(path: &Path) -> Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let backup_dir = parent.join(PathsConfig::UNUSED_BACKUP_DIR_NAME);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        fs::create_dir_all(&backup_dir)?;
        let destination = allocate_unique_path(&backup_dir, &name);
        move_file(path, &destination)
    }
}

/// Basenames of local image tokens.
fn referenced_basenames(text: &str) -> HashSet<String> {
    extract_tokens(text)
        .into_iter()
        .filter(|token| classify(token) == ReferenceKind::Local)
        .map(|token| basename(&token))
        .collect()
}

fn select_asset_dir(
    doc_dir: &Path,
    stem: &str,
    referenced: &HashSet<String>,
) -> Option<(PathBuf, Vec<String>)> {
    let images = doc_dir.join(PathsConfig::IMAGES_DIR_NAME);
    let candidates = [
        images.join(stem),
        images,
        doc_dir.join(PathsConfig::ASSETS_DIR_NAME),
        doc_dir.to_path_buf(),
    ];

    for (index, candidate) in candidates.into_iter().enumerate() {
        if !candidate.is_dir() {
            continue;
        }
        let files = list_files(&candidate);
        if index == 0 || files.iter().any(|f| referenced.contains(f)) {
            return Some((candidate, files));
        }
    }
    None
}

/// Regular files directly inside `dir`, sorted by name.
fn list_files(dir: &Path) -> Vec<String> {
    let names: BTreeSet<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(e) => {
            warn!("Cannot list {}: {}", dir.display(), e);
            BTreeSet::new()
        }
    };
    names.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_orphan_in_images_dir() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("doc.md"), "![p](images/photo.png)");
        write(&tmp.path().join("images/photo.png"), "p");
        write(&tmp.path().join("images/orphan.png"), "o");

        let report = AuditEngine::audit(tmp.path()).unwrap();
        assert_eq!(report.markdown_files, 1);
        assert_eq!(report.referenced, 1);
        assert_eq!(report.physical, 2);
        assert_eq!(report.redundant_count(), 1);
        assert!(report.redundant[0].ends_with("images/orphan.png"));
    }

    #[test]
    fn test_stem_folder_preferred_even_without_matches() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("doc.md"), "![p](other/photo.png)");
        write(&tmp.path().join("images/doc/stale.png"), "s");
        write(&tmp.path().join("images/photo.png"), "p");

        let report = AuditEngine::audit(&tmp.path().join("doc.md")).unwrap();
        assert_eq!(report.physical, 1);
        assert_eq!(report.redundant, vec![tmp.path().join("images/doc/stale.png")]);
    }

    #[test]
    fn test_doc_dir_fallback_skips_markdown() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("doc.md"), "![p](photo.png) ![r](https://x.org/a.png)");
        write(&tmp.path().join("photo.png"), "p");
        write(&tmp.path().join("extra.gif"), "e");

        let report = AuditEngine::audit(tmp.path()).unwrap();
        assert_eq!(report.referenced, 1);
        assert_eq!(report.physical, 3);
        assert_eq!(report.redundant, vec![tmp.path().join("extra.gif")]);
    }

    #[test]
    fn test_no_candidate_means_zero_physical() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("doc.md"), "![p](elsewhere/photo.png)");

        let report = AuditEngine::audit(tmp.path()).unwrap();
        assert_eq!(report.physical, 0);
        assert!(report.redundant.is_empty());
    }

    #[test]
    fn test_shared_directory_counted_once() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("a.md"), "![](images/a.png)");
        write(&tmp.path().join("b.md"), "![](images/b.png)");
        write(&tmp.path().join("images/a.png"), "a");
        write(&tmp.path().join("images/b.png"), "b");
        write(&tmp.path().join("images/c.png"), "c");

        let report = AuditEngine::audit(tmp.path()).unwrap();
        assert_eq!(report.markdown_files, 2);
        assert_eq!(report.referenced, 2);
        assert_eq!(report.physical, 3);
        assert_eq!(report.redundant, vec![tmp.path().join("images/c.png")]);
    }

    #[test]
    fn test_audit_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("doc.md"), "![p](images/photo.png)");
        write(&tmp.path().join("images/photo.png"), "p");
        write(&tmp.path().join("images/orphan.png"), "o");

        let first = AuditEngine::audit(tmp.path()).unwrap();
        let second = AuditEngine::audit(tmp.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cleanup_backup_and_permanent() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("images/a.png");
        let b = tmp.path().join("images/b.png");
        write(&a, "a");
        write(&b, "b");

        let report = AuditEngine::cleanup(&[a.clone(), tmp.path().join("images/gone.png")], false);
        assert_eq!(report.removed, 1);
        assert_eq!(report.skipped, 1);
        assert!(!a.exists());
        assert!(tmp.path().join("images/unused_backup/a.png").is_file());

        let report = AuditEngine::cleanup(&[b.clone()], true);
        assert_eq!(report.removed, 1);
        assert!(!b.exists());
        assert!(!tmp.path().join("images/unused_backup/b.png").exists());
    }

    #[test]
    fn test_scan_unused_skips_backup() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("images/doc/a.png"), "a");
        write(&tmp.path().join("images/doc/b.png"), "b");
        write(&tmp.path().join("images/unused_backup/c.png"), "c");

        let unused = AuditEngine::scan_unused(["![](./images/doc/a.png)"], tmp.path());
        assert_eq!(unused, vec![tmp.path().join("images/doc/b.png")]);
    }
}
