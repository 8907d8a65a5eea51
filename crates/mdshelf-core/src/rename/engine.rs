//! Batch renaming of Markdown documents in one folder.
//!
//! Collisions inside the batch are checked before any file is touched. Individual
//! renames that fail afterwards (source gone, destination already present) are
//! skipped with a warning and left out of the transaction.

use crate::config::RenameConfig;
use crate::markdown::discover_markdown;
use crate::rename::pattern::RenamePattern;
use crate::{MdShelfError, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One line of a rename preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePreviewEntry {
    pub old_name: String,
    pub new_name: String,
    #[serde(skip)]
    pub path: PathBuf,
}

/// A rename that was actually carried out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamedFile {
    pub new_path: PathBuf,
    pub old_path: PathBuf,
}

/// Renames applied by one `apply` call, in the order they happened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameTransaction {
    pub renamed: Vec<RenamedFile>,
}

impl RenameTransaction {
    pub fn len(&self) -> usize {
        self.renamed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renamed.is_empty()
    }

    /// Folder the renamed files live in.
    pub fn folder(&self) -> Option<&Path> {
        self.renamed.first().and_then(|f| f.old_path.parent())
    }
}

pub struct RenameEngine {
    date: String,
}

impl Default for RenameEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RenameEngine {
    /// Engine stamping `{date}` with today's local date.
    pub fn new() -> Self {
        Self::with_date(Local::now().format(RenameConfig::DATE_FORMAT).to_string())
    }

    pub fn with_date(date: impl Into<String>) -> Self {
        Self { date: date.into() }
    }

    /// Planned renames for every `.md` file directly inside `folder`, sorted by name.
    pub fn preview(&self, folder: &Path, pattern: &RenamePattern) -> Result<Vec<RenamePreviewEntry>> {
        if !folder.is_dir() {
            return Err(MdShelfError::NotADirectory(folder.to_path_buf()));
        }

        let entries = discover_markdown(folder, false)?
            .into_iter()
            .enumerate()
            .map(|(index, path)| {
                let old_name = file_name_of(&path);
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let extension = path
                    .extension()
                    .map(|e| format!(".{}", e.to_string_lossy()))
                    .unwrap_or_default();
                let new_name = format!("{}{}", pattern.expand(&stem, index, &self.date), extension);
                RenamePreviewEntry {
                    old_name,
                    new_name,
                    path,
                }
            })
            .collect();
        Ok(entries)
    }

    /// Rename the files listed by [`preview`](Self::preview).
    ///
    /// Fails with `NameCollision` before renaming anything if two files would get
    /// the same name.
    pub fn apply(&self, folder: &Path, pattern: &RenamePattern) -> Result<RenameTransaction> {
        let entries = self.preview(folder, pattern)?;

        let mut planned = HashSet::new();
        for entry in &entries {
            if !planned.insert(entry.new_name.as_str()) {
                return Err(MdShelfError::NameCollision {
                    name: entry.new_name.clone(),
                });
            }
        }

        let mut transaction = RenameTransaction::default();
        for entry in entries {
            if entry.old_name == entry.new_name {
                debug!("Unchanged: {}", entry.old_name);
                continue;
            }
            let destination = entry.path.with_file_name(&entry.new_name);
            if destination.exists() {
                warn!(
                    "Skipping {}: {} already exists",
                    entry.old_name, entry.new_name
                );
                continue;
            }
            if let Err(e) = fs::rename(&entry.path, &destination) {
                warn!("Failed to rename {}: {}", entry.old_name, e);
                continue;
            }
            info!("Renamed {} -> {}", entry.old_name, entry.new_name);
            transaction.renamed.push(RenamedFile {
                new_path: destination,
                old_path: entry.path,
            });
        }

        Ok(transaction)
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
