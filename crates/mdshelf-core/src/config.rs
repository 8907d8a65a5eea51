//! Centralized configuration for mdshelf.
//!
//! Constants for network fetches, on-disk layout and rename history, plus the
//! per-pass [`MigrationConfig`].

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
    pub const USER_AGENT: &'static str = "Mozilla/5.0 (compatible; mdshelf/0.3)";
    pub const DEFAULT_IMAGE_EXTENSION: &'static str = "jpg";
    pub const REMOTE_NAME_PREFIX: &'static str = "remote_image";
    pub const DOWNLOAD_TEMP_SUFFIX: &'static str = ".part";
}

/// Directory and file naming.
pub struct PathsConfig;

impl PathsConfig {
    pub const IMAGES_DIR_NAME: &'static str = "images";
    pub const ASSETS_DIR_NAME: &'static str = "assets";
    pub const UNUSED_BACKUP_DIR_NAME: &'static str = "unused_backup";
    pub const MERGED_DOCUMENT_NAME: &'static str = "merged_document.md";
    pub const RUN_LOG_SUFFIX: &'static str = "_migration.log";
    pub const MARKDOWN_EXTENSION: &'static str = "md";
}

/// Rename engine configuration.
pub struct RenameConfig;

impl RenameConfig {
    /// Oldest transactions are dropped once the undo stack grows past this.
    pub const MAX_HISTORY: usize = 50;
    pub const DATE_FORMAT: &'static str = "%Y%m%d";
    /// Widest zero-padding accepted for `{num}`.
    pub const MAX_PADDING: usize = 255;
}

/// Options for one migration pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MigrationConfig {
    /// Store each document's images under `images/<document stem>/`.
    #[serde(alias = "use_subfolders", alias = "subfolder")]
    pub use_subfolders: bool,
    /// Download `http(s)://` images instead of leaving them untouched.
    #[serde(alias = "download_remote", alias = "download")]
    pub download_remote: bool,
    /// Concatenate all migrated documents into one merged document.
    pub merge: bool,
    /// Scan for unreferenced images once migration finishes.
    #[serde(alias = "cleanup_after", alias = "cleanup")]
    pub cleanup_after: bool,
    /// Append a dated run log into the target directory.
    #[serde(alias = "write_run_log")]
    pub write_run_log: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            use_subfolders: false,
            download_remote: false,
            merge: false,
            cleanup_after: false,
            write_run_log: true,
        }
    }
}
