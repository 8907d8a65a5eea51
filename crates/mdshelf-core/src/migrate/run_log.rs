//! Dated per-run log file written next to migrated documents.
//!
//! Lines look like `2026-01-31 14:02:11 [INFO] message` and are appended to
//! `<target>/<YYYY-MM-DD>_migration.log`. Every line is also emitted via `tracing`.

use crate::config::PathsConfig;
use crate::{MdShelfError, Result};
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn, Level};

/// Log sink for one migration pass.
pub struct RunLog {
    path: Option<PathBuf>,
    file: Option<File>,
}

impl RunLog {
    /// Open (append) today's run log in `target_dir`.
    pub fn open(target_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(target_dir)
            .map_err(|e| MdShelfError::io_with_path(e, target_dir))?;
        let path = target_dir.join(Self::file_name_for_today());
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| MdShelfError::io_with_path(e, &path))?;
        Ok(Self {
            path: Some(path),
            file: Some(file),
        })
    }

    /// A run log that only forwards to `tracing`.
    pub fn disabled() -> Self {
        Self {
            path: None,
            file: None,
        }
    }

    pub fn file_name_for_today() -> String {
        format!(
            "{}{}",
            Local::now().format("%Y-%m-%d"),
            PathsConfig::RUN_LOG_SUFFIX
        )
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        self.record(Level::INFO, message.as_ref());
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        self.record(Level::WARN, message.as_ref());
    }

    pub fn error(&mut self, message: impl AsRef<str>) {
        self.record(Level::ERROR, message.as_ref());
    }

    fn record(&mut self, level: Level, message: &str) {
        match level {
            Level::ERROR => error!("{}", message),
            Level::WARN => warn!("{}", message),
            _ => info!("{}", message),
        }

        if let Some(file) = self.file.as_mut() {
            let line = format!(
                "{} [{}] {}\n",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                level,
                message
            );
            if let Err(e) = file.write_all(line.as_bytes()) {
                debug!("Failed to append to run log: {}", e);
            }
        }
    }
}
