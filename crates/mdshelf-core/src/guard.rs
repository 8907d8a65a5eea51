//! Single-flight guard for batch operations.
//!
//! At most one batch may touch a folder tree at a time. A lease on `/notes`
//! blocks leases on `/notes`, `/notes/sub` and `/`, and is released when dropped.

use crate::markdown::absolute;
use crate::{MdShelfError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Tracks folders that currently have a batch operation in flight.
#[derive(Debug, Clone, Default)]
pub struct FolderGuard {
    active: Arc<Mutex<HashSet<PathBuf>>>,
}

impl FolderGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire exclusive use of `folder`, or fail with `FolderBusy`.
    pub fn acquire(&self, folder: &Path) -> Result<FolderLease> {
        let folder = absolute(folder);
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(held) = active
            .iter()
            .find(|held| folder.starts_with(held) || held.starts_with(&folder))
        {
            debug!("Folder {} overlaps in-flight {}", folder.display(), held.display());
            return Err(MdShelfError::FolderBusy(folder));
        }

        active.insert(folder.clone());
        Ok(FolderLease {
            folder,
            active: self.active.clone(),
        })
    }

    /// Number of leases currently held.
    pub fn in_flight(&self) -> usize {
        self.active.lock().map(|a| a.len()).unwrap_or_default()
    }
}

/// Exclusive claim on a folder; released on drop.
#[derive(Debug)]
pub struct FolderLease {
    folder: PathBuf,
    active: Arc<Mutex<HashSet<PathBuf>>>,
}

impl Drop for FolderLease {
    fn drop(&mut self) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        active.remove(&self.folder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_folders_are_refused() {
        let guard = FolderGuard::new();
        let lease = guard.acquire(Path::new("/notes")).unwrap();

        assert!(matches!(
            guard.acquire(Path::new("/notes")),
            Err(MdShelfError::FolderBusy(_))
        ));
        assert!(guard.acquire(Path::new("/notes/sub")).is_err());
        assert!(guard.acquire(Path::new("/")).is_err());
        assert!(guard.acquire(Path::new("/other")).is_ok());

        drop(lease);
        assert!(guard.acquire(Path::new("/notes/sub")).is_ok());
    }

    #[test]
    fn test_lease_released_on_drop() {
        let guard = FolderGuard::new();
        {
            let _lease = guard.acquire(Path::new("/a")).unwrap();
            assert_eq!(guard.in_flight(), 1);
        }
        assert_eq!(guard.in_flight(), 0);
    }

    #[test]
    fn test_sibling_prefix_is_not_overlap() {
        let guard = FolderGuard::new();
        let _lease = guard.acquire(Path::new("/notes")).unwrap();
        assert!(guard.acquire(Path::new("/notes-archive")).is_ok());
    }
}
