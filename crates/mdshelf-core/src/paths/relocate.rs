//! File moves that survive crossing filesystems.

use crate::{MdShelfError, Result};
use std::path::Path;

/// Move a file, falling back to copy+delete for cross-filesystem moves.
pub fn move_file(src: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| MdShelfError::Io {
            message: format!("Failed to create destination parent: {}", parent.display()),
            path: Some(parent.to_path_buf()),
            source: Some(e),
        })?;
    }

    match std::fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(_) => {
            std::fs::copy(src, dest).map_err(|e| MdShelfError::Io {
                message: format!("Failed to copy {} -> {}", src.display(), dest.display()),
                path: Some(dest.to_path_buf()),
                source: Some(e),
            })?;
            std::fs::remove_file(src).map_err(|e| MdShelfError::Io {
                message: format!("Failed to clean up source after copy: {}", src.display()),
                path: Some(src.to_path_buf()),
                source: Some(e),
            })?;
            Ok(())
        }
    }
}
