//! Collision-free destination names.
//!
//! The existence check is not atomic with file creation. Callers write to the
//! returned path immediately, and batches never run concurrently against the same
//! folder (see [`crate::guard::FolderGuard`]).

use std::path::{Path, PathBuf};

/// Return a path inside `target_dir` that does not exist right now.
///
/// Tries `target_dir/desired` first, then `stem_1.ext`, `stem_2.ext`, ...
///
/// # Examples
///
/// ```no_run
/// use mdshelf_core::paths::allocate_unique_path;
/// use std::path::Path;
///
/// let path = allocate_unique_path(Path::new("/out/images"), "photo.png");
/// // "/out/images/photo.png", or "/out/images/photo_1.png" if that was taken
/// ```
pub fn allocate_unique_path(target_dir: &Path, desired: &str) -> PathBuf {
    let candidate = target_dir.join(desired);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, extension) = split_name(desired);
    let mut counter: u32 = 1;
    loop {
        let name = match extension {
            Some(ext) => format!("{}_{}.{}", stem, counter, ext),
            None => format!("{}_{}", stem, counter),
        };
        let candidate = target_dir.join(name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Split a filename into stem and extension (`.hidden` has no extension).
fn split_name(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(0) | None => (name, None),
        Some(pos) => (&name[..pos], Some(&name[pos + 1..])),
    }
}
