//! Pure path-string handling for image references.
//!
//! Nothing here touches the filesystem. Paths are normalized to forward slashes
//! with `.` and `..` segments collapsed, the way a Markdown author would write them.

use crate::markdown::ReferenceKind;
use crate::{MdShelfError, Result};
use std::path::{Path, PathBuf};

/// Normalize a path string: unify separators to `/` and collapse `.`/`..`.
///
/// Leading `..` segments of a relative path are kept; `..` at a filesystem root
/// is dropped. An empty result becomes `"."`.
///
/// # Examples
///
/// ```
/// use mdshelf_core::paths::normalize;
///
/// assert_eq!(normalize("img\\.\\a.png"), "img/a.png");
/// assert_eq!(normalize("a/b/../c.png"), "a/c.png");
/// assert_eq!(normalize("../shared/c.png"), "../shared/c.png");
/// ```
pub fn normalize(token: &str) -> String {
    let unified = token.trim().replace('\\', "/");
    let (root, rest) = split_root(&unified);

    let mut parts: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if root.is_empty() => parts.push(".."),
                _ => {}
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (root.is_empty(), joined.is_empty()) {
        (true, true) => ".".to_string(),
        (true, false) => joined,
        (false, _) => format!("{}{}", root, joined),
    }
}

/// Classify a token as remote (`http://`/`https://`, case-sensitive) or local.
pub fn classify(token: &str) -> ReferenceKind {
    if token.starts_with("http://") || token.starts_with("https://") {
        ReferenceKind::Remote
    } else {
        ReferenceKind::Local
    }
}

/// Resolve a local token to an absolute path relative to the owning document.
///
/// Absolute tokens are returned normalized; relative tokens are joined to
/// `document_dir` first. Fails only for an empty token.
pub fn resolve_local(token: &str, document_dir: &Path) -> Result<PathBuf> {
    if token.trim().is_empty() {
        return Err(MdShelfError::InvalidReference {
            token: token.to_string(),
        });
    }

    let normalized = normalize(token);
    if is_absolute(&normalized) {
        return Ok(PathBuf::from(normalized));
    }

    let joined = format!("{}/{}", document_dir.to_string_lossy(), normalized);
    Ok(PathBuf::from(normalize(&joined)))
}

/// Final segment of a normalized path string.
pub fn basename(token: &str) -> String {
    let normalized = normalize(token);
    normalized
        .rsplit('/')
        .next()
        .unwrap_or(normalized.as_str())
        .to_string()
}

fn is_absolute(normalized: &str) -> bool {
    normalized.starts_with('/') || drive_prefix_len(normalized) == 3
}

/// Split off `/` or a Windows drive root (`C:/`, `C:`).
fn split_root(path: &str) -> (&str, &str) {
    if path.starts_with('/') {
        return ("/", path.trim_start_matches('/'));
    }
    match drive_prefix_len(path) {
        0 => ("", path),
        len => (&path[..len], &path[len..]),
    }
}

fn drive_prefix_len(path: &str) -> usize {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        if bytes.get(2) == Some(&b'/') {
            3
        } else {
            2
        }
    } else {
        0
    }
}
