//! Markdown documents on disk.

use super::reference::{extract_references, ImageReference};
use crate::config::PathsConfig;
use crate::{MdShelfError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A loaded Markdown document and its (mutable) text.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    text: String,
}

impl Document {
    /// Load a UTF-8 document. Fails with `DocumentNotFound` if it is not a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = absolute(path.as_ref());
        if !path.is_file() {
            return Err(MdShelfError::DocumentNotFound(path));
        }
        let text = fs::read_to_string(&path).map_err(|e| MdShelfError::io_with_path(e, &path))?;
        Ok(Self { path, text })
    }

    /// Load a document, replacing invalid UTF-8 instead of failing.
    pub fn load_lossy(path: impl AsRef<Path>) -> Result<Self> {
        let path = absolute(path.as_ref());
        if !path.is_file() {
            return Err(MdShelfError::DocumentNotFound(path));
        }
        let bytes = fs::read(&path).map_err(|e| MdShelfError::io_with_path(e, &path))?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        Ok(Self { path, text })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the document.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// File name without extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: String) {
        self.text = text;
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn references(&self) -> Vec<ImageReference> {
        extract_references(&self.text, &self.path)
    }

    /// Write the current text to `destination`, creating parent directories.
    pub fn persist_to(&self, destination: &Path) -> Result<()> {
        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| MdShelfError::io_with_path(e, parent))?;
            }
        }
        fs::write(destination, &self.text)
            .map_err(|e| MdShelfError::io_with_path(e, destination))?;
        debug!("Wrote {}", destination.display());
        Ok(())
    }
}

/// Whether `path` has a `.md` extension (case-insensitive).
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(PathsConfig::MARKDOWN_EXTENSION))
        .unwrap_or(false)
}

/// Collect Markdown documents under `path`.
///
/// A file is returned as-is. A directory is listed (recursively when
/// `recursive`), sorted by file name within each directory.
pub fn discover_markdown(path: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let path = absolute(path);
    if path.is_file() {
        return Ok(vec![path]);
    }
    if !path.is_dir() {
        return Err(MdShelfError::DocumentNotFound(path));
    }

    let mut walker = WalkDir::new(&path).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let documents = walker
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_markdown(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    Ok(documents)
}

/// Absolute form of `path` without resolving symlinks.
pub fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_document() {
        let tmp = TempDir::new().unwrap();
        let err = Document::load(tmp.path().join("missing.md")).unwrap_err();
        assert!(matches!(err, MdShelfError::DocumentNotFound(_)));
    }

    #[test]
    fn test_load_and_accessors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("note.md");
        fs::write(&path, "![a](img/a.png)").unwrap();

        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.stem(), "note");
        assert_eq!(doc.file_name(), "note.md");
        assert_eq!(doc.dir(), tmp.path());
        assert_eq!(doc.references().len(), 1);
    }

    #[test]
    fn test_load_lossy_accepts_invalid_utf8() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.md");
        fs::write(&path, b"![a](a.png)\xff").unwrap();

        assert!(Document::load(&path).is_err());
        let doc = Document::load_lossy(&path).unwrap();
        assert!(doc.text().starts_with("![a](a.png)"));
    }

    #[test]
    fn test_discover_recursive_and_flat() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("b.md"), "").unwrap();
        fs::write(tmp.path().join("a.MD"), "").unwrap();
        fs::write(tmp.path().join("skip.txt"), "").unwrap();
        fs::write(tmp.path().join("sub/c.md"), "").unwrap();

        let flat = discover_markdown(tmp.path(), false).unwrap();
        let names: Vec<_> = flat
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.MD", "b.md"]);

        let deep = discover_markdown(tmp.path(), true).unwrap();
        assert_eq!(deep.len(), 3);
    }

    #[test]
    fn test_persist_creates_parent() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("a.md");
        fs::write(&src, "hello").unwrap();
        let doc = Document::load(&src).unwrap();

        let dest = tmp.path().join("out/nested/a.md");
        doc.persist_to(&dest).unwrap();
        assert_eq!(fs::read_to_string(dest).unwrap(), "hello");
    }
}
