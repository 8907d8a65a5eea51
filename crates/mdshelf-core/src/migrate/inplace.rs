//! In-place reorganization.
//!
//! Pulls the images a document references into `<folder>/images/`, renaming them
//! `<stem>_<n>.<ext>` after their position in the document, and rewrites the
//! document where it stands.

use crate::config::PathsConfig;
use crate::markdown::{rewrite_tokens, Document, ReferenceKind};
use crate::paths::{allocate_unique_path, move_file, resolve_local};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One image pulled into the images folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovedImage {
    pub token: String,
    pub from: PathBuf,
    pub to: PathBuf,
    pub new_reference: String,
}

/// Result of reorganizing one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InplaceDocument {
    pub path: PathBuf,
    pub moved: Vec<MovedImage>,
    /// Local tokens whose image could not be found.
    pub missing: Vec<String>,
    #[serde(skip)]
    pub text: String,
}

/// Reorganizes documents inside their own folder.
pub struct InplaceOrganizer;

impl InplaceOrganizer {
    /// Reorganize a single document and persist it in place.
    pub fn reorganize_document(path: &Path) -> Result<InplaceDocument> {
        let mut doc = Document::load(path)?;
        let stem = doc.stem();
        let images_dir = doc.dir().join(PathsConfig::IMAGES_DIR_NAME);
        let already_organized = format!("./{}/", PathsConfig::IMAGES_DIR_NAME);

        let mut seen = HashSet::new();
        let mut replacements = HashMap::new();
        let mut moved = Vec::new();
        let mut missing = Vec::new();

        for (index, reference) in doc.references().into_iter().enumerate() {
            let token = reference.token;
            if reference.kind == ReferenceKind::Remote
                || token.starts_with(&already_organized)
                || !seen.insert(token.clone())
            {
                continue;
            }

            let source = match resolve_local(&token, doc.dir()) {
                Ok(source) if source.is_file() => source,
                _ => {
                    warn!("Image not found for {:?} in {}", token, doc.path().display());
                    missing.push(token);
                    continue;
                }
            };

            let extension = source
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            let desired = format!("{}_{}{}", stem, index + 1, extension);

            let destination = if source == images_dir.join(&desired) {
                source.clone()
            } else {
                let destination = allocate_unique_path(&images_dir, &desired);
                if let Err(e) = move_file(&source, &destination) {
                    warn!("Failed to move {}: {}", source.display(), e);
                    continue;
                }
                destination
            };

            let name = destination
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let new_reference = format!("{}{}", already_organized, name);
            info!("Organized {} -> {}", source.display(), name);

            replacements.insert(token.clone(), new_reference.clone());
            moved.push(MovedImage {
                token,
                from: source,
                to: destination,
                new_reference,
            });
        }

        if !replacements.is_empty() {
            let rewritten = rewrite_tokens(doc.text(), &replacements);
            doc.set_text(rewritten);
            doc.persist_to(doc.path())?;
        }

        Ok(InplaceDocument {
            path: doc.path().to_path_buf(),
            moved,
            missing,
            text: doc.into_text(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_images_are_pulled_in_and_numbered() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("shots")).unwrap();
        fs::write(tmp.path().join("shots/a.png"), b"a").unwrap();
        fs::write(tmp.path().join("b.JPG"), b"b").unwrap();
        let doc = tmp.path().join("note.md");
        fs::write(
            &doc,
            "![](https://x.org/r.png) ![](shots/a.png) ![](b.JPG) ![](./images/kept.png)",
        )
        .unwrap();

        let result = InplaceOrganizer::reorganize_document(&doc).unwrap();

        assert_eq!(result.moved.len(), 2);
        assert!(tmp.path().join("images/note_2.png").is_file());
        assert!(tmp.path().join("images/note_3.JPG").is_file());
        assert!(!tmp.path().join("shots/a.png").exists());
        assert_eq!(
            fs::read_to_string(&doc).unwrap(),
            "![](https://x.org/r.png) ![](./images/note_2.png) ![](./images/note_3.JPG) ![](./images/kept.png)"
        );
    }

    #[test]
    fn test_missing_images_are_reported() {
        let tmp = TempDir::new().unwrap();
        let doc = tmp.path().join("note.md");
        fs::write(&doc, "![](gone.png)").unwrap();

        let result = InplaceOrganizer::reorganize_document(&doc).unwrap();
        assert!(result.moved.is_empty());
        assert_eq!(result.missing, vec!["gone.png"]);
        assert_eq!(fs::read_to_string(&doc).unwrap(), "![](gone.png)");
    }

    #[test]
    fn test_existing_target_name_not_overwritten() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("images")).unwrap();
        fs::write(tmp.path().join("images/note_1.png"), b"old").unwrap();
        fs::write(tmp.path().join("a.png"), b"new").unwrap();
        let doc = tmp.path().join("note.md");
        fs::write(&doc, "![](a.png)").unwrap();

        InplaceOrganizer::reorganize_document(&doc).unwrap();

        assert_eq!(fs::read(tmp.path().join("images/note_1.png")).unwrap(), b"old");
        assert_eq!(fs::read(tmp.path().join("images/note_1_1.png")).unwrap(), b"new");
        assert_eq!(
            fs::read_to_string(&doc).unwrap(),
            "![](./images/note_1_1.png)"
        );
    }
}
