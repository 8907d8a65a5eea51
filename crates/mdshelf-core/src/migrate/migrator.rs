//! Per-document asset migration.
//!
//! # Algorithm
//!
//! 1. **Load**: read the document (missing document fails the call)
//! 2. **Collect**: extract image references; each distinct token is handled once
//! 3. **Relocate**: copy local images / download remote ones into the asset directory
//! 4. **Rewrite**: point every link carrying a relocated token at its new location
//! 5. **Persist**: write the document into the target directory, unless merging
//!
//! Problems with a single reference never abort the document; they become
//! [`ReferenceOutcome`] entries and a log line.

use crate::config::{MigrationConfig, PathsConfig};
use crate::markdown::{rewrite_tokens, Document, ImageReference};
use crate::network::RemoteFetch;
use crate::paths::{allocate_unique_path, resolve_local};
use crate::{MdShelfError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What happened to one distinct image token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReferenceOutcome {
    Copied {
        token: String,
        source: PathBuf,
        destination: PathBuf,
        new_reference: String,
    },
    Downloaded {
        token: String,
        destination: PathBuf,
        new_reference: String,
    },
    SkippedRemote {
        token: String,
    },
    MissingSource {
        token: String,
        resolved: PathBuf,
    },
    Failed {
        token: String,
        reason: String,
    },
}

impl ReferenceOutcome {
    pub fn token(&self) -> &str {
        match self {
            ReferenceOutcome::Copied { token, .. }
            | ReferenceOutcome::Downloaded { token, .. }
            | ReferenceOutcome::SkippedRemote { token }
            | ReferenceOutcome::MissingSource { token, .. }
            | ReferenceOutcome::Failed { token, .. } => token,
        }
    }

    /// Rewritten link target, if the image was relocated.
    pub fn new_reference(&self) -> Option<&str> {
        match self {
            ReferenceOutcome::Copied { new_reference, .. }
            | ReferenceOutcome::Downloaded { new_reference, .. } => Some(new_reference),
            _ => None,
        }
    }
}

/// Result of migrating one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigratedDocument {
    pub source: PathBuf,
    pub file_name: String,
    /// Rewritten text.
    #[serde(skip)]
    pub text: String,
    /// Where the document was written; `None` when persistence is left to a merge.
    pub output: Option<PathBuf>,
    pub outcomes: Vec<ReferenceOutcome>,
}

impl MigratedDocument {
    pub fn relocated_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.new_reference().is_some())
            .count()
    }
}

/// Moves a document's images into `<target>/images[/<stem>]` and rewrites its links.
pub struct AssetMigrator {
    fetcher: Arc<dyn RemoteFetch>,
}

impl AssetMigrator {
    pub fn new(fetcher: Arc<dyn RemoteFetch>) -> Self {
        Self { fetcher }
    }

    /// Asset directory for a document stem under `target_docs_dir`.
    pub fn asset_dir(target_docs_dir: &Path, stem: &str, config: &MigrationConfig) -> PathBuf {
        let images = target_docs_dir.join(PathsConfig::IMAGES_DIR_NAME);
        if config.use_subfolders {
            images.join(stem)
        } else {
            images
        }
    }

    /// Link target written into the document for a relocated image.
    pub fn relative_reference(stem: &str, file_name: &str, config: &MigrationConfig) -> String {
        if config.use_subfolders {
            format!("./{}/{}/{}", PathsConfig::IMAGES_DIR_NAME, stem, file_name)
        } else {
            format!("./{}/{}", PathsConfig::IMAGES_DIR_NAME, file_name)
        }
    }

    /// Migrate one document into `target_docs_dir`.
    pub async fn migrate(
        &self,
        document: &Path,
        target_docs_dir: &Path,
        config: &MigrationConfig,
    ) -> Result<MigratedDocument> {
        let mut doc = Document::load(document)?;
        let stem = doc.stem();
        let asset_dir = Self::asset_dir(target_docs_dir, &stem, config);
        info!("Migrating {}", doc.path().display());

        let mut seen: HashSet<String> = HashSet::new();
        let mut replacements: HashMap<String, String> = HashMap::new();
        let mut outcomes = Vec::new();

        for reference in doc.references() {
            if !seen.insert(reference.token.clone()) {
                continue;
            }

            let outcome = if reference.is_remote() {
                self.fetch_remote(&reference, &stem, &asset_dir, config).await
            } else {
                Self::copy_local_blocking(&reference, doc.dir(), &stem, &asset_dir, config).await
            };

            if let Some(new_reference) = outcome.new_reference() {
                replacements.insert(outcome.token().to_string(), new_reference.to_string());
            }
            outcomes.push(outcome);
        }

        let rewritten = rewrite_tokens(doc.text(), &replacements);
        doc.set_text(rewritten);

        let output = if config.merge {
            None
        } else {
            let destination = target_docs_dir.join(doc.file_name());
            doc.persist_to(&destination)?;
            Some(destination)
        };

        Ok(MigratedDocument {
            source: doc.path().to_path_buf(),
            file_name: doc.file_name(),
            output,
            outcomes,
            text: doc.into_text(),
        })
    }

    async fn fetch_remote(
        &self,
        reference: &ImageReference,
        stem: &str,
        asset_dir: &Path,
        config: &MigrationConfig,
    ) -> ReferenceOutcome {
        let token = reference.token.clone();
        if !config.download_remote {
            debug!("Leaving remote image {}", token);
            return ReferenceOutcome::SkippedRemote { token };
        }

        match self.fetcher.fetch(&token, asset_dir).await {
            Ok(destination) => {
                let name = file_name_of(&destination);
                info!("Downloaded {} -> {}", token, name);
                ReferenceOutcome::Downloaded {
                    new_reference: Self::relative_reference(stem, &name, config),
                    token,
                    destination,
                }
            }
            Err(e) => {
                warn!("Download failed for {}: {}", token, e);
                ReferenceOutcome::Failed {
                    token,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Run [`copy_local`](Self::copy_local) off the async worker.
    async fn copy_local_blocking(
        reference: &ImageReference,
        document_dir: &Path,
        stem: &str,
        asset_dir: &Path,
        config: &MigrationConfig,
    ) -> ReferenceOutcome {
        let token = reference.token.clone();
        let reference = reference.clone();
        let document_dir = document_dir.to_path_buf();
        let stem = stem.to_string();
        let asset_dir = asset_dir.to_path_buf();
        let config = config.clone();

        tokio::task::spawn_blocking(move || {
            Self::copy_local(&reference, &document_dir, &stem, &asset_dir, &config)
        })
        .await
        .unwrap_or_else(|e| {
            warn!("Copy task for {:?} failed: {}", token, e);
            ReferenceOutcome::Failed {
                token,
                reason: e.to_string(),
            }
        })
    }

    fn copy_local(
        reference: &ImageReference,
        document_dir: &Path,
        stem: &str,
        asset_dir: &Path,
        config: &MigrationConfig,
    ) -> ReferenceOutcome {
        let token = reference.token.clone();
        let source = match resolve_local(&token, document_dir) {
            Ok(path) => path,
            Err(e) => {
                warn!("Skipping reference {:?}: {}", token, e);
                return ReferenceOutcome::Failed {
                    token,
                    reason: e.to_string(),
                };
            }
        };

        if !source.is_file() {
            warn!("Image not found: {} (from {:?})", source.display(), token);
            return ReferenceOutcome::MissingSource {
                token,
                resolved: source,
            };
        }

        match Self::copy_into(&source, asset_dir) {
            Ok(destination) => {
                let name = file_name_of(&destination);
                debug!("Copied {} -> {}", source.display(), destination.display());
                ReferenceOutcome::Copied {
                    new_reference: Self::relative_reference(stem, &name, config),
                    token,
                    source,
                    destination,
                }
            }
            Err(e) => {
                warn!("Failed to copy {}: {}", source.display(), e);
                ReferenceOutcome::Failed {
                    token,
                    reason: e.to_string(),
                }
            }
        }
    }

    fn copy_into(source: &Path, asset_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(asset_dir).map_err(|e| MdShelfError::io_with_path(e, asset_dir))?;
        let name = file_name_of(source);
        let destination = allocate_unique_path(asset_dir, &name);
        fs::copy(source, &destination).map_err(|e| MdShelfError::io_with_path(e, &destination))?;
        Ok(destination)
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
