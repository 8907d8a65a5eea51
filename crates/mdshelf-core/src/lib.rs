//! mdshelf core - headless library for moving Markdown documents together with
//! their images.
//!
//! The crate migrates documents into a target directory while relocating the images
//! they reference, audits folders for images nothing links to, renames document sets
//! by pattern with undo, and merges documents into one. It can be used
//! programmatically without any HTTP/RPC layer.
//!
//! # Example
//!
//! ```rust,ignore
//! use mdshelf_core::{MdShelf, MigrationConfig};
//!
//! #[tokio::main]
//! async fn main() -> mdshelf_core::Result<()> {
//!     let shelf = MdShelf::new()?;
//!
//!     let config = MigrationConfig {
//!         use_subfolders: true,
//!         ..Default::default()
//!     };
//!     let result = shelf.migrate("notes/doc.md".as_ref(), "/out".as_ref(), &config).await?;
//!     println!("{}", result.message);
//!
//!     let audit = shelf.audit("/out".as_ref()).await?;
//!     println!("{} redundant images", audit.redundant_count);
//!
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod guard;
pub mod markdown;
pub mod migrate;
pub mod models;
pub mod network;
pub mod paths;
pub mod rename;

mod api;

// Re-export commonly used types
pub use audit::{AuditEngine, AuditReport, CleanupReport};
pub use config::MigrationConfig;
pub use error::{MdShelfError, Result};
pub use guard::{FolderGuard, FolderLease};
pub use markdown::{Document, ImageReference, ReferenceKind};
pub use migrate::{AssetMigrator, MergeAssembler, MigratedDocument, ReferenceOutcome};
pub use models::{Operation, ProgressEvent};
pub use network::{HttpFetcher, RemoteFetch};
pub use rename::{RenameEngine, RenameHistory, RenamePattern, RenameTransaction};

pub use api::MdShelfBuilder;

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Session service for mdshelf operations.
///
/// Owns everything that lives for the length of a session: the rename undo
/// history, the per-folder single-flight guard, the remote fetcher and the optional
/// progress channel. Cloning is cheap and clones share the same session.
#[derive(Clone)]
pub struct MdShelf {
    inner: Arc<ShelfInner>,
}

pub(crate) struct ShelfInner {
    pub(crate) fetcher: Arc<dyn RemoteFetch>,
    /// Also serializes rename operations.
    pub(crate) history: Mutex<RenameHistory>,
    pub(crate) guard: FolderGuard,
    pub(crate) progress: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl MdShelf {
    /// Create a builder for MdShelf.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    /// let shelf = MdShelf::builder()
    ///     .with_progress(tx)
    ///     .history_capacity(10)
    ///     .build()?;
    /// ```
    pub fn builder() -> MdShelfBuilder {
        MdShelfBuilder::new()
    }

    /// Create a session with the HTTP fetcher and default history depth.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub(crate) fn emit(&self, operation: Operation, current: usize, total: usize, message: String) {
        if let Some(tx) = &self.inner.progress {
            let _ = tx.send(ProgressEvent::new(operation, current, total, message));
        }
    }

    /// Folders with a batch currently in flight.
    pub fn in_flight(&self) -> usize {
        self.inner.guard.in_flight()
    }
}
