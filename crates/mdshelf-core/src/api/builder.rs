//! Builder for configuring an MdShelf session.

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use crate::config::RenameConfig;
use crate::error::Result;
use crate::guard::FolderGuard;
use crate::models::ProgressEvent;
use crate::network::{HttpFetcher, RemoteFetch};
use crate::rename::RenameHistory;
use crate::{MdShelf, ShelfInner};

/// Builder for configuring MdShelf initialization.
pub struct MdShelfBuilder {
    fetcher: Option<Arc<dyn RemoteFetch>>,
    progress: Option<mpsc::UnboundedSender<ProgressEvent>>,
    history_capacity: usize,
}

impl Default for MdShelfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MdShelfBuilder {
    pub fn new() -> Self {
        Self {
            fetcher: None,
            progress: None,
            history_capacity: RenameConfig::MAX_HISTORY,
        }
    }

    /// Use a custom fetcher for remote images.
    ///
    /// Default: [`HttpFetcher`] with the standard timeout.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn RemoteFetch>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Send a [`ProgressEvent`] per processed file to `tx`.
    pub fn with_progress(mut self, tx: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Maximum number of rename transactions kept for undo.
    ///
    /// Default: 50
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Build the MdShelf session.
    pub fn build(self) -> Result<MdShelf> {
        let fetcher: Arc<dyn RemoteFetch> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new()?),
        };

        Ok(MdShelf {
            inner: Arc::new(ShelfInner {
                fetcher,
                history: Mutex::new(RenameHistory::with_capacity(self.history_capacity)),
                guard: FolderGuard::new(),
                progress: self.progress,
            }),
        })
    }
}
