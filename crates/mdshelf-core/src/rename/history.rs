//! Undo stack for rename transactions.

use crate::config::RenameConfig;
use crate::rename::engine::RenameTransaction;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Result of reverting one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoOutcome {
    pub restored: usize,
    /// New paths that could not be moved back.
    pub skipped: Vec<PathBuf>,
}

/// Bounded stack of applied transactions; the oldest entry is dropped when full.
#[derive(Debug)]
pub struct RenameHistory {
    transactions: VecDeque<RenameTransaction>,
    capacity: usize,
}

impl Default for RenameHistory {
    fn default() -> Self {
        Self::with_capacity(RenameConfig::MAX_HISTORY)
    }
}

impl RenameHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            transactions: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record a transaction. Empty transactions are not recorded.
    pub fn push(&mut self, transaction: RenameTransaction) {
        if transaction.is_empty() {
            return;
        }
        if self.transactions.len() == self.capacity {
            self.transactions.pop_front();
        }
        self.transactions.push_back(transaction);
    }

    /// Most recent transaction, without removing it.
    pub fn last(&self) -> Option<&RenameTransaction> {
        self.transactions.back()
    }

    pub fn pop(&mut self) -> Option<RenameTransaction> {
        self.transactions.pop_back()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Move every file of `transaction` back to its old name, newest rename first.
pub fn revert(transaction: &RenameTransaction) -> UndoOutcome {
    let mut outcome = UndoOutcome::default();

    for file in transaction.renamed.iter().rev() {
        if !file.new_path.exists() {
            warn!("Cannot undo {}: file is gone", file.new_path.display());
            outcome.skipped.push(file.new_path.clone());
            continue;
        }
        if file.old_path.exists() {
            warn!(
                "Cannot undo {}: {} exists again",
                file.new_path.display(),
                file.old_path.display()
            );
            outcome.skipped.push(file.new_path.clone());
            continue;
        }
        match fs::rename(&file.new_path, &file.old_path) {
            Ok(()) => {
                info!(
                    "Restored {} -> {}",
                    file.new_path.display(),
                    file.old_path.display()
                );
                outcome.restored += 1;
            }
            Err(e) => {
                warn!("Failed to restore {}: {}", file.new_path.display(), e);
                outcome.skipped.push(file.new_path.clone());
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rename::engine::{RenameEngine, RenamedFile};
    use crate::rename::pattern::RenamePattern;
    use std::collections::BTreeMap;
    use std::path::Path;
    use tempfile::TempDir;

    fn transaction(n: usize) -> RenameTransaction {
        RenameTransaction {
            renamed: vec![RenamedFile {
                new_path: PathBuf::from(format!("new_{}.md", n)),
                old_path: PathBuf::from(format!("old_{}.md", n)),
            }],
        }
    }

    fn snapshot(dir: &Path) -> BTreeMap<String, String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .map(|p| {
                (
                    p.file_name().unwrap().to_string_lossy().into_owned(),
                    fs::read_to_string(&p).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn test_stack_is_lifo_and_bounded() {
        let mut history = RenameHistory::with_capacity(2);
        history.push(transaction(1));
        history.push(transaction(2));
        history.push(transaction(3));

        assert_eq!(history.len(), 2);
        assert_eq!(history.pop(), Some(transaction(3)));
        assert_eq!(history.pop(), Some(transaction(2)));
        assert!(history.pop().is_none());
    }

    #[test]
    fn test_empty_transaction_not_recorded() {
        let mut history = RenameHistory::default();
        history.push(RenameTransaction::default());
        assert!(history.is_empty());
    }

    #[test]
    fn test_apply_then_revert_is_exact_inverse() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.md"), "A").unwrap();
        fs::write(tmp.path().join("b.md"), "B").unwrap();
        fs::write(tmp.path().join("notes.txt"), "n").unwrap();
        let before = snapshot(tmp.path());

        let pattern = RenamePattern::new("{original}_{num}", 1, 3).unwrap();
        let tx = RenameEngine::new().apply(tmp.path(), &pattern).unwrap();
        assert_ne!(snapshot(tmp.path()), before);

        let outcome = revert(&tx);
        assert_eq!(outcome.restored, 2);
        assert!(outcome.skipped.is_empty());
        assert_eq!(snapshot(tmp.path()), before);
    }

    #[test]
    fn test_revert_tolerates_missing_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.md"), "A").unwrap();
        fs::write(tmp.path().join("b.md"), "B").unwrap();

        let pattern = RenamePattern::new("{original}_{num}", 1, 3).unwrap();
        let tx = RenameEngine::new().apply(tmp.path(), &pattern).unwrap();
        fs::remove_file(tmp.path().join("a_001.md")).unwrap();

        let outcome = revert(&tx);
        assert_eq!(outcome.restored, 1);
        assert_eq!(outcome.skipped, vec![tmp.path().join("a_001.md")]);
        assert!(tmp.path().join("b.md").is_file());
    }
}
