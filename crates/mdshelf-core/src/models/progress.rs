//! Progress reporting for batch operations.

use serde::{Deserialize, Serialize};

/// Which batch operation a progress event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Migrate,
    Audit,
    Cleanup,
    Rename,
    Undo,
    Inplace,
}

/// Emitted once per processed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub operation: Operation,
    /// 1-based index of the item just processed.
    pub current: usize,
    pub total: usize,
    pub message: String,
}

impl ProgressEvent {
    pub fn new(operation: Operation, current: usize, total: usize, message: impl Into<String>) -> Self {
        Self {
            operation,
            current,
            total,
            message: message.into(),
        }
    }

    /// Fraction complete in `0.0..=1.0`.
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f32 / self.total as f32
        }
    }
}
