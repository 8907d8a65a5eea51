//! Pattern-based batch renaming with undo.

mod engine;
mod history;
mod pattern;

pub use engine::{RenameEngine, RenamePreviewEntry, RenameTransaction, RenamedFile};
pub use history::{revert, RenameHistory, UndoOutcome};
pub use pattern::RenamePattern;
