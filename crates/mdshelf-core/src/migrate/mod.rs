//! Document migration: relocating images, merging, and in-place reorganization.

mod inplace;
mod merge;
mod migrator;
mod run_log;

pub use inplace::{InplaceDocument, InplaceOrganizer, MovedImage};
pub use merge::MergeAssembler;
pub use migrator::{AssetMigrator, MigratedDocument, ReferenceOutcome};
pub use run_log::RunLog;
