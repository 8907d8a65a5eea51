//! Path normalization, reference resolution and collision-free allocation.

mod allocator;
mod relocate;
mod resolver;

pub use allocator::allocate_unique_path;
pub use relocate::move_file;
pub use resolver::{basename, classify, normalize, resolve_local};
