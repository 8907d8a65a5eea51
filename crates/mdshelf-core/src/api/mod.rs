//! Session API implementation submodules.
//!
//! Each submodule contains `impl MdShelf` blocks for one mode. The struct
//! definition remains in `lib.rs`.

mod audit;
mod builder;
mod migrate;
mod rename;

pub use builder::MdShelfBuilder;
