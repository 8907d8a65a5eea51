//! Markdown documents and the image references inside them.

mod document;
mod reference;

pub use document::{absolute, discover_markdown, is_markdown, Document};
pub use reference::{
    extract_references, extract_tokens, rewrite_tokens, ImageReference, ReferenceKind,
};
