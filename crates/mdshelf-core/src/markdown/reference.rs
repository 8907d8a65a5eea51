//! Image reference extraction and rewriting.
//!
//! References are found in inline image syntax `![alt](destination)` only.
//! Rewriting a relocated token applies to every inline link destination, so plain
//! links to the same file follow the image. A destination may carry angle brackets
//! or a trailing title; the token is the path part.

use crate::paths;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Inline image syntax. Alt text and destination are matched lazily on one line.
static IMAGE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").unwrap());

/// Destination part of any inline link, image or plain: `](destination)`.
static LINK_DESTINATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\]\((.*?)\)").unwrap());

/// Where a referenced image lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Local,
    Remote,
}

/// One image reference found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Path or URL inside the link destination.
    pub token: String,
    pub kind: ReferenceKind,
    /// Document the reference was found in.
    pub origin: PathBuf,
}

impl ImageReference {
    pub fn is_remote(&self) -> bool {
        self.kind == ReferenceKind::Remote
    }
}

/// Extract every image token in document order, duplicates included.
pub fn extract_tokens(text: &str) -> Vec<String> {
    IMAGE_LINK
        .captures_iter(text)
        .filter_map(|caps| caps.get(2))
        .map(|m| destination_token(m.as_str()).to_string())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Extract references with their classification.
pub fn extract_references(text: &str, origin: impl Into<PathBuf>) -> Vec<ImageReference> {
    let origin = origin.into();
    IMAGE_LINK
        .captures_iter(text)
        .filter_map(|caps| caps.get(2))
        .filter_map(|m| {
            let token = destination_token(m.as_str());
            if token.is_empty() {
                return None;
            }
            Some(ImageReference {
                token: token.to_string(),
                kind: paths::classify(token),
                origin: origin.clone(),
            })
        })
        .collect()
}

/// Rewrite link destinations whose token appears in `replacements`.
///
/// Covers image links and plain links alike, so a `[full size](img/a.png)`
/// companion link moves together with `![](img/a.png)`. Every link carrying the
/// same token is rewritten to the same target; text outside link destinations is
/// left alone.
pub fn rewrite_tokens(text: &str, replacements: &HashMap<String, String>) -> String {
    if replacements.is_empty() {
        return text.to_string();
    }

    LINK_DESTINATION
        .replace_all(text, |caps: &Captures| {
            let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            let Some(dest) = caps.get(1) else {
                return whole.to_string();
            };
            let token = destination_token(dest.as_str());
            match replacements.get(token) {
                Some(new_token) => format!("]({})", dest.as_str().replacen(token, new_token, 1)),
                None => whole.to_string(),
            }
        })
        .into_owned()
}

/// Path part of a link destination: strips `<...>` and a trailing quoted title.
fn destination_token(raw: &str) -> &str {
    let trimmed = raw.trim();

    if let Some(inner) = trimmed.strip_prefix('<') {
        if let Some(end) = inner.find('>') {
            return inner[..end].trim();
        }
    }

    if let Some((path, rest)) = trimmed.split_once(char::is_whitespace) {
        let rest = rest.trim_start();
        if rest.starts_with('"') || rest.starts_with('\'') || rest.starts_with('(') {
            return path;
        }
    }

    trimmed
}
