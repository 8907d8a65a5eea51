//! Merging migrated documents into one.
//!
//! Each source contributes `"\n\n# <filename>\n\n" + content`, in discovery order.

use crate::config::PathsConfig;
use crate::markdown::absolute;
use crate::{MdShelfError, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Builds the merged document for one migration pass.
pub struct MergeAssembler {
    output: PathBuf,
}

impl MergeAssembler {
    /// Merge into the default merged-document name under `target_dir`.
    pub fn new(target_dir: &Path) -> Self {
        Self::with_output(target_dir.join(PathsConfig::MERGED_DOCUMENT_NAME))
    }

    pub fn with_output(output: impl AsRef<Path>) -> Self {
        Self {
            output: absolute(output.as_ref()),
        }
    }

    /// Drop inputs that are the merge output itself.
    pub fn exclude_output(&self, documents: Vec<PathBuf>) -> Vec<PathBuf> {
        documents
            .into_iter()
            .filter(|doc| absolute(doc) != self.output)
            .collect()
    }

    /// Concatenate `(filename, content)` pairs.
    pub fn assemble<'a, I>(parts: I) -> String
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        parts
            .into_iter()
            .fold(String::new(), |mut merged, (file_name, content)| {
                merged.push_str("\n\n# ");
                merged.push_str(file_name);
                merged.push_str("\n\n");
                merged.push_str(content);
                merged
            })
    }

    /// Assemble and write the merged document, returning its path.
    pub fn write<'a, I>(&self, parts: I) -> Result<PathBuf>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let merged = Self::assemble(parts);
        if let Some(parent) = self.output.parent() {
            std::fs::create_dir_all(parent).map_err(|e| MdShelfError::io_with_path(e, parent))?;
        }
        std::fs::write(&self.output, merged)
            .map_err(|e| MdShelfError::io_with_path(e, &self.output))?;
        info!("Merged document written to {}", self.output.display());
        Ok(self.output.clone())
    }
}
