//! Rename templates.
//!
//! A template may contain `{original}` (file stem), `{num}` (zero-padded running
//! number) and `{date}` (`YYYYMMDD`). Everything else is copied literally.

use crate::config::RenameConfig;
use crate::{MdShelfError, Result};
use serde::{Deserialize, Serialize};

const ORIGINAL: &str = "{original}";
const NUM: &str = "{num}";
const DATE: &str = "{date}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePattern {
    pub template: String,
    pub start: u64,
    pub padding: usize,
}

impl RenamePattern {
    pub fn new(template: impl Into<String>, start: u64, padding: usize) -> Result<Self> {
        let template = template.into();
        if template.trim().is_empty() {
            return Err(MdShelfError::InvalidPattern {
                message: "pattern is empty".into(),
            });
        }
        if template.contains('/') || template.contains('\\') {
            return Err(MdShelfError::InvalidPattern {
                message: format!("pattern {:?} contains a path separator", template),
            });
        }
        if padding > RenameConfig::MAX_PADDING {
            return Err(MdShelfError::InvalidNumber {
                field: "padding".into(),
                value: padding.to_string(),
            });
        }
        Ok(Self {
            template,
            start,
            padding,
        })
    }

    /// Build a pattern from user-entered text fields.
    pub fn parse(template: &str, start: &str, padding: &str) -> Result<Self> {
        let start = parse_number("start", start)?;
        let padding = parse_number("padding", padding)?;
        let padding = usize::try_from(padding).map_err(|_| MdShelfError::InvalidNumber {
            field: "padding".into(),
            value: padding.to_string(),
        })?;
        Self::new(template, start, padding)
    }

    /// New stem for the file at `index` (0-based) in listing order.
    pub fn expand(&self, stem: &str, index: usize, date: &str) -> String {
        let number = self.start.saturating_add(index as u64);
        let number = format!("{:0width$}", number, width = self.padding);
        self.template
            .replace(ORIGINAL, stem)
            .replace(NUM, &number)
            .replace(DATE, date)
    }
}

fn parse_number(field: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| MdShelfError::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        })
}
