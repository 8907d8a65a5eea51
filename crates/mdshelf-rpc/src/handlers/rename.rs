//! Rename and undo handlers.

use super::{get_number_text, require_str_param};
use crate::server::AppState;
use mdshelf_core::RenamePattern;
use serde_json::Value;
use std::path::PathBuf;

/// Folder and pattern shared by preview and apply. `start` defaults to 1 and
/// `padding` to 3.
fn rename_params(params: &Value) -> mdshelf_core::Result<(PathBuf, RenamePattern)> {
    let folder = PathBuf::from(require_str_param(params, "folder", "folder")?);
    let template = require_str_param(params, "pattern", "pattern")?;
    let start = get_number_text(params, "start", "startNum").unwrap_or_else(|| "1".to_string());
    let padding = get_number_text(params, "padding", "pad").unwrap_or_else(|| "3".to_string());
    let pattern = RenamePattern::parse(&template, &start, &padding)?;
    Ok((folder, pattern))
}

pub async fn rename_preview(state: &AppState, params: &Value) -> mdshelf_core::Result<Value> {
    let (folder, pattern) = rename_params(params)?;
    let response = state.shelf.rename_preview(&folder, &pattern).await?;
    Ok(serde_json::to_value(response)?)
}

pub async fn rename_apply(state: &AppState, params: &Value) -> mdshelf_core::Result<Value> {
    let (folder, pattern) = rename_params(params)?;
    let response = state.shelf.rename_apply(&folder, &pattern).await?;
    Ok(serde_json::to_value(response)?)
}

pub async fn rename_undo(state: &AppState, _params: &Value) -> mdshelf_core::Result<Value> {
    let response = state.shelf.rename_undo().await?;
    Ok(serde_json::to_value(response)?)
}

pub async fn can_undo(state: &AppState, _params: &Value) -> mdshelf_core::Result<Value> {
    let response = state.shelf.undo_status().await;
    Ok(serde_json::to_value(response)?)
}
