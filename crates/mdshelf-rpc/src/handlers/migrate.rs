//! Migration and in-place reorganize handlers.

use super::{get_bool_param, require_str_param};
use crate::server::AppState;
use mdshelf_core::{MdShelfError, MigrationConfig};
use serde_json::Value;
use std::path::PathBuf;

pub async fn migrate(state: &AppState, params: &Value) -> mdshelf_core::Result<Value> {
    let source = PathBuf::from(require_str_param(params, "source", "source")?);
    let target = PathBuf::from(require_str_param(params, "target", "target")?);
    let config = match params.get("config") {
        Some(config) => serde_json::from_value::<MigrationConfig>(config.clone()).map_err(|e| {
            MdShelfError::InvalidParams {
                message: format!("Invalid config: {}", e),
            }
        })?,
        None => MigrationConfig::default(),
    };

    let response = state.shelf.migrate(&source, &target, &config).await?;
    Ok(serde_json::to_value(response)?)
}

pub async fn inplace(state: &AppState, params: &Value) -> mdshelf_core::Result<Value> {
    let folder = PathBuf::from(require_str_param(params, "folder", "folder")?);
    let cleanup = get_bool_param(params, "cleanup", "cleanup").unwrap_or(false);

    let response = state.shelf.inplace(&folder, cleanup).await?;
    Ok(serde_json::to_value(response)?)
}
