//! Audit and cleanup handlers.

use super::{get_bool_param, require_str_param};
use crate::server::AppState;
use mdshelf_core::MdShelfError;
use serde_json::Value;
use std::path::PathBuf;

pub async fn audit(state: &AppState, params: &Value) -> mdshelf_core::Result<Value> {
    let path = PathBuf::from(require_str_param(params, "path", "path")?);
    let response = state.shelf.audit(&path).await?;
    Ok(serde_json::to_value(response)?)
}

pub async fn cleanup(state: &AppState, params: &Value) -> mdshelf_core::Result<Value> {
    let paths = path_list(params)?;
    let permanent = get_bool_param(params, "permanent", "permanent").unwrap_or(false);

    let response = state.shelf.cleanup(paths, permanent).await?;
    Ok(serde_json::to_value(response)?)
}

/// `paths` must be an array of strings; any other entry rejects the call.
fn path_list(params: &Value) -> mdshelf_core::Result<Vec<PathBuf>> {
    params
        .get("paths")
        .and_then(|v| v.as_array())
        .ok_or_else(|| MdShelfError::InvalidParams {
            message: "Missing required parameter: paths".to_string(),
        })?
        .iter()
        .map(|v| {
            v.as_str()
                .map(PathBuf::from)
                .ok_or_else(|| MdShelfError::InvalidParams {
                    message: format!("paths entries must be strings, got {}", v),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_list() {
        let paths = path_list(&json!({"paths": ["/n/a.png", "/n/b.png"]})).unwrap();
        assert_eq!(paths, vec![PathBuf::from("/n/a.png"), PathBuf::from("/n/b.png")]);
        assert!(path_list(&json!({"paths": []})).unwrap().is_empty());
    }

    #[test]
    fn test_non_string_path_rejected() {
        let err = path_list(&json!({"paths": ["/n/a.png", 7]})).unwrap_err();
        assert_eq!(err.to_rpc_error_code(), -32602);

        let err = path_list(&json!({"paths": "/n/a.png"})).unwrap_err();
        assert!(matches!(err, MdShelfError::InvalidParams { .. }));
    }
}
