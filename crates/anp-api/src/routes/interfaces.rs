//! # Interface Definition File Routes
//!
//! Serves the OpenRPC JSON and YAML interface definitions referenced by
//! the agent description, out of the configured interface directory.
//!
//! File names are single path segments; anything that looks like a
//! traversal attempt is rejected before touching the filesystem. JSON
//! files are parsed before serving so a corrupt definition surfaces as a
//! 500 rather than leaking malformed bytes to clients.

use std::path::PathBuf;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

/// Assemble the interface file router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/agents/test/api/:json_file", get(json_interface))
        .route("/agents/test/api_files/:yaml_file", get(yaml_interface))
}

/// Resolve a requested file name inside the interface directory,
/// rejecting separators and parent references.
fn resolve(state: &AppState, name: &str) -> Result<PathBuf, AppError> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.starts_with('.')
    {
        return Err(AppError::BadRequest("invalid file name".into()));
    }
    Ok(state.config.interface_dir.join(name))
}

/// GET /agents/test/api/{json_file} — OpenRPC JSON interface definitions.
#[utoipa::path(
    get,
    path = "/agents/test/api/{json_file}",
    tag = "interfaces",
    params(("json_file" = String, Path, description = "JSON definition file name")),
    responses(
        (status = 200, description = "Interface definition"),
        (status = 400, description = "Not a JSON file", body = crate::error::ErrorBody),
        (status = 404, description = "File not found", body = crate::error::ErrorBody)
    ),
    security(("didwba" = []))
)]
async fn json_interface(
    State(state): State<AppState>,
    Path(json_file): Path<String>,
) -> Result<Json<Value>, AppError> {
    let path = resolve(&state, &json_file)?;

    if !path.is_file() {
        tracing::warn!(file = %json_file, "API file not found");
        return Err(AppError::NotFound("API file not found".into()));
    }
    if !json_file.ends_with(".json") {
        tracing::warn!(file = %json_file, "invalid API file type");
        return Err(AppError::BadRequest(
            "only JSON API files are served here".into(),
        ));
    }

    let raw = std::fs::read_to_string(&path)
        .map_err(|e| AppError::Internal(format!("cannot read {}: {e}", path.display())))?;
    let content: Value = serde_json::from_str(&raw)
        .map_err(|e| AppError::Internal(format!("malformed JSON in {}: {e}", path.display())))?;

    tracing::info!(file = %json_file, "served API file");
    Ok(Json(content))
}

/// GET /agents/test/api_files/{yaml_file} — YAML interface definitions.
#[utoipa::path(
    get,
    path = "/agents/test/api_files/{yaml_file}",
    tag = "interfaces",
    params(("yaml_file" = String, Path, description = "YAML definition file name")),
    responses(
        (status = 200, description = "YAML interface definition"),
        (status = 400, description = "Not a YAML file", body = crate::error::ErrorBody),
        (status = 404, description = "File not found", body = crate::error::ErrorBody)
    ),
    security(("didwba" = []))
)]
async fn yaml_interface(
    State(state): State<AppState>,
    Path(yaml_file): Path<String>,
) -> Result<Response, AppError> {
    let path = resolve(&state, &yaml_file)?;

    if !path.is_file() {
        tracing::warn!(file = %yaml_file, "YAML file not found");
        return Err(AppError::NotFound("YAML file not found".into()));
    }
    if !(yaml_file.ends_with(".yaml") || yaml_file.ends_with(".yml")) {
        tracing::warn!(file = %yaml_file, "invalid YAML file type");
        return Err(AppError::BadRequest(
            "only YAML files are served here".into(),
        ));
    }

    let raw = std::fs::read_to_string(&path)
        .map_err(|e| AppError::Internal(format!("cannot read {}: {e}", path.display())))?;
    // Parse to confirm the file is valid YAML before serving it verbatim.
    serde_yaml::from_str::<serde_yaml::Value>(&raw)
        .map_err(|e| AppError::Internal(format!("malformed YAML in {}: {e}", path.display())))?;

    tracing::info!(file = %yaml_file, "served YAML file");
    Ok((
        [(header::CONTENT_TYPE, "application/x-yaml")],
        raw,
    )
        .into_response())
}
