//! # Service Info Routes
//!
//! The unauthenticated operational surface: service description at `/`,
//! liveness at `/health`, and the legacy `/v1/status` compatibility
//! endpoint. All three are in the default exemption table.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

/// Version reported by the service endpoints.
pub const SERVICE_VERSION: &str = "1.0.0";

/// Assemble the service info router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/v1/status", get(status))
}

/// GET / — Basic service information and endpoint directory.
#[utoipa::path(
    get,
    path = "/",
    tag = "service",
    responses((status = 200, description = "Service information"))
)]
async fn root() -> Json<Value> {
    Json(json!({
        "service": "ANP Agent Example Service",
        "version": SERVICE_VERSION,
        "protocol": "ANP",
        "protocol_version": "1.0.0",
        "description": "Demonstration agent implementing the Agent Network Protocol",
        "endpoints": {
            "agent_description": "/agents/test/ad.json",
            "api_resources": "/agents/test/api/{json_file}",
            "yaml_resources": "/agents/test/api_files/{yaml_file}",
            "jsonrpc": "/agents/test/jsonrpc",
            "documentation": "/docs",
            "openapi_spec": "/openapi.json"
        },
        "authentication": "DID-WBA",
        "status": "online"
    }))
}

/// GET /health — Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    tag = "service",
    responses((status = 200, description = "Service is healthy"))
)]
async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "anp-agent",
        "version": SERVICE_VERSION
    }))
}

/// GET /v1/status — Compatibility status endpoint.
#[utoipa::path(
    get,
    path = "/v1/status",
    tag = "service",
    responses((status = 200, description = "Service status"))
)]
async fn status() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "ANP agent service is running"
    }))
}
