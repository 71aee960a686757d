//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`. `/openapi.json` itself is in the default
//! exemption table so integrators can fetch it without credentials.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the DID-WBA security scheme to the OpenAPI spec.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "didwba",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("DID-WBA")
                        .description(Some(
                            "DID-WBA authentication: a signed `DIDWba` challenge header \
                             on first contact, then the bearer token returned in the \
                             response `authorization` header.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Assembled OpenAPI spec for the entire agent surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ANP Agent Example Service",
        version = "1.0.0",
        description = "Demonstration agent implementing the Agent Network Protocol.\n\nProvides:\n- **Agent description** document with linked information and product resources\n- **Interface definitions** (OpenRPC JSON and YAML files)\n- **JSON-RPC 2.0** endpoint with echo, status, arithmetic, validation, and reporting methods\n\nAuthentication: DID-WBA. Send a signed `DIDWba` challenge in the `Authorization` header on first contact; subsequent requests may reuse the bearer token returned in the response `authorization` header. Health probes and the service root are unauthenticated.",
        license(name = "MIT"),
        contact(name = "ANP", url = "https://agent-network-protocol.com")
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server"),
    ),
    security(
        ("didwba" = [])
    ),
    paths(
        // ── Service info (unauthenticated) ──────────────────────────────
        crate::routes::service::root,
        crate::routes::service::health,
        crate::routes::service::status,
        // ── Agent description ───────────────────────────────────────────
        crate::routes::agent_description::agent_description,
        crate::routes::agent_description::information_resource,
        crate::routes::agent_description::product_resource,
        // ── Interface definitions ───────────────────────────────────────
        crate::routes::interfaces::json_interface,
        crate::routes::interfaces::yaml_interface,
        // ── JSON-RPC ────────────────────────────────────────────────────
        crate::routes::jsonrpc::handle_jsonrpc,
    ),
    components(
        schemas(
            crate::error::ErrorBody,
        ),
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "service", description = "Service info, health, and status probes (unauthenticated)"),
        (name = "agent-description", description = "ANP AgentDescription document and linked information/product resources"),
        (name = "interfaces", description = "OpenRPC JSON and YAML interface definition files"),
        (name = "jsonrpc", description = "Unified JSON-RPC 2.0 endpoint"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
///
/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
