//! # Agent Description Routes
//!
//! Serves the ANP AgentDescription document at `/agents/test/ad.json`
//! together with the information and product resources it links to. All
//! payloads are assembled per request so URLs track the configured
//! domain; the document itself sits behind the auth middleware.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::routes::service::SERVICE_VERSION;
use crate::state::AppState;

/// Assemble the agent description router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/agents/test/ad.json", get(agent_description))
        .route("/agents/test/info/:resource", get(information_resource))
        .route("/agents/test/products/:resource", get(product_resource))
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn agent_url(domain: &str, path: &str) -> String {
    format!("https://{domain}{path}")
}

/// GET /agents/test/ad.json — The ANP AgentDescription document.
#[utoipa::path(
    get,
    path = "/agents/test/ad.json",
    tag = "agent-description",
    responses(
        (status = 200, description = "Agent description document"),
        (status = 401, description = "Missing or invalid credentials", body = crate::error::ErrorBody)
    ),
    security(("didwba" = []))
)]
async fn agent_description(State(state): State<AppState>) -> Json<Value> {
    let domain = &state.config.agent_domain;
    tracing::info!("served agent description");

    Json(json!({
        "protocolType": "ANP",
        "protocolVersion": "1.0.0",
        "type": "AgentDescription",
        "url": agent_url(domain, "/agents/test/ad.json"),
        "name": "ANP Test Agent",
        "did": format!("did:wba:{domain}:test-agent"),
        "owner": {
            "type": "Organization",
            "name": domain,
            "url": format!("https://{domain}")
        },
        "description": "Demonstration ANP agent offering sample interfaces and structured payloads.",
        "created": timestamp(),
        "securityDefinitions": {
            "didwba_sc": {
                "scheme": "didwba",
                "in": "header",
                "name": "Authorization"
            }
        },
        "security": "didwba_sc",
        "information": [
            {
                "type": "Information",
                "description": "Overview of the test agent and its capabilities.",
                "url": agent_url(domain, "/agents/test/info/basic-info.json")
            }
        ],
        "products": [
            {
                "type": "Product",
                "description": "Synthetic analytics bundle used by integration tests.",
                "url": agent_url(domain, "/agents/test/products/test-product.json")
            }
        ],
        "interfaces": [
            {
                "type": "StructuredInterface",
                "protocol": "openrpc",
                "version": "1.3.2",
                "url": agent_url(domain, "/agents/test/api/external-interface.json"),
                "description": "External OpenRPC contract for remote procedure access."
            },
            {
                "type": "StructuredInterface",
                "protocol": "openrpc",
                "version": "1.3.2",
                "description": "Inline OpenRPC contract with minimal demo methods.",
                "content": inline_openrpc_contract(domain)
            }
        ]
    }))
}

/// The inline OpenRPC document embedded in the agent description,
/// covering the `echo` and `getStatus` methods.
fn inline_openrpc_contract(domain: &str) -> Value {
    json!({
        "openrpc": "1.3.2",
        "info": {
            "title": "Test Agent Inline API",
            "version": SERVICE_VERSION,
            "description": "Inline interface exposing echo and status utilities.",
            "x-anp-protocol-type": "ANP",
            "x-anp-protocol-version": "1.0.0"
        },
        "security": [{"didwba": []}],
        "servers": [
            {
                "name": "Test Server",
                "url": agent_url(domain, "/agents/test/jsonrpc"),
                "description": "JSON-RPC endpoint exposed by the agent."
            }
        ],
        "methods": [
            {
                "name": "echo",
                "summary": "Echo a provided message.",
                "params": [
                    {
                        "name": "message",
                        "required": true,
                        "schema": {"type": "string", "minLength": 1, "maxLength": 1000}
                    }
                ],
                "result": {
                    "name": "echoResult",
                    "schema": {
                        "type": "object",
                        "properties": {
                            "originalMessage": {"type": "string"},
                            "response": {"type": "string"},
                            "timestamp": {"type": "string", "format": "date-time"}
                        }
                    }
                }
            },
            {
                "name": "getStatus",
                "summary": "Report the agent status.",
                "params": [],
                "result": {
                    "name": "statusResult",
                    "schema": {
                        "type": "object",
                        "properties": {
                            "status": {"type": "string", "enum": ["online", "offline", "maintenance"]},
                            "version": {"type": "string"},
                            "uptime": {"type": "integer"},
                            "capabilities": {"type": "array", "items": {"type": "string"}}
                        }
                    }
                }
            }
        ],
        "components": {
            "securitySchemes": {
                "didwba": {
                    "type": "http",
                    "scheme": "bearer",
                    "bearerFormat": "DID-WBA",
                    "description": "DID-WBA security scheme for inter-agent auth."
                }
            }
        }
    })
}

/// Strip a `.json` suffix from a captured path segment, or 404.
fn resource_id(segment: &str, kind: &str) -> Result<String, AppError> {
    segment
        .strip_suffix(".json")
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::NotFound(format!("{kind} resource not found")))
}

/// GET /agents/test/info/{resource_id}.json — Linked information resources.
#[utoipa::path(
    get,
    path = "/agents/test/info/{resource}",
    tag = "agent-description",
    params(("resource" = String, Path, description = "Resource file name, e.g. basic-info.json")),
    responses(
        (status = 200, description = "Information resource"),
        (status = 404, description = "Unknown resource", body = crate::error::ErrorBody)
    ),
    security(("didwba" = []))
)]
async fn information_resource(
    State(state): State<AppState>,
    Path(resource): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = resource_id(&resource, "Information")?;
    if id != "basic-info" {
        tracing::warn!(resource = %id, "information resource not found");
        return Err(AppError::NotFound("Information resource not found".into()));
    }

    tracing::info!(resource = %id, "served information resource");
    Ok(Json(json!({
        "type": "Information",
        "title": "Test Agent Overview",
        "summary": "Demonstrates an ANP-compatible agent with sample payloads.",
        "owner": {
            "name": state.config.agent_domain,
            "contact": format!("support@{}", state.config.agent_domain)
        },
        "capabilities": ["echo", "status-report", "openrpc-discovery"],
        "lastUpdated": timestamp()
    })))
}

/// GET /agents/test/products/{resource_id}.json — Linked product resources.
#[utoipa::path(
    get,
    path = "/agents/test/products/{resource}",
    tag = "agent-description",
    params(("resource" = String, Path, description = "Resource file name, e.g. test-product.json")),
    responses(
        (status = 200, description = "Product resource"),
        (status = 404, description = "Unknown resource", body = crate::error::ErrorBody)
    ),
    security(("didwba" = []))
)]
async fn product_resource(
    State(state): State<AppState>,
    Path(resource): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = resource_id(&resource, "Product")?;
    if id != "test-product" {
        tracing::warn!(resource = %id, "product resource not found");
        return Err(AppError::NotFound("Product resource not found".into()));
    }

    tracing::info!(resource = %id, "served product resource");
    Ok(Json(json!({
        "type": "Product",
        "name": "Synthetic Insights Bundle",
        "sku": "TEST-PROD-001",
        "description": "Provides synthetic analytics and regression-safe datasets.",
        "lifecycle": {"stage": "beta", "since": "2024-01-01"},
        "pricing": {
            "currency": "USD",
            "model": "subscription",
            "amount": 49.0,
            "billingPeriod": "monthly"
        },
        "support": {
            "email": format!("support@{}", state.config.agent_domain),
            "documentation": format!("https://docs.{}/test-agent", state.config.agent_domain)
        }
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_id_strips_suffix() {
        assert_eq!(resource_id("basic-info.json", "Information").unwrap(), "basic-info");
    }

    #[test]
    fn resource_id_requires_json_suffix() {
        assert!(resource_id("basic-info", "Information").is_err());
        assert!(resource_id("basic-info.yaml", "Information").is_err());
        assert!(resource_id(".json", "Information").is_err());
    }

    #[test]
    fn inline_contract_lists_both_methods() {
        let contract = inline_openrpc_contract("agent-connect.ai");
        let names: Vec<&str> = contract["methods"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["echo", "getStatus"]);
        assert_eq!(
            contract["servers"][0]["url"],
            "https://agent-connect.ai/agents/test/jsonrpc"
        );
    }
}
