//! # JSON-RPC 2.0 Endpoint
//!
//! The unified RPC surface at `POST /agents/test/jsonrpc`. Every response
//! is HTTP 200; protocol-level failures are reported through the
//! JSON-RPC error object with the standard codes:
//!
//! | code   | meaning          |
//! |--------|------------------|
//! | -32700 | parse error      |
//! | -32600 | invalid request  |
//! | -32601 | method not found |
//! | -32602 | invalid params   |
//! | -32603 | internal error   |

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::routes::service::SERVICE_VERSION;
use crate::state::AppState;

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const INTERNAL_ERROR: i64 = -32603;

/// Capabilities advertised by `getStatus`.
const CAPABILITIES: [&str; 7] = [
    "echo",
    "status-report",
    "add",
    "greet",
    "calculateSum",
    "validateData",
    "generateReport",
];

/// Assemble the JSON-RPC router.
pub fn router() -> Router<AppState> {
    Router::new().route("/agents/test/jsonrpc", post(handle_jsonrpc))
}

/// Outcome of a method dispatch, folded into the response envelope.
enum RpcOutcome {
    Result(Value),
    Error {
        code: i64,
        message: &'static str,
        data: Option<Value>,
    },
}

impl RpcOutcome {
    fn invalid_params(detail: impl Into<Value>) -> Self {
        RpcOutcome::Error {
            code: INVALID_PARAMS,
            message: "Invalid params",
            data: Some(detail.into()),
        }
    }
}

fn envelope(id: Value, outcome: RpcOutcome) -> Value {
    match outcome {
        RpcOutcome::Result(result) => json!({
            "jsonrpc": "2.0",
            "result": result,
            "id": id,
        }),
        RpcOutcome::Error {
            code,
            message,
            data,
        } => {
            let mut error = json!({"code": code, "message": message});
            if let Some(data) = data {
                error["data"] = data;
            }
            json!({
                "jsonrpc": "2.0",
                "error": error,
                "id": id,
            })
        }
    }
}

/// POST /agents/test/jsonrpc — Unified JSON-RPC 2.0 endpoint.
#[utoipa::path(
    post,
    path = "/agents/test/jsonrpc",
    tag = "jsonrpc",
    responses(
        (status = 200, description = "JSON-RPC response envelope (result or error)"),
        (status = 401, description = "Missing or invalid credentials", body = crate::error::ErrorBody)
    ),
    security(("didwba" = []))
)]
async fn handle_jsonrpc(State(state): State<AppState>, body: Bytes) -> Json<Value> {
    // The body is taken raw so a malformed payload can still produce a
    // well-formed -32700 envelope instead of an axum rejection.
    let request: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "JSON-RPC parse error");
            return Json(envelope(
                Value::Null,
                RpcOutcome::Error {
                    code: PARSE_ERROR,
                    message: "Parse error",
                    data: Some(json!("Invalid JSON")),
                },
            ));
        }
    };

    let id = request.get("id").cloned().unwrap_or(Value::Null);

    if request.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
        return Json(envelope(
            id,
            RpcOutcome::Error {
                code: INVALID_REQUEST,
                message: "Invalid Request",
                data: Some(json!("JSON-RPC version must be 2.0")),
            },
        ));
    }

    let Some(method) = request.get("method").and_then(Value::as_str) else {
        return Json(envelope(
            id,
            RpcOutcome::Error {
                code: INVALID_REQUEST,
                message: "Invalid Request",
                data: Some(json!("Missing method")),
            },
        ));
    };

    let params = request.get("params").cloned().unwrap_or(json!({}));
    tracing::info!(method = %method, "JSON-RPC call");

    let outcome = match method {
        "echo" => echo(&params),
        "getStatus" => get_status(&state),
        "add" => add(&params),
        "greet" => greet(&params),
        "calculateSum" => calculate_sum(&params),
        "validateData" => validate_data(&params),
        "generateReport" => generate_report(&params),
        _ => {
            tracing::warn!(method = %method, "JSON-RPC method not found");
            RpcOutcome::Error {
                code: METHOD_NOT_FOUND,
                message: "Method not found",
                data: Some(json!(format!("Unknown method: {method}"))),
            }
        }
    };

    Json(envelope(id, outcome))
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `echo` — return the message with an echo prefix.
fn echo(params: &Value) -> RpcOutcome {
    let Some(message) = params.get("message").and_then(Value::as_str) else {
        return RpcOutcome::invalid_params("message must be a string");
    };
    if message.is_empty() || message.len() > 1000 {
        return RpcOutcome::invalid_params("message must be between 1 and 1000 characters");
    }
    RpcOutcome::Result(json!({
        "originalMessage": message,
        "response": format!("Echo: {message}"),
        "timestamp": timestamp(),
    }))
}

/// `getStatus` — report availability, version, uptime, and capabilities.
fn get_status(state: &AppState) -> RpcOutcome {
    RpcOutcome::Result(json!({
        "status": "online",
        "version": SERVICE_VERSION,
        "uptime": state.uptime_seconds(),
        "capabilities": CAPABILITIES,
    }))
}

/// `add` — sum two numbers.
fn add(params: &Value) -> RpcOutcome {
    let a = params.get("a").and_then(Value::as_f64);
    let b = params.get("b").and_then(Value::as_f64);
    match (a, b) {
        (Some(a), Some(b)) => RpcOutcome::Result(json!({"result": a + b})),
        _ => RpcOutcome::invalid_params("a and b must be numbers"),
    }
}

/// `greet` — greet a named caller.
fn greet(params: &Value) -> RpcOutcome {
    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return RpcOutcome::invalid_params("name must be a string");
    };
    if name.trim().is_empty() {
        return RpcOutcome::invalid_params("name must not be empty");
    }
    RpcOutcome::Result(json!({
        "greeting": format!("Hello, {name}!"),
        "timestamp": timestamp(),
    }))
}

/// `calculateSum` — sum an arbitrary list of numbers.
fn calculate_sum(params: &Value) -> RpcOutcome {
    let Some(numbers) = params.get("numbers").and_then(Value::as_array) else {
        return RpcOutcome::invalid_params("numbers must be an array");
    };
    if numbers.is_empty() {
        return RpcOutcome::invalid_params("numbers must not be empty");
    }
    let mut sum = 0.0;
    for n in numbers {
        let Some(n) = n.as_f64() else {
            return RpcOutcome::invalid_params("numbers must contain only numbers");
        };
        sum += n;
    }
    RpcOutcome::Result(json!({
        "sum": sum,
        "count": numbers.len(),
    }))
}

/// `validateData` — structural validation of a data object, reporting
/// which well-known fields are present.
fn validate_data(params: &Value) -> RpcOutcome {
    let Some(data) = params.get("data").and_then(Value::as_object) else {
        return RpcOutcome::invalid_params("data must be an object");
    };

    let mut issues = Vec::new();
    if let Some(email) = data.get("email").and_then(Value::as_str) {
        if !email.contains('@') {
            issues.push("email is not a valid address".to_string());
        }
    }
    if let Some(age) = data.get("age") {
        match age.as_i64() {
            Some(a) if (0..=150).contains(&a) => {}
            _ => issues.push("age must be an integer between 0 and 150".to_string()),
        }
    }
    if let Some(name) = data.get("name").and_then(Value::as_str) {
        if name.trim().is_empty() {
            issues.push("name must not be empty".to_string());
        }
    }

    RpcOutcome::Result(json!({
        "valid": issues.is_empty(),
        "fieldCount": data.len(),
        "fields": data.keys().collect::<Vec<_>>(),
        "issues": issues,
        "validatedAt": timestamp(),
    }))
}

/// `generateReport` — render a simple report in the requested format.
fn generate_report(params: &Value) -> RpcOutcome {
    let Some(request) = params.get("reportRequest").and_then(Value::as_object) else {
        return RpcOutcome::invalid_params("reportRequest must be an object");
    };
    let Some(title) = request.get("title").and_then(Value::as_str) else {
        return RpcOutcome::invalid_params("reportRequest.title must be a string");
    };
    let Some(content) = request.get("content").and_then(Value::as_str) else {
        return RpcOutcome::invalid_params("reportRequest.content must be a string");
    };
    let format = params
        .get("format")
        .and_then(Value::as_str)
        .unwrap_or("markdown");

    let rendered = match format {
        "markdown" => format!("# {title}\n\n{content}\n"),
        "html" => format!("<h1>{title}</h1>\n<p>{content}</p>\n"),
        "text" => format!("{title}\n\n{content}\n"),
        other => {
            return RpcOutcome::invalid_params(format!(
                "format must be markdown, html, or text (got {other})"
            ));
        }
    };

    RpcOutcome::Result(json!({
        "title": title,
        "format": format,
        "report": rendered,
        "metadata": request.get("metadata").cloned().unwrap_or(Value::Null),
        "generatedAt": timestamp(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use anp_wba::StaticDidResolver;
    use std::sync::Arc;

    fn test_state() -> AppState {
        AppState::with_resolver(AppConfig::default(), Arc::new(StaticDidResolver::new()))
            .unwrap()
    }

    async fn call(body: Value) -> Value {
        call_raw(body.to_string().into_bytes()).await
    }

    async fn call_raw(body: Vec<u8>) -> Value {
        let Json(response) = handle_jsonrpc(State(test_state()), Bytes::from(body)).await;
        response
    }

    fn rpc(method: &str, params: Value) -> Value {
        json!({"jsonrpc": "2.0", "method": method, "params": params, "id": 1})
    }

    #[tokio::test]
    async fn echo_returns_prefixed_message() {
        let response = call(rpc("echo", json!({"message": "hello"}))).await;
        assert_eq!(response["result"]["originalMessage"], "hello");
        assert_eq!(response["result"]["response"], "Echo: hello");
        assert_eq!(response["id"], 1);
    }

    #[tokio::test]
    async fn echo_rejects_empty_and_oversized_messages() {
        let response = call(rpc("echo", json!({"message": ""}))).await;
        assert_eq!(response["error"]["code"], INVALID_PARAMS);

        let long = "x".repeat(1001);
        let response = call(rpc("echo", json!({"message": long}))).await;
        assert_eq!(response["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn get_status_reports_capabilities() {
        let response = call(rpc("getStatus", json!({}))).await;
        assert_eq!(response["result"]["status"], "online");
        assert_eq!(response["result"]["version"], SERVICE_VERSION);
        assert!(response["result"]["uptime"].is_u64());
        let capabilities = response["result"]["capabilities"].as_array().unwrap();
        assert!(capabilities.iter().any(|c| c == "echo"));
        assert!(capabilities.iter().any(|c| c == "generateReport"));
    }

    #[tokio::test]
    async fn add_sums_numbers() {
        let response = call(rpc("add", json!({"a": 2, "b": 3.5}))).await;
        assert_eq!(response["result"]["result"], 5.5);
    }

    #[tokio::test]
    async fn add_rejects_non_numbers() {
        let response = call(rpc("add", json!({"a": "2", "b": 3}))).await;
        assert_eq!(response["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn greet_requires_nonempty_name() {
        let response = call(rpc("greet", json!({"name": "Alice"}))).await;
        assert_eq!(response["result"]["greeting"], "Hello, Alice!");

        let response = call(rpc("greet", json!({"name": "  "}))).await;
        assert_eq!(response["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn calculate_sum_totals_the_list() {
        let response = call(rpc("calculateSum", json!({"numbers": [1, 2, 3, 4.5]}))).await;
        assert_eq!(response["result"]["sum"], 10.5);
        assert_eq!(response["result"]["count"], 4);
    }

    #[tokio::test]
    async fn calculate_sum_rejects_bad_input() {
        let response = call(rpc("calculateSum", json!({"numbers": []}))).await;
        assert_eq!(response["error"]["code"], INVALID_PARAMS);

        let response = call(rpc("calculateSum", json!({"numbers": [1, "two"]}))).await;
        assert_eq!(response["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn validate_data_flags_issues() {
        let response = call(rpc(
            "validateData",
            json!({"data": {"email": "alice@example.com", "age": 30, "name": "Alice"}}),
        ))
        .await;
        assert_eq!(response["result"]["valid"], true);
        assert_eq!(response["result"]["fieldCount"], 3);

        let response = call(rpc(
            "validateData",
            json!({"data": {"email": "not-an-email", "age": 200}}),
        ))
        .await;
        assert_eq!(response["result"]["valid"], false);
        assert_eq!(response["result"]["issues"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn generate_report_renders_markdown_by_default() {
        let response = call(rpc(
            "generateReport",
            json!({"reportRequest": {"title": "Q1", "content": "All good."}}),
        ))
        .await;
        assert_eq!(response["result"]["format"], "markdown");
        assert_eq!(response["result"]["report"], "# Q1\n\nAll good.\n");
    }

    #[tokio::test]
    async fn generate_report_rejects_unknown_format() {
        let response = call(rpc(
            "generateReport",
            json!({
                "reportRequest": {"title": "Q1", "content": "All good."},
                "format": "pdf"
            }),
        ))
        .await;
        assert_eq!(response["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn unknown_method_is_minus_32601() {
        let response = call(rpc("launchRockets", json!({}))).await;
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);
        assert_eq!(response["error"]["message"], "Method not found");
    }

    #[tokio::test]
    async fn wrong_version_is_minus_32600() {
        let response = call(json!({"jsonrpc": "1.0", "method": "echo", "id": 7})).await;
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
        assert_eq!(response["error"]["data"], "JSON-RPC version must be 2.0");
        assert_eq!(response["id"], 7);
    }

    #[tokio::test]
    async fn missing_method_is_minus_32600() {
        let response = call(json!({"jsonrpc": "2.0", "id": 2})).await;
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
    }

    #[tokio::test]
    async fn malformed_body_is_minus_32700_with_null_id() {
        let response = call_raw(b"{not json".to_vec()).await;
        assert_eq!(response["error"]["code"], PARSE_ERROR);
        assert_eq!(response["error"]["message"], "Parse error");
        assert!(response["id"].is_null());
    }

    #[tokio::test]
    async fn id_is_echoed_back_verbatim() {
        let response = call(json!({
            "jsonrpc": "2.0",
            "method": "getStatus",
            "id": "request-42"
        }))
        .await;
        assert_eq!(response["id"], "request-42");
    }
}
