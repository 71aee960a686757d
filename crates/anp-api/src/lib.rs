//! # anp-api — Axum Services for the ANP Demo Agent
//!
//! A demonstration agent for the Agent Network Protocol (ANP). The agent
//! exposes its description document, interface definitions, and a
//! JSON-RPC endpoint, all gated behind DID-WBA authentication.
//!
//! ## API Surface
//!
//! | Path                               | Module                        | Auth |
//! |------------------------------------|-------------------------------|------|
//! | `/`, `/health`, `/v1/status`       | [`routes::service`]           | no   |
//! | `/agents/test/ad.json`             | [`routes::agent_description`] | yes  |
//! | `/agents/test/info/*`              | [`routes::agent_description`] | yes  |
//! | `/agents/test/products/*`          | [`routes::agent_description`] | yes  |
//! | `/agents/test/api/*`               | [`routes::interfaces`]        | yes  |
//! | `/agents/test/api_files/*`         | [`routes::interfaces`]        | yes  |
//! | `/agents/test/jsonrpc`             | [`routes::jsonrpc`]           | yes  |
//! | `/openapi.json`                    | [`openapi`]                   | no*  |
//! | `/metrics`                         | [`middleware::metrics`]       | no   |
//!
//! (*) `/openapi.json` is mounted behind the middleware but sits in the
//! default exemption table, so it is reachable without credentials.
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```
//!
//! Authenticated responses carry a rotated bearer token in the response
//! `authorization` header; clients should adopt it for the next request.

pub mod auth;
pub mod config;
pub mod error;
pub mod exempt;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::IntoResponse;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Service info routes (`/`, `/health`, `/v1/status`) and `/metrics` are
/// mounted outside the auth middleware so they remain accessible without
/// credentials. Everything else passes through the DID-WBA gate, which
/// consults the configured exemption table before demanding credentials.
pub fn app(state: AppState) -> Router {
    let metrics = ApiMetrics::new();
    let metrics_on = state.config.metrics_enabled;

    // Protected agent routes.
    //
    // Body size limit: 2 MiB. JSON-RPC payloads are small; anything larger
    // is a client error.
    //
    // Middleware execution order (outermost → innermost):
    //   TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
    let mut api = Router::new()
        .merge(routes::agent_description::router())
        .merge(routes::interfaces::router())
        .merge(routes::jsonrpc::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(from_fn_with_state(state.clone(), auth::auth_middleware));

    // Only register the metrics middleware when metrics are enabled.
    if metrics_on {
        api = api
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(Extension(metrics.clone()));
    }

    let api = api
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Unauthenticated service info routes.
    let mut unauthenticated = routes::service::router();

    // Mount /metrics when enabled (unauthenticated, like the probes).
    if metrics_on {
        unauthenticated = unauthenticated
            .route("/metrics", axum::routing::get(prometheus_metrics))
            .layer(Extension(metrics));
    }

    let unauthenticated = unauthenticated.with_state(state);

    Router::new()
        .merge(unauthenticated)
        .merge(api)
        .fallback(not_found)
}

/// Fallback for paths no route claims, keeping the `{"detail": …}` body
/// shape on 404s.
async fn not_found(uri: axum::http::Uri) -> crate::error::AppError {
    crate::error::AppError::NotFound(format!("Not Found: {}", uri.path()))
}

/// GET /metrics — Prometheus metrics scrape endpoint.
async fn prometheus_metrics(Extension(metrics): Extension<ApiMetrics>) -> impl IntoResponse {
    match metrics.gather_and_encode() {
        Ok(body) => (axum::http::StatusCode::OK, body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "failed to encode metrics".to_string(),
            )
                .into_response()
        }
    }
}
