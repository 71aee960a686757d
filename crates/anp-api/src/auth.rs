//! # DID-WBA Authentication Middleware
//!
//! Gates every non-exempt request behind the DID-WBA verifier. The flow
//! per request is:
//!
//! ```text
//! path → exemption check ──exempt──→ handler
//!                │
//!           verify header ──ok──→ inject CallerIdentity → handler
//!                │                      → response + rotated token header
//!              reject ──→ {"detail": …} with the error's status
//! ```
//!
//! Exactly one response per request; verification always precedes the
//! handler on protected paths. Rejections are decided by the error KIND
//! (each [`WbaError`] variant carries its status) — never by matching
//! message text.
//!
//! ## CallerIdentity
//!
//! Every verified request gets a [`CallerIdentity`] injected into the
//! request extensions. Handlers extract it via the `FromRequestParts` impl.

use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use anp_core::Did;
use anp_wba::{TokenType, VerifiedCaller, WbaError};

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

/// Identity of the authenticated caller, available to all route handlers
/// behind the middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// The caller's DID.
    pub did: Did,
    /// Which credential scheme authenticated this request.
    pub token_type: TokenType,
    /// The fresh token minted for this request; echoed to the caller in
    /// the response `authorization` header.
    pub access_token: String,
}

impl From<VerifiedCaller> for CallerIdentity {
    fn from(caller: VerifiedCaller) -> Self {
        Self {
            did: caller.did,
            token_type: caller.token_type,
            access_token: caller.access_token,
        }
    }
}

/// Extracts the identity the auth middleware injected into extensions.
/// Returns 401 if no identity is present (exempt path or middleware absent).
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// Domain a challenge must be signed for: the request's `Host` header
/// with any port suffix stripped.
fn request_domain(headers: &axum::http::HeaderMap) -> Option<String> {
    let host = headers.get(header::HOST)?.to_str().ok()?;
    let domain = host.split(':').next().unwrap_or(host).trim();
    (!domain.is_empty()).then(|| domain.to_string())
}

/// Verify the `Authorization` header on non-exempt paths.
///
/// Challenges are verified against the domain the client actually
/// connected to ([`request_domain`]); the configured `agent_domain` is
/// only a fallback for requests that omit `Host`.
///
/// On success the handler runs with a [`CallerIdentity`] in scope and the
/// response carries `authorization: bearer <fresh token>` so callers can
/// drop the signed-challenge handshake on subsequent requests.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();

    if state.config.exempt_paths.is_exempt(path) {
        tracing::debug!(%path, "authentication skipped: exempt path");
        return next.run(request).await;
    }

    let raw_header = match request.headers().get(header::AUTHORIZATION) {
        Some(value) => match value.to_str() {
            Ok(s) => s.to_string(),
            Err(_) => {
                return rejection(&WbaError::InvalidCredentialFormat(
                    "authorization header is not valid UTF-8".to_string(),
                ))
            }
        },
        None => return rejection(&WbaError::MissingCredential),
    };

    let domain = request_domain(request.headers())
        .unwrap_or_else(|| state.config.agent_domain.clone());

    let caller = match state.verifier.verify(&raw_header, &domain).await {
        Ok(caller) => CallerIdentity::from(caller),
        Err(err) => return rejection(&err),
    };

    tracing::debug!(did = %caller.did, %path, "request authenticated");

    let fresh_token = caller.access_token.clone();
    request.extensions_mut().insert(caller);
    let mut response = next.run(request).await;

    // Token rotation: every authenticated response hands back the newest
    // credential.
    if let Ok(value) = HeaderValue::from_str(&format!("bearer {fresh_token}")) {
        response.headers_mut().insert(header::AUTHORIZATION, value);
    }

    response
}

/// Short-circuit response for a failed verification.
fn rejection(err: &WbaError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if err.is_client_safe() {
        tracing::warn!(error = %err, "authentication failed");
        ErrorBody::response(status, err.to_string())
    } else {
        tracing::error!(error = %err, "authentication failed with internal error");
        ErrorBody::response(status, "An internal server error occurred")
    }
}
