//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. Holds the configuration, the DID-WBA
//! verifier (which owns the nonce registry and token issuer), and the
//! process start time used for uptime reporting.
//!
//! Clone-friendly via `Arc` internals.

use std::sync::Arc;
use std::time::Instant;

use chrono::Duration;

use anp_wba::{
    DidResolver, DidWbaVerifier, DidWbaVerifierConfig, HttpDidResolver, TokenIssuer,
};

use crate::config::AppConfig;

/// Shared application state accessible to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Startup configuration.
    pub config: Arc<AppConfig>,
    /// The DID-WBA verifier, shared with the auth middleware.
    pub verifier: Arc<DidWbaVerifier>,
    /// Process start time, reported as uptime by `getStatus`.
    pub started_at: Instant,
}

impl AppState {
    /// Build state for production use, resolving DIDs over HTTPS.
    ///
    /// # Errors
    ///
    /// Returns the token issuer's error message when configured PEM key
    /// files cannot be read or parsed.
    pub fn new(config: AppConfig) -> Result<Self, String> {
        Self::with_resolver(config, Arc::new(HttpDidResolver::new()))
    }

    /// Build state with a caller-supplied resolver. Tests and closed
    /// deployments pass a `StaticDidResolver` here.
    pub fn with_resolver(
        config: AppConfig,
        resolver: Arc<dyn DidResolver>,
    ) -> Result<Self, String> {
        let tokens = build_token_issuer(&config)?;
        let verifier = DidWbaVerifier::new(
            DidWbaVerifierConfig {
                nonce_window: Duration::minutes(config.nonce_expiry_minutes),
                timestamp_window: Duration::minutes(config.timestamp_expiry_minutes),
            },
            resolver,
            tokens,
        );

        Ok(Self {
            config: Arc::new(config),
            verifier: Arc::new(verifier),
            started_at: Instant::now(),
        })
    }

    /// Seconds since the service started.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Build the token issuer from configured PEM files, or fall back to an
/// ephemeral secret.
fn build_token_issuer(config: &AppConfig) -> Result<TokenIssuer, String> {
    let lifetime = Duration::minutes(config.token_expire_minutes);

    match (&config.jwt_private_key_path, &config.jwt_public_key_path) {
        (Some(private_path), Some(public_path)) => {
            let private_pem = std::fs::read_to_string(private_path)
                .map_err(|e| format!("cannot read {}: {e}", private_path.display()))?;
            let public_pem = std::fs::read_to_string(public_path)
                .map_err(|e| format!("cannot read {}: {e}", public_path.display()))?;
            TokenIssuer::rs256(&private_pem, &public_pem, lifetime).map_err(|e| e.to_string())
        }
        _ => {
            tracing::warn!(
                "JWT key files not configured — using an ephemeral signing secret. \
                 Tokens will not survive a restart."
            );
            Ok(TokenIssuer::ephemeral(lifetime))
        }
    }
}
