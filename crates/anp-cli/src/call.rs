//! # Call Subcommand
//!
//! Invokes a JSON-RPC method on an agent through the DID-WBA handshake.
//! The first request carries a signed `DIDWba` challenge; the rotated
//! bearer token returned by the agent is printed so scripts can reuse it
//! instead of re-signing.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::json;

use anp_wba::signing::build_authorization_header;

use crate::{service_domain, LocalIdentity};

/// Arguments for the `anp call` subcommand.
#[derive(Args, Debug)]
pub struct CallArgs {
    /// JSON-RPC endpoint URL
    /// (e.g., "https://agent-connect.ai/agents/test/jsonrpc").
    pub endpoint: String,

    /// Method to invoke (e.g., "echo", "getStatus").
    pub method: String,

    /// Method params as a JSON object (e.g., '{"message": "hi"}').
    #[arg(long, default_value = "{}")]
    pub params: String,

    /// Identity directory (did.json + private key).
    #[arg(long)]
    pub identity: PathBuf,

    /// Reuse a bearer token from a previous call instead of signing a
    /// fresh challenge.
    #[arg(long)]
    pub bearer: Option<String>,
}

/// Execute the call subcommand.
pub async fn run_call(args: &CallArgs) -> Result<u8> {
    let url = url::Url::parse(&args.endpoint).context("invalid endpoint URL")?;
    let params: serde_json::Value =
        serde_json::from_str(&args.params).context("--params is not valid JSON")?;

    let authorization = match &args.bearer {
        Some(token) if token.to_lowercase().starts_with("bearer ") => token.clone(),
        Some(token) => format!("Bearer {token}"),
        None => {
            let identity = LocalIdentity::load(&args.identity)?;
            let domain = service_domain(&url)?;
            tracing::debug!(did = %identity.did, %domain, "signing challenge");
            build_authorization_header(
                &identity.did,
                &identity.signing_key,
                identity.verification_method(),
                &domain,
            )
        }
    };

    let request_body = json!({
        "jsonrpc": "2.0",
        "method": args.method,
        "params": params,
        "id": 1,
    });

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;
    let response = client
        .post(url)
        .header(reqwest::header::AUTHORIZATION, authorization)
        .json(&request_body)
        .send()
        .await
        .context("request failed")?;

    let status = response.status();
    let rotated = response
        .headers()
        .get(reqwest::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.text().await?;

    if !status.is_success() {
        bail!("agent returned {status}: {body}");
    }

    let envelope: serde_json::Value =
        serde_json::from_str(&body).context("response is not a JSON-RPC envelope")?;
    println!("{}", serde_json::to_string_pretty(&envelope)?);

    if let Some(token) = rotated {
        eprintln!("rotated token: {token}");
    }

    // JSON-RPC errors arrive with HTTP 200; reflect them in the exit code.
    Ok(if envelope.get("error").is_some() { 1 } else { 0 })
}
