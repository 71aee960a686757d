//! # Describe Subcommand
//!
//! Fetches an agent description document. When an identity directory is
//! supplied the request authenticates through the DID-WBA handshake;
//! without one the fetch is anonymous (useful for agents that exempt
//! their description).

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use anp_wba::signing::build_authorization_header;

use crate::{service_domain, LocalIdentity};

/// Arguments for the `anp describe` subcommand.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// URL of the agent description document
    /// (e.g., "https://agent-connect.ai/agents/test/ad.json").
    pub url: String,

    /// Identity directory (did.json + private key) for authentication.
    #[arg(long)]
    pub identity: Option<PathBuf>,
}

/// Execute the describe subcommand.
pub async fn run_describe(args: &DescribeArgs) -> Result<u8> {
    let url = url::Url::parse(&args.url).context("invalid agent URL")?;

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;

    let mut request = client.get(url.clone());
    if let Some(dir) = &args.identity {
        let identity = LocalIdentity::load(dir)?;
        let domain = service_domain(&url)?;
        let header = build_authorization_header(
            &identity.did,
            &identity.signing_key,
            identity.verification_method(),
            &domain,
        );
        tracing::debug!(did = %identity.did, %domain, "signing challenge");
        request = request.header(reqwest::header::AUTHORIZATION, header);
    }

    let response = request.send().await.context("request failed")?;
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

    let description: serde_json::Value =
        serde_json::from_str(&body).context("agent description is not JSON")?;
    println!("{}", serde_json::to_string_pretty(&description)?);

    if let Some(token) = rotated {
        tracing::info!("agent rotated bearer token: {token}");
    }

    Ok(0)
}
