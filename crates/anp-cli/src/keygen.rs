//! # Keygen Subcommand
//!
//! Generates a did:wba identity: an Ed25519 keypair and the DID document
//! that publishes its public key. The document is meant to be hosted at
//! the DID's well-known URL so agents can resolve it during the
//! handshake.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use clap::Args;
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use anp_core::Did;
use anp_wba::signing::create_did_document;

use crate::{DID_DOCUMENT_FILE, PRIVATE_KEY_FILE};

/// Arguments for the `anp keygen` subcommand.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Host the DID will be served from (e.g., "example.com").
    #[arg(long)]
    pub host: String,

    /// Path segments under the host (e.g., "user alice" for
    /// did:wba:example.com:user:alice).
    #[arg(long, num_args = 0..)]
    pub segment: Vec<String>,

    /// Output directory for did.json and the private key.
    #[arg(long, short, default_value = ".")]
    pub output: PathBuf,

    /// Overwrite existing identity files.
    #[arg(long)]
    pub force: bool,
}

/// Execute the keygen subcommand.
pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    let segments: Vec<&str> = args.segment.iter().map(String::as_str).collect();
    let did = Did::wba(&args.host, &segments).context("invalid host or path segments")?;

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("cannot create {}", args.output.display()))?;

    let doc_path = args.output.join(DID_DOCUMENT_FILE);
    let key_path = args.output.join(PRIVATE_KEY_FILE);
    if !args.force && (doc_path.exists() || key_path.exists()) {
        bail!(
            "identity files already exist in {} (use --force to overwrite)",
            args.output.display()
        );
    }

    let mut seed = [0u8; 32];
    OsRng.fill_bytes(&mut seed);
    let signing_key = SigningKey::from_bytes(&seed);
    let encoded_seed = URL_SAFE_NO_PAD.encode(seed);
    seed.zeroize();

    let document = create_did_document(&did, &signing_key);
    std::fs::write(&doc_path, serde_json::to_string_pretty(&document)?)
        .with_context(|| format!("cannot write {}", doc_path.display()))?;
    std::fs::write(&key_path, encoded_seed)
        .with_context(|| format!("cannot write {}", key_path.display()))?;

    println!("did:        {}", did.as_str());
    println!("document:   {}", doc_path.display());
    println!("secret key: {}", key_path.display());
    println!("host {} at {}", DID_DOCUMENT_FILE, did.to_wba_url()?);

    Ok(0)
}
