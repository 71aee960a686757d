//! # anp-cli — CLI Companion for ANP Agents
//!
//! Provides the `anp` command-line interface for working with DID-WBA
//! agents:
//!
//! - `anp keygen` — Generate a did:wba identity (Ed25519 keypair plus
//!   DID document) ready to host.
//! - `anp describe` — Fetch an agent description document, optionally
//!   authenticating with a local identity.
//! - `anp call` — Invoke a JSON-RPC method on an agent through the
//!   DID-WBA handshake, reporting the rotated bearer token.
//!
//! Identities on disk are a directory containing `did.json` (the public
//! DID document) and `private-key.b64` (the base64url-encoded Ed25519
//! seed). The seed file is the only secret; treat it accordingly.

pub mod call;
pub mod describe;
pub mod keygen;

use std::path::Path;

use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::SigningKey;
use zeroize::Zeroize;

use anp_core::Did;
use anp_wba::DidDocument;

/// File name of the encoded Ed25519 seed inside an identity directory.
pub const PRIVATE_KEY_FILE: &str = "private-key.b64";

/// File name of the DID document inside an identity directory.
pub const DID_DOCUMENT_FILE: &str = "did.json";

/// An identity loaded from disk: the DID, its document, and the signing key.
pub struct LocalIdentity {
    pub did: Did,
    pub document: DidDocument,
    pub signing_key: SigningKey,
}

impl LocalIdentity {
    /// Load an identity from a directory written by `anp keygen`.
    pub fn load(dir: &Path) -> Result<Self> {
        let doc_path = dir.join(DID_DOCUMENT_FILE);
        let key_path = dir.join(PRIVATE_KEY_FILE);

        let doc_raw = std::fs::read_to_string(&doc_path)
            .with_context(|| format!("cannot read {}", doc_path.display()))?;
        let document: DidDocument = serde_json::from_str(&doc_raw)
            .with_context(|| format!("malformed DID document in {}", doc_path.display()))?;
        let did = document.id.clone();

        let seed_b64 = std::fs::read_to_string(&key_path)
            .with_context(|| format!("cannot read {}", key_path.display()))?;
        let seed = URL_SAFE_NO_PAD
            .decode(seed_b64.trim())
            .context("private key is not valid base64url")?;
        let mut seed: [u8; 32] = seed
            .try_into()
            .map_err(|_| anyhow::anyhow!("private key must be exactly 32 bytes"))?;
        let signing_key = SigningKey::from_bytes(&seed);
        seed.zeroize();

        Ok(Self {
            did,
            document,
            signing_key,
        })
    }

    /// The verification method fragment used when signing challenges.
    pub fn verification_method(&self) -> &str {
        "#key-1"
    }
}

/// Extract the serving domain from an agent URL for challenge signing.
pub fn service_domain(agent_url: &url::Url) -> Result<String> {
    agent_url
        .host_str()
        .map(str::to_string)
        .context("agent URL has no host")
}
