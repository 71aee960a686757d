//! # Challenge Construction and Signing
//!
//! The client side of the DID-WBA handshake, plus the canonical payload
//! shared with the verifier. A challenge binds four values — the caller's
//! DID, a fresh nonce, an RFC 3339 timestamp, and the service domain —
//! into a canonical JSON object; the Ed25519 signature covers the SHA-256
//! of that object's serialization.
//!
//! Canonical form: keys in lexicographic order (`did`, `nonce`,
//! `service`, `timestamp`), compact separators, UTF-8. Both sides must
//! produce identical bytes or verification fails.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{SecondsFormat, Utc};
use ed25519_dalek::{Signer, SigningKey};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use anp_core::Did;

use crate::document::{DidDocument, PublicKeyJwk, VerificationMethod};
use crate::error::WbaError;

/// Build the canonical challenge digest for signing or verifying.
///
/// `serde_json` maps serialize with sorted keys by default, which is what
/// makes the canonical form stable across both sides of the handshake.
pub fn challenge_payload(did: &Did, nonce: &str, service: &str, timestamp: &str) -> Vec<u8> {
    let payload = serde_json::json!({
        "did": did.as_str(),
        "nonce": nonce,
        "service": service,
        "timestamp": timestamp,
    });
    let serialized = serde_json::to_string(&payload).unwrap_or_default();
    Sha256::digest(serialized.as_bytes()).to_vec()
}

/// Sign a challenge and render the full `DIDWba` Authorization header value.
///
/// Generates a fresh UUID nonce and a current UTC timestamp, so every call
/// produces a distinct header.
pub fn build_authorization_header(
    did: &Did,
    signing_key: &SigningKey,
    verification_method: &str,
    service: &str,
) -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let digest = challenge_payload(did, &nonce, service, &timestamp);
    let signature = URL_SAFE_NO_PAD.encode(signing_key.sign(&digest).to_bytes());

    format!(
        "DIDWba did=\"{}\", nonce=\"{}\", timestamp=\"{}\", \
         verification_method=\"{}\", signature=\"{}\"",
        did.as_str(),
        nonce,
        timestamp,
        verification_method,
        signature
    )
}

/// Verify a base64url-encoded signature over the canonical challenge
/// payload.
///
/// # Errors
///
/// [`WbaError::InvalidCredentialFormat`] when the signature does not
/// decode; [`WbaError::SignatureInvalid`] when it decodes but does not
/// verify.
pub fn verify_challenge_signature(
    key: &ed25519_dalek::VerifyingKey,
    did: &Did,
    nonce: &str,
    service: &str,
    timestamp: &str,
    signature_b64: &str,
) -> Result<(), WbaError> {
    let raw = URL_SAFE_NO_PAD.decode(signature_b64).map_err(|e| {
        WbaError::InvalidCredentialFormat(format!("signature is not base64url: {e}"))
    })?;
    let arr: [u8; 64] = raw.as_slice().try_into().map_err(|_| {
        WbaError::InvalidCredentialFormat(format!(
            "expected 64 signature bytes, got {}",
            raw.len()
        ))
    })?;
    let signature = ed25519_dalek::Signature::from_bytes(&arr);
    let digest = challenge_payload(did, nonce, service, timestamp);
    key.verify_strict(&digest, &signature)
        .map_err(|_| WbaError::SignatureInvalid("challenge signature does not verify".to_string()))
}

/// Produce a DID document for `did` with a single Ed25519 authentication
/// key, suitable for serving at the DID's `did.json` location.
pub fn create_did_document(did: &Did, signing_key: &SigningKey) -> DidDocument {
    let method = VerificationMethod {
        id: format!("{}#key-1", did.as_str()),
        method_type: "JsonWebKey2020".to_string(),
        controller: did.as_str().to_string(),
        public_key_jwk: Some(PublicKeyJwk {
            kty: "OKP".to_string(),
            crv: "Ed25519".to_string(),
            x: URL_SAFE_NO_PAD.encode(signing_key.verifying_key().as_bytes()),
        }),
    };
    DidDocument {
        context: vec![
            "https://www.w3.org/ns/did/v1".to_string(),
            "https://w3id.org/security/suites/jws-2020/v1".to_string(),
        ],
        id: did.clone(),
        authentication: vec![method.id.clone()],
        verification_method: vec![method],
    }
}
