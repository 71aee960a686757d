//! # Authorization Header Grammar
//!
//! Parses the two credential schemes consumed by the verifier:
//!
//! ```text
//! DIDWba did="…", nonce="…", timestamp="…", verification_method="…", signature="…"
//! Bearer <jwt>
//! ```
//!
//! Scheme names are matched case-insensitively. DIDWba parameters are
//! comma-separated `key="value"` pairs in any order; all five are
//! required. Parsing is pure — no clock reads, no resolution.

use anp_core::Did;

use crate::error::WbaError;

/// The components of a `DIDWba` signed-challenge header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DidWbaParts {
    /// The claimed DID of the caller.
    pub did: Did,
    /// Single-use random value preventing replay.
    pub nonce: String,
    /// RFC 3339 timestamp the challenge was signed at (verbatim — the
    /// exact string participates in the signed payload).
    pub timestamp: String,
    /// Verification method reference, either a fragment (`#key-1`) or a
    /// full DID URL (`did:wba:…#key-1`).
    pub verification_method: String,
    /// Base64url (unpadded) Ed25519 signature over the challenge payload.
    pub signature: String,
}

/// A parsed `Authorization` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationHeader {
    /// First-contact signed challenge.
    DidWba(DidWbaParts),
    /// Previously issued bearer token.
    Bearer(String),
}

impl AuthorizationHeader {
    /// Parse a raw `Authorization` header value.
    ///
    /// # Errors
    ///
    /// - [`WbaError::MissingCredential`] for an empty or whitespace-only
    ///   value.
    /// - [`WbaError::InvalidCredentialFormat`] for an unrecognized scheme,
    ///   a `Bearer` with no token, or a `DIDWba` with missing/malformed
    ///   parameters.
    pub fn parse(raw: &str) -> Result<Self, WbaError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(WbaError::MissingCredential);
        }

        let (scheme, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((s, r)) => (s, r.trim()),
            None => (trimmed, ""),
        };

        if scheme.eq_ignore_ascii_case("bearer") {
            if rest.is_empty() {
                return Err(WbaError::InvalidCredentialFormat(
                    "bearer scheme with empty token".to_string(),
                ));
            }
            return Ok(Self::Bearer(rest.to_string()));
        }

        if scheme.eq_ignore_ascii_case("didwba") {
            return parse_didwba_params(rest).map(Self::DidWba);
        }

        Err(WbaError::InvalidCredentialFormat(format!(
            "unrecognized scheme '{scheme}'"
        )))
    }
}

/// Parse the `key="value"` parameter list of a DIDWba header.
fn parse_didwba_params(params: &str) -> Result<DidWbaParts, WbaError> {
    let mut did = None;
    let mut nonce = None;
    let mut timestamp = None;
    let mut verification_method = None;
    let mut signature = None;

    for pair in split_quoted_pairs(params)? {
        let (key, value) = pair;
        let slot = match key.as_str() {
            "did" => &mut did,
            "nonce" => &mut nonce,
            "timestamp" => &mut timestamp,
            "verification_method" => &mut verification_method,
            "signature" => &mut signature,
            other => {
                return Err(WbaError::InvalidCredentialFormat(format!(
                    "unknown DIDWba parameter '{other}'"
                )))
            }
        };
        if slot.replace(value).is_some() {
            return Err(WbaError::InvalidCredentialFormat(format!(
                "duplicate DIDWba parameter '{key}'"
            )));
        }
    }

    let require = |name: &str, v: Option<String>| {
        v.filter(|s| !s.is_empty()).ok_or_else(|| {
            WbaError::InvalidCredentialFormat(format!("missing DIDWba parameter '{name}'"))
        })
    };

    let did_str = require("did", did)?;
    let did = Did::new(did_str)
        .map_err(|e| WbaError::InvalidCredentialFormat(format!("bad did parameter: {e}")))?;

    Ok(DidWbaParts {
        did,
        nonce: require("nonce", nonce)?,
        timestamp: require("timestamp", timestamp)?,
        verification_method: require("verification_method", verification_method)?,
        signature: require("signature", signature)?,
    })
}

/// Split `k="v", k2="v2", …` into pairs, tolerating commas inside quotes.
fn split_quoted_pairs(input: &str) -> Result<Vec<(String, String)>, WbaError> {
    let mut pairs = Vec::new();
    let mut rest = input.trim();

    while !rest.is_empty() {
        let eq = rest.find('=').ok_or_else(|| {
            WbaError::InvalidCredentialFormat("expected key=\"value\" pair".to_string())
        })?;
        let key = rest[..eq].trim().to_string();
        let after = rest[eq + 1..].trim_start();
        if !after.starts_with('"') {
            return Err(WbaError::InvalidCredentialFormat(format!(
                "parameter '{key}' value is not quoted"
            )));
        }
        let close = after[1..].find('"').ok_or_else(|| {
            WbaError::InvalidCredentialFormat(format!("unterminated value for '{key}'"))
        })?;
        let value = after[1..1 + close].to_string();
        pairs.push((key, value));

        rest = after[close + 2..].trim_start();
        if let Some(stripped) = rest.strip_prefix(',') {
            rest = stripped.trim_start();
        } else if !rest.is_empty() {
            return Err(WbaError::InvalidCredentialFormat(
                "expected ',' between DIDWba parameters".to_string(),
            ));
        }
    }

    Ok(pairs)
}
