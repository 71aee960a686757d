//! # DID Resolution
//!
//! The verifier resolves the claimed DID to its document before checking
//! the challenge signature. Resolution is behind a trait so the service
//! can run against the open web ([`HttpDidResolver`]) or a fixed set of
//! known agents ([`StaticDidResolver`]) — the latter also backs the test
//! suites.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use anp_core::Did;

use crate::document::DidDocument;
use crate::error::WbaError;

/// Resolves a DID to its document.
#[async_trait]
pub trait DidResolver: Send + Sync {
    /// Fetch the DID document for `did`.
    ///
    /// # Errors
    ///
    /// [`WbaError::ResolutionFailed`] when the document cannot be
    /// retrieved or does not parse; [`WbaError::UnauthorizedPrincipal`]
    /// implementations may also reject DIDs outright.
    async fn resolve(&self, did: &Did) -> Result<DidDocument, WbaError>;
}

// ── HTTP resolution ─────────────────────────────────────────────────────────

/// Resolves `did:wba` identifiers over HTTPS at their canonical
/// `did.json` location.
#[derive(Debug, Clone)]
pub struct HttpDidResolver {
    client: reqwest::Client,
}

impl HttpDidResolver {
    /// Build a resolver with a connection/read timeout suited to an
    /// interactive auth path.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl Default for HttpDidResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DidResolver for HttpDidResolver {
    async fn resolve(&self, did: &Did) -> Result<DidDocument, WbaError> {
        let url = did.to_wba_url().map_err(|e| WbaError::ResolutionFailed {
            did: did.as_str().to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!(did = %did, %url, "resolving DID document");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| WbaError::ResolutionFailed {
                did: did.as_str().to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(WbaError::ResolutionFailed {
                did: did.as_str().to_string(),
                reason: format!("server returned {}", response.status()),
            });
        }

        let document: DidDocument =
            response
                .json()
                .await
                .map_err(|e| WbaError::ResolutionFailed {
                    did: did.as_str().to_string(),
                    reason: format!("document parse failed: {e}"),
                })?;

        if document.id != *did {
            return Err(WbaError::ResolutionFailed {
                did: did.as_str().to_string(),
                reason: format!("document id mismatch: {}", document.id),
            });
        }

        Ok(document)
    }
}

// ── In-memory resolution ────────────────────────────────────────────────────

/// A fixed, in-memory DID→document map.
///
/// Suits closed deployments where the set of peer agents is known, and
/// the verifier's test suites.
#[derive(Debug, Default)]
pub struct StaticDidResolver {
    documents: RwLock<HashMap<String, DidDocument>>,
}

impl StaticDidResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a document under its own DID.
    pub fn insert(&self, document: DidDocument) {
        self.documents
            .write()
            .insert(document.id.as_str().to_string(), document);
    }

    /// Number of registered documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Whether no documents are registered.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

#[async_trait]
impl DidResolver for StaticDidResolver {
    async fn resolve(&self, did: &Did) -> Result<DidDocument, WbaError> {
        self.documents
            .read()
            .get(did.as_str())
            .cloned()
            .ok_or_else(|| WbaError::ResolutionFailed {
                did: did.as_str().to_string(),
                reason: "unknown DID".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{PublicKeyJwk, VerificationMethod};
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    fn document(did: &str) -> DidDocument {
        let did = Did::new(did).unwrap();
        let key = ed25519_dalek::SigningKey::from_bytes(&[9u8; 32]);
        let method = VerificationMethod {
            id: format!("{}#key-1", did.as_str()),
            method_type: "JsonWebKey2020".to_string(),
            controller: did.as_str().to_string(),
            public_key_jwk: Some(PublicKeyJwk {
                kty: "OKP".to_string(),
                crv: "Ed25519".to_string(),
                x: URL_SAFE_NO_PAD.encode(key.verifying_key().as_bytes()),
            }),
        };
        DidDocument {
            context: vec![],
            id: did,
            authentication: vec![method.id.clone()],
            verification_method: vec![method],
        }
    }

    #[tokio::test]
    async fn static_resolver_returns_registered_document() {
        let resolver = StaticDidResolver::new();
        resolver.insert(document("did:wba:example.com:svc"));
        let did = Did::new("did:wba:example.com:svc").unwrap();
        let doc = resolver.resolve(&did).await.unwrap();
        assert_eq!(doc.id, did);
    }

    #[tokio::test]
    async fn static_resolver_unknown_did_fails() {
        let resolver = StaticDidResolver::new();
        let did = Did::new("did:wba:example.com:missing").unwrap();
        let err = resolver.resolve(&did).await.unwrap_err();
        assert!(matches!(err, WbaError::ResolutionFailed { .. }));
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn static_resolver_replaces_on_reinsert() {
        let resolver = StaticDidResolver::new();
        resolver.insert(document("did:wba:example.com:svc"));
        resolver.insert(document("did:wba:example.com:svc"));
        assert_eq!(resolver.len(), 1);
    }

    #[tokio::test]
    async fn http_resolver_rejects_non_wba_did() {
        let resolver = HttpDidResolver::new();
        let did = Did::new("did:key:z6MkTest").unwrap();
        let err = resolver.resolve(&did).await.unwrap_err();
        assert!(matches!(err, WbaError::ResolutionFailed { .. }));
    }
}
