//! # DID-WBA Verifier
//!
//! Orchestrates the full credential check: header parsing, timestamp
//! window, nonce replay protection, DID resolution, signature
//! verification, and bearer-token validation. Every successful
//! verification — first contact or bearer — mints a fresh access token,
//! so callers always hold the newest credential.
//!
//! The verifier owns all of its state: the nonce registry, the token
//! issuer, and the resolver are constructed with it and shared behind
//! `Arc` by whoever embeds it. Nothing here is global.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use anp_core::Did;

use crate::error::WbaError;
use crate::header::{AuthorizationHeader, DidWbaParts};
use crate::nonce::NonceRegistry;
use crate::resolver::DidResolver;
use crate::signing::verify_challenge_signature;
use crate::token::TokenIssuer;

/// Which credential scheme authenticated the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// A signed DID-WBA challenge (first contact).
    DidWba,
    /// A previously issued bearer token.
    Bearer,
}

/// The outcome of a successful verification.
#[derive(Debug, Clone)]
pub struct VerifiedCaller {
    /// The authenticated caller's DID.
    pub did: Did,
    /// The scheme that authenticated this request.
    pub token_type: TokenType,
    /// Freshly minted access token to hand back to the caller.
    pub access_token: String,
}

/// Tunable windows for the verifier.
#[derive(Debug, Clone)]
pub struct DidWbaVerifierConfig {
    /// How long a consumed nonce stays unusable.
    pub nonce_window: Duration,
    /// Maximum allowed skew between a challenge timestamp and now.
    pub timestamp_window: Duration,
}

impl Default for DidWbaVerifierConfig {
    fn default() -> Self {
        Self {
            nonce_window: Duration::minutes(5),
            timestamp_window: Duration::minutes(5),
        }
    }
}

/// Verifies `Authorization` headers and issues rotated access tokens.
pub struct DidWbaVerifier {
    config: DidWbaVerifierConfig,
    resolver: Arc<dyn DidResolver>,
    nonces: NonceRegistry,
    tokens: TokenIssuer,
}

impl std::fmt::Debug for DidWbaVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DidWbaVerifier")
            .field("config", &self.config)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl DidWbaVerifier {
    /// Assemble a verifier from its parts.
    pub fn new(
        config: DidWbaVerifierConfig,
        resolver: Arc<dyn DidResolver>,
        tokens: TokenIssuer,
    ) -> Self {
        let nonces = NonceRegistry::new(config.nonce_window);
        Self {
            config,
            resolver,
            nonces,
            tokens,
        }
    }

    /// Verify a raw `Authorization` header value against `domain`.
    ///
    /// `domain` is the service identity the challenge must have been
    /// signed for; a signature over any other domain fails.
    ///
    /// # Errors
    ///
    /// Any [`WbaError`]; callers map variants to HTTP statuses via
    /// [`WbaError::status_code`].
    pub async fn verify(&self, raw_header: &str, domain: &str) -> Result<VerifiedCaller, WbaError> {
        match AuthorizationHeader::parse(raw_header)? {
            AuthorizationHeader::DidWba(parts) => self.verify_challenge(parts, domain).await,
            AuthorizationHeader::Bearer(token) => self.verify_bearer(&token),
        }
    }

    async fn verify_challenge(
        &self,
        parts: DidWbaParts,
        domain: &str,
    ) -> Result<VerifiedCaller, WbaError> {
        let now = Utc::now();
        self.check_timestamp(&parts.timestamp, now)?;
        self.nonces.check_and_store(&parts.nonce, now)?;

        let document = self.resolver.resolve(&parts.did).await?;
        let method = document.authentication_method(&parts.verification_method)?;
        let key = method.ed25519_key()?;

        verify_challenge_signature(
            &key,
            &parts.did,
            &parts.nonce,
            domain,
            &parts.timestamp,
            &parts.signature,
        )?;

        let access_token = self.tokens.issue(&parts.did)?;
        tracing::info!(did = %parts.did, "DID-WBA challenge verified");

        Ok(VerifiedCaller {
            did: parts.did,
            token_type: TokenType::DidWba,
            access_token,
        })
    }

    fn verify_bearer(&self, token: &str) -> Result<VerifiedCaller, WbaError> {
        let claims = self.tokens.validate(token)?;
        let did = Did::new(&claims.sub)
            .map_err(|e| WbaError::TokenInvalid(format!("bad subject claim: {e}")))?;

        // Rotation: a fresh token accompanies every authenticated response.
        let access_token = self.tokens.issue(&did)?;

        Ok(VerifiedCaller {
            did,
            token_type: TokenType::Bearer,
            access_token,
        })
    }

    fn check_timestamp(&self, timestamp: &str, now: DateTime<Utc>) -> Result<(), WbaError> {
        let parsed = DateTime::parse_from_rfc3339(timestamp)
            .map_err(|e| {
                WbaError::InvalidCredentialFormat(format!("timestamp is not RFC 3339: {e}"))
            })?
            .with_timezone(&Utc);

        let skew = if parsed > now { parsed - now } else { now - parsed };
        if skew > self.config.timestamp_window {
            return Err(WbaError::TimestampOutOfWindow(format!(
                "challenge signed at {timestamp}, outside the {}-minute window",
                self.config.timestamp_window.num_minutes()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::StaticDidResolver;
    use crate::signing::{build_authorization_header, create_did_document};
    use ed25519_dalek::SigningKey;

    const DOMAIN: &str = "agent-connect.ai";

    fn verifier_with_alice() -> (DidWbaVerifier, Did, SigningKey) {
        let did = Did::new("did:wba:example.com:user:alice").unwrap();
        let key = SigningKey::from_bytes(&[21u8; 32]);
        let resolver = StaticDidResolver::new();
        resolver.insert(create_did_document(&did, &key));
        let verifier = DidWbaVerifier::new(
            DidWbaVerifierConfig::default(),
            Arc::new(resolver),
            TokenIssuer::ephemeral(Duration::minutes(60)),
        );
        (verifier, did, key)
    }

    #[tokio::test]
    async fn full_handshake_succeeds() {
        let (verifier, did, key) = verifier_with_alice();
        let header = build_authorization_header(&did, &key, "#key-1", DOMAIN);
        let caller = verifier.verify(&header, DOMAIN).await.unwrap();
        assert_eq!(caller.did, did);
        assert_eq!(caller.token_type, TokenType::DidWba);
        assert!(!caller.access_token.is_empty());
    }

    #[tokio::test]
    async fn issued_token_authenticates_and_rotates() {
        let (verifier, did, key) = verifier_with_alice();
        let header = build_authorization_header(&did, &key, "#key-1", DOMAIN);
        let first = verifier.verify(&header, DOMAIN).await.unwrap();

        let bearer = format!("Bearer {}", first.access_token);
        let second = verifier.verify(&bearer, DOMAIN).await.unwrap();
        assert_eq!(second.did, did);
        assert_eq!(second.token_type, TokenType::Bearer);
        assert_ne!(
            second.access_token, first.access_token,
            "token rotates on every call"
        );
    }

    #[tokio::test]
    async fn replayed_challenge_rejected() {
        let (verifier, did, key) = verifier_with_alice();
        let header = build_authorization_header(&did, &key, "#key-1", DOMAIN);
        verifier.verify(&header, DOMAIN).await.unwrap();
        let err = verifier.verify(&header, DOMAIN).await.unwrap_err();
        assert!(matches!(err, WbaError::ReplayedNonce(_)));
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn challenge_for_other_domain_rejected() {
        let (verifier, did, key) = verifier_with_alice();
        let header = build_authorization_header(&did, &key, "#key-1", "other.example");
        let err = verifier.verify(&header, DOMAIN).await.unwrap_err();
        assert!(matches!(err, WbaError::SignatureInvalid(_)));
    }

    #[tokio::test]
    async fn stale_timestamp_rejected() {
        let (verifier, did, key) = verifier_with_alice();
        let header = build_authorization_header(&did, &key, "#key-1", DOMAIN);
        // Rewrite the timestamp to ten minutes ago; the signature no longer
        // matters because the window check runs first.
        let stale = (Utc::now() - Duration::minutes(10))
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        let parts = match crate::header::AuthorizationHeader::parse(&header).unwrap() {
            crate::header::AuthorizationHeader::DidWba(p) => p,
            _ => unreachable!(),
        };
        let tampered = format!(
            "DIDWba did=\"{}\", nonce=\"{}\", timestamp=\"{stale}\", \
             verification_method=\"#key-1\", signature=\"{}\"",
            did.as_str(),
            parts.nonce,
            parts.signature
        );
        let err = verifier.verify(&tampered, DOMAIN).await.unwrap_err();
        assert!(matches!(err, WbaError::TimestampOutOfWindow(_)));
    }

    #[tokio::test]
    async fn unparseable_timestamp_is_format_error() {
        let (verifier, did, _) = verifier_with_alice();
        let header = format!(
            "DIDWba did=\"{}\", nonce=\"n1\", timestamp=\"yesterday\", \
             verification_method=\"#key-1\", signature=\"c2ln\"",
            did.as_str()
        );
        let err = verifier.verify(&header, DOMAIN).await.unwrap_err();
        assert!(matches!(err, WbaError::InvalidCredentialFormat(_)));
    }

    #[tokio::test]
    async fn unknown_did_rejected() {
        let (verifier, _, key) = verifier_with_alice();
        let stranger = Did::new("did:wba:example.com:user:mallory").unwrap();
        let header = build_authorization_header(&stranger, &key, "#key-1", DOMAIN);
        let err = verifier.verify(&header, DOMAIN).await.unwrap_err();
        assert!(matches!(err, WbaError::ResolutionFailed { .. }));
    }

    #[tokio::test]
    async fn wrong_key_rejected() {
        let (verifier, did, _) = verifier_with_alice();
        let wrong = SigningKey::from_bytes(&[22u8; 32]);
        let header = build_authorization_header(&did, &wrong, "#key-1", DOMAIN);
        let err = verifier.verify(&header, DOMAIN).await.unwrap_err();
        assert!(matches!(err, WbaError::SignatureInvalid(_)));
    }

    #[tokio::test]
    async fn garbage_bearer_rejected() {
        let (verifier, _, _) = verifier_with_alice();
        let err = verifier.verify("Bearer invalid-token", DOMAIN).await.unwrap_err();
        assert!(matches!(err, WbaError::TokenInvalid(_)));
    }

    #[tokio::test]
    async fn empty_header_is_missing_credential() {
        let (verifier, _, _) = verifier_with_alice();
        let err = verifier.verify("", DOMAIN).await.unwrap_err();
        assert!(matches!(err, WbaError::MissingCredential));
    }
}
