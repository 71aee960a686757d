//! # Bearer Token Issuance
//!
//! JWT minting and validation for calls that follow a successful DID-WBA
//! handshake. The issuer is constructed once at process start from key
//! material and held as owned immutable state — there is no global
//! singleton.
//!
//! ## Key material
//!
//! RS256 with operator-provided PEM keys when configured; otherwise an
//! ephemeral HS256 secret is generated at startup. Ephemeral secrets mean
//! tokens do not survive a restart, which is acceptable for a demo agent —
//! callers simply re-run the DID-WBA handshake.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use anp_core::Did;

use crate::error::WbaError;

/// Claims carried in an issued access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// The authenticated caller's DID.
    pub sub: String,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
    /// Unique token identifier.
    pub jti: String,
}

/// Mints and validates bearer tokens.
pub struct TokenIssuer {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &self.algorithm)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Build an RS256 issuer from PEM-encoded key material.
    ///
    /// # Errors
    ///
    /// [`WbaError::Internal`] when either PEM fails to parse. Key material
    /// problems are an operator configuration fault, never a caller fault.
    pub fn rs256(
        private_key_pem: &str,
        public_key_pem: &str,
        lifetime: Duration,
    ) -> Result<Self, WbaError> {
        let encoding = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| WbaError::Internal(format!("unusable RSA private key: {e}")))?;
        let decoding = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| WbaError::Internal(format!("unusable RSA public key: {e}")))?;
        Ok(Self {
            algorithm: Algorithm::RS256,
            encoding,
            decoding,
            lifetime,
        })
    }

    /// Build an issuer with a fresh random HS256 secret.
    ///
    /// Used when no key files are configured. Tokens issued by one process
    /// cannot be validated by another.
    pub fn ephemeral(lifetime: Duration) -> Self {
        let mut secret = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut secret);
        Self {
            algorithm: Algorithm::HS256,
            encoding: EncodingKey::from_secret(&secret),
            decoding: DecodingKey::from_secret(&secret),
            lifetime,
        }
    }

    /// Mint a fresh access token for `did`.
    ///
    /// # Errors
    ///
    /// [`WbaError::Internal`] when signing fails.
    pub fn issue(&self, did: &Did) -> Result<String, WbaError> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: did.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        jsonwebtoken::encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|e| WbaError::Internal(format!("token signing failed: {e}")))
    }

    /// Validate a presented token and return its claims.
    ///
    /// # Errors
    ///
    /// [`WbaError::TokenInvalid`] for any validation failure — expiry,
    /// malformed structure, wrong signature or algorithm.
    pub fn validate(&self, token: &str) -> Result<AccessTokenClaims, WbaError> {
        let validation = Validation::new(self.algorithm);
        jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| WbaError::TokenInvalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn did() -> Did {
        Did::new("did:wba:example.com:user:alice").unwrap()
    }

    #[test]
    fn issued_token_validates() {
        let issuer = TokenIssuer::ephemeral(Duration::minutes(60));
        let token = issuer.issue(&did()).unwrap();
        let claims = issuer.validate(&token).unwrap();
        assert_eq!(claims.sub, "did:wba:example.com:user:alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tokens_are_unique_per_issue() {
        let issuer = TokenIssuer::ephemeral(Duration::minutes(60));
        let a = issuer.issue(&did()).unwrap();
        let b = issuer.issue(&did()).unwrap();
        assert_ne!(a, b, "each issuance carries a fresh jti");
    }

    #[test]
    fn garbage_token_rejected() {
        let issuer = TokenIssuer::ephemeral(Duration::minutes(60));
        assert!(matches!(
            issuer.validate("not.a.jwt"),
            Err(WbaError::TokenInvalid(_))
        ));
        assert!(issuer.validate("").is_err());
        assert!(issuer.validate("invalid-token").is_err());
    }

    #[test]
    fn token_from_other_issuer_rejected() {
        let a = TokenIssuer::ephemeral(Duration::minutes(60));
        let b = TokenIssuer::ephemeral(Duration::minutes(60));
        let token = a.issue(&did()).unwrap();
        assert!(matches!(
            b.validate(&token),
            Err(WbaError::TokenInvalid(_))
        ));
    }

    #[test]
    fn expired_token_rejected() {
        // Negative lifetime puts exp in the past, beyond the default leeway.
        let issuer = TokenIssuer::ephemeral(Duration::minutes(-10));
        let token = issuer.issue(&did()).unwrap();
        assert!(matches!(
            issuer.validate(&token),
            Err(WbaError::TokenInvalid(_))
        ));
    }

    #[test]
    fn bad_pem_is_internal_error() {
        let err = TokenIssuer::rs256("not a pem", "also not", Duration::minutes(60)).unwrap_err();
        assert!(matches!(err, WbaError::Internal(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn debug_does_not_leak_key_material() {
        let issuer = TokenIssuer::ephemeral(Duration::minutes(60));
        let rendered = format!("{issuer:?}");
        assert!(rendered.contains("HS256"));
        assert!(!rendered.contains("secret"));
    }
}
