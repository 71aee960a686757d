//! # DID-WBA Error Types
//!
//! A closed, kinded error enumeration for the verification pipeline.
//! Every variant maps to a fixed HTTP status via [`WbaError::status_code`],
//! so the transport layer dispatches on the kind and never pattern-matches
//! error text.

use thiserror::Error;

/// Errors from DID-WBA verification and token issuance.
#[derive(Error, Debug)]
pub enum WbaError {
    /// No `Authorization` header was presented on a protected path.
    #[error("missing authorization header")]
    MissingCredential,

    /// The header is present but does not parse as a recognized scheme.
    #[error("invalid authorization header format: {0}")]
    InvalidCredentialFormat(String),

    /// The detached signature does not verify against the claimed DID's key.
    #[error("signature verification failed: {0}")]
    SignatureInvalid(String),

    /// The nonce was already consumed within its validity window.
    #[error("nonce already used: {0}")]
    ReplayedNonce(String),

    /// The embedded timestamp is outside the allowed skew window.
    #[error("timestamp outside allowed window: {0}")]
    TimestampOutOfWindow(String),

    /// A bearer token failed validation (expired, malformed, bad signature).
    #[error("invalid access token: {0}")]
    TokenInvalid(String),

    /// The DID document does not contain the referenced verification method.
    #[error("unknown verification method: {0}")]
    UnknownVerificationMethod(String),

    /// The DID document could not be resolved.
    #[error("DID resolution failed for {did}: {reason}")]
    ResolutionFailed { did: String, reason: String },

    /// The DID is recognized but not permitted to call this service.
    #[error("principal not authorized: {0}")]
    UnauthorizedPrincipal(String),

    /// Anything else — key material unusable, serialization failure.
    /// The message is logged server-side and never returned to clients.
    #[error("internal verifier error: {0}")]
    Internal(String),
}

impl WbaError {
    /// The HTTP status code this error resolves to at the transport layer.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingCredential
            | Self::InvalidCredentialFormat(_)
            | Self::SignatureInvalid(_)
            | Self::ReplayedNonce(_)
            | Self::TimestampOutOfWindow(_)
            | Self::TokenInvalid(_)
            | Self::UnknownVerificationMethod(_)
            | Self::ResolutionFailed { .. } => 401,
            Self::UnauthorizedPrincipal(_) => 403,
            Self::Internal(_) => 500,
        }
    }

    /// Whether the error message is safe to return to the client.
    ///
    /// Internal errors are logged with full detail server-side and
    /// replaced with a generic message in responses.
    pub fn is_client_safe(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_failures_are_401() {
        assert_eq!(WbaError::MissingCredential.status_code(), 401);
        assert_eq!(
            WbaError::InvalidCredentialFormat("x".into()).status_code(),
            401
        );
        assert_eq!(WbaError::SignatureInvalid("x".into()).status_code(), 401);
        assert_eq!(WbaError::ReplayedNonce("x".into()).status_code(), 401);
        assert_eq!(
            WbaError::TimestampOutOfWindow("x".into()).status_code(),
            401
        );
        assert_eq!(WbaError::TokenInvalid("x".into()).status_code(), 401);
        assert_eq!(
            WbaError::UnknownVerificationMethod("#k".into()).status_code(),
            401
        );
        assert_eq!(
            WbaError::ResolutionFailed {
                did: "did:wba:example.com:x".into(),
                reason: "404".into()
            }
            .status_code(),
            401
        );
    }

    #[test]
    fn unauthorized_principal_is_403() {
        assert_eq!(
            WbaError::UnauthorizedPrincipal("did:wba:evil.com:x".into()).status_code(),
            403
        );
    }

    #[test]
    fn internal_is_500_and_not_client_safe() {
        let err = WbaError::Internal("pem parse failure".into());
        assert_eq!(err.status_code(), 500);
        assert!(!err.is_client_safe());
    }

    #[test]
    fn credential_errors_are_client_safe() {
        assert!(WbaError::MissingCredential.is_client_safe());
        assert!(WbaError::ReplayedNonce("n".into()).is_client_safe());
    }

    #[test]
    fn messages_carry_context() {
        let err = WbaError::ResolutionFailed {
            did: "did:wba:example.com:svc".into(),
            reason: "connection refused".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("did:wba:example.com:svc"));
        assert!(msg.contains("connection refused"));
    }
}
