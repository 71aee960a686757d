//! # Validation Error Types
//!
//! Structured errors for identifier validation in `anp-core`.
//! Uses `thiserror` for ergonomic error definitions with diagnostic context.

use thiserror::Error;

/// Errors raised when validating domain identifiers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The string is not a well-formed `did:method:identifier`.
    #[error("invalid DID: {0}")]
    InvalidDid(String),

    /// The DID uses a method other than the one required by the caller.
    #[error("unsupported DID method '{method}' (expected '{expected}')")]
    UnsupportedMethod { method: String, expected: String },

    /// The host component of a did:wba identifier is not a usable hostname.
    #[error("invalid did:wba host: {0}")]
    InvalidHost(String),
}
