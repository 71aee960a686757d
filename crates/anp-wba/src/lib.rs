//! # anp-wba — DID-WBA Verification & Token Issuance
//!
//! Framework-agnostic implementation of the DID-WBA (Web-Based Auth)
//! profile used between ANP agents. The HTTP layer hands this crate a raw
//! `Authorization` header value and the request's domain; everything else
//! happens here:
//!
//! - **Header grammar** — `DIDWba …` signed-challenge headers for first
//!   contact, `Bearer <jwt>` for subsequent calls ([`header`]).
//! - **DID documents** — W3C document shape with Ed25519 verification
//!   methods, plus the [`resolver::DidResolver`] trait with HTTP and
//!   in-memory implementations ([`document`], [`resolver`]).
//! - **Replay protection** — single-use nonce registry with a bounded
//!   validity window ([`nonce`]).
//! - **Token issuance** — JWT minting and validation; a fresh bearer token
//!   is issued on every successful verification ([`token`]).
//! - **Verifier** — the [`verifier::DidWbaVerifier`] orchestrating the
//!   above behind a single async `verify` operation.
//! - **Client-side signing** — building headers a verifier accepts,
//!   for the CLI and tests ([`signing`]).
//!
//! ## Error contract
//!
//! Every failure is a [`WbaError`] — a closed, kinded enumeration carrying
//! an HTTP status code. Callers dispatch on the kind, never on message
//! text.

pub mod document;
pub mod error;
pub mod header;
pub mod nonce;
pub mod resolver;
pub mod signing;
pub mod token;
pub mod verifier;

pub use document::{DidDocument, PublicKeyJwk, VerificationMethod};
pub use error::WbaError;
pub use header::{AuthorizationHeader, DidWbaParts};
pub use nonce::NonceRegistry;
pub use resolver::{DidResolver, HttpDidResolver, StaticDidResolver};
pub use token::{AccessTokenClaims, TokenIssuer};
pub use verifier::{DidWbaVerifier, DidWbaVerifierConfig, TokenType, VerifiedCaller};
