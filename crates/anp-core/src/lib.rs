//! # anp-core — Foundational Types for the ANP Agent Stack
//!
//! This crate provides the building blocks shared by the verification
//! library and the API service:
//!
//! - [`Did`] — a validated W3C Decentralized Identifier newtype with
//!   helpers for the `did:wba` (Web-Based Auth) method, including
//!   DID-to-URL resolution.
//! - [`ValidationError`] — structured errors for identifier validation.
//!
//! Higher layers never pass identifiers around as raw strings; they are
//! validated once at the boundary and carried as [`Did`] afterwards.

pub mod error;
pub mod identity;

pub use error::ValidationError;
pub use identity::Did;
