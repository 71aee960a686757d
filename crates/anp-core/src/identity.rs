//! # DID Identifier Newtype
//!
//! A validated W3C Decentralized Identifier with helpers for the
//! `did:wba` method used throughout the ANP agent stack.
//!
//! ## Validation
//!
//! [`Did`] validates `did:method:identifier` format at construction time.
//! The method must be non-empty lowercase alphanumeric, the identifier
//! non-empty. Deserialization routes through the same constructor so that
//! invalid values are rejected at the boundary, not silently accepted.
//!
//! ## did:wba resolution
//!
//! A `did:wba` identifier encodes an HTTPS location:
//!
//! ```text
//! did:wba:example.com:user:alice   → https://example.com/user/alice/did.json
//! did:wba:example.com              → https://example.com/.well-known/did.json
//! did:wba:example.com%3A8800:tst   → https://example.com:8800/tst/did.json
//! ```
//!
//! The host segment percent-encodes a port separator as `%3A`.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A W3C Decentralized Identifier (`did:method:identifier`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Did(String);

impl<'de> Deserialize<'de> for Did {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl Did {
    /// Create a DID from a string, validating format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDid`] if the string does not
    /// match the `did:method:identifier` format.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Build a `did:wba` DID from a host and path segments.
    ///
    /// A port is encoded into the host segment as `%3A` per the did:wba
    /// method specification.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidHost`] for an empty host or one
    /// containing whitespace or `/`.
    pub fn wba(host: &str, segments: &[&str]) -> Result<Self, ValidationError> {
        if host.is_empty() || host.contains(char::is_whitespace) || host.contains('/') {
            return Err(ValidationError::InvalidHost(host.to_string()));
        }
        let encoded_host = host.replacen(':', "%3A", 1);
        let mut did = format!("did:wba:{encoded_host}");
        for seg in segments {
            did.push(':');
            did.push_str(seg);
        }
        Self::new(did)
    }

    /// Validate DID format without constructing.
    fn validate(s: &str) -> Result<(), ValidationError> {
        if !s.starts_with("did:") {
            return Err(ValidationError::InvalidDid(s.to_string()));
        }

        let rest = &s[4..]; // after "did:"
        match rest.find(':') {
            None => return Err(ValidationError::InvalidDid(s.to_string())),
            Some(pos) => {
                let method = &rest[..pos];
                let identifier = &rest[pos + 1..];

                // Method must be non-empty and lowercase alphanumeric
                if method.is_empty()
                    || !method
                        .chars()
                        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
                {
                    return Err(ValidationError::InvalidDid(s.to_string()));
                }

                // Identifier must be non-empty
                if identifier.is_empty() {
                    return Err(ValidationError::InvalidDid(s.to_string()));
                }
            }
        }

        Ok(())
    }

    /// Access the DID string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the DID method (the part between the first and second colons).
    pub fn method(&self) -> &str {
        let rest = &self.0[4..]; // after "did:"
        let colon_pos = rest.find(':').expect("validated at construction");
        &rest[..colon_pos]
    }

    /// Return the method-specific identifier (everything after the method).
    pub fn method_specific_id(&self) -> &str {
        let rest = &self.0[4..];
        let colon_pos = rest.find(':').expect("validated at construction");
        &rest[colon_pos + 1..]
    }

    /// Require that this DID uses the `wba` method.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedMethod`] otherwise.
    pub fn require_wba(&self) -> Result<(), ValidationError> {
        if self.method() == "wba" {
            Ok(())
        } else {
            Err(ValidationError::UnsupportedMethod {
                method: self.method().to_string(),
                expected: "wba".to_string(),
            })
        }
    }

    /// The host component of a did:wba identifier, with any `%3A` port
    /// separator decoded back to `:`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedMethod`] for non-wba DIDs.
    pub fn wba_host(&self) -> Result<String, ValidationError> {
        self.require_wba()?;
        let id = self.method_specific_id();
        let host = id.split(':').next().unwrap_or(id);
        Ok(host.replacen("%3A", ":", 1))
    }

    /// The host of a did:wba identifier with any port stripped — this is
    /// the value the signed-challenge `service` field must match.
    pub fn wba_domain(&self) -> Result<String, ValidationError> {
        let host = self.wba_host()?;
        Ok(host
            .split(':')
            .next()
            .unwrap_or(host.as_str())
            .to_string())
    }

    /// Resolve a did:wba identifier to the HTTPS URL of its DID document.
    ///
    /// With path segments the document lives at
    /// `https://{host}/{segments...}/did.json`; a bare host resolves to
    /// `https://{host}/.well-known/did.json`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedMethod`] for non-wba DIDs.
    pub fn to_wba_url(&self) -> Result<String, ValidationError> {
        self.require_wba()?;
        let id = self.method_specific_id();
        let mut parts = id.split(':');
        let host = parts
            .next()
            .ok_or_else(|| ValidationError::InvalidDid(self.0.clone()))?
            .replacen("%3A", ":", 1);
        let segments: Vec<&str> = parts.collect();
        if segments.is_empty() {
            Ok(format!("https://{host}/.well-known/did.json"))
        } else {
            Ok(format!("https://{host}/{}/did.json", segments.join("/")))
        }
    }
}

impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Did {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
