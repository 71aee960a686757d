//! # DID Document Types
//!
//! The subset of the W3C DID document shape the verifier consumes:
//! the document identifier, its verification methods, and the
//! `authentication` relationship listing which methods may sign
//! DID-WBA challenges.
//!
//! ## Key material
//!
//! Verification methods carry Ed25519 public keys as `publicKeyJwk`
//! (OKP / Ed25519 / base64url `x`). Other key representations are
//! rejected at extraction time, not at deserialization time, so a
//! document mixing key types still resolves as long as the referenced
//! method is usable.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use anp_core::Did;

use crate::error::WbaError;

/// A JSON Web Key as embedded in a verification method.
///
/// Only OKP / Ed25519 keys are accepted by [`VerificationMethod::ed25519_key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyJwk {
    /// Key type — `"OKP"` for Ed25519.
    pub kty: String,
    /// Curve — `"Ed25519"`.
    pub crv: String,
    /// Base64url-encoded (unpadded) public key bytes.
    pub x: String,
}

/// A verification method entry in a DID document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationMethod {
    /// Method identifier — a DID URL such as `did:wba:example.com:x#key-1`.
    pub id: String,
    /// Method type, e.g. `"JsonWebKey2020"` or `"Ed25519VerificationKey2020"`.
    #[serde(rename = "type")]
    pub method_type: String,
    /// The DID controlling this key.
    pub controller: String,
    /// Embedded JWK key material.
    #[serde(rename = "publicKeyJwk", skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<PublicKeyJwk>,
}

impl VerificationMethod {
    /// Extract the Ed25519 verifying key from this method's JWK.
    ///
    /// # Errors
    ///
    /// [`WbaError::UnknownVerificationMethod`] when the method carries no
    /// JWK, a non-Ed25519 JWK, or undecodable key bytes.
    pub fn ed25519_key(&self) -> Result<ed25519_dalek::VerifyingKey, WbaError> {
        let jwk = self.public_key_jwk.as_ref().ok_or_else(|| {
            WbaError::UnknownVerificationMethod(format!("{} carries no publicKeyJwk", self.id))
        })?;
        if jwk.kty != "OKP" || jwk.crv != "Ed25519" {
            return Err(WbaError::UnknownVerificationMethod(format!(
                "{}: unsupported key type {}/{}",
                self.id, jwk.kty, jwk.crv
            )));
        }
        let bytes = URL_SAFE_NO_PAD.decode(&jwk.x).map_err(|e| {
            WbaError::UnknownVerificationMethod(format!("{}: bad key encoding: {e}", self.id))
        })?;
        let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            WbaError::UnknownVerificationMethod(format!(
                "{}: expected 32 key bytes, got {}",
                self.id,
                bytes.len()
            ))
        })?;
        ed25519_dalek::VerifyingKey::from_bytes(&arr).map_err(|e| {
            WbaError::UnknownVerificationMethod(format!("{}: invalid Ed25519 key: {e}", self.id))
        })
    }
}

/// A DID document, as served at the DID's `did.json` location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DidDocument {
    /// JSON-LD context. Preserved verbatim; the verifier does not process it.
    #[serde(rename = "@context", default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
    /// The document's DID.
    pub id: Did,
    /// Key material usable for verification.
    #[serde(rename = "verificationMethod", default)]
    pub verification_method: Vec<VerificationMethod>,
    /// Verification method ids permitted for authentication.
    #[serde(default)]
    pub authentication: Vec<String>,
}

impl DidDocument {
    /// Find the verification method referenced by `reference`, which may be
    /// a bare fragment (`#key-1`) or a full DID URL, and confirm it is
    /// listed in the document's `authentication` relationship.
    ///
    /// # Errors
    ///
    /// [`WbaError::UnknownVerificationMethod`] when no such method exists
    /// or it is not authorized for authentication.
    pub fn authentication_method(
        &self,
        reference: &str,
    ) -> Result<&VerificationMethod, WbaError> {
        let full_id = if reference.starts_with('#') {
            format!("{}{}", self.id.as_str(), reference)
        } else {
            reference.to_string()
        };

        let authorized = self.authentication.iter().any(|entry| {
            entry == &full_id
                || (entry.starts_with('#')
                    && format!("{}{}", self.id.as_str(), entry) == full_id)
        });
        if !authorized {
            return Err(WbaError::UnknownVerificationMethod(format!(
                "{full_id} is not listed for authentication"
            )));
        }

        self.verification_method
            .iter()
            .find(|m| m.id == full_id)
            .ok_or_else(|| {
                WbaError::UnknownVerificationMethod(format!("{full_id} not found in document"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;

    fn test_document() -> (DidDocument, SigningKey) {
        let signing = SigningKey::from_bytes(&[7u8; 32]);
        let did = Did::new("did:wba:example.com:user:alice").unwrap();
        let method = VerificationMethod {
            id: format!("{}#key-1", did.as_str()),
            method_type: "JsonWebKey2020".to_string(),
            controller: did.as_str().to_string(),
            public_key_jwk: Some(PublicKeyJwk {
                kty: "OKP".to_string(),
                crv: "Ed25519".to_string(),
                x: URL_SAFE_NO_PAD.encode(signing.verifying_key().as_bytes()),
            }),
        };
        let doc = DidDocument {
            context: vec!["https://www.w3.org/ns/did/v1".to_string()],
            id: did,
            authentication: vec![method.id.clone()],
            verification_method: vec![method],
        };
        (doc, signing)
    }

    #[test]
    fn finds_method_by_fragment() {
        let (doc, signing) = test_document();
        let method = doc.authentication_method("#key-1").unwrap();
        let key = method.ed25519_key().unwrap();
        assert_eq!(key.as_bytes(), signing.verifying_key().as_bytes());
    }

    #[test]
    fn finds_method_by_full_did_url() {
        let (doc, _) = test_document();
        assert!(doc
            .authentication_method("did:wba:example.com:user:alice#key-1")
            .is_ok());
    }

    #[test]
    fn unknown_fragment_rejected() {
        let (doc, _) = test_document();
        assert!(matches!(
            doc.authentication_method("#key-9"),
            Err(WbaError::UnknownVerificationMethod(_))
        ));
    }

    #[test]
    fn method_not_in_authentication_rejected() {
        let (mut doc, _) = test_document();
        doc.authentication.clear();
        assert!(matches!(
            doc.authentication_method("#key-1"),
            Err(WbaError::UnknownVerificationMethod(_))
        ));
    }

    #[test]
    fn fragment_entries_in_authentication_accepted() {
        let (mut doc, _) = test_document();
        doc.authentication = vec!["#key-1".to_string()];
        assert!(doc.authentication_method("#key-1").is_ok());
    }

    #[test]
    fn non_ed25519_jwk_rejected() {
        let (mut doc, _) = test_document();
        doc.verification_method[0].public_key_jwk = Some(PublicKeyJwk {
            kty: "EC".to_string(),
            crv: "P-256".to_string(),
            x: "AA".to_string(),
        });
        let method = doc.authentication_method("#key-1").unwrap();
        assert!(matches!(
            method.ed25519_key(),
            Err(WbaError::UnknownVerificationMethod(_))
        ));
    }

    #[test]
    fn missing_jwk_rejected() {
        let (mut doc, _) = test_document();
        doc.verification_method[0].public_key_jwk = None;
        let method = doc.authentication_method("#key-1").unwrap();
        assert!(method.ed25519_key().is_err());
    }

    #[test]
    fn wrong_key_length_rejected() {
        let (mut doc, _) = test_document();
        doc.verification_method[0]
            .public_key_jwk
            .as_mut()
            .unwrap()
            .x = URL_SAFE_NO_PAD.encode([1u8; 16]);
        let method = doc.authentication_method("#key-1").unwrap();
        assert!(method.ed25519_key().is_err());
    }

    #[test]
    fn document_roundtrips_w3c_field_names() {
        let (doc, _) = test_document();
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("verificationMethod").is_some());
        assert!(json["verificationMethod"][0].get("publicKeyJwk").is_some());
        assert!(json["verificationMethod"][0].get("type").is_some());
        let back: DidDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }
}
