//! Ed25519 verification of inbound webhook requests
//!
//! Discord signs every interaction request with the application's private key.
//! The signature covers the `X-Signature-Timestamp` header value immediately
//! followed by the raw request body, and is sent hex-encoded in
//! `X-Signature-Ed25519`.

use ed25519_dalek::{Signature, Verifier as _, VerifyingKey};

/// Header carrying the hex-encoded request signature
pub const SIGNATURE_HEADER: &str = "X-Signature-Ed25519";
/// Header carrying the timestamp prefixed to the signed message
pub const TIMESTAMP_HEADER: &str = "X-Signature-Timestamp";

/// An error authenticating a request or loading the key used to do so
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    /// One or both of the signature headers were absent
    #[error("missing signature")]
    MissingSignature,
    /// The signature was malformed or did not match the request
    #[error("bad signature")]
    BadSignature,
    /// The configured application public key could not be parsed
    #[error("invalid public key: {0}")]
    InvalidPublicKey(&'static str),
}

/// Checks request signatures against an application's public key
#[derive(Debug, Clone, Copy)]
pub struct SignatureGate {
    key: VerifyingKey,
}

impl SignatureGate {
    /// Construct a gate for the given public key
    #[inline]
    #[must_use]
    pub fn new(key: VerifyingKey) -> Self { Self { key } }

    /// Construct a gate from the hex-encoded public key shown on the
    /// application's developer portal page
    ///
    /// # Errors
    /// This function returns an error if the string is not valid hex or does
    /// not encode a valid Ed25519 public key.
    pub fn from_hex(public_key: &str) -> Result<Self, AuthenticationError> {
        let bytes = hex::decode(public_key.trim())
            .map_err(|_| AuthenticationError::InvalidPublicKey("not a hex string"))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| AuthenticationError::InvalidPublicKey("expected 32 bytes"))?;

        VerifyingKey::from_bytes(&bytes)
            .map(Self::new)
            .map_err(|_| AuthenticationError::InvalidPublicKey("not a curve point"))
    }

    /// The public key requests are checked against
    #[inline]
    #[must_use]
    pub fn key(&self) -> &VerifyingKey { &self.key }

    /// Verify a request given its signature headers (if present) and raw body
    ///
    /// # Errors
    /// This method returns [`AuthenticationError::MissingSignature`] if either
    /// header is absent, or [`AuthenticationError::BadSignature`] if the
    /// signature does not verify.
    pub fn verify(
        &self,
        signature: Option<&str>,
        timestamp: Option<&str>,
        body: &[u8],
    ) -> Result<(), AuthenticationError> {
        let (Some(signature), Some(timestamp)) = (signature, timestamp) else {
            return Err(AuthenticationError::MissingSignature);
        };

        let signature: [u8; 64] = hex::decode(signature)
            .ok()
            .and_then(|b| b.try_into().ok())
            .ok_or(AuthenticationError::BadSignature)?;
        let signature = Signature::from_bytes(&signature);

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.key
            .verify(&message, &signature)
            .map_err(|_| AuthenticationError::BadSignature)
    }
}
