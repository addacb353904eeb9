//! Error types for the Travis CI client.
//!
//! # Design
//! Failures fall into three families: the exchange itself (`Transport`,
//! `Http`), the payload (`Decode`, `Serialization`, `UnexpectedResponse`)
//! and cryptography (`Crypto`). Non-2xx responses keep the raw status and
//! body so callers can decide how to surface them.

/// Errors returned by `TravisClient` and `Travis` operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request could not be completed (DNS, connect, TLS, I/O).
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// The service answered with a non-2xx status.
    #[error("error response from Travis: HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body was empty, not decodable in its charset, or not
    /// the expected JSON. `body` holds the raw payload.
    #[error("unable to deserialize response: {message}")]
    Decode { message: String, body: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response decoded but lacks what a composite operation needs,
    /// e.g. an empty builds list.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl ApiError {
    /// HTTP status of an `Http` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Errors from encrypting a secure environment variable.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// The PEM text is not an RSA public key in any accepted encoding.
    #[error("invalid RSA public key ({format}): {reason}")]
    InvalidKey { format: &'static str, reason: String },

    /// Encryption failed, typically because the plaintext does not fit the
    /// key under PKCS#1 v1.5 padding.
    #[error("encryption failed: {0}")]
    Encryption(#[from] rsa::Error),
}

/// A specialized Result type for Travis CI client operations.
pub type Result<T> = std::result::Result<T, ApiError>;
