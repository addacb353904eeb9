//! Secure environment variables: `VAR=value` pairs encrypted with a
//! repository's RSA public key so only that repository's builds can read them.
//!
//! The service decrypts with PKCS#1 v1.5, so that padding is mandatory here;
//! OAEP ciphertexts would not be accepted.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};

use crate::error::CryptoError;

const PKCS1_LABEL: &str = "RSA PUBLIC KEY";
const SPKI_LABEL: &str = "PUBLIC KEY";

/// Encrypt `"<var>=<value>"` with the PEM public key and return the
/// base64-encoded ciphertext.
///
/// The result is nondeterministic: PKCS#1 v1.5 padding is random.
pub fn encrypt_secure_var(pem: &str, var: &str, value: &str) -> Result<String, CryptoError> {
    let key = parse_public_key(pem)?;
    let plaintext = format!("{var}={value}");
    let ciphertext = key.encrypt(&mut rand::thread_rng(), Pkcs1v15Encrypt, plaintext.as_bytes())?;
    Ok(STANDARD.encode(ciphertext))
}

/// Parse an RSA public key from SubjectPublicKeyInfo or PKCS#1 PEM.
///
/// Repository keys have been served as SubjectPublicKeyInfo DER under an
/// `RSA PUBLIC KEY` label; that combination is accepted too. A failure is
/// reported against the encoding the PEM label announces.
pub fn parse_public_key(pem: &str) -> Result<RsaPublicKey, CryptoError> {
    let pem = pem.trim();
    if pem.starts_with(&format!("-----BEGIN {PKCS1_LABEL}-----")) {
        return RsaPublicKey::from_pkcs1_pem(pem).or_else(|pkcs1_err| {
            let relabelled = pem.replace(PKCS1_LABEL, SPKI_LABEL);
            RsaPublicKey::from_public_key_pem(&relabelled).map_err(|_| CryptoError::InvalidKey {
                format: "PKCS#1",
                reason: pkcs1_err.to_string(),
            })
        });
    }
    RsaPublicKey::from_public_key_pem(pem).map_err(|e| CryptoError::InvalidKey {
        format: "SubjectPublicKeyInfo",
        reason: e.to_string(),
    })
}
