//! Security / Encryption domain models.
//!
//! This module contains pure domain models used by the encryption adapters.
//! It does NOT implement crypto algorithms or touch the filesystem.
//!
//! Design: one symmetric key per data directory.
//! - KeyManager materializes the key once and keeps it for the session
//! - The key encrypts/decrypts the sensitive fields of project records

use base64::{engine::general_purpose::STANDARD, Engine};
use rand::{rngs::OsRng, TryRngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncryptionFormatVersion {
    V1,
}

impl EncryptionFormatVersion {
    pub fn tag(&self) -> u8 {
        match self {
            EncryptionFormatVersion::V1 => 0x01,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self, EncryptionError> {
        match tag {
            0x01 => Ok(EncryptionFormatVersion::V1),
            _ => Err(EncryptionError::UnsupportedBlobVersion),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncryptionAlgo {
    /// Only supported XChaCha20-Poly1305 for now
    XChaCha20Poly1305,
}

impl EncryptionAlgo {
    pub fn nonce_len(&self) -> usize {
        match self {
            EncryptionAlgo::XChaCha20Poly1305 => 24,
        }
    }

    /// Poly1305 authentication tag appended to every ciphertext.
    pub fn tag_len(&self) -> usize {
        match self {
            EncryptionAlgo::XChaCha20Poly1305 => 16,
        }
    }
}

impl fmt::Display for EncryptionAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EncryptionAlgo::XChaCha20Poly1305 => "xchacha20-poly1305",
        };
        write!(f, "{}", s)
    }
}

/// Encrypted blob container
/// =========================
///
/// Self-contained AEAD output for one sensitive field. The text form is
/// `base64(version_tag || nonce || ciphertext_with_tag)` so it can sit in a JSON string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBlob {
    pub version: EncryptionFormatVersion,
    pub aead: EncryptionAlgo,
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

impl EncryptedBlob {
    pub fn validate_basic(&self) -> Result<(), EncryptionError> {
        if self.nonce.len() != self.aead.nonce_len() {
            return Err(EncryptionError::Decryption(format!(
                "invalid nonce length for {}: {}",
                self.aead,
                self.nonce.len()
            )));
        }

        if self.ciphertext.len() < self.aead.tag_len() {
            return Err(EncryptionError::Decryption(
                "ciphertext shorter than authentication tag".into(),
            ));
        }

        Ok(())
    }

    pub fn to_text(&self) -> String {
        let mut raw = Vec::with_capacity(1 + self.nonce.len() + self.ciphertext.len());
        raw.push(self.version.tag());
        raw.extend_from_slice(&self.nonce);
        raw.extend_from_slice(&self.ciphertext);
        STANDARD.encode(raw)
    }

    pub fn from_text(text: &str) -> Result<Self, EncryptionError> {
        let raw = STANDARD
            .decode(text.trim())
            .map_err(|e| EncryptionError::Decryption(format!("invalid base64: {e}")))?;

        let (&tag, rest) = raw
            .split_first()
            .ok_or_else(|| EncryptionError::Decryption("empty payload".into()))?;
        let version = EncryptionFormatVersion::from_tag(tag)?;
        let aead = EncryptionAlgo::XChaCha20Poly1305;

        if rest.len() < aead.nonce_len() {
            return Err(EncryptionError::Decryption("payload shorter than nonce".into()));
        }
        let (nonce, ciphertext) = rest.split_at(aead.nonce_len());

        let blob = Self {
            version,
            aead,
            nonce: nonce.to_vec(),
            ciphertext: ciphertext.to_vec(),
        };
        blob.validate_basic()?;
        Ok(blob)
    }
}

/// The symmetric key that encrypts every sensitive field of the store.
///
/// - 32 bytes, suitable for XChaCha20-Poly1305.
/// - Do NOT implement Serialize/Deserialize.
/// - Wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey([u8; EncryptionKey::LEN]);

impl EncryptionKey {
    pub const LEN: usize = 32;

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn generate() -> Result<Self, EncryptionError> {
        let mut buf = [0u8; Self::LEN];
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|_| EncryptionError::CryptoFailure)?;
        let key = Self::from_bytes(&buf);
        buf.zeroize();
        key
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EncryptionError> {
        if bytes.len() != Self::LEN {
            return Err(EncryptionError::KeyMaterialCorrupt(format!(
                "invalid key length: expected {}, got {}",
                Self::LEN,
                bytes.len()
            )));
        }
        let mut key = [0u8; Self::LEN];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptionKey([REDACTED])")
    }
}

impl Drop for EncryptionKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EncryptionError {
    /// Malformed payload, failed authentication, or wrong key.
    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("unsupported blob format version")]
    UnsupportedBlobVersion,

    #[error("encryption failed")]
    EncryptFailed,

    #[error("internal crypto failure")]
    CryptoFailure,

    #[error("invalid key")]
    InvalidKey,

    #[error("key material is corrupt: {0}")]
    KeyMaterialCorrupt(String),

    #[error("no writable location for key material: {0}")]
    PermissionDenied(String),

    #[error("I/O failure during key material access: {0}")]
    IoFailure(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_blob() -> EncryptedBlob {
        EncryptedBlob {
            version: EncryptionFormatVersion::V1,
            aead: EncryptionAlgo::XChaCha20Poly1305,
            nonce: vec![7u8; 24],
            ciphertext: vec![9u8; 40],
        }
    }

    #[test]
    fn text_form_round_trips() {
        let blob = sample_blob();
        let text = blob.to_text();
        assert_eq!(EncryptedBlob::from_text(&text).unwrap(), blob);
    }

    #[test]
    fn text_form_starts_with_version_tag() {
        let raw = STANDARD.decode(sample_blob().to_text()).unwrap();
        assert_eq!(raw[0], 0x01);
    }

    #[test]
    fn truncated_text_is_rejected() {
        let text = sample_blob().to_text();
        let raw = STANDARD.decode(&text).unwrap();
        let truncated = STANDARD.encode(&raw[..20]);

        let err = EncryptedBlob::from_text(&truncated).unwrap_err();
        assert!(matches!(err, EncryptionError::Decryption(_)));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut raw = STANDARD.decode(sample_blob().to_text()).unwrap();
        raw[0] = 0x7f;
        let err = EncryptedBlob::from_text(&STANDARD.encode(raw)).unwrap_err();
        assert!(matches!(err, EncryptionError::UnsupportedBlobVersion));
    }

    #[test]
    fn garbage_text_is_rejected() {
        let err = EncryptedBlob::from_text("not base64 at all!").unwrap_err();
        assert!(matches!(err, EncryptionError::Decryption(_)));
    }

    #[test]
    fn key_rejects_wrong_length() {
        let err = EncryptionKey::from_bytes(&[1u8; 16]).unwrap_err();
        assert!(matches!(err, EncryptionError::KeyMaterialCorrupt(_)));
    }

    #[test]
    fn key_debug_is_redacted() {
        let key = EncryptionKey::from_bytes(&[3u8; 32]).unwrap();
        assert_eq!(format!("{:?}", key), "EncryptionKey([REDACTED])");
    }

    #[test]
    fn generated_keys_differ() {
        let a = EncryptionKey::generate().unwrap();
        let b = EncryptionKey::generate().unwrap();
        assert_ne!(a, b);
    }
}
