use crate::security::{EncryptionError, EncryptionKey};

/// Authenticated encryption of short text fields.
pub trait SecretCipherPort: Send + Sync {
    /// Empty input yields an empty string.
    fn encrypt(&self, key: &EncryptionKey, plaintext: &str) -> Result<String, EncryptionError>;

    /// Failure mapping:
    /// - Malformed text, failed tag, wrong key -> EncryptionError::Decryption
    fn decrypt(&self, key: &EncryptionKey, ciphertext: &str) -> Result<String, EncryptionError>;
}
