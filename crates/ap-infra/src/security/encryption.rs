use rand::RngCore;

use ap_core::ports::SecretCipherPort;
use ap_core::security::{
    EncryptedBlob, EncryptionAlgo, EncryptionError, EncryptionFormatVersion, EncryptionKey,
};
use chacha20poly1305::aead::Aead;
use chacha20poly1305::{KeyInit, XChaCha20Poly1305, XNonce};

const CURR_VERSION: EncryptionFormatVersion = EncryptionFormatVersion::V1;

pub struct XChaChaSecretCipher;

impl SecretCipherPort for XChaChaSecretCipher {
    fn encrypt(&self, key: &EncryptionKey, plaintext: &str) -> Result<String, EncryptionError> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }

        let aead = EncryptionAlgo::XChaCha20Poly1305;
        let mut nonce = vec![0u8; aead.nonce_len()];
        rand::rng().fill_bytes(&mut nonce);

        let ciphertext = match aead {
            EncryptionAlgo::XChaCha20Poly1305 => {
                let cipher = XChaCha20Poly1305::new_from_slice(key.as_bytes())
                    .map_err(|_| EncryptionError::InvalidKey)?;
                cipher
                    .encrypt(XNonce::from_slice(&nonce), plaintext.as_bytes())
                    .map_err(|_| EncryptionError::EncryptFailed)?
            }
        };

        Ok(EncryptedBlob {
            version: CURR_VERSION,
            aead,
            nonce,
            ciphertext,
        }
        .to_text())
    }

    fn decrypt(&self, key: &EncryptionKey, ciphertext: &str) -> Result<String, EncryptionError> {
        if ciphertext.is_empty() {
            return Ok(String::new());
        }

        let blob = EncryptedBlob::from_text(ciphertext)?;
        let plaintext = match blob.aead {
            EncryptionAlgo::XChaCha20Poly1305 => {
                let cipher = XChaCha20Poly1305::new_from_slice(key.as_bytes())
                    .map_err(|_| EncryptionError::InvalidKey)?;
                cipher
                    .decrypt(XNonce::from_slice(&blob.nonce), blob.ciphertext.as_ref())
                    .map_err(|_| {
                        EncryptionError::Decryption("authentication tag mismatch".into())
                    })?
            }
        };

        String::from_utf8(plaintext)
            .map_err(|_| EncryptionError::Decryption("plaintext is not valid UTF-8".into()))
    }
}
