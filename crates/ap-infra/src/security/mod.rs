mod encryption;
mod key_manager;

pub use encryption::XChaChaSecretCipher;
pub use key_manager::{FileKeyManager, KEY_FILE_NAME, PREVIOUS_KEY_FILE_NAME};
pub(crate) use key_manager::StagedKey;
