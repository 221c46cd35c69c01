pub mod model;
pub mod secret;

pub use model::{EncryptedBlob, EncryptionAlgo, EncryptionError, EncryptionFormatVersion, EncryptionKey};
pub use secret::SecretString;
