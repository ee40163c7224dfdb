//! At-rest protection of tenant secrets.

mod secret_cipher;

pub use secret_cipher::{SecretCipher, NONCE_LEN};
