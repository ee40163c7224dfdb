//! AES-256-GCM sealing plus keyed lookup digests for tenant secrets.
//!
//! Sealed values are stored as `nonce || ciphertext || tag`. Every call to
//! [`SecretCipher::seal`] draws a fresh 96-bit nonce from the system CSPRNG,
//! so sealing the same token twice yields different bytes. Lookups and
//! uniqueness checks therefore go through [`SecretCipher::digest`], an
//! HMAC-SHA256 under a subkey derived from the sealing key.

use std::fmt;

use hmac::{Hmac, Mac};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::Sha256;

use crate::domain::foundation::{DomainError, ErrorCode};

pub const NONCE_LEN: usize = 12;

const DIGEST_CONTEXT: &[u8] = b"channel-gate/lookup-digest/v1";

#[derive(Clone)]
pub struct SecretCipher {
    key: [u8; 32],
    digest_key: [u8; 32],
    rng: SystemRandom,
}

impl SecretCipher {
    pub fn new(key: [u8; 32]) -> Self {
        let digest_key = hmac_sha256(&key, DIGEST_CONTEXT);
        Self {
            key,
            digest_key,
            rng: SystemRandom::new(),
        }
    }

    /// Encrypts `plaintext` under a random nonce.
    pub fn seal(&self, plaintext: &str) -> Result<Vec<u8>, DomainError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| encryption_error("failed to generate random nonce"))?;

        let mut in_out = plaintext.as_bytes().to_vec();
        self.aead_key()?
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::empty(),
                &mut in_out,
            )
            .map_err(|_| encryption_error("AES-256-GCM encryption failed"))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + in_out.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&in_out);
        Ok(sealed)
    }

    /// Decrypts a value produced by [`seal`](Self::seal).
    ///
    /// # Errors
    ///
    /// `EncryptionError` for a wrong key, truncated input or tampering.
    pub fn open(&self, sealed: &[u8]) -> Result<String, DomainError> {
        if sealed.len() < NONCE_LEN {
            return Err(encryption_error("sealed value is shorter than its nonce"));
        }
        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| encryption_error("invalid nonce"))?;

        let mut in_out = ciphertext.to_vec();
        let plaintext = self
            .aead_key()?
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| encryption_error("AES-256-GCM decryption failed"))?;

        String::from_utf8(plaintext.to_vec())
            .map_err(|_| encryption_error("decrypted secret is not UTF-8"))
    }

    /// Deterministic hex digest used as the lookup and uniqueness key.
    pub fn digest(&self, plaintext: &str) -> String {
        hex::encode(hmac_sha256(&self.digest_key, plaintext.as_bytes()))
    }

    fn aead_key(&self) -> Result<LessSafeKey, DomainError> {
        let unbound = UnboundKey::new(&AES_256_GCM, &self.key)
            .map_err(|_| encryption_error("failed to create AES-256-GCM key"))?;
        Ok(LessSafeKey::new(unbound))
    }
}

impl fmt::Debug for SecretCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretCipher([REDACTED])")
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts any key");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

fn encryption_error(message: &str) -> DomainError {
    DomainError::new(ErrorCode::EncryptionError, message)
}
