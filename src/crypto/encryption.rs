//! AES-256-GCM authenticated encryption.
//!
//! Two layers live here:
//!
//! - `encrypt` / `decrypt` work with a raw 32-byte key and produce
//!   `[ 12-byte nonce | ciphertext + 16-byte tag ]`.
//! - `PasswordCodec` implements `AeadCodec`: it derives the key from a
//!   password with a fresh salt on every call and produces a
//!   self-contained, base64-encoded blob:
//!
//! ```text
//! base64( salt[16] | iv[12] | ciphertext + tag[16] )
//! ```
//!
//! The GCM tag is the only integrity check.  Any failure to decrypt
//! (wrong password, flipped bit, truncated blob, bad base64) surfaces as
//! `DecryptionFailed`.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::kdf::{generate_salt, KeyDerivation, Pbkdf2Sha256, SALT_LEN};
use crate::errors::{LockboxError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Password-based authenticated encryption producing text blobs.
pub trait AeadCodec: Send + Sync {
    /// Encrypt `plaintext` under `password`.  Never deterministic.
    fn encrypt(&self, plaintext: &[u8], password: &[u8]) -> Result<String>;

    /// Decrypt a blob produced by `encrypt`.
    fn decrypt(&self, blob: &str, password: &[u8]) -> Result<Vec<u8>>;
}

/// AES-256-GCM over a pluggable key derivation.
pub struct PasswordCodec<K: KeyDerivation = Pbkdf2Sha256> {
    kdf: K,
}

impl Default for PasswordCodec<Pbkdf2Sha256> {
    fn default() -> Self {
        Self::new(Pbkdf2Sha256::default())
    }
}

impl<K: KeyDerivation> PasswordCodec<K> {
    pub fn new(kdf: K) -> Self {
        Self { kdf }
    }
}

impl<K: KeyDerivation> AeadCodec for PasswordCodec<K> {
    fn encrypt(&self, plaintext: &[u8], password: &[u8]) -> Result<String> {
        let salt = generate_salt();
        let key = self.kdf.derive_key(password, &salt)?;
        let sealed = encrypt(key.as_bytes(), plaintext)?;

        let mut blob = Vec::with_capacity(SALT_LEN + sealed.len());
        blob.extend_from_slice(&salt);
        blob.extend_from_slice(&sealed);
        Ok(BASE64.encode(blob))
    }

    fn decrypt(&self, blob: &str, password: &[u8]) -> Result<Vec<u8>> {
        let raw = BASE64
            .decode(blob.trim())
            .map_err(|_| LockboxError::DecryptionFailed)?;

        if raw.len() < SALT_LEN + NONCE_LEN + TAG_LEN {
            return Err(LockboxError::DecryptionFailed);
        }

        let (salt, sealed) = raw.split_at(SALT_LEN);
        let key = self.kdf.derive_key(password, salt)?;
        decrypt(key.as_bytes(), sealed)
    }
}

/// Encrypt `plaintext` with a 32-byte `key`.
///
/// Returns the nonce prepended to the ciphertext (nonce || ciphertext).
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| LockboxError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| LockboxError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt data that was produced by `encrypt`.
pub fn decrypt(key: &[u8], ciphertext_with_nonce: &[u8]) -> Result<Vec<u8>> {
    if ciphertext_with_nonce.len() < NONCE_LEN + TAG_LEN {
        return Err(LockboxError::DecryptionFailed);
    }

    let (nonce_bytes, ciphertext) = ciphertext_with_nonce.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| LockboxError::DecryptionFailed)?;

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| LockboxError::DecryptionFailed)
}
