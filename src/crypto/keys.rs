//! Zeroize-on-drop wrappers for symmetric key material.
//!
//! - `DerivedKey` holds a key derived from a password; it lives for a
//!   single encrypt/decrypt call and is wiped when dropped.
//! - `LinkKey` is a freshly generated random key used by one-time
//!   links.  It has no relation to the master secret and travels with
//!   the link as URL-safe base64.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use zeroize::Zeroize;

use crate::errors::{LockboxError, Result};

/// Length of every symmetric key (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// A 32-byte key derived from a password.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct DerivedKey {
    bytes: [u8; KEY_LEN],
}

impl DerivedKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

/// A random 32-byte key that protects a single shared secret.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct LinkKey {
    bytes: [u8; KEY_LEN],
}

impl LinkKey {
    /// Generate a new key from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Parse a key from its URL-safe base64 form.
    ///
    /// A malformed key is indistinguishable from a wrong one, so both
    /// map to `DecryptionFailed`.
    pub fn from_encoded(encoded: &str) -> Result<Self> {
        let mut decoded = URL_SAFE_NO_PAD
            .decode(encoded.trim())
            .map_err(|_| LockboxError::DecryptionFailed)?;

        if decoded.len() != KEY_LEN {
            decoded.zeroize();
            return Err(LockboxError::DecryptionFailed);
        }

        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&decoded);
        decoded.zeroize();
        Ok(Self { bytes })
    }

    /// URL-safe base64 without padding, suitable for a URL fragment.
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}
