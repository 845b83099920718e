//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! Every encrypt/decrypt call derives a fresh 256-bit key from the
//! password and the blob's salt.  Keys are never cached; the returned
//! `DerivedKey` zeroizes itself when dropped.
//!
//! The derivation sits behind the `KeyDerivation` trait so a different
//! backend (for example a hardware-backed one) can be plugged into the
//! codec without touching any call site.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

use super::keys::{DerivedKey, KEY_LEN};
use crate::errors::{LockboxError, Result};

/// Length of the salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// PBKDF2 round count for every stored blob.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Lowest round count `with_iterations` accepts.
pub const MIN_ITERATIONS: u32 = 1_000;

/// Debug builds only: overrides the round count of
/// `Pbkdf2Sha256::for_installation` so the binary's own tests stay fast.
/// Release builds ignore it.
pub const TEST_ITERATIONS_ENV: &str = "LOCKBOX_TEST_KDF_ITERATIONS";

/// Turns a password and salt into symmetric key material.
///
/// Implementations must be pure: the same password and salt always
/// produce the same key.
pub trait KeyDerivation: Send + Sync {
    fn derive_key(&self, password: &[u8], salt: &[u8]) -> Result<DerivedKey>;
}

/// PBKDF2 with HMAC-SHA256.
#[derive(Debug, Clone, Copy)]
pub struct Pbkdf2Sha256 {
    iterations: u32,
}

impl Default for Pbkdf2Sha256 {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl Pbkdf2Sha256 {
    /// Build a deriver with an explicit round count.
    ///
    /// Rejects counts below `MIN_ITERATIONS`.
    pub fn with_iterations(iterations: u32) -> Result<Self> {
        if iterations < MIN_ITERATIONS {
            return Err(LockboxError::KeyDerivationFailed(format!(
                "PBKDF2 iterations must be at least {MIN_ITERATIONS} (got {iterations})"
            )));
        }
        Ok(Self { iterations })
    }

    /// The deriver used for an on-disk installation.
    ///
    /// The blob does not record its round count, so this is always
    /// `DEFAULT_ITERATIONS` outside of debug-build tests.
    pub fn for_installation() -> Result<Self> {
        let Some(raw) = iterations_override() else {
            return Ok(Self::default());
        };
        let iterations = raw.trim().parse::<u32>().map_err(|_| {
            LockboxError::KeyDerivationFailed(format!("{TEST_ITERATIONS_ENV} is not a number"))
        })?;
        Self::with_iterations(iterations)
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

#[cfg(debug_assertions)]
fn iterations_override() -> Option<String> {
    std::env::var(TEST_ITERATIONS_ENV).ok()
}

#[cfg(not(debug_assertions))]
fn iterations_override() -> Option<String> {
    None
}

impl KeyDerivation for Pbkdf2Sha256 {
    fn derive_key(&self, password: &[u8], salt: &[u8]) -> Result<DerivedKey> {
        if salt.is_empty() {
            return Err(LockboxError::KeyDerivationFailed("salt is empty".into()));
        }

        let mut key = [0u8; KEY_LEN];
        pbkdf2_hmac::<Sha256>(password, salt, self.iterations, &mut key);
        Ok(DerivedKey::new(key))
    }
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
