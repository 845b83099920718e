//! Cryptographic primitives for Lockbox.
//!
//! This module provides:
//! - PBKDF2-SHA256 password-based key derivation (`kdf`)
//! - AES-256-GCM encryption and the password codec (`encryption`)
//! - Zeroizing key wrappers (`keys`)
//! - Password / passphrase generation (`generator`)
//! - Strength scoring (`strength`)

pub mod encryption;
pub mod generator;
pub mod kdf;
pub mod keys;
pub mod strength;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{AeadCodec, PasswordCodec, strength, ...};
pub use encryption::{decrypt, encrypt, AeadCodec, PasswordCodec};
pub use generator::{generate_passphrase, generate_password, random_id, CharClasses};
pub use kdf::{generate_salt, KeyDerivation, Pbkdf2Sha256};
pub use keys::{DerivedKey, LinkKey};
pub use strength::{strength, strength_label, StrengthLabel};
