use thiserror::Error;

/// All errors that can occur in Lockbox.
#[derive(Debug, Error)]
pub enum LockboxError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — wrong password or corrupted data")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Generator / settings errors ---
    #[error("Configuration error: {0}")]
    Config(String),

    // --- Vault errors ---
    #[error("Vault is locked — unlock it first")]
    VaultLocked,

    #[error("No vault exists yet — run `lockbox init`")]
    VaultNotFound,

    #[error("A vault already exists")]
    VaultAlreadyExists,

    #[error("Entry '{0}' not found")]
    NotFound(String),

    #[error("The {0} settings are protected by a different master password; disable them before restoring")]
    SafeguardMismatch(&'static str),

    // --- Self-destruct ---
    #[error("Too many failed attempts — the vault has been wiped")]
    WipeTriggered,

    // --- One-time links ---
    #[error("This link has expired")]
    LinkExpired,

    #[error("This link has already been used")]
    LinkConsumed,

    // --- Sharding ---
    #[error("Incomplete shard set: {0}")]
    IncompleteShardSet(String),

    #[error("Shard {index} could not be decrypted")]
    ShardDecryptionFailed { index: usize },

    #[error("Shard {index} failed its checksum — the shard has been altered")]
    ShardIntegrity { index: usize },

    // --- Storage errors ---
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,

    #[error("Audit error: {0}")]
    AuditError(String),
}

impl From<serde_json::Error> for LockboxError {
    fn from(e: serde_json::Error) -> Self {
        Self::SerializationError(e.to_string())
    }
}

/// Convenience type alias for Lockbox results.
pub type Result<T> = std::result::Result<T, LockboxError>;
