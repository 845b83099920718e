//! Persisted slot layout.
//!
//! Every collection lives in its own named slot.  A slot value is a
//! string: either plain JSON or an encrypted blob produced by the
//! `AeadCodec`.  Backends only need get/set/remove, so the vault and the
//! security features never touch the filesystem directly.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::Result;

/// The named slots that make up an installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Encrypted vault document.
    Vault,
    /// Duress settings (encrypted).
    DuressSettings,
    /// Decoy dataset shown in duress mode.
    DecoyVault,
    /// Passphrase-stack settings (phrases encrypted).
    PassphraseStack,
    /// Self-destruct counters (plain).
    SelfDestruct,
    /// Rotation policy (plain).
    RotationSettings,
    /// One-time link records.
    OneTimeLinks,
    /// Stored shard sets.
    VaultShards,
}

impl Slot {
    /// Every slot belonging to the vault, in wipe order.
    pub const ALL: [Slot; 8] = [
        Slot::Vault,
        Slot::DuressSettings,
        Slot::DecoyVault,
        Slot::PassphraseStack,
        Slot::RotationSettings,
        Slot::OneTimeLinks,
        Slot::VaultShards,
        Slot::SelfDestruct,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Vault => "vault",
            Slot::DuressSettings => "duress_settings",
            Slot::DecoyVault => "decoy_vault",
            Slot::PassphraseStack => "passphrase_stack",
            Slot::SelfDestruct => "self_destruct",
            Slot::RotationSettings => "rotation_settings",
            Slot::OneTimeLinks => "one_time_links",
            Slot::VaultShards => "vault_shards",
        }
    }
}

/// A key-value backend with one string value per slot.
pub trait SlotStore: Send + Sync {
    fn get(&self, slot: Slot) -> Result<Option<String>>;
    fn set(&self, slot: Slot, value: &str) -> Result<()>;
    /// Removing a missing slot is not an error.
    fn remove(&self, slot: Slot) -> Result<()>;

    fn contains(&self, slot: Slot) -> Result<bool> {
        Ok(self.get(slot)?.is_some())
    }
}

/// Read a plain-JSON slot, returning `None` when it is empty.
pub fn load_json<T: DeserializeOwned>(store: &dyn SlotStore, slot: Slot) -> Result<Option<T>> {
    match store.get(slot)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serialize a value as JSON into a slot.
pub fn save_json<T: Serialize>(store: &dyn SlotStore, slot: Slot, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(slot, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_names_are_unique() {
        let mut names: Vec<&str> = Slot::ALL.iter().map(Slot::as_str).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Slot::ALL.len());
    }

    #[test]
    fn json_helpers_roundtrip() {
        let store = MemoryStore::new();
        assert!(load_json::<Vec<u32>>(&store, Slot::VaultShards)
            .unwrap()
            .is_none());

        save_json(&store, Slot::VaultShards, &vec![1u32, 2, 3]).unwrap();
        let back: Vec<u32> = load_json(&store, Slot::VaultShards).unwrap().unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }
}
