//! n-way vault sharding.
//!
//! A document is cut into `n` contiguous byte ranges of equal size (the
//! last may be shorter).  Each slice is encrypted on its own with the
//! codec, so every shard has its own salt and nonce, and carries a
//! SHA-256 checksum of its plaintext.  All `n` shards are required to
//! rebuild the document.
//!
//! `combine_shards` re-verifies each checksum after decryption.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::crypto::{random_id, AeadCodec};
use crate::errors::{LockboxError, Result};
use crate::storage::{load_json, save_json, Slot, SlotStore};

pub const MIN_SHARDS: usize = 2;

/// One encrypted slice of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultShard {
    pub set_id: String,
    /// Zero-based position in the set.
    pub index: usize,
    pub total_shards: usize,
    /// Codec blob of the slice.
    pub data: String,
    /// Hex SHA-256 of the plaintext slice.
    pub checksum: String,
    pub created_at: DateTime<Utc>,
}

fn checksum(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Split `document` into `n` encrypted shards under `password`.
pub fn split_vault(
    codec: &dyn AeadCodec,
    document: &[u8],
    n: usize,
    password: &str,
) -> Result<Vec<VaultShard>> {
    if n < MIN_SHARDS {
        return Err(LockboxError::Config(format!(
            "a vault must be split into at least {MIN_SHARDS} shards"
        )));
    }

    let set_id = random_id();
    let created_at = Utc::now();
    let size = document.len().div_ceil(n).max(1);

    let mut shards = Vec::with_capacity(n);
    for index in 0..n {
        let start = (index * size).min(document.len());
        let end = ((index + 1) * size).min(document.len());
        let slice = &document[start..end];

        shards.push(VaultShard {
            set_id: set_id.clone(),
            index,
            total_shards: n,
            data: codec.encrypt(slice, password.as_bytes())?,
            checksum: checksum(slice),
            created_at,
        });
    }

    info!(set_id = %set_id, shards = n, bytes = document.len(), "vault split into shards");
    Ok(shards)
}

/// Rebuild a document from a complete shard set.
///
/// The shards may be supplied in any order.
pub fn combine_shards(
    codec: &dyn AeadCodec,
    shards: &[VaultShard],
    password: &str,
) -> Result<Zeroizing<Vec<u8>>> {
    let first = shards
        .first()
        .ok_or_else(|| LockboxError::IncompleteShardSet("no shards supplied".into()))?;

    if shards.iter().any(|s| s.set_id != first.set_id) {
        return Err(LockboxError::IncompleteShardSet(
            "shards come from different sets".into(),
        ));
    }
    if shards.iter().any(|s| s.total_shards != shards.len()) {
        return Err(LockboxError::IncompleteShardSet(format!(
            "have {} of {} shards",
            shards.len(),
            first.total_shards
        )));
    }

    let mut ordered: Vec<&VaultShard> = shards.iter().collect();
    ordered.sort_by_key(|s| s.index);
    let indices: HashSet<usize> = ordered.iter().map(|s| s.index).collect();
    if indices.len() != ordered.len() || ordered.iter().any(|s| s.index >= s.total_shards) {
        return Err(LockboxError::IncompleteShardSet(
            "duplicate or out-of-range shard index".into(),
        ));
    }

    let mut document = Zeroizing::new(Vec::new());
    for shard in ordered {
        let slice = Zeroizing::new(
            codec
                .decrypt(&shard.data, password.as_bytes())
                .map_err(|_| LockboxError::ShardDecryptionFailed { index: shard.index })?,
        );
        if checksum(&slice) != shard.checksum {
            warn!(set_id = %shard.set_id, index = shard.index, "shard checksum mismatch");
            return Err(LockboxError::ShardIntegrity { index: shard.index });
        }
        document.extend_from_slice(&slice);
    }

    info!(set_id = %first.set_id, shards = shards.len(), "shards combined");
    Ok(document)
}

/// Summary of a stored shard set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSetInfo {
    pub set_id: String,
    pub total_shards: usize,
    pub created_at: DateTime<Utc>,
}

/// Shard sets kept in the installation's `VaultShards` slot.
pub struct ShardStore {
    store: Arc<dyn SlotStore>,
}

type ShardTable = BTreeMap<String, Vec<VaultShard>>;

impl ShardStore {
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self { store }
    }

    /// Store a full set, replacing any set with the same id.
    pub fn save_set(&self, shards: &[VaultShard]) -> Result<String> {
        let set_id = shards
            .first()
            .map(|s| s.set_id.clone())
            .ok_or_else(|| LockboxError::IncompleteShardSet("no shards supplied".into()))?;
        if shards.iter().any(|s| s.set_id != set_id) {
            return Err(LockboxError::IncompleteShardSet(
                "shards come from different sets".into(),
            ));
        }

        let mut table = self.table()?;
        table.insert(set_id.clone(), shards.to_vec());
        save_json(self.store.as_ref(), Slot::VaultShards, &table)?;
        Ok(set_id)
    }

    pub fn load_set(&self, set_id: &str) -> Result<Vec<VaultShard>> {
        self.table()?
            .remove(set_id)
            .ok_or_else(|| LockboxError::NotFound(set_id.to_string()))
    }

    pub fn list_sets(&self) -> Result<Vec<ShardSetInfo>> {
        let mut sets: Vec<ShardSetInfo> = self
            .table()?
            .into_iter()
            .filter_map(|(set_id, shards)| {
                shards.first().map(|s| ShardSetInfo {
                    set_id,
                    total_shards: s.total_shards,
                    created_at: s.created_at,
                })
            })
            .collect();
        sets.sort_by_key(|s| s.created_at);
        Ok(sets)
    }

    pub fn delete_set(&self, set_id: &str) -> Result<()> {
        let mut table = self.table()?;
        if table.remove(set_id).is_none() {
            return Err(LockboxError::NotFound(set_id.to_string()));
        }
        save_json(self.store.as_ref(), Slot::VaultShards, &table)
    }

    fn table(&self) -> Result<ShardTable> {
        Ok(load_json(self.store.as_ref(), Slot::VaultShards)?.unwrap_or_default())
    }
}
