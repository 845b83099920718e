//! One-time access links for sharing a single password.
//!
//! Each link gets its own random key, unrelated to the master secret.
//! The password is encrypted under that key and stored with an expiry
//! and an access budget.  The id and key are meant to travel together in
//! a URL fragment (`<id>#<key>`) and are never sent anywhere by this
//! crate.
//!
//! A record ends in exactly one of two ways: it is deleted when found
//! expired, or deleted when its final permitted access succeeds.

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::crypto::{decrypt, encrypt, random_id, LinkKey};
use crate::errors::{LockboxError, Result};
use crate::storage::{load_json, save_json, Slot, SlotStore};

/// Stored state of one link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub id: String,
    pub password_id: String,
    /// base64( nonce | ciphertext + tag ) under the link key.
    pub payload: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub access_count: u32,
    pub max_accesses: u32,
}

impl LinkRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_exhausted(&self) -> bool {
        self.access_count >= self.max_accesses
    }
}

/// What the creator hands out.
#[derive(Debug, Clone)]
pub struct SharedLink {
    pub id: String,
    /// URL-safe base64 link key.
    pub key: String,
    pub expires_at: DateTime<Utc>,
}

impl SharedLink {
    /// `<id>#<key>`, ready to append to a share URL.
    pub fn fragment(&self) -> String {
        format!("{}#{}", self.id, self.key)
    }
}

/// Split an `<id>#<key>` fragment (a leading URL part is ignored).
pub fn parse_fragment(fragment: &str) -> Result<(String, String)> {
    let tail = fragment.rsplit('/').next().unwrap_or(fragment);
    match tail.split_once('#') {
        Some((id, key)) if !id.is_empty() && !key.is_empty() => {
            Ok((id.to_string(), key.to_string()))
        }
        _ => Err(LockboxError::Config(
            "link must look like <id>#<key>".into(),
        )),
    }
}

type LinkTable = BTreeMap<String, LinkRecord>;

pub struct OneTimeLinks {
    store: Arc<dyn SlotStore>,
}

impl OneTimeLinks {
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self { store }
    }

    /// Encrypt `password` under a fresh key and store a link for it.
    pub fn create_link(
        &self,
        password_id: &str,
        password: &str,
        ttl_minutes: u32,
        max_accesses: u32,
    ) -> Result<SharedLink> {
        self.create_link_at(password_id, password, ttl_minutes, max_accesses, Utc::now())
    }

    pub fn create_link_at(
        &self,
        password_id: &str,
        password: &str,
        ttl_minutes: u32,
        max_accesses: u32,
        now: DateTime<Utc>,
    ) -> Result<SharedLink> {
        if max_accesses == 0 {
            return Err(LockboxError::Config(
                "a link must allow at least one access".into(),
            ));
        }

        let key = LinkKey::generate();
        let sealed = encrypt(key.as_bytes(), password.as_bytes())?;
        let record = LinkRecord {
            id: random_id(),
            password_id: password_id.to_string(),
            payload: BASE64.encode(sealed),
            created_at: now,
            expires_at: now + Duration::minutes(i64::from(ttl_minutes)),
            access_count: 0,
            max_accesses,
        };

        let link = SharedLink {
            id: record.id.clone(),
            key: key.encode(),
            expires_at: record.expires_at,
        };

        let mut table = self.table()?;
        table.insert(record.id.clone(), record);
        self.save(&table)?;

        info!(link_id = %link.id, ttl_minutes, max_accesses, "one-time link created");
        Ok(link)
    }

    /// Open a link, consuming one access.
    pub fn access_link(&self, id: &str, key: &str) -> Result<Zeroizing<String>> {
        self.access_link_at(id, key, Utc::now())
    }

    pub fn access_link_at(
        &self,
        id: &str,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<Zeroizing<String>> {
        let mut table = self.table()?;
        let record = table
            .get(id)
            .cloned()
            .ok_or_else(|| LockboxError::NotFound(id.to_string()))?;

        if record.is_expired(now) {
            table.remove(id);
            self.save(&table)?;
            info!(link_id = %id, "expired link removed");
            return Err(LockboxError::LinkExpired);
        }
        if record.is_exhausted() {
            table.remove(id);
            self.save(&table)?;
            return Err(LockboxError::LinkConsumed);
        }

        let key = LinkKey::from_encoded(key)?;
        let sealed = BASE64
            .decode(&record.payload)
            .map_err(|_| LockboxError::DecryptionFailed)?;
        let plain = Zeroizing::new(decrypt(key.as_bytes(), &sealed)?);
        let secret = Zeroizing::new(
            String::from_utf8(plain.to_vec())
                .map_err(|_| LockboxError::SerializationError("shared secret is not UTF-8".into()))?,
        );

        let count = record.access_count + 1;
        if count >= record.max_accesses {
            table.remove(id);
            debug!(link_id = %id, "final access, link removed");
        } else if let Some(stored) = table.get_mut(id) {
            stored.access_count = count;
        }
        self.save(&table)?;

        info!(link_id = %id, access = count, "one-time link accessed");
        Ok(secret)
    }

    /// Delete a link before it is used.
    pub fn revoke_link(&self, id: &str) -> Result<()> {
        let mut table = self.table()?;
        if table.remove(id).is_none() {
            return Err(LockboxError::NotFound(id.to_string()));
        }
        self.save(&table)
    }

    /// Drop every expired record.  Returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let mut table = self.table()?;
        let before = table.len();
        table.retain(|_, r| !r.is_expired(now));
        let removed = before - table.len();
        if removed > 0 {
            self.save(&table)?;
        }
        Ok(removed)
    }

    /// Stored links, oldest first.
    pub fn list_links(&self) -> Result<Vec<LinkRecord>> {
        let mut links: Vec<LinkRecord> = self.table()?.into_values().collect();
        links.sort_by_key(|l| l.created_at);
        Ok(links)
    }

    pub fn active_link_count(&self) -> Result<usize> {
        let now = Utc::now();
        Ok(self
            .table()?
            .values()
            .filter(|r| !r.is_expired(now) && !r.is_exhausted())
            .count())
    }

    fn table(&self) -> Result<LinkTable> {
        Ok(load_json(self.store.as_ref(), Slot::OneTimeLinks)?.unwrap_or_default())
    }

    fn save(&self, table: &LinkTable) -> Result<()> {
        save_json(self.store.as_ref(), Slot::OneTimeLinks, table)
    }
}
