//! High-level vault operations.
//!
//! `VaultStore` owns the session state machine (Locked ⇄ Unlocked) and
//! wraps the slot store and the codec, so the rest of the application
//! works with calls like `store.add_entry(NewEntry::new(...))`.
//!
//! Every read decrypts the whole document and every write re-encrypts
//! it, re-deriving the key from the cached secret each time.  That keeps
//! the on-disk format a single self-contained blob at the cost of
//! O(vault size) work per mutation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::crypto::AeadCodec;
use crate::errors::{LockboxError, Result};
use crate::storage::{Slot, SlotStore};

use super::model::{EntryUpdate, NewEntry, PasswordEntry, Vault};
use super::session::{ActivityEvent, Session};

/// The main vault handle.
pub struct VaultStore {
    store: Arc<dyn SlotStore>,
    codec: Arc<dyn AeadCodec>,
    session: Session,
}

impl VaultStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    pub fn new(store: Arc<dyn SlotStore>, codec: Arc<dyn AeadCodec>, auto_lock: Duration) -> Self {
        Self {
            store,
            codec,
            session: Session::new(auto_lock),
        }
    }

    /// Whether a vault document has been persisted.
    pub fn exists(&self) -> Result<bool> {
        self.store.contains(Slot::Vault)
    }

    /// Create and persist an empty vault, leaving it unlocked.
    ///
    /// Fails with `VaultAlreadyExists` if one is already stored.
    pub fn create_vault(&mut self, password: &str, name: &str) -> Result<Vault> {
        if self.exists()? {
            return Err(LockboxError::VaultAlreadyExists);
        }

        let vault = Vault::new(name);
        self.write(&vault, password)?;
        self.session.start(password);

        info!(vault_id = %vault.id, "vault created");
        Ok(vault)
    }

    // ------------------------------------------------------------------
    // Lock / unlock
    // ------------------------------------------------------------------

    /// Try to open the vault with `password`.
    ///
    /// A wrong password returns `Ok(false)` rather than an error; the
    /// caller is expected to report it to the self-destruct guard.
    pub fn unlock(&mut self, password: &str) -> Result<bool> {
        let blob = self
            .store
            .get(Slot::Vault)?
            .ok_or(LockboxError::VaultNotFound)?;

        match self.codec.decrypt(&blob, password.as_bytes()) {
            Ok(plain) => {
                let plain = Zeroizing::new(plain);
                let _: Vault = serde_json::from_slice(&plain)?;
                self.session.start(password);
                info!("vault unlocked");
                Ok(true)
            }
            Err(LockboxError::DecryptionFailed) => {
                warn!("vault unlock rejected");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Drop the cached secret and stop the timer.  Idempotent.
    pub fn lock(&mut self) {
        if self.session.is_listening() {
            info!("vault locked");
        }
        self.session.end();
    }

    pub fn is_unlocked(&mut self) -> bool {
        self.session.is_live()
    }

    /// Forward a user activity event to the inactivity timer.
    pub fn record_activity(&mut self, event: ActivityEvent) -> bool {
        self.session.record_activity(event)
    }

    /// Poll the inactivity timer; `true` if it just locked the vault.
    pub fn tick(&mut self) -> bool {
        self.session.tick()
    }

    pub fn set_auto_lock(&mut self, timeout: Duration) {
        self.session.set_timeout(timeout);
    }

    pub fn auto_lock(&self) -> Duration {
        self.session.timeout()
    }

    // ------------------------------------------------------------------
    // Document access
    // ------------------------------------------------------------------

    /// Decrypt and return the full vault document.
    pub fn load_vault(&mut self) -> Result<Vault> {
        let secret = self.session.secret()?;
        let blob = self
            .store
            .get(Slot::Vault)?
            .ok_or(LockboxError::VaultNotFound)?;

        let plain = Zeroizing::new(self.codec.decrypt(&blob, secret.as_bytes())?);
        Ok(serde_json::from_slice(&plain)?)
    }

    /// Re-encrypt and persist the full document, refreshing `updated_at`.
    pub fn save_vault(&mut self, vault: &mut Vault) -> Result<()> {
        let secret = self.session.secret()?;
        vault.updated_at = Utc::now();
        self.write(vault, &secret)
    }

    fn write(&self, vault: &Vault, password: &str) -> Result<()> {
        let plain = Zeroizing::new(serde_json::to_vec(vault)?);
        let blob = self.codec.encrypt(&plain, password.as_bytes())?;
        self.store.set(Slot::Vault, &blob)
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    pub fn add_entry(&mut self, entry: NewEntry) -> Result<PasswordEntry> {
        let mut vault = self.load_vault()?;
        let entry = entry.into_entry(Utc::now());
        vault.entries.push(entry.clone());
        self.save_vault(&mut vault)?;
        Ok(entry)
    }

    /// Apply `update` to the entry with `id`, bumping its `updated_at`.
    pub fn update_entry(&mut self, id: &str, update: EntryUpdate) -> Result<PasswordEntry> {
        let mut vault = self.load_vault()?;
        let entry = vault
            .find_mut(id)
            .ok_or_else(|| LockboxError::NotFound(id.to_string()))?;
        update.apply(entry, Utc::now());
        let updated = entry.clone();
        self.save_vault(&mut vault)?;
        Ok(updated)
    }

    pub fn delete_entry(&mut self, id: &str) -> Result<()> {
        let mut vault = self.load_vault()?;
        let before = vault.entries.len();
        vault.entries.retain(|e| e.id != id);
        if vault.entries.len() == before {
            return Err(LockboxError::NotFound(id.to_string()));
        }
        self.save_vault(&mut vault)
    }

    pub fn get_entry(&mut self, id: &str) -> Result<PasswordEntry> {
        self.load_vault()?
            .find(id)
            .cloned()
            .ok_or_else(|| LockboxError::NotFound(id.to_string()))
    }

    pub fn get_all_entries(&mut self) -> Result<Vec<PasswordEntry>> {
        Ok(self.load_vault()?.entries)
    }

    pub fn entry_count(&mut self) -> Result<usize> {
        Ok(self.load_vault()?.entries.len())
    }

    /// Case-insensitive substring search over title, username, url,
    /// notes, category and tags.  An empty query returns everything.
    pub fn search_entries(&mut self, query: &str) -> Result<Vec<PasswordEntry>> {
        let entries = self.get_all_entries()?;
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(entries);
        }
        Ok(entries.into_iter().filter(|e| e.matches(&needle)).collect())
    }

    // ------------------------------------------------------------------
    // Backup / restore / re-key
    // ------------------------------------------------------------------

    /// The persisted vault blob, exactly as stored.
    pub fn create_backup(&mut self) -> Result<String> {
        self.session.secret()?;
        self.store
            .get(Slot::Vault)?
            .ok_or(LockboxError::VaultNotFound)
    }

    /// Decrypt and parse a backup without touching storage.
    pub fn verify_backup(&self, blob: &str, password: &str) -> Result<Vault> {
        let plain = Zeroizing::new(self.codec.decrypt(blob, password.as_bytes())?);
        Ok(serde_json::from_slice(&plain)?)
    }

    /// Replace the stored vault with `blob`.
    ///
    /// The blob is decrypted and parsed first; a wrong password or a
    /// corrupt backup fails without touching the existing vault.  On
    /// success the session is unlocked with `password`.
    pub fn restore_backup(&mut self, blob: &str, password: &str) -> Result<Vault> {
        let vault = self.verify_backup(blob, password)?;

        self.store.set(Slot::Vault, blob.trim())?;
        self.session.start(password);

        info!(entries = vault.entries.len(), "vault restored from backup");
        Ok(vault)
    }

    /// Re-encrypt the vault under `new_password`.
    ///
    /// `current` must decrypt the stored vault.
    pub fn change_password(&mut self, current: &str, new_password: &str) -> Result<()> {
        let blob = self
            .store
            .get(Slot::Vault)?
            .ok_or(LockboxError::VaultNotFound)?;
        let plain = Zeroizing::new(self.codec.decrypt(&blob, current.as_bytes())?);
        let mut vault: Vault = serde_json::from_slice(&plain)?;

        vault.updated_at = Utc::now();
        self.write(&vault, new_password)?;
        self.session.start(new_password);

        info!("master password changed");
        Ok(())
    }

    /// The slot store this vault persists to.
    pub fn slot_store(&self) -> &Arc<dyn SlotStore> {
        &self.store
    }

    /// The codec used for the vault blob.
    pub fn codec(&self) -> &Arc<dyn AeadCodec> {
        &self.codec
    }
}
