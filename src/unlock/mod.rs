//! The installation facade.
//!
//! `Lockbox` owns one vault session together with every safeguard that
//! sits on the unlock path, and wires them in a fixed order:
//!
//! 1. duress check: the duress password opens the decoy dataset and is
//!    never counted as a failure;
//! 2. vault unlock;
//! 3. self-destruct: a rejected password is counted, and the last
//!    permitted failure wipes storage;
//! 4. passphrase stacking: a correct password with stacking enabled
//!    leaves the session gated until every phrase has been entered.
//!
//! Entry reads go through `entries`/`search`, which answer from the decoy
//! dataset while a duress session is active.  Both sessions honour the
//! same inactivity timeout.
//!
//! Restores (from a backup or from shards) also pass through the
//! self-destruct guard: a master password that does not open the backup
//! counts as a failed unlock.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Settings;
use crate::crypto::{AeadCodec, PasswordCodec, Pbkdf2Sha256};
use crate::duress::DuressGuard;
use crate::errors::{LockboxError, Result};
use crate::links::OneTimeLinks;
use crate::rotation::{PasswordRotator, RotationReport};
use crate::self_destruct::{AttemptOutcome, SelfDestructGuard};
use crate::sharding::{combine_shards, split_vault, ShardStore, VaultShard};
use crate::stacking::PassphraseStack;
use crate::storage::{FileStore, SlotStore};
use crate::vault::{ActivityEvent, PasswordEntry, Vault, VaultStore};

/// Result of a single unlock attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// The real vault is open.
    Unlocked,
    /// The duress password was entered; reads go to the decoy dataset.
    Decoy,
    /// Master password accepted, stacked passphrases still missing.
    PassphrasesRequired { remaining: usize },
    /// Wrong password.  `remaining` is the number of failures left before
    /// a wipe, or `None` when self-destruct is off.
    Rejected { remaining: Option<u32> },
}

pub struct Lockbox {
    vault: VaultStore,
    self_destruct: SelfDestructGuard,
    duress: DuressGuard,
    stack: PassphraseStack,
    links: OneTimeLinks,
    shards: ShardStore,
    rotation: PasswordRotator,
}

impl Lockbox {
    pub fn new(store: Arc<dyn SlotStore>, codec: Arc<dyn AeadCodec>, auto_lock: Duration) -> Self {
        let mut duress = DuressGuard::new(store.clone(), codec.clone());
        duress.set_auto_lock(auto_lock);
        Self {
            vault: VaultStore::new(store.clone(), codec.clone(), auto_lock),
            self_destruct: SelfDestructGuard::new(store.clone()),
            duress,
            stack: PassphraseStack::new(store.clone(), codec),
            links: OneTimeLinks::new(store.clone()),
            shards: ShardStore::new(store.clone()),
            rotation: PasswordRotator::new(store),
        }
    }

    /// Open the on-disk installation under `project_dir`.
    ///
    /// The key derivation cost is fixed, never taken from `settings`, so
    /// every blob stays readable by any installation.
    pub fn open(settings: &Settings, project_dir: &Path) -> Result<Self> {
        let store = FileStore::open(&settings.data_path(project_dir))?;
        let codec = PasswordCodec::new(Pbkdf2Sha256::for_installation()?);
        Ok(Self::new(
            Arc::new(store),
            Arc::new(codec),
            settings.auto_lock_timeout(),
        ))
    }

    /// Run one password through the unlock path.
    ///
    /// Returns `Err(WipeTriggered)` when this failure destroyed the
    /// vault, so callers can send the user to re-registration.
    pub fn unlock(&mut self, password: &str) -> Result<UnlockOutcome> {
        self.lock();

        if self.duress.is_duress_password(password)? {
            self.duress.create_duress_session();
            return Ok(UnlockOutcome::Decoy);
        }

        if !self.vault.unlock(password)? {
            return match self.self_destruct.record_failed_attempt()? {
                AttemptOutcome::Triggered => Err(LockboxError::WipeTriggered),
                AttemptOutcome::Counted { remaining, .. } => Ok(UnlockOutcome::Rejected {
                    remaining: Some(remaining),
                }),
                AttemptOutcome::Disabled => Ok(UnlockOutcome::Rejected { remaining: None }),
            };
        }

        // The vault session is live from here on; any failure must end it.
        match self.open_gates(password) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.lock();
                Err(e)
            }
        }
    }

    fn open_gates(&mut self, password: &str) -> Result<UnlockOutcome> {
        self.self_destruct.record_successful_login()?;
        self.stack.load_required(password)?;
        match self.stack.remaining() {
            0 => Ok(UnlockOutcome::Unlocked),
            remaining => {
                info!(remaining, "waiting for stacked passphrases");
                Ok(UnlockOutcome::PassphrasesRequired { remaining })
            }
        }
    }

    /// Feed one stacked passphrase.  Returns the new outcome.
    pub fn enter_passphrase(&mut self, phrase: &str) -> Result<UnlockOutcome> {
        if !self.vault.is_unlocked() {
            return Err(LockboxError::VaultLocked);
        }
        self.stack.enter_passphrase(phrase);
        match self.stack.remaining() {
            0 => Ok(UnlockOutcome::Unlocked),
            remaining => Ok(UnlockOutcome::PassphrasesRequired { remaining }),
        }
    }

    /// Vault open, every stacked phrase entered and no duress session.
    pub fn is_fully_unlocked(&mut self) -> bool {
        !self.duress.is_in_duress_mode()
            && self.vault.is_unlocked()
            && self.stack.are_all_phrases_entered()
    }

    /// End the real or decoy session.
    pub fn lock(&mut self) {
        self.vault.lock();
        self.duress.end_duress_session();
        self.stack.reset_entered();
    }

    pub fn is_in_duress_mode(&self) -> bool {
        self.duress.is_in_duress_mode()
    }

    /// Forward user activity to whichever session is open.
    pub fn record_activity(&mut self, event: ActivityEvent) -> bool {
        if self.duress.is_in_duress_mode() {
            return self.duress.record_activity(event);
        }
        self.vault.record_activity(event)
    }

    /// Poll the inactivity timers; `true` if a session just locked.
    pub fn tick(&mut self) -> bool {
        let decoy = self.duress.tick();
        let real = self.vault.tick();
        decoy || real
    }

    /// Count a wrong master password against the self-destruct guard.
    fn count_failure(&self, err: LockboxError) -> LockboxError {
        match self.self_destruct.record_failed_attempt() {
            Ok(AttemptOutcome::Triggered) => LockboxError::WipeTriggered,
            Ok(_) => err,
            Err(e) => e,
        }
    }

    /// Reads from the decoy dataset, once its session is checked.
    fn ensure_decoy_live(&mut self) -> Result<()> {
        if self.duress.is_decoy_live() {
            Ok(())
        } else {
            Err(LockboxError::VaultLocked)
        }
    }

    /// `VaultLocked` unless the real vault is fully open.
    fn ensure_unlocked(&mut self) -> Result<()> {
        if self.is_fully_unlocked() {
            Ok(())
        } else {
            Err(LockboxError::VaultLocked)
        }
    }

    // ------------------------------------------------------------------
    // Reads that honour duress mode
    // ------------------------------------------------------------------

    pub fn entries(&mut self) -> Result<Vec<PasswordEntry>> {
        if self.duress.is_in_duress_mode() {
            self.ensure_decoy_live()?;
            return self.duress.decoy_entries();
        }
        self.ensure_unlocked()?;
        self.vault.get_all_entries()
    }

    pub fn search(&mut self, query: &str) -> Result<Vec<PasswordEntry>> {
        if self.duress.is_in_duress_mode() {
            self.ensure_decoy_live()?;
            return self.duress.search_decoy(query);
        }
        self.ensure_unlocked()?;
        self.vault.search_entries(query)
    }

    /// Find an entry by id, an id prefix of at least 8 characters, or
    /// case-insensitive title.
    pub fn find_entry(&mut self, id_or_title: &str) -> Result<PasswordEntry> {
        let needle = id_or_title.to_lowercase();
        let is_prefix = |id: &str| needle.len() >= 8 && id.starts_with(&needle);
        self.entries()?
            .into_iter()
            .find(|e| e.id == needle || is_prefix(&e.id) || e.title.to_lowercase() == needle)
            .ok_or_else(|| LockboxError::NotFound(id_or_title.to_string()))
    }

    // ------------------------------------------------------------------
    // Operations on the real vault
    // ------------------------------------------------------------------

    /// The vault store, once the session is fully open.
    pub fn vault(&mut self) -> Result<&mut VaultStore> {
        self.ensure_unlocked()?;
        Ok(&mut self.vault)
    }

    /// Create a new vault.  Any prior self-destruct count is cleared.
    pub fn create_vault(&mut self, password: &str, name: &str) -> Result<Vault> {
        let vault = self.vault.create_vault(password, name)?;
        self.self_destruct.record_successful_login()?;
        Ok(vault)
    }

    pub fn exists(&self) -> Result<bool> {
        self.vault.exists()
    }

    /// Restore a backup blob.  Works on a locked installation.
    ///
    /// Nothing is written unless `password` opens the backup and every
    /// configured safeguard record.  Stacking and duress settings are
    /// encrypted under the master password, so a backup taken under a
    /// different one would leave them unreadable; that restore is refused
    /// with `SafeguardMismatch` until they are disabled.
    pub fn restore_backup(&mut self, blob: &str, password: &str) -> Result<Vault> {
        self.lock();

        match self.vault.verify_backup(blob, password) {
            Ok(_) => {}
            Err(LockboxError::DecryptionFailed) => {
                return Err(self.count_failure(LockboxError::DecryptionFailed))
            }
            Err(e) => return Err(e),
        }
        self.check_safeguards(password)?;

        let vault = self.vault.restore_backup(blob, password)?;
        if let Err(e) = self.open_gates(password) {
            self.lock();
            return Err(e);
        }
        Ok(vault)
    }

    fn check_safeguards(&self, password: &str) -> Result<()> {
        let mismatch = |name: &'static str| {
            move |e: LockboxError| match e {
                LockboxError::DecryptionFailed => LockboxError::SafeguardMismatch(name),
                other => other,
            }
        };
        self.stack
            .verify_master(password)
            .map_err(mismatch("passphrase stacking"))?;
        self.duress
            .verify_owner(password)
            .map_err(mismatch("duress"))
    }

    /// Split the decrypted vault document into `n` shards encrypted under
    /// the master password.
    pub fn split_current_vault(&mut self, n: usize, password: &str) -> Result<Vec<VaultShard>> {
        self.ensure_unlocked()?;
        let vault = self.vault.load_vault()?;
        let document = zeroize::Zeroizing::new(serde_json::to_vec(&vault)?);
        split_vault(self.vault.codec().as_ref(), &document, n, password)
    }

    /// Rebuild a vault from shards and make it the stored vault.
    pub fn restore_from_shards(&mut self, shards: &[VaultShard], password: &str) -> Result<Vault> {
        let codec = self.vault.codec().clone();
        let document = match combine_shards(codec.as_ref(), shards, password) {
            Ok(document) => document,
            Err(e @ LockboxError::ShardDecryptionFailed { .. }) => {
                self.lock();
                return Err(self.count_failure(e));
            }
            Err(e) => return Err(e),
        };
        let blob = codec.encrypt(&document, password.as_bytes())?;
        self.restore_backup(&blob, password)
    }

    pub fn rotate_all(&mut self) -> Result<RotationReport> {
        self.ensure_unlocked()?;
        let report = self.rotation.perform_auto_rotation(&mut self.vault)?;
        if !report.failed.is_empty() {
            warn!(failed = report.failed.len(), "some passwords were not rotated");
        }
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Component access
    // ------------------------------------------------------------------

    pub fn self_destruct(&self) -> &SelfDestructGuard {
        &self.self_destruct
    }

    pub fn duress(&mut self) -> &mut DuressGuard {
        &mut self.duress
    }

    pub fn stack(&mut self) -> &mut PassphraseStack {
        &mut self.stack
    }

    pub fn links(&self) -> &OneTimeLinks {
        &self.links
    }

    pub fn shards(&self) -> &ShardStore {
        &self.shards
    }

    pub fn rotation(&self) -> &PasswordRotator {
        &self.rotation
    }
}
