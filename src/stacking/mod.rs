//! Passphrase stacking: extra phrases required after the master password.
//!
//! The required phrases are stored encrypted under the master secret.
//! After a successful unlock the caller loads them into the gate with
//! `load_required`, then feeds phrases in with `enter_passphrase`.  The
//! gate opens once every required phrase has been entered.  Entry order
//! is not enforced: completion is set containment.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use zeroize::Zeroizing;

use crate::crypto::AeadCodec;
use crate::errors::{LockboxError, Result};
use crate::storage::{load_json, save_json, Slot, SlotStore};

/// Fewest phrases a stack may hold.
pub const MIN_PHRASES: usize = 2;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StackRecord {
    enabled: bool,
    /// `Vec<String>` of phrases, encrypted under the master secret.
    phrases: String,
}

pub struct PassphraseStack {
    store: Arc<dyn SlotStore>,
    codec: Arc<dyn AeadCodec>,
    required: Vec<Zeroizing<String>>,
    entered: Vec<Zeroizing<String>>,
}

impl PassphraseStack {
    pub fn new(store: Arc<dyn SlotStore>, codec: Arc<dyn AeadCodec>) -> Self {
        Self {
            store,
            codec,
            required: Vec::new(),
            entered: Vec::new(),
        }
    }

    /// Persist `phrases` as the required stack.
    pub fn enable_passphrase_stacking(
        &mut self,
        phrases: &[String],
        master_password: &str,
    ) -> Result<()> {
        if phrases.len() < MIN_PHRASES {
            return Err(LockboxError::Config(format!(
                "passphrase stacking needs at least {MIN_PHRASES} phrases"
            )));
        }
        if phrases.iter().any(|p| p.is_empty()) {
            return Err(LockboxError::Config("passphrases cannot be empty".into()));
        }

        let plain = Zeroizing::new(serde_json::to_vec(phrases)?);
        let record = StackRecord {
            enabled: true,
            phrases: self.codec.encrypt(&plain, master_password.as_bytes())?,
        };
        save_json(self.store.as_ref(), Slot::PassphraseStack, &record)?;

        self.required = phrases.iter().cloned().map(Zeroizing::new).collect();
        self.entered.clear();
        info!(count = phrases.len(), "passphrase stacking enabled");
        Ok(())
    }

    /// Turn stacking off.  `master_password` must decrypt the stack.
    pub fn disable_passphrase_stacking(&mut self, master_password: &str) -> Result<()> {
        if let Some(record) = self.record()? {
            self.codec
                .decrypt(&record.phrases, master_password.as_bytes())?;
        }
        self.store.remove(Slot::PassphraseStack)?;
        self.required.clear();
        self.entered.clear();
        info!("passphrase stacking disabled");
        Ok(())
    }

    pub fn is_enabled(&self) -> Result<bool> {
        Ok(self.record()?.is_some_and(|r| r.enabled))
    }

    /// Decrypt the required phrases into this session and clear any
    /// previously entered ones.
    ///
    /// On failure the previously loaded phrases stay in place, so the
    /// gate never opens because a load went wrong.
    pub fn load_required(&mut self, master_password: &str) -> Result<()> {
        self.entered.clear();
        let required = self.decrypt_phrases(master_password)?;
        self.required = required.unwrap_or_default();
        Ok(())
    }

    /// `Ok` when stacking is off or `master_password` opens the stored
    /// phrases.
    pub fn verify_master(&self, master_password: &str) -> Result<()> {
        self.decrypt_phrases(master_password).map(|_| ())
    }

    fn decrypt_phrases(&self, master_password: &str) -> Result<Option<Vec<Zeroizing<String>>>> {
        let Some(record) = self.record()? else {
            return Ok(None);
        };
        if !record.enabled {
            return Ok(None);
        }

        let plain = Zeroizing::new(
            self.codec
                .decrypt(&record.phrases, master_password.as_bytes())?,
        );
        let phrases: Vec<String> = serde_json::from_slice(&plain)?;
        Ok(Some(phrases.into_iter().map(Zeroizing::new).collect()))
    }

    /// Add a phrase to the entered set.  Entering the same phrase twice
    /// has no further effect.
    pub fn enter_passphrase(&mut self, phrase: &str) {
        let phrase = Zeroizing::new(phrase.to_string());
        if !self.entered.contains(&phrase) {
            self.entered.push(phrase);
        }
    }

    /// True iff every required phrase has been entered.
    pub fn are_all_phrases_entered(&self) -> bool {
        self.required.iter().all(|p| self.entered.contains(p))
    }

    /// First configured phrase not yet entered, if any.
    pub fn get_next_required_passphrase(&self) -> Option<&str> {
        self.required
            .iter()
            .find(|p| !self.entered.contains(*p))
            .map(|p| p.as_str())
    }

    /// How many required phrases are still missing.
    pub fn remaining(&self) -> usize {
        self.required
            .iter()
            .filter(|p| !self.entered.contains(*p))
            .count()
    }

    /// The phrases loaded for this session.
    pub fn required_phrases(&self) -> Vec<Zeroizing<String>> {
        self.required.clone()
    }

    /// Forget the entered phrases (end of session).
    pub fn reset_entered(&mut self) {
        self.entered.clear();
    }

    fn record(&self) -> Result<Option<StackRecord>> {
        load_json(self.store.as_ref(), Slot::PassphraseStack)
    }
}
