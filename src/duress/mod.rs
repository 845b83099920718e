//! Duress (decoy) password.
//!
//! The owner registers a second password.  Entering it instead of the
//! real one opens a decoy dataset, so a coerced unlock reveals nothing.
//!
//! Persisted record:
//!
//! - `owner`: the full `DuressSettings`, encrypted under the **real**
//!   password.  Only someone who already holds the real password can
//!   read or change the configuration.
//! - `check`: just the duress value, encrypted under the **duress**
//!   password.  `is_duress_password` decrypts this with the candidate
//!   and then compares the stored value to the candidate; the real
//!   password cannot decrypt it, so it is never classified as duress.
//!
//! The decoy dataset itself is stored as plain JSON.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::crypto::{generate_password, AeadCodec, CharClasses};
use crate::errors::{LockboxError, Result};
use crate::storage::{load_json, save_json, Slot, SlotStore};
use crate::vault::{ActivityEvent, NewEntry, PasswordEntry, Session};

/// Decrypted owner view of the duress configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuressSettings {
    pub enabled: bool,
    pub duress_password: String,
    pub real_password: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DuressCheck {
    duress_password: String,
}

#[derive(Serialize, Deserialize)]
struct DuressRecord {
    enabled: bool,
    owner: String,
    check: String,
}

pub struct DuressGuard {
    store: Arc<dyn SlotStore>,
    codec: Arc<dyn AeadCodec>,
    active: bool,
    /// Inactivity deadline for the decoy session.  Holds no secret.
    session: Session,
}

impl DuressGuard {
    pub fn new(store: Arc<dyn SlotStore>, codec: Arc<dyn AeadCodec>) -> Self {
        Self {
            store,
            codec,
            active: false,
            session: Session::default(),
        }
    }

    /// Register (or replace) the duress password.
    ///
    /// The caller is responsible for having verified `real_password`
    /// against the vault.
    pub fn set_duress_password(&self, duress_password: &str, real_password: &str) -> Result<()> {
        if duress_password.is_empty() {
            return Err(LockboxError::Config("duress password cannot be empty".into()));
        }
        if duress_password == real_password {
            return Err(LockboxError::Config(
                "duress password must differ from the master password".into(),
            ));
        }

        let settings = DuressSettings {
            enabled: true,
            duress_password: duress_password.to_string(),
            real_password: real_password.to_string(),
        };
        let check = DuressCheck {
            duress_password: duress_password.to_string(),
        };

        let owner_json = Zeroizing::new(serde_json::to_vec(&settings)?);
        let check_json = Zeroizing::new(serde_json::to_vec(&check)?);

        let record = DuressRecord {
            enabled: true,
            owner: self.codec.encrypt(&owner_json, real_password.as_bytes())?,
            check: self.codec.encrypt(&check_json, duress_password.as_bytes())?,
        };
        save_json(self.store.as_ref(), Slot::DuressSettings, &record)?;
        info!("duress password configured");
        Ok(())
    }

    /// Decrypt the owner view.  Fails with `DecryptionFailed` unless
    /// `real_password` is the one the record was created with.
    pub fn settings(&self, real_password: &str) -> Result<Option<DuressSettings>> {
        let Some(record) = self.record()? else {
            return Ok(None);
        };
        let plain = Zeroizing::new(self.codec.decrypt(&record.owner, real_password.as_bytes())?);
        Ok(Some(serde_json::from_slice(&plain)?))
    }

    /// Remove the duress configuration and the decoy dataset.
    pub fn disable(&mut self, real_password: &str) -> Result<()> {
        if self.settings(real_password)?.is_none() {
            return Ok(());
        }
        self.store.remove(Slot::DuressSettings)?;
        self.store.remove(Slot::DecoyVault)?;
        self.active = false;
        info!("duress password removed");
        Ok(())
    }

    /// `Ok` when duress is off or `real_password` opens the owner record.
    pub fn verify_owner(&self, real_password: &str) -> Result<()> {
        self.settings(real_password).map(|_| ())
    }

    pub fn is_enabled(&self) -> Result<bool> {
        Ok(self.record()?.is_some_and(|r| r.enabled))
    }

    /// True iff `candidate` is the configured duress password.
    pub fn is_duress_password(&self, candidate: &str) -> Result<bool> {
        let Some(record) = self.record()? else {
            return Ok(false);
        };
        if !record.enabled {
            return Ok(false);
        }

        let plain = match self.codec.decrypt(&record.check, candidate.as_bytes()) {
            Ok(plain) => Zeroizing::new(plain),
            Err(LockboxError::DecryptionFailed) => return Ok(false),
            Err(e) => return Err(e),
        };
        let check: DuressCheck = serde_json::from_slice(&plain)?;
        let stored = Zeroizing::new(check.duress_password);

        Ok(stored.as_bytes().ct_eq(candidate.as_bytes()).into())
    }

    // ------------------------------------------------------------------
    // Session flag
    // ------------------------------------------------------------------

    pub fn create_duress_session(&mut self) {
        self.active = true;
        self.session.start("");
        debug!("decoy session started");
    }

    /// True from `create_duress_session` until `end_duress_session`,
    /// even after the decoy session has timed out.
    pub fn is_in_duress_mode(&self) -> bool {
        self.active
    }

    /// A duress session whose inactivity deadline has not passed.
    pub fn is_decoy_live(&mut self) -> bool {
        self.active && self.session.is_live()
    }

    pub fn end_duress_session(&mut self) {
        self.active = false;
        self.session.end();
    }

    /// Poll the decoy session's timer; `true` if this call expired it.
    pub fn tick(&mut self) -> bool {
        self.active && self.session.tick()
    }

    pub fn set_auto_lock(&mut self, timeout: std::time::Duration) {
        self.session.set_timeout(timeout);
    }

    pub fn record_activity(&mut self, event: ActivityEvent) -> bool {
        self.active && self.session.record_activity(event)
    }

    // ------------------------------------------------------------------
    // Decoy dataset
    // ------------------------------------------------------------------

    /// The decoy entries, seeding plausible defaults on first access.
    pub fn decoy_entries(&self) -> Result<Vec<PasswordEntry>> {
        if let Some(entries) = load_json(self.store.as_ref(), Slot::DecoyVault)? {
            return Ok(entries);
        }
        let seeded = seed_decoy_entries()?;
        save_json(self.store.as_ref(), Slot::DecoyVault, &seeded)?;
        Ok(seeded)
    }

    /// Case-insensitive search over the decoy dataset.
    pub fn search_decoy(&self, query: &str) -> Result<Vec<PasswordEntry>> {
        let needle = query.trim().to_lowercase();
        let entries = self.decoy_entries()?;
        if needle.is_empty() {
            return Ok(entries);
        }
        Ok(entries.into_iter().filter(|e| e.matches(&needle)).collect())
    }

    fn record(&self) -> Result<Option<DuressRecord>> {
        load_json(self.store.as_ref(), Slot::DuressSettings)
    }
}

fn seed_decoy_entries() -> Result<Vec<PasswordEntry>> {
    let now = Utc::now();
    let samples = [
        ("Email", "j.miller84@mailbox.org", "https://mailbox.org", "Personal", 210),
        ("Streaming", "jmiller", "https://www.netflix.com", "Entertainment", 95),
        ("Grocery delivery", "j.miller84@mailbox.org", "https://www.instacart.com", "Shopping", 40),
        ("Library card", "2938 0041 7720", "https://catalog.citylibrary.org", "Personal", 400),
    ];

    samples
        .into_iter()
        .map(|(title, username, url, category, age_days)| -> Result<PasswordEntry> {
            let mut new = NewEntry::new(
                title,
                username,
                &generate_password(12, CharClasses::ALL)?,
                url,
            );
            new.category = Some(category.to_string());
            let mut entry = new.into_entry(now - Duration::days(age_days));
            entry.updated_at = now - Duration::days(age_days / 2);
            Ok(entry)
        })
        .collect()
}
