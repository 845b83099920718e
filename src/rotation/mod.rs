//! Policy-driven password rotation.
//!
//! An entry is flagged when its password is at least `interval_days` old
//! (measured from the entry's `updated_at`) or scores below
//! `min_strength`.  Ids in `excluded_ids` are never flagged.  The
//! flagged set is computed on demand and never stored.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::crypto::{generate_password, strength, CharClasses};
use crate::errors::Result;
use crate::storage::{load_json, save_json, Slot, SlotStore};
use crate::vault::{EntryUpdate, PasswordEntry, VaultStore};

/// Length of generated replacement passwords.
pub const ROTATED_LENGTH: usize = 16;

/// Rotation policy, stored as plain JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RotationSettings {
    pub enabled: bool,
    pub interval_days: u32,
    pub min_strength: u8,
    pub excluded_ids: Vec<String>,
    pub last_rotation: Option<DateTime<Utc>>,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_days: 90,
            min_strength: 70,
            excluded_ids: Vec::new(),
            last_rotation: None,
        }
    }
}

/// Why an entry was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationReason {
    Age { days: i64 },
    Weak { score: u8 },
}

#[derive(Debug, Clone)]
pub struct RotationCandidate {
    pub entry_id: String,
    pub title: String,
    pub reasons: Vec<RotationReason>,
}

/// Reasons `entry` should be rotated under `settings`; empty if none.
pub fn needs_rotation(
    entry: &PasswordEntry,
    settings: &RotationSettings,
    now: DateTime<Utc>,
) -> Vec<RotationReason> {
    if settings.excluded_ids.iter().any(|id| *id == entry.id) {
        return Vec::new();
    }

    let mut reasons = Vec::new();
    let age = now - entry.updated_at;
    if age >= Duration::days(i64::from(settings.interval_days)) {
        reasons.push(RotationReason::Age {
            days: age.num_days(),
        });
    }
    let score = strength(&entry.password);
    if score < settings.min_strength {
        reasons.push(RotationReason::Weak { score });
    }
    reasons
}

/// Every entry that needs rotation, in vault order.
pub fn passwords_needing_rotation(
    entries: &[PasswordEntry],
    settings: &RotationSettings,
    now: DateTime<Utc>,
) -> Vec<RotationCandidate> {
    entries
        .iter()
        .filter_map(|entry| {
            let reasons = needs_rotation(entry, settings, now);
            (!reasons.is_empty()).then(|| RotationCandidate {
                entry_id: entry.id.clone(),
                title: entry.title.clone(),
                reasons,
            })
        })
        .collect()
}

/// Result of a batch rotation.
#[derive(Debug, Default)]
pub struct RotationReport {
    pub rotated: Vec<String>,
    /// `(entry id, error message)` for each entry that could not be rotated.
    pub failed: Vec<(String, String)>,
}

pub struct PasswordRotator {
    store: Arc<dyn SlotStore>,
}

impl PasswordRotator {
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self { store }
    }

    pub fn settings(&self) -> Result<RotationSettings> {
        Ok(load_json(self.store.as_ref(), Slot::RotationSettings)?.unwrap_or_default())
    }

    pub fn save_settings(&self, settings: &RotationSettings) -> Result<()> {
        save_json(self.store.as_ref(), Slot::RotationSettings, settings)
    }

    pub fn get_passwords_needing_rotation(
        &self,
        vault: &mut VaultStore,
    ) -> Result<Vec<RotationCandidate>> {
        let settings = self.settings()?;
        let entries = vault.get_all_entries()?;
        Ok(passwords_needing_rotation(&entries, &settings, Utc::now()))
    }

    /// Replace one entry's password with a fresh 16-character password
    /// drawn from all four classes.
    pub fn rotate_password(&self, vault: &mut VaultStore, entry_id: &str) -> Result<PasswordEntry> {
        let password = generate_password(ROTATED_LENGTH, CharClasses::ALL)?;
        vault.update_entry(entry_id, EntryUpdate::password(&password))
    }

    /// Rotate every flagged entry, carrying on past individual failures.
    ///
    /// Does nothing while the policy is disabled.  `last_rotation` is
    /// only advanced when at least one rotation succeeded.
    pub fn perform_auto_rotation(&self, vault: &mut VaultStore) -> Result<RotationReport> {
        let mut settings = self.settings()?;
        let mut report = RotationReport::default();
        if !settings.enabled {
            return Ok(report);
        }

        for candidate in self.get_passwords_needing_rotation(vault)? {
            match self.rotate_password(vault, &candidate.entry_id) {
                Ok(_) => report.rotated.push(candidate.entry_id),
                Err(e) => {
                    warn!(entry_id = %candidate.entry_id, error = %e, "rotation failed");
                    report.failed.push((candidate.entry_id, e.to_string()));
                }
            }
        }

        if !report.rotated.is_empty() {
            settings.last_rotation = Some(Utc::now());
            self.save_settings(&settings)?;
        }
        info!(
            rotated = report.rotated.len(),
            failed = report.failed.len(),
            "auto-rotation finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::kdf::MIN_ITERATIONS;
    use crate::crypto::{PasswordCodec, Pbkdf2Sha256};
    use crate::storage::MemoryStore;
    use crate::vault::NewEntry;

    const STRONG: &str = "Zq8!mV3#pL0@xR7$";

    fn entry(id: &str, password: &str, age_days: i64) -> PasswordEntry {
        let updated = Utc::now() - Duration::days(age_days);
        PasswordEntry {
            id: id.into(),
            title: id.into(),
            username: "u".into(),
            password: password.into(),
            url: String::new(),
            notes: None,
            category: None,
            tags: Vec::new(),
            created_at: updated,
            updated_at: updated,
            expires_at: None,
        }
    }

    fn policy() -> RotationSettings {
        RotationSettings {
            enabled: true,
            interval_days: 30,
            min_strength: 70,
            ..RotationSettings::default()
        }
    }

    #[test]
    fn old_strong_entry_is_flagged_for_age() {
        let reasons = needs_rotation(&entry("a", STRONG, 45), &policy(), Utc::now());
        assert!(matches!(reasons.as_slice(), [RotationReason::Age { days: 45 }]));
    }

    #[test]
    fn new_weak_entry_is_flagged_for_strength() {
        let reasons = needs_rotation(&entry("a", "abc", 1), &policy(), Utc::now());
        assert!(matches!(reasons.as_slice(), [RotationReason::Weak { .. }]));
    }

    #[test]
    fn new_strong_entry_is_not_flagged() {
        assert!(needs_rotation(&entry("a", STRONG, 1), &policy(), Utc::now()).is_empty());
    }

    #[test]
    fn excluded_ids_are_never_flagged() {
        let mut settings = policy();
        settings.excluded_ids.push("a".into());
        assert!(needs_rotation(&entry("a", "abc", 400), &settings, Utc::now()).is_empty());
    }

    #[test]
    fn settings_default_when_slot_is_empty() {
        let rotator = PasswordRotator::new(Arc::new(MemoryStore::new()));
        assert_eq!(rotator.settings().unwrap(), RotationSettings::default());
    }

    fn unlocked_vault(store: Arc<MemoryStore>) -> VaultStore {
        let codec = PasswordCodec::new(Pbkdf2Sha256::with_iterations(MIN_ITERATIONS).unwrap());
        let mut vault = VaultStore::new(store, Arc::new(codec), std::time::Duration::from_secs(300));
        vault.create_vault("master", "Personal").unwrap();
        vault
    }

    #[test]
    fn auto_rotation_rotates_weak_entries() {
        let store = Arc::new(MemoryStore::new());
        let mut vault = unlocked_vault(store.clone());
        let weak = vault.add_entry(NewEntry::new("Weak", "u", "abc", "")).unwrap();
        let strong = vault.add_entry(NewEntry::new("Strong", "u", STRONG, "")).unwrap();

        let rotator = PasswordRotator::new(store);
        rotator.save_settings(&policy()).unwrap();

        let report = rotator.perform_auto_rotation(&mut vault).unwrap();
        assert_eq!(report.rotated, vec![weak.id.clone()]);
        assert!(report.failed.is_empty());

        let rotated = vault.get_entry(&weak.id).unwrap();
        assert_eq!(rotated.password.len(), ROTATED_LENGTH);
        assert_ne!(rotated.password, "abc");
        assert_eq!(vault.get_entry(&strong.id).unwrap().password, STRONG);
        assert!(rotator.settings().unwrap().last_rotation.is_some());
    }

    #[test]
    fn nothing_to_rotate_keeps_last_rotation() {
        let store = Arc::new(MemoryStore::new());
        let mut vault = unlocked_vault(store.clone());
        vault.add_entry(NewEntry::new("Strong", "u", STRONG, "")).unwrap();

        let rotator = PasswordRotator::new(store);
        rotator.save_settings(&policy()).unwrap();

        let report = rotator.perform_auto_rotation(&mut vault).unwrap();
        assert!(report.rotated.is_empty());
        assert!(rotator.settings().unwrap().last_rotation.is_none());
    }

    #[test]
    fn disabled_policy_does_nothing() {
        let store = Arc::new(MemoryStore::new());
        let mut vault = unlocked_vault(store.clone());
        vault.add_entry(NewEntry::new("Weak", "u", "abc", "")).unwrap();

        let rotator = PasswordRotator::new(store);
        let report = rotator.perform_auto_rotation(&mut vault).unwrap();
        assert!(report.rotated.is_empty() && report.failed.is_empty());
    }
}
