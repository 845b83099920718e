//! Integration tests for the Lockbox vault module.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use lockbox::crypto::kdf::MIN_ITERATIONS;
use lockbox::crypto::{PasswordCodec, Pbkdf2Sha256};
use lockbox::errors::LockboxError;
use lockbox::storage::{FileStore, Slot, SlotStore};
use lockbox::config::Settings;
use lockbox::vault::{ActivityEvent, EntryUpdate, NewEntry, VaultStore};
use lockbox::{Lockbox, UnlockOutcome};
use tempfile::TempDir;

/// Helper: a vault store on disk inside a fresh temp dir.
fn file_vault() -> (TempDir, Arc<FileStore>, VaultStore) {
    let dir = TempDir::new().expect("create temp dir");
    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    let vault = open_on(store.clone(), Duration::from_secs(300));
    (dir, store, vault)
}

fn open_on(store: Arc<FileStore>, auto_lock: Duration) -> VaultStore {
    let codec = PasswordCodec::new(Pbkdf2Sha256::with_iterations(MIN_ITERATIONS).unwrap());
    VaultStore::new(store, Arc::new(codec), auto_lock)
}

// ---------------------------------------------------------------------------
// Create, lock and re-open
// ---------------------------------------------------------------------------

#[test]
fn scenario_create_add_lock_unlock() {
    let (_dir, _store, mut vault) = file_vault();

    vault.create_vault("Tr0ub4dor&3", "Personal").unwrap();
    vault
        .add_entry(NewEntry::new("Example", "a@b.com", "x", "https://e.com"))
        .unwrap();
    vault.lock();

    assert!(vault.unlock("Tr0ub4dor&3").unwrap());
    let entries = vault.get_all_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Example");
}

#[test]
fn reopen_from_disk_with_a_new_handle() {
    let (_dir, store, mut vault) = file_vault();
    vault.create_vault("pw-123456", "Personal").unwrap();
    vault
        .add_entry(NewEntry::new("GitHub", "octo", "s3cret", "https://github.com"))
        .unwrap();
    drop(vault);

    let mut reopened = open_on(store, Duration::from_secs(300));
    assert!(!reopened.is_unlocked());
    assert!(reopened.unlock("pw-123456").unwrap());
    assert_eq!(reopened.get_all_entries().unwrap()[0].password, "s3cret");
}

#[test]
fn wrong_password_returns_false_and_stays_locked() {
    let (_dir, _store, mut vault) = file_vault();
    vault.create_vault("right", "Personal").unwrap();
    vault.lock();

    assert!(!vault.unlock("wrong").unwrap());
    assert!(!vault.is_unlocked());
    assert!(matches!(vault.get_all_entries(), Err(LockboxError::VaultLocked)));
}

#[test]
fn vault_slot_is_an_encrypted_blob() {
    let (_dir, store, mut vault) = file_vault();
    vault.create_vault("pw", "Personal").unwrap();
    vault
        .add_entry(NewEntry::new("Bank", "alice", "hunter2", ""))
        .unwrap();

    let raw = fs::read_to_string(store.slot_path(Slot::Vault)).unwrap();
    assert!(!raw.contains("hunter2"));
    assert!(!raw.contains("Bank"));
}

// ---------------------------------------------------------------------------
// Entry operations
// ---------------------------------------------------------------------------

#[test]
fn update_refreshes_updated_at_and_keeps_other_fields() {
    let (_dir, _store, mut vault) = file_vault();
    vault.create_vault("pw", "Personal").unwrap();
    let added = vault
        .add_entry(NewEntry::new("Mail", "me", "old", "https://mail"))
        .unwrap();

    let updated = vault
        .update_entry(&added.id, EntryUpdate::password("new"))
        .unwrap();
    assert_eq!(updated.password, "new");
    assert_eq!(updated.title, "Mail");
    assert!(updated.updated_at >= added.updated_at);
    assert_eq!(vault.get_entry(&added.id).unwrap().password, "new");
}

#[test]
fn delete_removes_entry() {
    let (_dir, _store, mut vault) = file_vault();
    vault.create_vault("pw", "Personal").unwrap();
    let a = vault.add_entry(NewEntry::new("A", "", "1", "")).unwrap();
    vault.add_entry(NewEntry::new("B", "", "2", "")).unwrap();

    vault.delete_entry(&a.id).unwrap();
    assert_eq!(vault.entry_count().unwrap(), 1);
    assert!(matches!(vault.get_entry(&a.id), Err(LockboxError::NotFound(_))));
}

#[test]
fn search_is_case_insensitive_and_empty_query_returns_all() {
    let (_dir, _store, mut vault) = file_vault();
    vault.create_vault("pw", "Personal").unwrap();

    let mut work = NewEntry::new("Jira", "alice", "x", "https://corp.atlassian.net");
    work.tags = vec!["Work".into()];
    vault.add_entry(work).unwrap();
    vault
        .add_entry(NewEntry::new("Netflix", "alice", "y", "https://netflix.com"))
        .unwrap();

    assert_eq!(vault.search_entries("ATLASSIAN").unwrap().len(), 1);
    assert_eq!(vault.search_entries("work").unwrap()[0].title, "Jira");
    assert_eq!(vault.search_entries("alice").unwrap().len(), 2);
    assert_eq!(vault.search_entries("").unwrap().len(), 2);
    assert!(vault.search_entries("nothing").unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Backup, restore and password change
// ---------------------------------------------------------------------------

#[test]
fn backup_restores_into_a_fresh_installation() {
    let (_dir, _store, mut vault) = file_vault();
    vault.create_vault("pw", "Personal").unwrap();
    vault.add_entry(NewEntry::new("A", "", "1", "")).unwrap();
    let backup = vault.create_backup().unwrap();

    let (_dir2, _store2, mut fresh) = file_vault();
    let restored = fresh.restore_backup(&backup, "pw").unwrap();
    assert_eq!(restored.entries.len(), 1);
    assert!(fresh.is_unlocked());
    assert_eq!(fresh.get_all_entries().unwrap()[0].title, "A");
}

#[test]
fn restore_with_wrong_password_leaves_existing_vault() {
    let (_dir, store, mut vault) = file_vault();
    vault.create_vault("pw", "Personal").unwrap();
    vault.add_entry(NewEntry::new("Keep", "", "1", "")).unwrap();
    let before = store.get(Slot::Vault).unwrap();

    let (_other_dir, _other_store, mut other) = file_vault();
    other.create_vault("other", "Other").unwrap();
    let foreign = other.create_backup().unwrap();

    assert!(matches!(
        vault.restore_backup(&foreign, "pw"),
        Err(LockboxError::DecryptionFailed)
    ));
    assert!(matches!(
        vault.restore_backup("corrupt", "pw"),
        Err(LockboxError::DecryptionFailed)
    ));
    assert_eq!(store.get(Slot::Vault).unwrap(), before);
}

#[test]
fn change_password_rekeys_the_vault() {
    let (_dir, _store, mut vault) = file_vault();
    vault.create_vault("old-pass", "Personal").unwrap();
    vault.add_entry(NewEntry::new("A", "", "1", "")).unwrap();

    vault.change_password("old-pass", "new-pass").unwrap();
    vault.lock();

    assert!(!vault.unlock("old-pass").unwrap());
    assert!(vault.unlock("new-pass").unwrap());
    assert_eq!(vault.entry_count().unwrap(), 1);
}

#[test]
fn change_password_requires_current_password() {
    let (_dir, _store, mut vault) = file_vault();
    vault.create_vault("old-pass", "Personal").unwrap();
    assert!(matches!(
        vault.change_password("nope", "new-pass"),
        Err(LockboxError::DecryptionFailed)
    ));
}

// ---------------------------------------------------------------------------
// Inactivity auto-lock
// ---------------------------------------------------------------------------

#[test]
fn idle_session_locks_itself() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    let mut vault = open_on(store, Duration::from_millis(100));
    vault.create_vault("pw", "Personal").unwrap();

    std::thread::sleep(Duration::from_millis(250));
    assert!(vault.tick(), "timer should fire after the timeout");
    assert!(!vault.is_unlocked());
    assert!(!vault.record_activity(ActivityEvent::Pointer));
}

#[test]
fn lock_is_idempotent() {
    let (_dir, _store, mut vault) = file_vault();
    vault.create_vault("pw", "Personal").unwrap();
    vault.lock();
    vault.lock();
    assert!(!vault.is_unlocked());
}

#[test]
fn project_file_cannot_change_the_kdf_cost() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join(".lockbox.toml");
    fs::write(&config, "kdf_iterations = 1000\n").unwrap();

    let settings = Settings::load(dir.path()).unwrap();
    let mut lb = Lockbox::open(&settings, dir.path()).unwrap();
    lb.create_vault("Tr0ub4dor&3", "Personal").unwrap();
    lb.lock();

    // Same installation, no project file: the vault must still open.
    fs::remove_file(&config).unwrap();
    let settings = Settings::load(dir.path()).unwrap();
    let mut lb = Lockbox::open(&settings, dir.path()).unwrap();
    assert_eq!(lb.unlock("Tr0ub4dor&3").unwrap(), UnlockOutcome::Unlocked);
}
