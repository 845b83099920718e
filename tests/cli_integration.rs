//! Integration tests for the Lockbox CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Passwords come from `LOCKBOX_PASSWORD` so no prompt is shown, and
//! the debug-build `LOCKBOX_TEST_KDF_ITERATIONS` hook keeps key
//! derivation cheap.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const MASTER: &str = "correct-horse-battery";

/// Helper: get a Command pointing at the lockbox binary.
fn lockbox() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("lockbox").expect("binary should exist");
    cmd.env("LOCKBOX_TEST_KDF_ITERATIONS", "1000");
    cmd
}

/// Helper: an empty project dir.
fn project() -> TempDir {
    TempDir::new().unwrap()
}

/// Helper: a command run inside `dir` with the given master password.
fn in_dir(dir: &TempDir, password: &str) -> Command {
    let mut cmd = lockbox();
    cmd.current_dir(dir.path())
        .env("LOCKBOX_PASSWORD", password)
        .env_remove("LOCKBOX_DIR")
        .env_remove("LOCKBOX_PASSPHRASES");
    cmd
}

fn init(dir: &TempDir) {
    in_dir(dir, MASTER).arg("init").assert().success();
}

#[test]
fn help_flag_shows_usage() {
    lockbox()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Local-first personal secrets vault"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("share"))
        .stdout(predicate::str::contains("shard"))
        .stdout(predicate::str::contains("rotate"))
        .stdout(predicate::str::contains("self-destruct"))
        .stdout(predicate::str::contains("duress"));
}

#[test]
fn version_flag_shows_version() {
    lockbox()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lockbox"));
}

#[test]
fn no_args_shows_help() {
    lockbox()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn generate_prints_a_password_of_the_requested_length() {
    let out = lockbox()
        .args(["generate", "--length", "24"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(String::from_utf8(out).unwrap().trim().chars().count(), 24);
}

#[test]
fn generate_with_no_classes_fails() {
    lockbox()
        .args([
            "generate",
            "--no-lowercase",
            "--no-uppercase",
            "--no-digits",
            "--no-symbols",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("character class"));
}

#[test]
fn strength_reports_label() {
    lockbox()
        .args(["strength", "abc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("weak"));
    lockbox()
        .args(["strength", "Zq8!mV3#pL0@xR7$"])
        .assert()
        .success()
        .stdout(predicate::str::contains("strong"));
}

#[test]
fn list_on_missing_vault_fails() {
    let tmp = project();
    in_dir(&tmp, MASTER)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No vault exists"));
}

#[test]
fn init_twice_fails() {
    let tmp = project();
    init(&tmp);
    tmp.child(".lockbox/vault.lbx").assert(predicate::path::exists());
    in_dir(&tmp, MASTER)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn init_rejects_short_password() {
    let tmp = project();
    in_dir(&tmp, "short")
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8"));
}

#[test]
fn init_warns_about_a_weak_master_password() {
    let tmp = project();
    in_dir(&tmp, "aaaaaaaa")
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("weak"))
        .stderr(predicate::str::contains("master password is weak"));

    let strong = project();
    in_dir(&strong, "Tr0ub4dor&3-horse")
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("strong"))
        .stderr(predicate::str::contains("is weak").not());
}

#[test]
fn add_list_get_rm_workflow() {
    let tmp = project();
    init(&tmp);

    in_dir(&tmp, MASTER)
        .args(["add", "GitHub", "-u", "octo", "--url", "https://github.com", "-p", "s3cret!"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 'GitHub'"));

    in_dir(&tmp, MASTER)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("GitHub"))
        .stdout(predicate::str::contains("octo"))
        .stdout(predicate::str::contains("s3cret!").not());

    in_dir(&tmp, MASTER)
        .args(["get", "github"])
        .assert()
        .success()
        .stdout(predicate::str::contains("s3cret!"));

    in_dir(&tmp, MASTER)
        .args(["search", "GIT"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 match"));

    in_dir(&tmp, MASTER)
        .args(["rm", "GitHub", "--force"])
        .assert()
        .success();

    in_dir(&tmp, MASTER)
        .args(["get", "GitHub"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn wrong_password_fails() {
    let tmp = project();
    init(&tmp);
    in_dir(&tmp, "wrong-password")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Decryption failed"));
}

#[test]
fn self_destruct_wipes_after_max_failures() {
    let tmp = project();
    init(&tmp);
    in_dir(&tmp, MASTER)
        .args(["self-destruct", "2"])
        .assert()
        .success();

    in_dir(&tmp, "wrong-password")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 attempt(s) left"));
    in_dir(&tmp, "wrong-password")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("wiped"));

    tmp.child(".lockbox/vault.lbx").assert(predicate::path::missing());
    in_dir(&tmp, MASTER)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No vault exists"));
}

#[test]
fn share_link_opens_once() {
    let tmp = project();
    init(&tmp);
    in_dir(&tmp, MASTER)
        .args(["add", "Wifi", "-p", "guest-pass-42"])
        .assert()
        .success();

    let out = in_dir(&tmp, MASTER)
        .args(["share", "Wifi", "--ttl", "10"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(out).unwrap();
    let link = stdout.lines().last().unwrap().trim().to_string();
    assert!(link.contains('#'));

    // Opening a link needs no master password.
    lockbox()
        .current_dir(tmp.path())
        .env_remove("LOCKBOX_PASSWORD")
        .args(["open-link", &link])
        .assert()
        .success()
        .stdout(predicate::str::contains("guest-pass-42"));

    lockbox()
        .current_dir(tmp.path())
        .args(["open-link", &link])
        .assert()
        .failure();
}

#[test]
fn backup_and_restore_roundtrip() {
    let tmp = project();
    init(&tmp);
    in_dir(&tmp, MASTER)
        .args(["add", "Bank", "-p", "n0t-telling"])
        .assert()
        .success();
    in_dir(&tmp, MASTER)
        .args(["backup", "-o", "vault-backup.lbx"])
        .assert()
        .success();

    let other = project();
    std::fs::copy(
        tmp.path().join("vault-backup.lbx"),
        other.path().join("vault-backup.lbx"),
    )
    .unwrap();

    in_dir(&other, MASTER)
        .args(["restore", "vault-backup.lbx", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 entries"));
    in_dir(&other, MASTER)
        .args(["get", "Bank"])
        .assert()
        .success()
        .stdout(predicate::str::contains("n0t-telling"));
}

#[test]
fn restore_with_wrong_password_fails() {
    let tmp = project();
    init(&tmp);
    in_dir(&tmp, MASTER)
        .args(["backup", "-o", "b.lbx"])
        .assert()
        .success();
    in_dir(&tmp, "not-the-password")
        .args(["restore", "b.lbx", "--force"])
        .assert()
        .failure();
}

#[test]
fn duress_password_shows_decoy_entries() {
    let tmp = project();
    init(&tmp);
    in_dir(&tmp, MASTER)
        .args(["add", "Offshore", "-p", "real-secret"])
        .assert()
        .success();
    in_dir(&tmp, MASTER)
        .env("LOCKBOX_DURESS_PASSWORD", "coerced-pass")
        .args(["duress", "set"])
        .assert()
        .success();

    in_dir(&tmp, "coerced-pass")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Offshore").not());
}

#[test]
fn stacked_passphrases_are_required() {
    let tmp = project();
    init(&tmp);
    in_dir(&tmp, MASTER)
        .args(["stack", "enable", "first phrase", "second phrase"])
        .assert()
        .success();

    in_dir(&tmp, MASTER)
        .env("LOCKBOX_PASSPHRASES", "second phrase")
        .arg("list")
        .assert()
        .failure();

    in_dir(&tmp, MASTER)
        .env("LOCKBOX_PASSPHRASES", "second phrase,first phrase")
        .arg("list")
        .assert()
        .success();
}

#[test]
fn shard_split_and_combine() {
    let tmp = project();
    init(&tmp);
    in_dir(&tmp, MASTER)
        .args(["add", "Example", "-p", "x"])
        .assert()
        .success();
    in_dir(&tmp, MASTER)
        .args(["shard", "split", "--shards", "3", "--output", "shards"])
        .assert()
        .success();

    let mut files: Vec<String> = std::fs::read_dir(tmp.path().join("shards"))
        .unwrap()
        .map(|e| e.unwrap().path().display().to_string())
        .collect();
    files.sort();
    assert_eq!(files.len(), 3);

    let other = project();
    in_dir(&other, MASTER)
        .args(["shard", "combine"])
        .args(&files[..2])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Incomplete shard set"));

    in_dir(&other, MASTER)
        .args(["shard", "combine"])
        .args(&files)
        .assert()
        .success();
    in_dir(&other, MASTER)
        .args(["get", "Example"])
        .assert()
        .success()
        .stdout(predicate::str::contains("x"));
}

#[test]
fn rotate_check_lists_weak_passwords() {
    let tmp = project();
    init(&tmp);
    in_dir(&tmp, MASTER)
        .args(["add", "Old Forum", "-p", "abc"])
        .assert()
        .success();

    in_dir(&tmp, MASTER)
        .args(["rotate", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Old Forum"));

    in_dir(&tmp, MASTER)
        .args(["rotate", "--enable"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rotated 1"));

    in_dir(&tmp, MASTER)
        .args(["rotate", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No passwords need rotation"));
}

#[cfg(feature = "audit-log")]
#[test]
fn audit_records_failed_unlocks() {
    let tmp = project();
    init(&tmp);
    let _ = in_dir(&tmp, "wrong-password").arg("list").assert().failure();

    in_dir(&tmp, MASTER)
        .arg("audit")
        .assert()
        .success()
        .stdout(predicate::str::contains("unlock_failed"))
        .stdout(predicate::str::contains("vault_created"));
}
