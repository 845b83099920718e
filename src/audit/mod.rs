//! Security-event log backed by SQLite.
//!
//! Records unlock failures, wipes, link accesses, rotations and other
//! vault events in `<data_dir>/audit.db`.  Duress unlocks are never
//! recorded: the log must not reveal that a decoy session happened.
//!
//! Logging degrades gracefully: if the database can't be opened or
//! written to, the vault operation carries on without a record.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::errors::{LockboxError, Result};

/// Kinds of recorded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEvent {
    VaultCreated,
    Unlocked,
    UnlockFailed,
    Wiped,
    EntryAdded,
    EntryDeleted,
    SecretRevealed,
    BackupCreated,
    BackupRestored,
    PasswordChanged,
    LinkCreated,
    LinkAccessed,
    VaultSplit,
    ShardsCombined,
    PasswordsRotated,
    SettingsChanged,
}

impl SecurityEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VaultCreated => "vault_created",
            Self::Unlocked => "unlocked",
            Self::UnlockFailed => "unlock_failed",
            Self::Wiped => "wiped",
            Self::EntryAdded => "entry_added",
            Self::EntryDeleted => "entry_deleted",
            Self::SecretRevealed => "secret_revealed",
            Self::BackupCreated => "backup_created",
            Self::BackupRestored => "backup_restored",
            Self::PasswordChanged => "password_changed",
            Self::LinkCreated => "link_created",
            Self::LinkAccessed => "link_accessed",
            Self::VaultSplit => "vault_split",
            Self::ShardsCombined => "shards_combined",
            Self::PasswordsRotated => "passwords_rotated",
            Self::SettingsChanged => "settings_changed",
        }
    }
}

impl fmt::Display for SecurityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single audit log entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub event: String,
    pub subject: Option<String>,
    pub details: Option<String>,
}

/// SQLite-backed audit log.
pub struct AuditLog {
    conn: Connection,
}

impl AuditLog {
    /// Open (or create) the audit database at `<data_dir>/audit.db`.
    ///
    /// Returns `None` if the database can't be opened; callers treat
    /// this as "audit logging unavailable" and continue normally.
    pub fn open(data_dir: &Path) -> Option<Self> {
        let db_path = Self::db_path(data_dir);
        let conn = Connection::open(&db_path).ok()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&db_path, perms);
        }

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS security_events (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                event     TEXT NOT NULL,
                subject   TEXT,
                details   TEXT
            );",
        )
        .ok()?;

        Some(Self { conn })
    }

    /// Record an event.  Errors are ignored.
    pub fn log(&self, event: SecurityEvent, subject: Option<&str>, details: Option<&str>) {
        let now = Utc::now().to_rfc3339();
        let _ = self.conn.execute(
            "INSERT INTO security_events (timestamp, event, subject, details)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![now, event.as_str(), subject, details],
        );
    }

    /// Most recent events first, at most `limit` of them.
    pub fn recent(&self, limit: usize) -> Result<Vec<AuditEntry>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, timestamp, event, subject, details
                 FROM security_events
                 ORDER BY id DESC
                 LIMIT ?1",
            )
            .map_err(|e| LockboxError::AuditError(format!("query prepare: {e}")))?;

        let rows = stmt
            .query_map([limit], |row| {
                let ts: String = row.get(1)?;
                let timestamp = DateTime::parse_from_rfc3339(&ts)
                    .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));
                Ok(AuditEntry {
                    id: row.get(0)?,
                    timestamp,
                    event: row.get(2)?,
                    subject: row.get(3)?,
                    details: row.get(4)?,
                })
            })
            .map_err(|e| LockboxError::AuditError(format!("query exec: {e}")))?;

        rows.map(|r| r.map_err(|e| LockboxError::AuditError(format!("row parse: {e}"))))
            .collect()
    }

    pub fn db_path(data_dir: &Path) -> PathBuf {
        data_dir.join("audit.db")
    }
}

/// Open the log under `data_dir`, record one event and close it.
/// Never fails the calling operation.
pub fn record(data_dir: &Path, event: SecurityEvent, subject: Option<&str>, details: Option<&str>) {
    if let Some(audit) = AuditLog::open(data_dir) {
        audit.log(event, subject, details);
    }
}
