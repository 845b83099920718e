//! Vault document and password entry types.
//!
//! The whole `Vault` is serialized to JSON and encrypted as one blob, so
//! every mutation rewrites the full document.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::random_id;

/// The decrypted vault document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vault {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Entries in insertion order.
    #[serde(default)]
    pub entries: Vec<PasswordEntry>,
}

impl Vault {
    /// A fresh, empty vault.
    pub fn new(name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: random_id(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
            entries: Vec::new(),
        }
    }

    pub fn find(&self, id: &str) -> Option<&PasswordEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut PasswordEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }
}

/// A single credential stored in the vault.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PasswordEntry {
    pub id: String,
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl PasswordEntry {
    /// Case-insensitive substring match over the searchable fields.
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        let hit = |s: &str| s.to_lowercase().contains(needle);

        hit(&self.title)
            || hit(&self.username)
            || hit(&self.url)
            || self.notes.as_deref().is_some_and(hit)
            || self.category.as_deref().is_some_and(hit)
            || self.tags.iter().any(|t| hit(t))
    }
}

// Keep passwords out of logs and panic messages.
impl fmt::Debug for PasswordEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordEntry")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("url", &self.url)
            .field("category", &self.category)
            .field("tags", &self.tags)
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

/// Input for `VaultStore::add_entry`.
#[derive(Debug, Clone, Default)]
pub struct NewEntry {
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: String,
    pub notes: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewEntry {
    /// Shorthand for the four required fields.
    pub fn new(title: &str, username: &str, password: &str, url: &str) -> Self {
        Self {
            title: title.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            url: url.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn into_entry(self, now: DateTime<Utc>) -> PasswordEntry {
        PasswordEntry {
            id: random_id(),
            title: self.title,
            username: self.username,
            password: self.password,
            url: self.url,
            notes: self.notes,
            category: self.category,
            tags: self.tags,
            created_at: now,
            updated_at: now,
            expires_at: self.expires_at,
        }
    }
}

/// Partial update for `VaultStore::update_entry`.  `None` leaves a
/// field unchanged.
#[derive(Debug, Clone, Default)]
pub struct EntryUpdate {
    pub title: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub url: Option<String>,
    pub notes: Option<Option<String>>,
    pub category: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

impl EntryUpdate {
    /// An update that only replaces the password.
    pub fn password(password: &str) -> Self {
        Self {
            password: Some(password.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn apply(self, entry: &mut PasswordEntry, now: DateTime<Utc>) {
        if let Some(v) = self.title {
            entry.title = v;
        }
        if let Some(v) = self.username {
            entry.username = v;
        }
        if let Some(v) = self.password {
            entry.password = v;
        }
        if let Some(v) = self.url {
            entry.url = v;
        }
        if let Some(v) = self.notes {
            entry.notes = v;
        }
        if let Some(v) = self.category {
            entry.category = v;
        }
        if let Some(v) = self.tags {
            entry.tags = v;
        }
        if let Some(v) = self.expires_at {
            entry.expires_at = v;
        }
        entry.updated_at = now;
    }
}
