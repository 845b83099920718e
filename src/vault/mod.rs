//! Vault module: encrypted credential storage.
//!
//! This module provides:
//! - `Vault`, `PasswordEntry` and the entry input types (`model`)
//! - The lock/unlock `Session` with its inactivity timer (`session`)
//! - High-level `VaultStore` for creating, unlocking and editing (`store`)

pub mod model;
pub mod session;
pub mod store;

// Re-export the most commonly used items.
pub use model::{EntryUpdate, NewEntry, PasswordEntry, Vault};
pub use session::{ActivityEvent, Session, DEFAULT_AUTO_LOCK};
pub use store::VaultStore;
