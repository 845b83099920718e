#[cfg(feature = "audit-log")]
pub mod audit;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod crypto;
pub mod duress;
pub mod errors;
pub mod links;
pub mod rotation;
pub mod self_destruct;
pub mod sharding;
pub mod stacking;
pub mod storage;
pub mod unlock;
pub mod vault;

pub use errors::{LockboxError, Result};
pub use unlock::{Lockbox, UnlockOutcome};
