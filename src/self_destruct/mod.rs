//! Self-destruct on repeated failed unlocks.
//!
//! A persisted counter tracks consecutive failures.  When `max_attempts`
//! is non-zero and the counter reaches it, every vault slot is removed
//! and the guard reports `Triggered`.  A successful unlock resets the
//! counter to zero.  `max_attempts == 0` disables the guard.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::errors::Result;
use crate::storage::{load_json, save_json, Slot, SlotStore};

/// Persisted counter state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfDestructState {
    pub failed_attempts: u32,
    /// Zero means disabled.
    pub max_attempts: u32,
}

/// Result of recording a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The guard is disabled; nothing to count against.
    Disabled,
    /// Still below the threshold.
    Counted { failed: u32, remaining: u32 },
    /// Threshold reached: all vault storage has been wiped.
    Triggered,
}

impl AttemptOutcome {
    pub fn is_triggered(&self) -> bool {
        matches!(self, Self::Triggered)
    }
}

pub struct SelfDestructGuard {
    store: Arc<dyn SlotStore>,
}

impl SelfDestructGuard {
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self { store }
    }

    pub fn state(&self) -> Result<SelfDestructState> {
        Ok(load_json(self.store.as_ref(), Slot::SelfDestruct)?.unwrap_or_default())
    }

    /// Set the threshold (0 disables).  The running count is kept.
    pub fn configure(&self, max_attempts: u32) -> Result<()> {
        let mut state = self.state()?;
        state.max_attempts = max_attempts;
        save_json(self.store.as_ref(), Slot::SelfDestruct, &state)
    }

    /// Count one failed unlock; wipe if the threshold is reached.
    pub fn record_failed_attempt(&self) -> Result<AttemptOutcome> {
        let mut state = self.state()?;
        state.failed_attempts = state.failed_attempts.saturating_add(1);

        if state.max_attempts == 0 {
            save_json(self.store.as_ref(), Slot::SelfDestruct, &state)?;
            return Ok(AttemptOutcome::Disabled);
        }

        if state.failed_attempts >= state.max_attempts {
            self.wipe()?;
            return Ok(AttemptOutcome::Triggered);
        }

        save_json(self.store.as_ref(), Slot::SelfDestruct, &state)?;
        let remaining = state.max_attempts - state.failed_attempts;
        warn!(failed = state.failed_attempts, remaining, "failed unlock attempt");
        Ok(AttemptOutcome::Counted {
            failed: state.failed_attempts,
            remaining,
        })
    }

    /// Reset the counter after a successful unlock.
    pub fn record_successful_login(&self) -> Result<()> {
        let mut state = self.state()?;
        if state.failed_attempts == 0 {
            return Ok(());
        }
        state.failed_attempts = 0;
        save_json(self.store.as_ref(), Slot::SelfDestruct, &state)
    }

    /// Remove every vault-related slot, including this guard's own state.
    fn wipe(&self) -> Result<()> {
        for slot in Slot::ALL {
            self.store.remove(slot)?;
        }
        error!("self-destruct triggered: vault storage wiped");
        Ok(())
    }
}
