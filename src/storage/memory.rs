//! In-memory slot store, used by tests and embedders that persist
//! elsewhere.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{Slot, SlotStore};
use crate::errors::{LockboxError, Result};

#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<Slot, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> LockboxError {
    LockboxError::Storage("memory store lock poisoned".into())
}

impl SlotStore for MemoryStore {
    fn get(&self, slot: Slot) -> Result<Option<String>> {
        let slots = self.slots.lock().map_err(|_| poisoned())?;
        Ok(slots.get(&slot).cloned())
    }

    fn set(&self, slot: Slot, value: &str) -> Result<()> {
        let mut slots = self.slots.lock().map_err(|_| poisoned())?;
        slots.insert(slot, value.to_string());
        Ok(())
    }

    fn remove(&self, slot: Slot) -> Result<()> {
        let mut slots = self.slots.lock().map_err(|_| poisoned())?;
        slots.remove(&slot);
        Ok(())
    }
}
