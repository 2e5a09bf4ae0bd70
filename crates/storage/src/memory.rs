// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process step table.

use crate::{EntryGuard, StepEntry, StepTable, TableError};
use nd_core::{StepKey, StepState};
use parking_lot::{ArcMutexGuard, Mutex, RawMutex};
use std::collections::HashMap;
use std::sync::Arc;

type Slot = Arc<Mutex<StepEntry>>;

/// Step table shared between threads of one process.
///
/// The map lock is only held to find a slot; waiting for an entry happens on
/// the slot's own mutex.
#[derive(Default)]
pub struct MemoryStepTable {
    slots: Mutex<HashMap<StepKey, Slot>>,
}

impl MemoryStepTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}

struct MemoryGuard {
    guard: ArcMutexGuard<RawMutex, StepEntry>,
}

impl EntryGuard for MemoryGuard {
    fn entry(&self) -> &StepEntry {
        &self.guard
    }

    fn set_state(&mut self, state: StepState) -> Result<(), TableError> {
        self.guard.state = state;
        Ok(())
    }

    fn set_exec_name(&mut self, exec_name: &str) -> Result<(), TableError> {
        self.guard.exec_name = exec_name.to_string();
        Ok(())
    }
}

impl StepTable for MemoryStepTable {
    fn insert(&self, entry: StepEntry) -> Result<(), TableError> {
        let key = entry.key();
        let mut slots = self.slots.lock();
        let Some(slot) = slots.get(&key).cloned() else {
            slots.insert(key, Arc::new(Mutex::new(entry)));
            return Ok(());
        };
        drop(slots);
        // replace in place so a current holder keeps excluding us
        *slot.lock() = entry;
        Ok(())
    }

    fn lock_entry(&self, key: StepKey) -> Result<Option<Box<dyn EntryGuard + '_>>, TableError> {
        loop {
            let Some(slot) = self.slots.lock().get(&key).cloned() else {
                return Ok(None);
            };
            let guard = slot.lock_arc();
            // deleted (or deleted and re-inserted) while we waited
            let current = self.slots.lock().get(&key).is_some_and(|s| Arc::ptr_eq(s, &slot));
            if current {
                return Ok(Some(Box::new(MemoryGuard { guard })));
            }
        }
    }

    fn delete(&self, key: StepKey) -> Result<(), TableError> {
        let slot = self.slots.lock().remove(&key).ok_or(TableError::NotFound(key))?;
        // wait out the current holder
        drop(slot.lock());
        Ok(())
    }

    fn keys(&self) -> Result<Vec<StepKey>, TableError> {
        Ok(self.slots.lock().keys().copied().collect())
    }
}
