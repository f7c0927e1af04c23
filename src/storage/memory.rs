//! In-memory persistence with fault injection.
//!
//! Stands in for a real backend in tests and embedded setups. Faults can be
//! injected per operation to exercise the engine's degrade-to-memory path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::RecordPersistence;
use crate::core::ActorRecordSet;
use crate::error::{CooldownError, Result};

/// Which operations fail while a fault is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// `exists` and `load` fail.
    Read,
    /// `save` fails.
    Write,
    /// Every operation fails.
    All,
}

#[derive(Debug, Default)]
pub struct MemoryPersistence {
    sets: Mutex<HashMap<String, ActorRecordSet>>,
    fault: Mutex<Option<FaultKind>>,
    loads: AtomicUsize,
    saves: AtomicUsize,
}

impl MemoryPersistence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a stored set.
    #[must_use]
    pub fn with_set(self, key: &str, records: ActorRecordSet) -> Self {
        self.sets.lock().insert(key.to_string(), records);
        self
    }

    pub fn inject_fault(&self, fault: FaultKind) {
        *self.fault.lock() = Some(fault);
    }

    pub fn clear_fault(&self) {
        *self.fault.lock() = None;
    }

    /// Stored copy of a set, bypassing fault injection.
    #[must_use]
    pub fn stored(&self, key: &str) -> Option<ActorRecordSet> {
        self.sets.lock().get(key).cloned()
    }

    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn check(&self, write: bool, op: &str, key: &str) -> Result<()> {
        let failing = match *self.fault.lock() {
            Some(FaultKind::All) => true,
            Some(FaultKind::Read) => !write,
            Some(FaultKind::Write) => write,
            None => false,
        };
        if failing {
            return Err(CooldownError::PersistenceUnavailable(format!(
                "injected {op} fault for {key}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordPersistence for MemoryPersistence {
    async fn exists(&self, key: &str) -> Result<bool> {
        self.check(false, "exists", key)?;
        Ok(self.sets.lock().contains_key(key))
    }

    async fn load(&self, key: &str) -> Result<Option<ActorRecordSet>> {
        self.check(false, "load", key)?;
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.sets.lock().get(key).cloned())
    }

    async fn save(&self, key: &str, records: &ActorRecordSet) -> Result<()> {
        self.check(true, "save", key)?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.sets.lock().insert(key.to_string(), records.clone());
        Ok(())
    }
}
