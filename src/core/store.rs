//! Execution record store
//!
//! Holds the last execution time per (actor, command) in memory, backed by an
//! optional persistence collaborator:
//!
//! - Reads consult memory first and fall back to a one-time lazy load of the
//!   actor's persisted set. Loaded records never overwrite entries already in
//!   memory.
//! - Writes update memory, then write through: the persisted set is re-read,
//!   patched with the new entry and saved whole.
//! - Persistence failures are logged and otherwise ignored; memory stays
//!   authoritative.
//!
//! All mutation of one actor's set happens under that actor's async lock, so
//! the lazy load and the upsert + write-through sequences never interleave.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

use crate::core::exemption::ExemptionCheck;
use crate::core::types::{ActorRecordSet, ActorRef, CommandId};
use crate::error::Result;
use crate::storage::RecordPersistence;

#[derive(Debug, Default)]
struct ActorSlot {
    records: ActorRecordSet,
    /// A persisted copy has been read (successfully) into `records`.
    loaded: bool,
}

pub struct RecordStore {
    actors: Mutex<HashMap<String, Arc<AsyncMutex<ActorSlot>>>>,
    persistence: Option<Arc<dyn RecordPersistence>>,
    exemption: ExemptionCheck,
}

impl RecordStore {
    /// Create a store. `persistence` of `None` keeps everything in memory.
    pub fn new(exemption: ExemptionCheck, persistence: Option<Arc<dyn RecordPersistence>>) -> Self {
        Self {
            actors: Mutex::new(HashMap::new()),
            persistence,
            exemption,
        }
    }

    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.persistence.is_some()
    }

    #[must_use]
    pub fn exemption(&self) -> &ExemptionCheck {
        &self.exemption
    }

    fn slot(&self, key: &str) -> Arc<AsyncMutex<ActorSlot>> {
        self.actors
            .lock()
            .entry(key.to_string())
            .or_default()
            .clone()
    }

    /// Last successful execution of `command` by `actor`.
    ///
    /// Exempt actors always get `None` without touching storage.
    pub async fn last_executed(
        &self,
        actor: &ActorRef,
        command: &CommandId,
    ) -> Result<Option<DateTime<Utc>>> {
        if self.exemption.is_exempt(actor).await? {
            return Ok(None);
        }

        let key = actor.key();
        let slot = self.slot(&key);
        let mut slot = slot.lock().await;

        if let Some(executed) = slot.records.get(command) {
            return Ok(Some(executed));
        }
        if !slot.loaded {
            self.lazy_load(&key, &mut slot).await;
        }
        Ok(slot.records.get(command))
    }

    /// Record a successful execution. No-op for console actors.
    pub async fn record_execution(
        &self,
        actor: &ActorRef,
        command: &CommandId,
        executed: DateTime<Utc>,
    ) -> Result<()> {
        if actor.kind.is_console() {
            return Ok(());
        }

        let key = actor.key();
        let slot = self.slot(&key);
        let mut slot = slot.lock().await;

        slot.records.upsert(command, executed);
        debug!(actor = %key, command = %command, %executed, "recorded execution");

        self.write_through(&key, &mut slot, command, executed).await;
        Ok(())
    }

    /// Snapshot of every record held for `actor`, loading persisted ones if needed.
    pub async fn records(&self, actor: &ActorRef) -> ActorRecordSet {
        let key = actor.key();
        let slot = self.slot(&key);
        let mut slot = slot.lock().await;
        if !slot.loaded {
            self.lazy_load(&key, &mut slot).await;
        }
        slot.records.clone()
    }

    async fn lazy_load(&self, key: &str, slot: &mut ActorSlot) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        match load_persisted(persistence.as_ref(), key).await {
            Ok(persisted) => {
                if let Some(persisted) = persisted {
                    debug!(actor = %key, records = persisted.len(), "lazily loaded records");
                    slot.records.merge_missing(&persisted);
                }
                slot.loaded = true;
            }
            Err(err) => {
                warn!(actor = %key, error = %err, "failed to load persisted records; using memory only");
            }
        }
    }

    async fn write_through(
        &self,
        key: &str,
        slot: &mut ActorSlot,
        command: &CommandId,
        executed: DateTime<Utc>,
    ) {
        let Some(persistence) = &self.persistence else {
            return;
        };

        let mut persisted = match load_persisted(persistence.as_ref(), key).await {
            Ok(persisted) => {
                let persisted = persisted.unwrap_or_default();
                slot.records.merge_missing(&persisted);
                slot.loaded = true;
                persisted
            }
            Err(err) => {
                warn!(actor = %key, command = %command, error = %err, "failed to read records before write-through; not persisted");
                return;
            }
        };

        persisted.upsert(command, executed);
        if let Err(err) = persistence.save(key, &persisted).await {
            warn!(actor = %key, command = %command, error = %err, "failed to persist execution record");
        }
    }
}

async fn load_persisted(
    persistence: &dyn RecordPersistence,
    key: &str,
) -> Result<Option<ActorRecordSet>> {
    if !persistence.exists(key).await? {
        return Ok(None);
    }
    persistence.load(key).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ExecutionRecord;
    use crate::permissions::RoleFile;
    use crate::storage::{FaultKind, MemoryPersistence};
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn exemption() -> ExemptionCheck {
        let roles = RoleFile::from_toml_str(
            r#"
[[roles]]
id = "admin"
members = ["player.admin"]
grants = ["Cooldowns:immune"]
"#,
        )
        .unwrap();
        ExemptionCheck::new(Arc::new(roles), "Cooldowns")
    }

    fn store_with(persistence: &Arc<MemoryPersistence>) -> RecordStore {
        RecordStore::new(exemption(), Some(persistence.clone()))
    }

    fn set(records: &[(&str, i64)]) -> ActorRecordSet {
        records
            .iter()
            .map(|(command, secs)| ExecutionRecord::new((*command).into(), at(*secs)))
            .collect()
    }

    #[tokio::test]
    async fn record_then_read_round_trips() {
        let store = RecordStore::new(exemption(), None);
        let actor = ActorRef::player("1");

        store.record_execution(&actor, &"heal".into(), at(0)).await.unwrap();

        assert_eq!(store.last_executed(&actor, &"heal".into()).await.unwrap(), Some(at(0)));
        assert_eq!(store.last_executed(&actor, &"HEAL".into()).await.unwrap(), Some(at(0)));
        assert_eq!(store.last_executed(&actor, &"kit".into()).await.unwrap(), None);
        assert!(!store.is_persistent());
    }

    #[tokio::test]
    async fn re_execution_overwrites_in_place() {
        let store = RecordStore::new(exemption(), None);
        let actor = ActorRef::player("1");

        store.record_execution(&actor, &"heal".into(), at(0)).await.unwrap();
        store.record_execution(&actor, &"heal".into(), at(50)).await.unwrap();

        let records = store.records(&actor).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records.get(&"heal".into()), Some(at(50)));
    }

    #[tokio::test]
    async fn console_is_never_recorded_or_read() {
        let persistence = Arc::new(
            MemoryPersistence::new().with_set("console.console", set(&[("heal", 0)])),
        );
        let store = store_with(&persistence);
        let console = ActorRef::console();

        store.record_execution(&console, &"heal".into(), at(10)).await.unwrap();

        assert_eq!(store.last_executed(&console, &"heal".into()).await.unwrap(), None);
        assert_eq!(persistence.save_count(), 0);
        assert_eq!(persistence.load_count(), 0);
    }

    #[tokio::test]
    async fn immune_actor_reads_none_without_touching_storage() {
        let persistence =
            Arc::new(MemoryPersistence::new().with_set("player.admin", set(&[("heal", 0)])));
        let store = store_with(&persistence);

        let admin = ActorRef::player("admin");
        assert_eq!(store.last_executed(&admin, &"heal".into()).await.unwrap(), None);
        assert_eq!(persistence.load_count(), 0);
    }

    #[tokio::test]
    async fn lazy_load_happens_once() {
        let persistence =
            Arc::new(MemoryPersistence::new().with_set("player.1", set(&[("heal", 0)])));
        let store = store_with(&persistence);
        let actor = ActorRef::player("1");

        assert_eq!(store.last_executed(&actor, &"heal".into()).await.unwrap(), Some(at(0)));
        assert_eq!(store.last_executed(&actor, &"kit".into()).await.unwrap(), None);
        assert_eq!(store.last_executed(&actor, &"kit".into()).await.unwrap(), None);
        assert_eq!(persistence.load_count(), 1);
    }

    #[tokio::test]
    async fn lazy_load_does_not_overwrite_memory() {
        let persistence =
            Arc::new(MemoryPersistence::new().with_set("player.1", set(&[("a", 1)])));
        let actor = ActorRef::player("1");

        // Populate memory before any read, without letting the write-through
        // touch the persisted copy.
        persistence.inject_fault(FaultKind::All);
        let store = store_with(&persistence);
        store.record_execution(&actor, &"a".into(), at(2)).await.unwrap();
        store.record_execution(&actor, &"b".into(), at(3)).await.unwrap();
        persistence.clear_fault();

        let records = store.records(&actor).await;
        assert_eq!(records, set(&[("a", 2), ("b", 3)]));
        assert_eq!(persistence.stored("player.1"), Some(set(&[("a", 1)])));
    }

    #[tokio::test]
    async fn write_through_patches_persisted_set() {
        let persistence = Arc::new(
            MemoryPersistence::new().with_set("player.1", set(&[("kit", 5), ("heal", 1)])),
        );
        let store = store_with(&persistence);
        let actor = ActorRef::player("1");

        store.record_execution(&actor, &"heal".into(), at(9)).await.unwrap();

        assert_eq!(persistence.stored("player.1"), Some(set(&[("kit", 5), ("heal", 9)])));
        // The forced load also materialized the persisted entries in memory.
        assert_eq!(store.last_executed(&actor, &"kit".into()).await.unwrap(), Some(at(5)));
    }

    #[tokio::test]
    async fn persistence_survives_restart() {
        let persistence = Arc::new(MemoryPersistence::new());
        let actor = ActorRef::player("1");

        store_with(&persistence)
            .record_execution(&actor, &"heal".into(), at(0))
            .await
            .unwrap();

        let restarted = store_with(&persistence);
        assert_eq!(
            restarted.last_executed(&actor, &"heal".into()).await.unwrap(),
            Some(at(0))
        );
    }

    #[tokio::test]
    async fn save_failure_keeps_memory_authoritative() {
        let persistence = Arc::new(MemoryPersistence::new());
        persistence.inject_fault(FaultKind::Write);
        let store = store_with(&persistence);
        let actor = ActorRef::player("1");

        store.record_execution(&actor, &"heal".into(), at(0)).await.unwrap();

        assert_eq!(store.last_executed(&actor, &"heal".into()).await.unwrap(), Some(at(0)));
        assert!(persistence.stored("player.1").is_none());
    }

    #[tokio::test]
    async fn failed_lazy_load_is_retried() {
        let persistence =
            Arc::new(MemoryPersistence::new().with_set("player.1", set(&[("heal", 0)])));
        persistence.inject_fault(FaultKind::Read);
        let store = store_with(&persistence);
        let actor = ActorRef::player("1");

        assert_eq!(store.last_executed(&actor, &"heal".into()).await.unwrap(), None);

        persistence.clear_fault();
        assert_eq!(store.last_executed(&actor, &"heal".into()).await.unwrap(), Some(at(0)));
    }

    #[tokio::test]
    async fn concurrent_writes_for_one_actor_do_not_corrupt_the_set() {
        let persistence = Arc::new(MemoryPersistence::new());
        let store = Arc::new(store_with(&persistence));
        let actor = ActorRef::player("1");

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            let actor = actor.clone();
            handles.push(tokio::spawn(async move {
                let command = CommandId::from(format!("cmd{}", i % 4));
                store.record_execution(&actor, &command, at(i)).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.records(&actor).await.len(), 4);
        assert_eq!(persistence.stored("player.1").unwrap().len(), 4);
    }
}
