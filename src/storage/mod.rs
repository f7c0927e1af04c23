//! Persistence collaborator for execution records
//!
//! Records are keyed by the actor's composite key and stored as a whole
//! set per actor. The engine only requires that `(command, executed)` pairs
//! round-trip through `save`/`load`.

pub mod memory;
pub mod yaml;

use async_trait::async_trait;

use crate::core::ActorRecordSet;
use crate::error::Result;

pub use memory::{FaultKind, MemoryPersistence};
pub use yaml::YamlDirectoryStore;

/// Durable per-key storage of actor record sets.
#[async_trait]
pub trait RecordPersistence: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Load the set stored under `key`; `None` when nothing is stored.
    async fn load(&self, key: &str) -> Result<Option<ActorRecordSet>>;

    /// Replace the set stored under `key`.
    async fn save(&self, key: &str, records: &ActorRecordSet) -> Result<()>;
}
