//! Execution gate
//!
//! Wraps one command invocation:
//!
//! ```text
//! PreCheck -> Blocked
//!          -> Proceed -> Executing -> Failed
//!                                  -> Succeeded -> Recorded
//! ```
//!
//! PreCheck through Recorded holds a lock for the (actor, command) pair, so two
//! concurrent invocations of the same command by the same actor cannot both
//! pass the check before either is recorded. A handler that re-invokes its own
//! command for the same actor through the same gate will wait forever.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

use crate::core::clock::Clock;
use crate::core::resolver::{CooldownResolver, EffectiveCooldown};
use crate::core::store::RecordStore;
use crate::core::types::{ActorRef, CommandId};
use crate::error::{CooldownError, Result};
use crate::messages::Messages;

/// One command invocation as seen by the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub actor: ActorRef,
    pub command: CommandId,
}

impl Invocation {
    pub fn new(actor: ActorRef, command: impl Into<CommandId>) -> Self {
        Self {
            actor,
            command: command.into(),
        }
    }
}

/// How the wrapped handler finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed,
}

/// A blocked invocation: how long is left and what to tell the actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CooldownBlock {
    pub remaining: Duration,
    pub message: String,
}

impl CooldownBlock {
    #[must_use]
    pub fn into_error(self) -> CooldownError {
        CooldownError::CooldownActive {
            remaining: self.remaining,
            message: self.message,
        }
    }
}

/// Permission to run the handler.
///
/// Holds the (actor, command) lock until passed to
/// [`ExecutionGate::complete`]. Dropping it instead records nothing.
#[derive(Debug)]
pub struct GateTicket {
    invocation: Invocation,
    cooldown: EffectiveCooldown,
    _lease: LockLease,
}

impl GateTicket {
    #[must_use]
    pub const fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    /// Cooldown that applied at PreCheck, if any.
    #[must_use]
    pub const fn cooldown(&self) -> EffectiveCooldown {
        self.cooldown
    }
}

#[derive(Debug)]
pub enum GateDecision {
    Proceed(GateTicket),
    Blocked(CooldownBlock),
}

impl GateDecision {
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }

    /// The ticket, or `CooldownActive` when blocked.
    pub fn into_result(self) -> Result<GateTicket> {
        match self {
            Self::Proceed(ticket) => Ok(ticket),
            Self::Blocked(block) => Err(block.into_error()),
        }
    }
}

type LockKey = (String, String);

/// Per-(actor, command) locks. An entry lives only while some invocation
/// holds or waits on it.
#[derive(Debug, Default)]
struct LockTable {
    entries: Mutex<HashMap<LockKey, Arc<AsyncMutex<()>>>>,
}

impl LockTable {
    async fn acquire(self: &Arc<Self>, key: LockKey) -> LockLease {
        // Declared before the wait so a cancelled wait still releases the entry.
        let mut lease = LockLease {
            table: Arc::clone(self),
            key: key.clone(),
            guard: None,
        };
        let lock = self.entries.lock().entry(key).or_default().clone();
        lease.guard = Some(lock.lock_owned().await);
        lease
    }

    fn release(&self, key: &LockKey) {
        let mut entries = self.entries.lock();
        if entries
            .get(key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            entries.remove(key);
        }
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

#[derive(Debug)]
struct LockLease {
    table: Arc<LockTable>,
    key: LockKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for LockLease {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.table.release(&self.key);
    }
}

pub struct ExecutionGate {
    resolver: CooldownResolver,
    store: Arc<RecordStore>,
    clock: Arc<dyn Clock>,
    messages: Messages,
    record_all: bool,
    locks: Arc<LockTable>,
}

impl ExecutionGate {
    pub fn new(
        resolver: CooldownResolver,
        store: Arc<RecordStore>,
        clock: Arc<dyn Clock>,
        messages: Messages,
    ) -> Self {
        Self {
            resolver,
            store,
            clock,
            messages,
            record_all: true,
            locks: Arc::default(),
        }
    }

    /// Record every successful execution (default), or only those a cooldown
    /// applied to.
    #[must_use]
    pub const fn with_record_all(mut self, record_all: bool) -> Self {
        self.record_all = record_all;
        self
    }

    #[must_use]
    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    #[must_use]
    pub const fn resolver(&self) -> &CooldownResolver {
        &self.resolver
    }

    #[must_use]
    pub const fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Current time on the gate's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    async fn lock(&self, invocation: &Invocation) -> LockLease {
        let key = (invocation.actor.key(), invocation.command.folded());
        self.locks.acquire(key).await
    }

    /// Decide whether the invocation may run.
    ///
    /// # Errors
    ///
    /// Resolution, exemption and storage failures propagate; they are not a
    /// block.
    pub async fn pre_check(&self, invocation: &Invocation) -> Result<GateDecision> {
        let lease = self.lock(invocation).await;
        let Invocation { actor, command } = invocation;

        let cooldown = self.resolver.resolve_for(actor, command).await?;
        if let Some(duration) = cooldown {
            if let Some(last) = self.store.last_executed(actor, command).await? {
                let elapsed = elapsed_since(last, self.clock.now());
                if elapsed < duration {
                    let remaining = duration - elapsed;
                    debug!(actor = %actor, command = %command, remaining_ms = remaining.as_millis(), "command on cooldown");
                    return Ok(GateDecision::Blocked(CooldownBlock {
                        remaining,
                        message: self.messages.cooldown(remaining),
                    }));
                }
            }
        }

        debug!(actor = %actor, command = %command, cooldown = ?cooldown, "command may proceed");
        Ok(GateDecision::Proceed(GateTicket {
            invocation: invocation.clone(),
            cooldown,
            _lease: lease,
        }))
    }

    /// Finish an invocation, recording it on success. Releases the lock.
    pub async fn complete(&self, ticket: GateTicket, outcome: Outcome) -> Result<()> {
        let Invocation { actor, command } = &ticket.invocation;
        match outcome {
            Outcome::Failed => {
                debug!(actor = %actor, command = %command, "command failed; cooldown not consumed");
            }
            Outcome::Succeeded if self.record_all || ticket.cooldown.is_some() => {
                self.store
                    .record_execution(actor, command, self.clock.now())
                    .await?;
            }
            Outcome::Succeeded => {}
        }
        Ok(())
    }

    /// Run `handler` under the gate.
    ///
    /// A block surfaces as [`CooldownError::CooldownActive`] and the handler is
    /// never polled. A handler error is returned unchanged after the
    /// invocation is marked failed.
    pub async fn run<T, F>(&self, invocation: &Invocation, handler: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let ticket = self.pre_check(invocation).await?.into_result()?;
        let result = handler.await;
        let outcome = if result.is_ok() {
            Outcome::Succeeded
        } else {
            Outcome::Failed
        };
        self.complete(ticket, outcome).await?;
        result
    }
}

/// Time since `last`, clamped at zero when `last` lies in the future.
fn elapsed_since(last: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - last).to_std().unwrap_or(Duration::ZERO)
}
