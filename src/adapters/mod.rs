//! Pipeline adapters
//!
//! Command pipelines differ in how they describe an invocation and report
//! failures. Each adapter translates its pipeline's shape into a
//! [`CommandContext`] and drives the gate through [`DispatchHooks`]; the gate
//! itself is shared.

mod legacy;
mod native;

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, warn};

use crate::core::{ActorRef, CommandId, ExecutionGate, GateDecision, GateTicket, Invocation, Outcome};

pub use legacy::{LegacyCommand, LegacyCooldownHook, LegacyRegistry};
pub use native::NativeCooldownListener;

/// Failure attached to an invocation by the pipeline or by the gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchFailure {
    /// Shown to the actor as-is.
    #[error("{0}")]
    UserFacing(String),
    #[error("command not found")]
    CommandNotFound,
    #[error("{0}")]
    Internal(String),
}

/// Per-invocation state shared between a pipeline and its adapter.
#[derive(Debug)]
pub struct CommandContext {
    pub actor: ActorRef,
    /// Alias as typed, without arguments.
    pub alias: String,
    /// Resolved command id; `None` when the pipeline could not resolve one.
    pub command: Option<CommandId>,
    pub failure: Option<DispatchFailure>,
    /// The failure was dealt with and does not count against the invocation.
    pub failure_handled: bool,
    ticket: Option<GateTicket>,
}

impl CommandContext {
    pub fn new(actor: ActorRef, alias: impl Into<String>) -> Self {
        Self {
            actor,
            alias: alias.into(),
            command: None,
            failure: None,
            failure_handled: false,
            ticket: None,
        }
    }

    #[must_use]
    pub fn with_command(mut self, command: impl Into<CommandId>) -> Self {
        self.command = Some(command.into());
        self
    }

    #[must_use]
    pub fn with_failure(mut self, failure: DispatchFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn fail(&mut self, failure: DispatchFailure) {
        self.failure = Some(failure);
        self.failure_handled = false;
    }

    /// Whether the pipeline considers the invocation successful.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.failure.is_none() || self.failure_handled
    }

    #[must_use]
    pub const fn is_gated(&self) -> bool {
        self.ticket.is_some()
    }
}

/// Before/after dispatch hooks over the shared gate.
#[derive(Clone)]
pub struct DispatchHooks {
    gate: Arc<ExecutionGate>,
}

impl DispatchHooks {
    pub fn new(gate: Arc<ExecutionGate>) -> Self {
        Self { gate }
    }

    #[must_use]
    pub fn gate(&self) -> &Arc<ExecutionGate> {
        &self.gate
    }

    /// Run PreCheck for `command`.
    ///
    /// Returns `true` when the handler may run; the ticket is then held by the
    /// context. Otherwise the context carries the failure to show.
    pub async fn before_dispatch(&self, ctx: &mut CommandContext, command: CommandId) -> bool {
        let invocation = Invocation::new(ctx.actor.clone(), command);
        match self.gate.pre_check(&invocation).await {
            Ok(GateDecision::Proceed(ticket)) => {
                ctx.ticket = Some(ticket);
                true
            }
            Ok(GateDecision::Blocked(block)) => {
                ctx.fail(DispatchFailure::UserFacing(block.message));
                false
            }
            Err(err) => {
                error!(
                    actor = %invocation.actor,
                    command = %invocation.command,
                    error = %err,
                    code = %err.code(),
                    "cooldown check failed"
                );
                ctx.fail(DispatchFailure::Internal(
                    err.user_message(self.gate.messages()),
                ));
                false
            }
        }
    }

    /// Complete the held ticket from the context's outcome. No-op when
    /// nothing was gated.
    pub async fn after_dispatch(&self, ctx: &mut CommandContext) {
        let Some(ticket) = ctx.ticket.take() else {
            return;
        };
        let outcome = if ctx.succeeded() {
            Outcome::Succeeded
        } else {
            Outcome::Failed
        };
        if let Err(err) = self.gate.complete(ticket, outcome).await {
            warn!(actor = %ctx.actor, alias = %ctx.alias, error = %err, "failed to record execution");
        }
    }
}
