//! Adapter for the legacy command pipeline.
//!
//! Legacy commands are only reached after the native pipeline failed to
//! resolve the alias. The hook wraps the legacy continuation: it runs PreCheck
//! first, awaits the continuation only when allowed, then completes the ticket
//! from the continuation's result.

use std::future::Future;
use std::sync::Arc;

use tracing::trace;

use super::{CommandContext, DispatchFailure, DispatchHooks};
use crate::config::LegacyConfig;
use crate::core::{ActorRef, CommandId};

/// A command known to the legacy registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyCommand {
    pub name: String,
}

impl LegacyCommand {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Command lookup and permission checks of the legacy pipeline.
pub trait LegacyRegistry: Send + Sync {
    /// Look up a command by lowercased alias.
    fn find(&self, alias: &str) -> Option<LegacyCommand>;

    fn has_permission(&self, actor: &ActorRef, command: &LegacyCommand) -> bool;
}

#[derive(Clone)]
pub struct LegacyCooldownHook {
    hooks: DispatchHooks,
    registry: Option<Arc<dyn LegacyRegistry>>,
    alias_prefix: String,
    id_prefix: String,
}

impl LegacyCooldownHook {
    /// `registry` of `None` means the legacy pipeline is not loaded; every
    /// dispatch then passes straight through.
    pub fn new(
        hooks: DispatchHooks,
        registry: Option<Arc<dyn LegacyRegistry>>,
        config: &LegacyConfig,
    ) -> Self {
        Self {
            hooks,
            registry,
            alias_prefix: config.alias_prefix.clone(),
            id_prefix: config.id_prefix.clone(),
        }
    }

    /// Command id the gate sees for a legacy command.
    #[must_use]
    pub fn command_id(&self, command: &LegacyCommand) -> CommandId {
        CommandId::new(format!("{}{}", self.id_prefix, command.name))
    }

    /// Resolve the legacy command this context targets, if the hook applies.
    fn target(&self, ctx: &CommandContext) -> Option<CommandId> {
        if ctx.failure != Some(DispatchFailure::CommandNotFound) {
            return None;
        }
        let registry = self.registry.as_ref()?;

        let alias = ctx.alias.split_whitespace().next()?;
        let alias = alias.strip_prefix(&self.alias_prefix).unwrap_or(alias);
        if alias.is_empty() {
            return None;
        }

        let command = registry.find(&alias.to_lowercase())?;
        if !registry.has_permission(&ctx.actor, &command) {
            trace!(actor = %ctx.actor, command = %command.name, "no legacy permission; not gated");
            return None;
        }
        Some(self.command_id(&command))
    }

    /// Run the legacy continuation for `ctx` under the gate.
    ///
    /// The continuation reports its own failure; on success the original
    /// not-found failure is marked handled.
    pub async fn dispatch<F>(&self, ctx: &mut CommandContext, continuation: F)
    where
        F: Future<Output = Result<(), DispatchFailure>>,
    {
        let Some(command) = self.target(ctx) else {
            apply(ctx, continuation.await);
            return;
        };

        if !self.hooks.before_dispatch(ctx, command).await {
            return;
        }

        apply(ctx, continuation.await);
        self.hooks.after_dispatch(ctx).await;
    }
}

fn apply(ctx: &mut CommandContext, result: Result<(), DispatchFailure>) {
    match result {
        Ok(()) => ctx.failure_handled = true,
        Err(failure) => ctx.fail(failure),
    }
}
