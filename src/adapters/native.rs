//! Event-driven adapter for the native command pipeline.
//!
//! The pipeline raises an executing event before the handler and an executed
//! event after it, passing the same context to both.

use super::{CommandContext, DispatchHooks};

#[derive(Clone)]
pub struct NativeCooldownListener {
    hooks: DispatchHooks,
}

impl NativeCooldownListener {
    #[must_use]
    pub const fn new(hooks: DispatchHooks) -> Self {
        Self { hooks }
    }

    /// Before the handler. Unresolved commands are left alone.
    pub async fn on_executing(&self, ctx: &mut CommandContext) {
        let Some(command) = ctx.command.clone() else {
            return;
        };
        self.hooks.before_dispatch(ctx, command).await;
    }

    /// After the handler, whatever its result.
    pub async fn on_executed(&self, ctx: &mut CommandContext) {
        self.hooks.after_dispatch(ctx).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::DispatchFailure;
    use crate::core::{
        ActorRef, CooldownResolver, ExecutionGate, ExemptionCheck, ManualClock, RecordStore,
    };
    use crate::messages::Messages;
    use crate::permissions::RoleFile;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use std::time::Duration;

    fn listener() -> (NativeCooldownListener, Arc<ManualClock>) {
        let roles = Arc::new(
            RoleFile::from_toml_str(
                r#"
[[roles]]
id = "default"
auto_assign = true
data = { cooldowns = [{ command = "heal", cooldown = "1m" }, { command = "warp", cooldown = "1x" }] }
"#,
            )
            .unwrap(),
        );
        let clock = Arc::new(ManualClock::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap()));
        let store = RecordStore::new(ExemptionCheck::new(roles.clone(), "Cooldowns"), None);
        let gate = ExecutionGate::new(
            CooldownResolver::new(roles),
            Arc::new(store),
            clock.clone(),
            Messages::default(),
        );
        (
            NativeCooldownListener::new(DispatchHooks::new(Arc::new(gate))),
            clock,
        )
    }

    async fn dispatch(listener: &NativeCooldownListener, ctx: &mut CommandContext) {
        listener.on_executing(ctx).await;
        listener.on_executed(ctx).await;
    }

    fn heal() -> CommandContext {
        CommandContext::new(ActorRef::player("1"), "heal").with_command("heal")
    }

    #[tokio::test]
    async fn second_invocation_is_blocked_with_message() {
        let (listener, clock) = listener();

        let mut first = heal();
        dispatch(&listener, &mut first).await;
        assert!(first.failure.is_none());

        clock.advance(Duration::from_secs(15));
        let mut second = heal();
        listener.on_executing(&mut second).await;
        match &second.failure {
            Some(DispatchFailure::UserFacing(message)) => assert!(message.contains("45s"), "{message}"),
            other => panic!("unexpected failure {other:?}"),
        }
        assert!(!second.is_gated());
    }

    #[tokio::test]
    async fn unhandled_failure_is_not_recorded() {
        let (listener, _) = listener();

        let mut ctx = heal();
        listener.on_executing(&mut ctx).await;
        assert!(ctx.is_gated());
        ctx.fail(DispatchFailure::Internal("handler crashed".into()));
        listener.on_executed(&mut ctx).await;

        let mut retry = heal();
        listener.on_executing(&mut retry).await;
        assert!(retry.failure.is_none());
    }

    #[tokio::test]
    async fn handled_failure_still_counts_as_success() {
        let (listener, _) = listener();

        let mut ctx = heal();
        listener.on_executing(&mut ctx).await;
        ctx.failure = Some(DispatchFailure::UserFacing("usage: /heal".into()));
        ctx.failure_handled = true;
        listener.on_executed(&mut ctx).await;

        let mut again = heal();
        listener.on_executing(&mut again).await;
        assert!(matches!(again.failure, Some(DispatchFailure::UserFacing(_))));
    }

    #[tokio::test]
    async fn unresolved_command_is_ignored() {
        let (listener, _) = listener();
        let mut ctx = CommandContext::new(ActorRef::player("1"), "nope")
            .with_failure(DispatchFailure::CommandNotFound);

        dispatch(&listener, &mut ctx).await;

        assert_eq!(ctx.failure, Some(DispatchFailure::CommandNotFound));
        assert!(!ctx.is_gated());
    }

    #[tokio::test]
    async fn misconfigured_cooldown_shows_generic_error() {
        let (listener, _) = listener();
        let mut ctx = CommandContext::new(ActorRef::player("1"), "warp").with_command("warp");

        listener.on_executing(&mut ctx).await;

        assert_eq!(
            ctx.failure,
            Some(DispatchFailure::Internal(
                Messages::default().internal_error().to_string()
            ))
        );
    }
}
