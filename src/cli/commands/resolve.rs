//! cooldowns resolve - Show the effective cooldown for an actor and command.

use clap::Args;

use super::TargetArgs;
use crate::app::AppContext;
use crate::cli::output::{emit_human, emit_json, robot_ok, HumanLayout};
use crate::core::duration::format_remaining;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

pub async fn run(ctx: &AppContext, args: &ResolveArgs) -> Result<()> {
    let gate = ctx.engine.gate();
    let actor = &args.target.actor;
    let command = args.target.command_id();

    let resolved = gate.resolver().resolve_detailed_for(actor, &command).await?;
    let exempt = gate.store().exemption().is_exempt(actor).await?;

    if ctx.robot_mode {
        return emit_json(&robot_ok(serde_json::json!({
            "actor": actor.key(),
            "command": command,
            "exempt": exempt,
            "cooldown": resolved.as_ref().map(|r| serde_json::json!({
                "seconds": r.duration.as_secs(),
                "raw": r.raw,
                "role": r.role_id,
                "priority": r.priority,
            })),
        })));
    }

    let mut layout = HumanLayout::new();
    layout
        .title("Effective Cooldown")
        .kv("Actor", &actor.key())
        .kv("Command", command.as_str());
    match &resolved {
        Some(resolved) => {
            layout
                .kv("Cooldown", &format_remaining(resolved.duration))
                .kv("Rule", &resolved.raw)
                .kv("Role", &format!("{} (priority {})", resolved.role_id, resolved.priority));
        }
        None => {
            layout.kv("Cooldown", "none");
        }
    }
    layout.kv("Exempt", if exempt { "yes" } else { "no" });
    emit_human(layout);
    Ok(())
}
