//! cooldowns check - Run the pre-check for an actor and command.

use clap::Args;

use super::TargetArgs;
use crate::app::AppContext;
use crate::cli::output::{emit_human, emit_json, robot_ok, HumanLayout};
use crate::core::{GateDecision, Invocation, Outcome};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Record a successful execution when the check passes
    #[arg(long)]
    pub record: bool,
}

/// Exits with a `CooldownActive` error while the command is cooling down.
pub async fn run(ctx: &AppContext, args: &CheckArgs) -> Result<()> {
    let gate = ctx.engine.gate();
    let invocation = Invocation::new(args.target.actor.clone(), args.target.command_id());

    let ticket = match gate.pre_check(&invocation).await? {
        GateDecision::Proceed(ticket) => ticket,
        GateDecision::Blocked(block) => return Err(block.into_error()),
    };
    let cooldown = ticket.cooldown();
    if args.record {
        gate.complete(ticket, Outcome::Succeeded).await?;
    } else {
        drop(ticket);
    }

    if ctx.robot_mode {
        return emit_json(&robot_ok(serde_json::json!({
            "actor": invocation.actor.key(),
            "command": invocation.command,
            "allowed": true,
            "cooldown_seconds": cooldown.map(|d| d.as_secs()),
            "recorded": args.record,
        })));
    }

    let mut layout = HumanLayout::new();
    layout
        .kv("Actor", &invocation.actor.key())
        .kv("Command", invocation.command.as_str())
        .kv("Status", "ready");
    if args.record {
        layout.kv("Recorded", "yes");
    }
    emit_human(layout);
    Ok(())
}
