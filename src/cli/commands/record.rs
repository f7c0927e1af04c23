//! cooldowns record - Record a successful execution now.

use clap::Args;

use super::TargetArgs;
use crate::app::AppContext;
use crate::cli::output::{emit_human, emit_json, robot_ok, HumanLayout};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct RecordArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

pub async fn run(ctx: &AppContext, args: &RecordArgs) -> Result<()> {
    let gate = ctx.engine.gate();
    let actor = &args.target.actor;
    let command = args.target.command_id();
    let executed = gate.now();

    gate.store().record_execution(actor, &command, executed).await?;

    if ctx.robot_mode {
        return emit_json(&robot_ok(serde_json::json!({
            "actor": actor.key(),
            "command": command,
            "executed": executed,
            "skipped": actor.kind.is_console(),
        })));
    }

    let mut layout = HumanLayout::new();
    layout
        .title("Execution Recorded")
        .kv("Actor", &actor.key())
        .kv("Command", command.as_str())
        .kv("Executed", &executed.to_rfc3339());
    if actor.kind.is_console() {
        layout.bullet("console executions are never recorded");
    }
    emit_human(layout);
    Ok(())
}
