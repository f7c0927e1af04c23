//! cooldowns records - List an actor's execution records.

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{emit_human, emit_json, robot_ok, HumanLayout};
use crate::core::{ActorRef, ExecutionRecord};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct RecordsArgs {
    /// Actor as `kind.id`
    #[arg(long)]
    pub actor: ActorRef,
}

pub async fn run(ctx: &AppContext, args: &RecordsArgs) -> Result<()> {
    let records = ctx.engine.gate().store().records(&args.actor).await;
    let mut records: Vec<ExecutionRecord> = records.iter().cloned().collect();
    records.sort_by(|a, b| b.executed.cmp(&a.executed));

    if ctx.robot_mode {
        return emit_json(&robot_ok(serde_json::json!({
            "actor": args.actor.key(),
            "records": records,
        })));
    }

    let mut layout = HumanLayout::new();
    layout.title(&format!("Records for {}", args.actor.key()));
    if records.is_empty() {
        layout.bullet("no executions recorded");
    }
    for record in &records {
        layout.kv(record.command.as_str(), &record.executed.to_rfc3339());
    }
    emit_human(layout);
    Ok(())
}
