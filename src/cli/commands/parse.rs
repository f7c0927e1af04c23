//! cooldowns parse - Parse a duration string.

use clap::Args;

use crate::cli::output::{emit_human, emit_json, robot_ok, HumanLayout};
use crate::core::duration::{format_remaining, parse};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Duration such as `30s`, `1h30m` or `2 days`
    pub duration: String,
}

/// Runs without loading config, roles or records.
pub fn run_without_context(robot: bool, args: &ParseArgs) -> Result<()> {
    let parsed = parse(&args.duration)?;

    if robot {
        return emit_json(&robot_ok(serde_json::json!({
            "input": args.duration,
            "seconds": parsed.as_secs(),
            "formatted": format_remaining(parsed),
        })));
    }

    let mut layout = HumanLayout::new();
    layout
        .kv("Input", &args.duration)
        .kv("Duration", &format_remaining(parsed))
        .kv("Seconds", &parsed.as_secs().to_string());
    emit_human(layout);
    Ok(())
}
