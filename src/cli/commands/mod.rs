//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use clap::Args;

use crate::app::AppContext;
use crate::cli::Commands;
use crate::core::{ActorRef, CommandId};
use crate::error::Result;

pub mod check;
pub mod parse;
pub mod record;
pub mod records;
pub mod resolve;

/// Dispatch a command to its handler
pub async fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Parse(args) => parse::run_without_context(ctx.robot_mode, args),
        Commands::Resolve(args) => resolve::run(ctx, args).await,
        Commands::Check(args) => check::run(ctx, args).await,
        Commands::Record(args) => record::run(ctx, args).await,
        Commands::Records(args) => records::run(ctx, args).await,
    }
}

/// Actor and command an operation applies to.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Actor as `kind.id`, e.g. `player.76561198000000000`
    #[arg(long)]
    pub actor: ActorRef,

    /// Command identifier, e.g. `heal` or `Legacy.kit`
    #[arg(long)]
    pub command: String,
}

impl TargetArgs {
    #[must_use]
    pub fn command_id(&self) -> CommandId {
        CommandId::new(self.command.clone())
    }
}
