//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod commands;
pub mod output;

/// Inspect and exercise command cooldowns
#[derive(Parser, Debug)]
#[command(name = "cooldowns")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable JSON output for machine consumption
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: <root>/config.toml over ~/.config/cooldowns/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Project root holding config, roles and records (default: current directory)
    #[arg(long, global = true, env = "COOLDOWNS_ROOT")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a cooldown duration such as `1h30m`
    Parse(commands::parse::ParseArgs),

    /// Show the cooldown that applies to an actor and command
    Resolve(commands::resolve::ResolveArgs),

    /// Check whether an actor may run a command now
    Check(commands::check::CheckArgs),

    /// Record a successful execution
    Record(commands::record::RecordArgs),

    /// List an actor's execution records
    Records(commands::records::RecordsArgs),
}
