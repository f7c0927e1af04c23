//! Per-actor, per-command execution cooldowns.
//!
//! The [`core::ExecutionGate`](crate::core::ExecutionGate) wraps each command invocation: it resolves the
//! cooldown granted by the actor's highest-priority role, compares it with the
//! last recorded execution, and records successful runs. Roles come from a
//! [`permissions::PermissionProvider`]; records are kept in memory and written
//! through to an optional [`storage::RecordPersistence`].

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod messages;
pub mod permissions;
pub mod storage;

pub use error::{CooldownError, Result};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
