//! Actor, command and record types shared by the engine

use std::fmt::{self, Write as _};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CooldownError, Result};

/// Identifier of a command, compared case-insensitively.
///
/// The original spelling is kept for display and persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(String);

impl CommandId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a raw command string.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        fold(&self.0).eq(fold(other))
    }

    /// Lowercased form used wherever commands are keyed.
    #[must_use]
    pub fn folded(&self) -> String {
        fold(&self.0).collect()
    }
}

/// Full Unicode lowercase fold, applied per character.
fn fold(value: &str) -> impl Iterator<Item = char> + '_ {
    value.chars().flat_map(char::to_lowercase)
}

impl PartialEq for CommandId {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl Eq for CommandId {}

impl Hash for CommandId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for c in fold(&self.0) {
            state.write_u32(u32::from(c));
        }
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommandId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CommandId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Kind of entity invoking a command.
///
/// `Other` kinds compare and display lowercased, however they were built.
#[derive(Debug, Clone)]
pub enum ActorKind {
    Player,
    Console,
    Other(String),
}

impl ActorKind {
    #[must_use]
    pub const fn is_console(&self) -> bool {
        matches!(self, Self::Console)
    }
}

impl PartialEq for ActorKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Player, Self::Player) | (Self::Console, Self::Console) => true,
            (Self::Other(a), Self::Other(b)) => fold(a).eq(fold(b)),
            _ => false,
        }
    }
}

impl Eq for ActorKind {}

impl Hash for ActorKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Player => state.write_u8(0),
            Self::Console => state.write_u8(1),
            Self::Other(kind) => {
                state.write_u8(2);
                for c in fold(kind) {
                    state.write_u32(u32::from(c));
                }
            }
        }
    }
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => f.write_str("player"),
            Self::Console => f.write_str("console"),
            Self::Other(kind) => fold(kind).try_for_each(|c| f.write_char(c)),
        }
    }
}

impl From<&str> for ActorKind {
    fn from(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "player" => Self::Player,
            "console" => Self::Console,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A command invoker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActorRef {
    pub kind: ActorKind,
    pub id: String,
}

impl ActorRef {
    pub fn new(kind: ActorKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }

    pub fn player(id: impl Into<String>) -> Self {
        Self::new(ActorKind::Player, id)
    }

    #[must_use]
    pub fn console() -> Self {
        Self::new(ActorKind::Console, "console")
    }

    /// Composite key `kind.id`, stable across pipelines.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}.{}", self.kind, self.id)
    }
}

impl fmt::Display for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind, self.id)
    }
}

impl FromStr for ActorRef {
    type Err = CooldownError;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, id) = s
            .split_once('.')
            .ok_or_else(|| CooldownError::InvalidActor(format!("{s} (expected <kind>.<id>)")))?;
        if kind.is_empty() || id.is_empty() {
            return Err(CooldownError::InvalidActor(format!(
                "{s} (kind and id must be non-empty)"
            )));
        }
        Ok(Self::new(ActorKind::from(kind), id))
    }
}

/// A role an actor belongs to. Higher priority wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
    pub id: String,
    pub priority: i32,
}

impl RoleRef {
    pub fn new(id: impl Into<String>, priority: i32) -> Self {
        Self {
            id: id.into(),
            priority,
        }
    }
}

/// One cooldown entry from a role's data.
/// Extra keys in the entry are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownRule {
    pub command: String,
    pub cooldown: String,
}

impl CooldownRule {
    pub fn new(command: impl Into<String>, cooldown: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            cooldown: cooldown.into(),
        }
    }
}

/// Last successful execution of a command by one actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub command: CommandId,
    pub executed: DateTime<Utc>,
}

impl ExecutionRecord {
    #[must_use]
    pub const fn new(command: CommandId, executed: DateTime<Utc>) -> Self {
        Self { command, executed }
    }
}

/// All execution records held for one actor, at most one per command.
///
/// Order is irrelevant, including for equality. Serializes as a plain list;
/// duplicate commands in a decoded list collapse to the last entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ExecutionRecord>", into = "Vec<ExecutionRecord>")]
pub struct ActorRecordSet {
    records: Vec<ExecutionRecord>,
}

impl PartialEq for ActorRecordSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .records
                .iter()
                .all(|record| other.get(&record.command) == Some(record.executed))
    }
}

impl Eq for ActorRecordSet {}

impl ActorRecordSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, command: &CommandId) -> Option<DateTime<Utc>> {
        self.records
            .iter()
            .find(|record| &record.command == command)
            .map(|record| record.executed)
    }

    /// Insert or overwrite the record for `command`.
    pub fn upsert(&mut self, command: &CommandId, executed: DateTime<Utc>) {
        match self.records.iter_mut().find(|record| &record.command == command) {
            Some(record) => record.executed = executed,
            None => self
                .records
                .push(ExecutionRecord::new(command.clone(), executed)),
        }
    }

    /// Add records for commands not already present. Existing entries win.
    pub fn merge_missing(&mut self, other: &Self) {
        for record in &other.records {
            if self.get(&record.command).is_none() {
                self.records.push(record.clone());
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExecutionRecord> {
        self.records.iter()
    }
}

impl FromIterator<ExecutionRecord> for ActorRecordSet {
    fn from_iter<I: IntoIterator<Item = ExecutionRecord>>(iter: I) -> Self {
        let mut set = Self::new();
        for record in iter {
            set.upsert(&record.command, record.executed);
        }
        set
    }
}

impl From<Vec<ExecutionRecord>> for ActorRecordSet {
    fn from(records: Vec<ExecutionRecord>) -> Self {
        records.into_iter().collect()
    }
}

impl From<ActorRecordSet> for Vec<ExecutionRecord> {
    fn from(set: ActorRecordSet) -> Self {
        set.records
    }
}
