//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Duration errors
//! - 2xx: Cooldown errors
//! - 3xx: Config errors
//! - 4xx: Permission errors
//! - 6xx: Storage errors
//! - 9xx: Internal errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for robot mode output.
///
/// Each variant maps to a numeric code (e.g., `DurationInvalid` -> E101).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Duration errors (1xx)
    // ========================================
    /// E101: A configured cooldown string could not be parsed
    DurationInvalid,

    // ========================================
    // Cooldown errors (2xx)
    // ========================================
    /// E201: The actor must wait before running the command again
    CooldownActive,

    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E301: Config file has invalid syntax or values
    ConfigInvalid,
    /// E302: Required config value is missing
    ConfigMissingRequired,

    // ========================================
    // Permission errors (4xx)
    // ========================================
    /// E401: Role data attached to a role could not be decoded
    RoleDataInvalid,
    /// E402: Actor reference could not be parsed
    ActorInvalid,

    // ========================================
    // Storage errors (6xx)
    // ========================================
    /// E601: Persistence backend failed to load or save
    PersistenceUnavailable,
    /// E602: Reading or writing a file failed
    IoError,
    /// E603: Encoding or decoding a structured record failed
    SerializationError,

    // ========================================
    // Internal errors (9xx)
    // ========================================
    /// E901: Unexpected internal failure
    InternalError,
}

impl ErrorCode {
    /// Get the numeric code (e.g., 101 for `DurationInvalid`).
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::DurationInvalid => 101,
            Self::CooldownActive => 201,
            Self::ConfigInvalid => 301,
            Self::ConfigMissingRequired => 302,
            Self::RoleDataInvalid => 401,
            Self::ActorInvalid => 402,
            Self::PersistenceUnavailable => 601,
            Self::IoError => 602,
            Self::SerializationError => 603,
            Self::InternalError => 901,
        }
    }

    /// Get the code as a string (e.g., "E101").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{:03}", self.numeric())
    }

    /// Get a short recovery hint for this error.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::DurationInvalid => {
                "Use durations like `45s`, `10m`, `1h30m` or `2d` in the role's cooldowns list"
            }
            Self::CooldownActive => "Wait for the remaining time and run the command again",
            Self::ConfigInvalid => "Check config.toml syntax and value types",
            Self::ConfigMissingRequired => "Add the missing key to config.toml or set its env override",
            Self::RoleDataInvalid => {
                "Each cooldowns entry must be a table with `command` and `cooldown` strings"
            }
            Self::ActorInvalid => "Actors are written as `<kind>.<id>`, e.g. `player.76561198000000000`",
            Self::PersistenceUnavailable => {
                "Check the records directory is writable, or disable persistence.enabled"
            }
            Self::IoError => "Check file permissions and available disk space",
            Self::SerializationError => "The record file may be corrupted; inspect or remove it",
            Self::InternalError => "Re-run with -vv and report the logged context",
        }
    }

    /// Whether the user can act on this error without code changes.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::DurationInvalid
            | Self::CooldownActive
            | Self::ConfigInvalid
            | Self::ConfigMissingRequired
            | Self::RoleDataInvalid
            | Self::ActorInvalid
            | Self::PersistenceUnavailable
            | Self::IoError => true,
            Self::SerializationError | Self::InternalError => false,
        }
    }

    /// Get the category name for this error.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "duration",
            2 => "cooldown",
            3 => "config",
            4 => "permission",
            6 => "storage",
            9 => "internal",
            _ => "unknown",
        }
    }

    /// Iterate over all error codes.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::DurationInvalid,
            Self::CooldownActive,
            Self::ConfigInvalid,
            Self::ConfigMissingRequired,
            Self::RoleDataInvalid,
            Self::ActorInvalid,
            Self::PersistenceUnavailable,
            Self::IoError,
            Self::SerializationError,
            Self::InternalError,
        ]
        .into_iter()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}
