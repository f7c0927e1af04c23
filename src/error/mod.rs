//! Error handling for cooldowns.
//!
//! This module provides:
//! - [`CooldownError`]: The main error enum for all engine operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//! - [`StructuredError`]: Serializable error with code, category and hint

mod codes;

use std::io;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::messages::Messages;

pub use codes::ErrorCode;

/// Main error type for cooldown operations.
#[derive(Error, Debug)]
pub enum CooldownError {
    #[error("Invalid duration format '{input}': {reason}")]
    InvalidDurationFormat { input: String, reason: String },

    #[error("{message}")]
    CooldownActive { remaining: Duration, message: String },

    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("Invalid cooldown data for role '{role_id}': {reason}")]
    RoleData { role_id: String, reason: String },

    #[error("Invalid actor reference: {0}")]
    InvalidActor(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing required config: {0}")]
    MissingConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl CooldownError {
    /// Shorthand for a duration parse failure.
    pub fn invalid_duration(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDurationFormat {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidDurationFormat { .. } => ErrorCode::DurationInvalid,
            Self::CooldownActive { .. } => ErrorCode::CooldownActive,
            Self::PersistenceUnavailable(_) => ErrorCode::PersistenceUnavailable,
            Self::RoleData { .. } => ErrorCode::RoleDataInvalid,
            Self::InvalidActor(_) => ErrorCode::ActorInvalid,
            Self::Config(_) | Self::Toml(_) => ErrorCode::ConfigInvalid,
            Self::MissingConfig(_) => ErrorCode::ConfigMissingRequired,
            Self::Internal(_) => ErrorCode::InternalError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) | Self::Yaml(_) => ErrorCode::SerializationError,
        }
    }

    /// Whether this is the expected "still cooling down" condition rather than a fault.
    #[must_use]
    pub const fn is_cooldown(&self) -> bool {
        matches!(self, Self::CooldownActive { .. })
    }

    /// Text that may be shown to the invoking actor.
    ///
    /// Only an active cooldown is shown verbatim; everything else collapses
    /// to the generic internal-error message so no internal detail leaks.
    #[must_use]
    pub fn user_message(&self, messages: &Messages) -> String {
        match self {
            Self::CooldownActive { message, .. } => message.clone(),
            _ => messages.internal_error().to_string(),
        }
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::InvalidDurationFormat { input, reason } => {
                Some(serde_json::json!({ "input": input, "reason": reason }))
            }
            Self::CooldownActive { remaining, .. } => {
                Some(serde_json::json!({ "remaining_secs": remaining.as_secs_f64() }))
            }
            Self::RoleData { role_id, reason } => {
                Some(serde_json::json!({ "role_id": role_id, "reason": reason }))
            }
            Self::MissingConfig(key) => Some(serde_json::json!({ "config_key": key })),
            _ => None,
        }
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "COOLDOWN_ACTIVE")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 201)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Additional context for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Whether this error is potentially recoverable by the user
    pub recoverable: bool,

    /// Error category (e.g., "cooldown", "config", "storage")
    pub category: String,
}

impl StructuredError {
    /// Create a new structured error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            numeric_code: code.numeric(),
            message: message.into(),
            suggestion: code.suggestion().to_string(),
            context: None,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
            code,
        }
    }

    /// Create a structured error from a `CooldownError`.
    #[must_use]
    pub fn from_error(err: &CooldownError) -> Self {
        Self {
            context: err.context(),
            ..Self::new(err.code(), err.to_string())
        }
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<&CooldownError> for StructuredError {
    fn from(err: &CooldownError) -> Self {
        Self::from_error(err)
    }
}

/// Result type alias using `CooldownError`.
pub type Result<T> = std::result::Result<T, CooldownError>;
