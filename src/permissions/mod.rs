//! Permission collaborator boundary
//!
//! The engine never reads raw role data. Implementations decode whatever
//! their backing format is into typed [`RoleRef`] and [`CooldownRule`] values
//! before handing them over.

mod role_file;

use async_trait::async_trait;

use crate::core::{ActorRef, CooldownRule, RoleRef};
use crate::error::Result;

pub use role_file::{RoleDefinition, RoleFile};

/// Outcome of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    Granted,
    Denied,
}

impl Grant {
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Roles, role data and grants for actors.
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    /// Roles the actor currently belongs to. Order is unspecified.
    async fn roles(&self, actor: &ActorRef) -> Result<Vec<RoleRef>>;

    /// Cooldown rules attached to a role; empty when the role has none.
    async fn role_cooldowns(&self, role_id: &str) -> Result<Vec<CooldownRule>>;

    /// Whether `permission` is granted to the actor.
    async fn check_grant(&self, actor: &ActorRef, permission: &str) -> Result<Grant>;
}
