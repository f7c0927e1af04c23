//! Effective cooldown resolution from prioritized roles

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};

use crate::core::duration;
use crate::core::types::{ActorRef, CommandId, RoleRef};
use crate::error::Result;
use crate::permissions::PermissionProvider;

/// The single cooldown applying to an actor/command pair, if any.
pub type EffectiveCooldown = Option<Duration>;

/// A resolved cooldown with the role it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCooldown {
    pub duration: Duration,
    pub role_id: String,
    pub priority: i32,
    /// The rule's raw text, as configured.
    pub raw: String,
}

/// Picks the cooldown of the highest-priority role carrying a matching rule.
///
/// Nothing is cached: role membership and role data are read on every call.
#[derive(Clone)]
pub struct CooldownResolver {
    permissions: Arc<dyn PermissionProvider>,
}

impl CooldownResolver {
    pub fn new(permissions: Arc<dyn PermissionProvider>) -> Self {
        Self { permissions }
    }

    /// Resolve using the actor's current roles.
    pub async fn resolve_for(
        &self,
        actor: &ActorRef,
        command: &CommandId,
    ) -> Result<EffectiveCooldown> {
        let roles = self.permissions.roles(actor).await?;
        self.resolve(&roles, command).await
    }

    /// Resolve using the actor's current roles, reporting the winning role.
    pub async fn resolve_detailed_for(
        &self,
        actor: &ActorRef,
        command: &CommandId,
    ) -> Result<Option<ResolvedCooldown>> {
        let roles = self.permissions.roles(actor).await?;
        self.resolve_detailed(&roles, command).await
    }

    /// Resolve against an explicit role list.
    pub async fn resolve(&self, roles: &[RoleRef], command: &CommandId) -> Result<EffectiveCooldown> {
        Ok(self
            .resolve_detailed(roles, command)
            .await?
            .map(|resolved| resolved.duration))
    }

    /// Resolve against an explicit role list, reporting the winning role.
    ///
    /// Among equal priorities the first role in `roles` wins; callers that
    /// need a stable winner must order the list themselves. Within one role
    /// the first matching rule is used.
    ///
    /// # Errors
    ///
    /// Any role-data or duration parse failure aborts the whole resolution.
    pub async fn resolve_detailed(
        &self,
        roles: &[RoleRef],
        command: &CommandId,
    ) -> Result<Option<ResolvedCooldown>> {
        let mut best: Option<ResolvedCooldown> = None;

        for role in roles {
            // A role at or below the current winner can never replace it.
            if best
                .as_ref()
                .is_some_and(|current| role.priority <= current.priority)
            {
                continue;
            }

            let rules = self.permissions.role_cooldowns(&role.id).await?;
            let Some(rule) = rules.iter().find(|rule| command.matches(&rule.command)) else {
                continue;
            };

            let parsed = duration::parse(&rule.cooldown).inspect_err(|err| {
                error!(
                    role = %role.id,
                    command = %command,
                    error = %err,
                    "error occurred while parsing command cooldown"
                );
            })?;

            debug!(role = %role.id, priority = role.priority, cooldown = %rule.cooldown, "cooldown candidate");
            best = Some(ResolvedCooldown {
                duration: parsed,
                role_id: role.id.clone(),
                priority: role.priority,
                raw: rule.cooldown.clone(),
            });
        }

        Ok(best)
    }
}
