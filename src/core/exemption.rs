//! Actors that bypass cooldowns entirely

use std::sync::Arc;

use crate::core::types::ActorRef;
use crate::error::Result;
use crate::permissions::PermissionProvider;

/// Permission suffix granting cooldown immunity.
pub const IMMUNE_PERMISSION: &str = "immune";

/// Console actors and holders of `<namespace>:immune` are exempt.
///
/// Evaluated on every call; grants may change at runtime.
#[derive(Clone)]
pub struct ExemptionCheck {
    permissions: Arc<dyn PermissionProvider>,
    immune_permission: String,
}

impl ExemptionCheck {
    pub fn new(permissions: Arc<dyn PermissionProvider>, namespace: &str) -> Self {
        Self {
            permissions,
            immune_permission: format!("{namespace}:{IMMUNE_PERMISSION}"),
        }
    }

    #[must_use]
    pub fn immune_permission(&self) -> &str {
        &self.immune_permission
    }

    pub async fn is_exempt(&self, actor: &ActorRef) -> Result<bool> {
        if actor.kind.is_console() {
            return Ok(true);
        }
        let grant = self
            .permissions
            .check_grant(actor, &self.immune_permission)
            .await?;
        Ok(grant.is_granted())
    }
}
