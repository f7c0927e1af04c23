//! TOML-backed roles document
//!
//! ```toml
//! [[roles]]
//! id = "vip"
//! priority = 10
//! members = ["player.76561198000000000"]
//! grants = ["Cooldowns:immune"]
//!
//! [[roles.data.cooldowns]]
//! command = "heal"
//! cooldown = "30s"
//! ```

use std::path::Path;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Grant, PermissionProvider};
use crate::core::{ActorRef, CooldownRule, RoleRef};
use crate::error::{CooldownError, Result};

/// Data key holding a role's cooldown list.
const COOLDOWNS_KEY: &str = "cooldowns";

/// One role as written in the roles file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub id: String,
    #[serde(default)]
    pub priority: i32,
    /// Actor keys (`kind.id`) that belong to this role.
    #[serde(default)]
    pub members: Vec<String>,
    /// Assigned to every actor regardless of membership.
    #[serde(default)]
    pub auto_assign: bool,
    #[serde(default)]
    pub grants: Vec<String>,
    /// Free-form role data; `cooldowns` is decoded on demand.
    #[serde(default)]
    pub data: toml::Table,
}

impl RoleDefinition {
    fn applies_to(&self, actor_key: &str) -> bool {
        self.auto_assign
            || self
                .members
                .iter()
                .any(|member| member.eq_ignore_ascii_case(actor_key))
    }

    fn decode_cooldowns(&self) -> Result<Vec<CooldownRule>> {
        let Some(raw) = self.data.get(COOLDOWNS_KEY) else {
            return Ok(Vec::new());
        };
        let entries = raw.as_array().ok_or_else(|| CooldownError::RoleData {
            role_id: self.id.clone(),
            reason: format!("`{COOLDOWNS_KEY}` must be a list, found {}", raw.type_str()),
        })?;

        let mut rules = Vec::with_capacity(entries.len());
        for entry in entries {
            if !entry.is_table() {
                warn!(role = %self.id, entry = %entry, "skipping non-table cooldown entry");
                continue;
            }
            let rule: CooldownRule =
                entry
                    .clone()
                    .try_into()
                    .map_err(|err: toml::de::Error| CooldownError::RoleData {
                        role_id: self.id.clone(),
                        reason: err.message().to_string(),
                    })?;
            rules.push(rule);
        }
        Ok(rules)
    }
}

#[derive(Debug, Default, Deserialize)]
struct RoleDocument {
    #[serde(default)]
    roles: Vec<RoleDefinition>,
}

/// Permission provider reading roles from a TOML document.
#[derive(Debug, Default)]
pub struct RoleFile {
    roles: RwLock<Vec<RoleDefinition>>,
}

impl RoleFile {
    #[must_use]
    pub fn new(roles: Vec<RoleDefinition>) -> Self {
        Self {
            roles: RwLock::new(roles),
        }
    }

    /// Parse a roles document from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let document: RoleDocument = toml::from_str(raw)?;
        Ok(Self::new(document.roles))
    }

    /// Load a roles document. A missing file yields no roles.
    pub async fn load(path: &Path) -> Result<Self> {
        let file = Self::default();
        file.reload(path).await?;
        Ok(file)
    }

    /// Re-read the document, replacing all roles.
    pub async fn reload(&self, path: &Path) -> Result<()> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "roles file not found; no cooldowns configured");
                String::new()
            }
            Err(err) => return Err(err.into()),
        };
        let document: RoleDocument = toml::from_str(&raw)
            .map_err(|err| CooldownError::Config(format!("parse roles {}: {err}", path.display())))?;
        debug!(path = %path.display(), roles = document.roles.len(), "loaded roles");
        *self.roles.write() = document.roles;
        Ok(())
    }

    /// Replace all roles in place.
    pub fn replace(&self, roles: Vec<RoleDefinition>) {
        *self.roles.write() = roles;
    }
}

fn grant_matches(pattern: &str, permission: &str) -> bool {
    if pattern == "*" || pattern.eq_ignore_ascii_case(permission) {
        return true;
    }
    pattern.strip_suffix('*').is_some_and(|prefix| {
        permission
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

#[async_trait]
impl PermissionProvider for RoleFile {
    async fn roles(&self, actor: &ActorRef) -> Result<Vec<RoleRef>> {
        let key = actor.key();
        Ok(self
            .roles
            .read()
            .iter()
            .filter(|role| role.applies_to(&key))
            .map(|role| RoleRef::new(role.id.clone(), role.priority))
            .collect())
    }

    async fn role_cooldowns(&self, role_id: &str) -> Result<Vec<CooldownRule>> {
        let roles = self.roles.read();
        match roles.iter().find(|role| role.id.eq_ignore_ascii_case(role_id)) {
            Some(role) => role.decode_cooldowns(),
            None => Ok(Vec::new()),
        }
    }

    async fn check_grant(&self, actor: &ActorRef, permission: &str) -> Result<Grant> {
        let key = actor.key();
        let granted = self
            .roles
            .read()
            .iter()
            .filter(|role| role.applies_to(&key))
            .flat_map(|role| role.grants.iter())
            .any(|pattern| grant_matches(pattern, permission));
        Ok(if granted { Grant::Granted } else { Grant::Denied })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    const ROLES: &str = r#"
[[roles]]
id = "default"
priority = 0
auto_assign = true

[[roles.data.cooldowns]]
command = "heal"
cooldown = "5m"

[[roles]]
id = "vip"
priority = 10
members = ["player.1"]
grants = ["kits:*"]

[[roles.data.cooldowns]]
command = "heal"
cooldown = "30s"

[[roles]]
id = "staff"
priority = 100
members = ["Player.2"]
grants = ["Cooldowns:immune"]
"#;

    #[tokio::test]
    async fn roles_include_auto_assigned_and_members() {
        let file = RoleFile::from_toml_str(ROLES).unwrap();

        let roles = file.roles(&ActorRef::player("1")).await.unwrap();
        let ids: Vec<_> = roles.iter().map(|role| role.id.as_str()).collect();
        assert_eq!(ids, ["default", "vip"]);

        let roles = file.roles(&ActorRef::player("2")).await.unwrap();
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[1], RoleRef::new("staff", 100));

        let roles = file.roles(&ActorRef::player("3")).await.unwrap();
        assert_eq!(roles, [RoleRef::new("default", 0)]);
    }

    #[tokio::test]
    async fn cooldowns_decode_into_rules() {
        let file = RoleFile::from_toml_str(ROLES).unwrap();
        assert_eq!(
            file.role_cooldowns("vip").await.unwrap(),
            [CooldownRule::new("heal", "30s")]
        );
        assert!(file.role_cooldowns("staff").await.unwrap().is_empty());
        assert!(file.role_cooldowns("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_cooldown_entry_is_role_data_error() {
        let file = RoleFile::from_toml_str(
            r#"
[[roles]]
id = "broken"

[[roles.data.cooldowns]]
command = "heal"
"#,
        )
        .unwrap();

        let err = file.role_cooldowns("broken").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::RoleDataInvalid);
    }

    #[tokio::test]
    async fn non_list_cooldowns_is_role_data_error() {
        let file = RoleFile::from_toml_str(
            r#"
[[roles]]
id = "broken"
data = { cooldowns = "heal=30s" }
"#,
        )
        .unwrap();

        assert!(matches!(
            file.role_cooldowns("broken").await,
            Err(CooldownError::RoleData { .. })
        ));
    }

    #[tokio::test]
    async fn non_table_entries_are_skipped() {
        let file = RoleFile::from_toml_str(
            r#"
[[roles]]
id = "mixed"
data = { cooldowns = ["heal", { command = "kit", cooldown = "1h" }] }
"#,
        )
        .unwrap();

        assert_eq!(
            file.role_cooldowns("mixed").await.unwrap(),
            [CooldownRule::new("kit", "1h")]
        );
    }

    #[tokio::test]
    async fn extra_keys_in_entries_are_ignored() {
        let file = RoleFile::from_toml_str(
            r#"
[[roles]]
id = "annotated"
data = { cooldowns = [{ command = "heal", cooldown = "30s", note = "daily" }] }
"#,
        )
        .unwrap();

        assert_eq!(
            file.role_cooldowns("annotated").await.unwrap(),
            [CooldownRule::new("heal", "30s")]
        );
    }

    #[tokio::test]
    async fn grants_support_wildcards() {
        let file = RoleFile::from_toml_str(ROLES).unwrap();
        let vip = ActorRef::player("1");
        let staff = ActorRef::player("2");

        assert!(file.check_grant(&vip, "kits:vip").await.unwrap().is_granted());
        assert!(!file.check_grant(&vip, "Cooldowns:immune").await.unwrap().is_granted());
        assert!(file.check_grant(&staff, "cooldowns:IMMUNE").await.unwrap().is_granted());
    }

    #[tokio::test]
    async fn missing_file_yields_no_roles() {
        let dir = tempfile::tempdir().unwrap();
        let file = RoleFile::load(&dir.path().join("roles.toml")).await.unwrap();
        assert!(file.roles(&ActorRef::player("1")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reload_picks_up_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roles.toml");
        std::fs::write(&path, ROLES).unwrap();
        let file = RoleFile::load(&path).await.unwrap();
        assert_eq!(file.roles(&ActorRef::player("9")).await.unwrap().len(), 1);

        std::fs::write(&path, "").unwrap();
        file.reload(&path).await.unwrap();
        assert!(file.roles(&ActorRef::player("9")).await.unwrap().is_empty());
    }
}
