use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CooldownError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub permissions: PermissionsConfig,
    #[serde(default)]
    pub messages: MessagesConfig,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub legacy: LegacyConfig,
}

impl Config {
    /// Load defaults, then config files, then environment overrides.
    ///
    /// An explicit path (or `COOLDOWNS_CONFIG`) replaces the global and
    /// project files.
    pub fn load(explicit_path: Option<&Path>, root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("COOLDOWNS_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            let patch = Self::load_patch(&path)?.ok_or_else(|| {
                CooldownError::MissingConfig(format!("config file {}", path.display()))
            })?;
            config.merge_patch(patch);
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_patch(&root.join("config.toml"))? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.resolve_paths(root);

        Ok(config)
    }

    /// Parse a config from TOML text over the defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let patch: ConfigPatch =
            toml::from_str(raw).map_err(|err| CooldownError::Config(format!("parse config: {err}")))?;
        let mut config = Self::default();
        config.merge_patch(patch);
        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("cooldowns/config.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| CooldownError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| CooldownError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.persistence {
            self.persistence.merge(patch);
        }
        if let Some(patch) = patch.permissions {
            self.permissions.merge(patch);
        }
        if let Some(patch) = patch.messages {
            self.messages.merge(patch);
        }
        if let Some(patch) = patch.gate {
            self.gate.merge(patch);
        }
        if let Some(patch) = patch.legacy {
            self.legacy.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = env_bool(&env, "COOLDOWNS_PERSISTENCE_ENABLED")? {
            self.persistence.enabled = value;
        }
        if let Some(value) = env("COOLDOWNS_PERSISTENCE_DIR") {
            self.persistence.directory = PathBuf::from(value);
        }
        if let Some(value) = env("COOLDOWNS_NAMESPACE") {
            self.permissions.namespace = value;
        }
        if let Some(value) = env("COOLDOWNS_ROLES_FILE") {
            self.permissions.roles_file = PathBuf::from(value);
        }
        if let Some(value) = env_bool(&env, "COOLDOWNS_RECORD_ALL")? {
            self.gate.record_all_executions = value;
        }
        if let Some(value) = env("COOLDOWNS_MESSAGE_COOLDOWN") {
            self.messages.cooldown = value;
        }
        Ok(())
    }

    /// Anchor relative file paths at `root`.
    fn resolve_paths(&mut self, root: &Path) {
        if self.persistence.directory.is_relative() {
            self.persistence.directory = root.join(&self.persistence.directory);
        }
        if self.permissions.roles_file.is_relative() {
            self.permissions.roles_file = root.join(&self.permissions.roles_file);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Keep execution records across restarts.
    pub enabled: bool,
    pub directory: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from("records"),
        }
    }
}

impl PersistenceConfig {
    fn merge(&mut self, patch: PersistencePatch) {
        if let Some(value) = patch.enabled {
            self.enabled = value;
        }
        if let Some(value) = patch.directory {
            self.directory = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionsConfig {
    /// Prefix of this plugin's permissions; immunity is `<namespace>:immune`.
    pub namespace: String,
    pub roles_file: PathBuf,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            namespace: "Cooldowns".to_string(),
            roles_file: PathBuf::from("roles.toml"),
        }
    }
}

impl PermissionsConfig {
    fn merge(&mut self, patch: PermissionsPatch) {
        if let Some(value) = patch.namespace {
            self.namespace = value;
        }
        if let Some(value) = patch.roles_file {
            self.roles_file = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    pub cooldown: String,
    pub internal_error: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            cooldown: "You must wait {time_left} before running this command again.".to_string(),
            internal_error: "An internal error occurred during the command execution.".to_string(),
        }
    }
}

impl MessagesConfig {
    fn merge(&mut self, patch: MessagesPatch) {
        if let Some(value) = patch.cooldown {
            self.cooldown = value;
        }
        if let Some(value) = patch.internal_error {
            self.internal_error = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Record every successful execution, not only those with a cooldown.
    pub record_all_executions: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            record_all_executions: true,
        }
    }
}

impl GateConfig {
    fn merge(&mut self, patch: GatePatch) {
        if let Some(value) = patch.record_all_executions {
            self.record_all_executions = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyConfig {
    /// Prefix stripped from aliases routed to the legacy pipeline.
    pub alias_prefix: String,
    /// Prefix of command ids produced by the legacy adapter.
    pub id_prefix: String,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            alias_prefix: "legacy:".to_string(),
            id_prefix: "Legacy.".to_string(),
        }
    }
}

impl LegacyConfig {
    fn merge(&mut self, patch: LegacyPatch) {
        if let Some(value) = patch.alias_prefix {
            self.alias_prefix = value;
        }
        if let Some(value) = patch.id_prefix {
            self.id_prefix = value;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    persistence: Option<PersistencePatch>,
    permissions: Option<PermissionsPatch>,
    messages: Option<MessagesPatch>,
    gate: Option<GatePatch>,
    legacy: Option<LegacyPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct PersistencePatch {
    enabled: Option<bool>,
    directory: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct PermissionsPatch {
    namespace: Option<String>,
    roles_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct MessagesPatch {
    cooldown: Option<String>,
    internal_error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GatePatch {
    record_all_executions: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LegacyPatch {
    alias_prefix: Option<String>,
    id_prefix: Option<String>,
}

fn env_bool(env: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<bool>> {
    match env(key) {
        Some(value) => match value.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(CooldownError::Config(format!("invalid {key} value {value}"))),
        },
        None => Ok(None),
    }
}
