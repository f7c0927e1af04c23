//! Engine wiring
//!
//! Everything is constructed explicitly from a [`Config`] and handed to
//! callers; there is no global instance.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::adapters::{DispatchHooks, LegacyCooldownHook, LegacyRegistry, NativeCooldownListener};
use crate::cli::Cli;
use crate::config::Config;
use crate::core::{Clock, CooldownResolver, ExecutionGate, ExemptionCheck, RecordStore, SystemClock};
use crate::error::Result;
use crate::messages::Messages;
use crate::permissions::{PermissionProvider, RoleFile};
use crate::storage::{RecordPersistence, YamlDirectoryStore};

/// A fully wired cooldown engine.
#[derive(Clone)]
pub struct Engine {
    gate: Arc<ExecutionGate>,
    hooks: DispatchHooks,
    config: Config,
}

impl Engine {
    /// Wire an engine from its collaborators.
    ///
    /// `persistence` is ignored when `persistence.enabled` is off.
    pub fn new(
        config: &Config,
        permissions: Arc<dyn PermissionProvider>,
        persistence: Option<Arc<dyn RecordPersistence>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let persistence = persistence.filter(|_| config.persistence.enabled);
        let exemption = ExemptionCheck::new(permissions.clone(), &config.permissions.namespace);
        let store = RecordStore::new(exemption, persistence);
        let gate = Arc::new(
            ExecutionGate::new(
                CooldownResolver::new(permissions),
                Arc::new(store),
                clock,
                Messages::from_config(&config.messages),
            )
            .with_record_all(config.gate.record_all_executions),
        );
        Self {
            hooks: DispatchHooks::new(gate.clone()),
            gate,
            config: config.clone(),
        }
    }

    /// Wire an engine over the roles file and record directory named in
    /// `config`, on the system clock.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let roles = Arc::new(RoleFile::load(&config.permissions.roles_file).await?);
        let persistence: Option<Arc<dyn RecordPersistence>> = config
            .persistence
            .enabled
            .then(|| {
                Arc::new(YamlDirectoryStore::new(config.persistence.directory.clone()))
                    as Arc<dyn RecordPersistence>
            });
        debug!(
            roles = %config.permissions.roles_file.display(),
            persistent = persistence.is_some(),
            "engine configured"
        );
        Ok(Self::new(config, roles, persistence, Arc::new(SystemClock)))
    }

    #[must_use]
    pub const fn gate(&self) -> &Arc<ExecutionGate> {
        &self.gate
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn native_listener(&self) -> NativeCooldownListener {
        NativeCooldownListener::new(self.hooks.clone())
    }

    #[must_use]
    pub fn legacy_hook(&self, registry: Option<Arc<dyn LegacyRegistry>>) -> LegacyCooldownHook {
        LegacyCooldownHook::new(self.hooks.clone(), registry, &self.config.legacy)
    }
}

/// State shared by CLI commands.
pub struct AppContext {
    pub root: PathBuf,
    pub config: Config,
    pub engine: Engine,
    pub robot_mode: bool,
}

impl AppContext {
    pub async fn from_cli(cli: &Cli) -> Result<Self> {
        let root = match &cli.root {
            Some(root) => root.clone(),
            None => std::env::current_dir()?,
        };
        let config = Config::load(cli.config.as_deref(), &root)?;
        let engine = Engine::from_config(&config).await?;
        Ok(Self {
            root,
            config,
            engine,
            robot_mode: cli.robot,
        })
    }
}
