//! Per-invocation wiring: configuration, logging, database and services.

use anyhow::{Context, Result};

use super::GlobalArgs;
use crate::adapters::sqlite::{initialize_database, repositories, PoolConfig};
use crate::domain::models::{Actor, Config};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::{LogConfig, LoggerImpl};
use crate::services::Engine;

pub struct CliContext {
    pub engine: Engine,
    pub config: Config,
    pub json: bool,
    user: Option<String>,
    roles: Vec<String>,
    _logger: LoggerImpl,
}

impl CliContext {
    pub async fn open(global: &GlobalArgs) -> Result<Self> {
        let config = load_config(global)?;
        let logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;

        let db_url = format!("sqlite:{}", config.database.path);
        let pool = initialize_database(&db_url, Some(PoolConfig::from(&config.database)))
            .await
            .with_context(|| {
                format!("Failed to open database at {}. Run 'runcheck init' first.", config.database.path)
            })?;

        Ok(Self {
            engine: Engine::new(repositories(pool), &config),
            config,
            json: global.json,
            user: global.user.clone(),
            roles: global.roles.clone(),
            _logger: logger,
        })
    }

    /// The acting user; commands that write require one.
    pub fn actor(&self) -> Result<Actor> {
        let user = self
            .user
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .context("No acting user. Pass --user or set RUNCHECK_USER.")?;
        Ok(Actor::new(user, &self.roles))
    }
}

pub fn load_config(global: &GlobalArgs) -> Result<Config> {
    match &global.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}
