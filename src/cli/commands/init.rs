//! Implementation of the `runcheck init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::adapters::sqlite::{initialize_database, repositories, PoolConfig};
use crate::cli::output::{output, CommandOutput};
use crate::cli::GlobalArgs;
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::{LogConfig, LoggerImpl};
use crate::services::Engine;

const SEED_ACTOR: &str = "runcheck";

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing .runcheck/config.yaml
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub initialized_path: PathBuf,
    pub config_written: bool,
    pub database_path: PathBuf,
    pub subjects_seeded: usize,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if self.config_written {
            lines.push("\nWrote .runcheck/config.yaml".to_string());
        }
        lines.push(format!("Database ready at {}", self.database_path.display()));
        if self.subjects_seeded > 0 {
            lines.push(format!("Seeded {} default subject(s)", self.subjects_seeded));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: InitArgs, global: &GlobalArgs) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir().context("Failed to get current directory")?.join(&args.path)
    };

    let config = match &global.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => Config::default(),
    };
    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;

    let runcheck_dir = target_path.join(".runcheck");
    fs::create_dir_all(&runcheck_dir)
        .await
        .with_context(|| format!("Failed to create {}", runcheck_dir.display()))?;

    let config_written = write_config(&runcheck_dir.join("config.yaml"), &config, args.force).await?;

    let database_path = resolve_database_path(&target_path, &config.database.path);
    let db_url = format!("sqlite:{}", database_path.display());
    let pool = initialize_database(&db_url, Some(PoolConfig::from(&config.database)))
        .await
        .context("Failed to initialize database")?;

    let engine = Engine::new(repositories(pool), &config);
    let actor = global.user.as_deref().unwrap_or(SEED_ACTOR);
    let subjects_seeded = engine.catalog.seed_defaults(actor).await?;

    let output_data = InitOutput {
        success: true,
        message: if config_written || subjects_seeded > 0 {
            "Project initialized successfully.".to_string()
        } else {
            "Project already initialized.".to_string()
        },
        initialized_path: target_path,
        config_written,
        database_path,
        subjects_seeded,
    };

    output(&output_data, global.json);
    Ok(())
}

/// Write the project config unless one exists and `force` is off.
async fn write_config(path: &Path, config: &Config, force: bool) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
    fs::write(path, yaml)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

fn resolve_database_path(root: &Path, configured: &str) -> PathBuf {
    let path = Path::new(configured);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
