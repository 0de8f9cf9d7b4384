use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::domain::models::normalize_role;

/// Prefix of environment variable overrides; `__` separates nested keys.
pub const ENV_PREFIX: &str = "RUNCHECK_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid role in auth.{section}: {role}")]
    InvalidRole { section: &'static str, role: String },
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .runcheck/config.yaml (project config, created by init)
    /// 3. .runcheck/local.yaml (project local overrides, optional)
    /// 4. Environment variables (RUNCHECK_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".runcheck/config.yaml"))
            .merge(Yaml::file(".runcheck/local.yaml"))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file; environment overrides still apply.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.trim().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.database.max_connections));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(config.logging.rotation.clone()));
        }

        for (section, roles) in [
            ("admin_roles", &config.auth.admin_roles),
            ("override_roles", &config.auth.override_roles),
        ] {
            if let Some(bad) = roles.iter().find(|r| normalize_role(r).is_none()) {
                return Err(ConfigError::InvalidRole {
                    section,
                    role: bad.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn yaml_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database.path, ".runcheck/runcheck.db");
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.auth.override_roles, vec!["SYS:RUNCHECK".to_string()]);
        assert!(config.history.watch_all_subject_fields);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
database:
  path: /srv/runcheck.db
  max_connections: 8
logging:
  level: debug
  format: json
auth:
  admin_roles: [SYS:ADMIN, GRP:OPS]
history:
  watch_all_subject_fields: false
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");
        assert_eq!(config.database.path, "/srv/runcheck.db");
        assert_eq!(config.database.max_connections, 8);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.rotation, "daily");
        assert_eq!(config.auth.admin_roles.len(), 2);
        assert_eq!(config.auth.override_roles, vec!["SYS:RUNCHECK".to_string()]);
        assert!(!config.history.watch_all_subject_fields);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "loud"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidLogFormat(_)
        ));
    }

    #[test]
    fn test_validate_database_settings() {
        let mut config = Config::default();
        config.database.path = "  ".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::EmptyDatabasePath
        ));

        let mut config = Config::default();
        config.database.max_connections = 0;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidMaxConnections(0)
        ));
    }

    #[test]
    fn test_validate_malformed_role() {
        let mut config = Config::default();
        config.auth.override_roles.push("runcheck".to_string());

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidRole { section, role } => {
                assert_eq!(section, "override_roles");
                assert_eq!(role, "runcheck");
            }
            other => panic!("Expected InvalidRole error, got {other:?}"),
        }
    }

    #[test]
    fn test_file_then_env_precedence() {
        let file = yaml_file("logging:\n  level: warn\n  format: json\ndatabase:\n  path: from-file.db\n");

        temp_env::with_vars(
            [
                ("RUNCHECK_LOGGING__LEVEL", Some("debug")),
                ("RUNCHECK_DATABASE__MAX_CONNECTIONS", Some("2")),
            ],
            || {
                let config = ConfigLoader::load_from_file(file.path()).unwrap();
                assert_eq!(config.logging.level, "debug", "env should win over file");
                assert_eq!(config.logging.format, "json", "file should win over defaults");
                assert_eq!(config.database.path, "from-file.db");
                assert_eq!(config.database.max_connections, 2);
            },
        );
    }

    #[test]
    fn test_invalid_env_override_rejected() {
        let file = yaml_file("logging:\n  level: info\n");

        temp_env::with_var("RUNCHECK_LOGGING__FORMAT", Some("xml"), || {
            let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
            assert!(err.to_string().contains("Invalid log format"));
        });
    }

    #[test]
    fn test_missing_file_rejected() {
        assert!(ConfigLoader::load_from_file("/nonexistent/runcheck.yaml").is_err());
    }
}
