use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid scan_time: {0}. Must be wall-clock HH:MM")]
    InvalidScanTime(String),

    #[error("Invalid page size: {0}. Must be at least 1")]
    InvalidPageSize(u32),

    #[error("API host cannot be empty")]
    EmptyApiHost,

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .agora/config.yaml (project config, created by init)
    /// 3. .agora/local.yaml (project local overrides, optional)
    /// 4. Environment variables (AGORA_* prefix, highest priority)
    ///
    /// Configuration is always project-local (pwd/.agora/) so one machine
    /// can host several association databases side by side.
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            // 1. Start with programmatic defaults
            .merge(Serialized::defaults(Config::default()))
            // 2. Merge project config (primary config, created by init)
            .merge(Yaml::file(".agora/config.yaml"))
            // 3. Merge project local overrides (optional, for dev/test overrides)
            .merge(Yaml::file(".agora/local.yaml"))
            // 4. Merge environment variables (highest priority)
            .merge(Env::prefixed("AGORA_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        // Validate database config
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        // Validate logging config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        // Validate scheduler config
        if chrono::NaiveTime::parse_from_str(&config.scheduler.scan_time, "%H:%M").is_err() {
            return Err(ConfigError::InvalidScanTime(
                config.scheduler.scan_time.clone(),
            ));
        }

        // Validate API config
        if config.api.host.is_empty() {
            return Err(ConfigError::EmptyApiHost);
        }

        // Validate engagement tuning
        if config.engagement.proposal_page_size == 0 {
            return Err(ConfigError::InvalidPageSize(
                config.engagement.proposal_page_size,
            ));
        }
        if config.engagement.comment_page_size == 0 {
            return Err(ConfigError::InvalidPageSize(
                config.engagement.comment_page_size,
            ));
        }

        // Validate collaborator endpoints when present
        for url in [
            config.collaborators.directory_url.as_deref(),
            config.collaborators.notify_url.as_deref(),
        ]
        .into_iter()
        .flatten()
        {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::ValidationFailed(format!(
                    "Collaborator URL '{url}' must be http(s)"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database.path, ".agora/agora.db");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.scheduler.scan_time, "03:00");
        assert_eq!(config.api.port, 8085);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
database:
  path: /custom/path.db
  max_connections: 5
logging:
  level: debug
  format: json
scheduler:
  scan_time: '21:30'
  run_on_startup: false
engagement:
  proposal_page_size: 50
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.database.path, "/custom/path.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.scheduler.scan_time, "21:30");
        assert!(!config.scheduler.run_on_startup);
        assert_eq!(config.engagement.proposal_page_size, 50);
        // Untouched sections keep their defaults
        assert_eq!(config.engagement.comment_page_size, 10);
        assert_eq!(config.api.host, "127.0.0.1");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn test_invalid_scan_time_rejected() {
        let mut config = Config::default();
        config.scheduler.scan_time = "25:99".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidScanTime(_))
        ));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut config = Config::default();
        config.engagement.comment_page_size = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidPageSize(0))
        ));
    }

    #[test]
    fn test_non_http_collaborator_url_rejected() {
        let mut config = Config::default();
        config.collaborators.notify_url = Some("ftp://example.com/hook".to_string());
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "api:\n  port: 9100\n").expect("write config");

        let config = ConfigLoader::load_from_file(&path).expect("load config");
        assert_eq!(config.api.port, 9100);
        assert_eq!(config.database.path, ".agora/agora.db");
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        // Figment treats a missing YAML file as an empty provider.
        let config = ConfigLoader::load_from_file("/nonexistent/agora.yaml")
            .expect("defaults should survive a missing file");
        assert_eq!(config.api.port, 8085);
    }
}
