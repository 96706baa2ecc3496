//! Configuration Loader
//!
//! Environment-aware configuration loading. Handles file discovery,
//! environment detection and layering through the `config` crate.

use super::error::{ConfigResult, ConfigurationError};
use super::ConsumerConfig;
use crate::constants::env as env_vars;
use config::{Config, Environment, File};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Base name of configuration files inside the config directory
const CONFIG_FILE_STEM: &str = "transcode-consumer";

/// Where configuration is read from
#[derive(Debug, Clone)]
pub struct ConfigSources {
    /// Explicit file; must exist when set
    pub config_path: Option<PathBuf>,
    /// Directory searched for `transcode-consumer.toml` and
    /// `transcode-consumer.<environment>.toml` when no explicit file is given
    pub config_dir: PathBuf,
    /// Deployment environment name
    pub environment: String,
    /// Environment variable snapshot; `None` reads the process environment
    pub env_overrides: Option<HashMap<String, String>>,
}

impl ConfigSources {
    /// Sources derived from the process environment
    pub fn from_env() -> Self {
        Self {
            config_path: env::var(env_vars::CONFIG_PATH).ok().map(PathBuf::from),
            config_dir: PathBuf::from("config"),
            environment: detect_environment(),
            env_overrides: None,
        }
    }

    fn candidate_files(&self) -> Vec<(PathBuf, bool)> {
        match &self.config_path {
            Some(path) => vec![(path.clone(), true)],
            None => vec![
                (
                    self.config_dir.join(format!("{CONFIG_FILE_STEM}.toml")),
                    false,
                ),
                (
                    self.config_dir
                        .join(format!("{CONFIG_FILE_STEM}.{}.toml", self.environment)),
                    false,
                ),
            ],
        }
    }
}

/// Loaded, validated configuration plus where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: ConsumerConfig,
    environment: String,
    loaded_files: Vec<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from(ConfigSources::from_env())
    }

    /// Load configuration from explicit sources
    ///
    /// Layering, lowest precedence first: defaults, config files, environment
    /// variables (`TRANSCODE_QUEUE__URL`, `TRANSCODE_NETWORK__SUBNETS=a,b`).
    pub fn load_from(sources: ConfigSources) -> ConfigResult<Arc<ConfigManager>> {
        debug!(
            environment = %sources.environment,
            config_dir = %sources.config_dir.display(),
            "Loading configuration"
        );

        let mut builder = Config::builder().add_source(Config::try_from(&ConsumerConfig::default())?);

        let mut loaded_files = Vec::new();
        for (path, required) in sources.candidate_files() {
            if !path.is_file() {
                if required {
                    return Err(ConfigurationError::config_file_not_found(path));
                }
                continue;
            }
            builder = builder.add_source(File::from(path.clone()).required(required));
            loaded_files.push(path);
        }

        let environment = Environment::with_prefix(env_vars::CONFIG_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("network.subnets")
            .with_list_parse_key("network.security_groups")
            .try_parsing(true)
            .source(sources.env_overrides.clone());

        let config: ConsumerConfig = builder
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        config.validate()?;

        info!(
            environment = %sources.environment,
            files = ?loaded_files,
            queue = %config.queue.url,
            cluster = %config.job.cluster_id,
            dry_run = config.job.dry_run,
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: sources.environment,
            loaded_files,
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    /// Get the deployment environment
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Files that contributed to the configuration, in load order
    pub fn loaded_files(&self) -> &[PathBuf] {
        &self.loaded_files
    }

    /// Effective configuration as JSON, for diagnostics
    pub fn debug_config(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null)
    }
}

/// Detect the deployment environment from `TRANSCODE_ENV`
pub fn detect_environment() -> String {
    env::var(env_vars::ENVIRONMENT)
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
        .to_lowercase()
}
