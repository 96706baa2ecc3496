//! # Consumer Configuration System
//!
//! Layered, validated configuration for the notification consumer. Values come
//! from built-in defaults, an optional TOML file, an optional
//! environment-specific TOML file and `TRANSCODE_*` environment variables, in
//! increasing order of precedence.
//!
//! Credentials are never part of this configuration; the AWS default
//! provider chain supplies them.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use transcode_consumer::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let queue_url = &manager.config().queue.url;
//! let backoff = manager.config().poll.error_backoff();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::defaults;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::{ConfigManager, ConfigSources};

/// SQS refuses more than 10 messages per receive
const MAX_RECEIVE_BATCH: i32 = 10;
/// SQS caps long polling at 20 seconds
const MAX_WAIT_TIME_SECONDS: u64 = 20;

/// Root configuration structure mirroring transcode-consumer.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsumerConfig {
    /// Cloud provider client settings
    pub aws: AwsConfig,

    /// Notification queue settings
    pub queue: QueueConfig,

    /// Poll loop behaviour
    pub poll: PollConfig,

    /// Job launch template
    pub job: JobConfig,

    /// Network placement of launched jobs
    pub network: NetworkConfig,
}

/// Cloud provider client settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AwsConfig {
    /// Region override; falls back to the SDK's region chain, then `us-east-1`
    pub region: Option<String>,
    /// Endpoint override for local stacks (e.g. LocalStack)
    pub endpoint_url: Option<String>,
}

/// Notification queue settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Queue url
    pub url: String,
    /// Messages requested per receive
    pub max_messages: i32,
    /// Long-poll wait per receive
    pub wait_time_seconds: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_messages: defaults::MAX_MESSAGES,
            wait_time_seconds: defaults::WAIT_TIME_SECONDS,
        }
    }
}

impl QueueConfig {
    pub fn wait_time(&self) -> Duration {
        Duration::from_secs(self.wait_time_seconds)
    }
}

/// Poll loop behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollConfig {
    /// Fixed delay after a failed receive
    pub error_backoff_ms: u64,
    /// Receive count above which a message is reported as repeatedly redelivered
    pub redelivery_warn_threshold: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            error_backoff_ms: defaults::ERROR_BACKOFF_MS,
            redelivery_warn_threshold: defaults::REDELIVERY_WARN_THRESHOLD,
        }
    }
}

impl PollConfig {
    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }
}

/// Job launch template: which cluster, which task template, which container
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JobConfig {
    /// Cluster identifier (name or ARN)
    pub cluster_id: String,
    /// Task template identifier (family:revision or ARN)
    pub task_template_id: String,
    /// Container inside the task template that receives the overrides
    pub container_name: String,
    /// Environment variable carrying the bucket name
    pub bucket_env_var: String,
    /// Environment variable carrying the object key
    pub key_env_var: String,
    /// Log launches instead of calling the job platform
    pub dry_run: bool,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            cluster_id: String::new(),
            task_template_id: String::new(),
            container_name: String::new(),
            bucket_env_var: defaults::BUCKET_ENV_VAR.to_string(),
            key_env_var: defaults::KEY_ENV_VAR.to_string(),
            dry_run: false,
        }
    }
}

/// Network placement of launched jobs
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub assign_public_ip: bool,
    pub security_groups: Vec<String>,
    pub subnets: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            assign_public_ip: true,
            security_groups: Vec::new(),
            subnets: Vec::new(),
        }
    }
}

impl ConsumerConfig {
    /// Validate the configuration, reporting the first problem found
    pub fn validate(&self) -> ConfigResult<()> {
        require_non_empty("queue.url", &self.queue.url, "queue configuration")?;

        if !(1..=MAX_RECEIVE_BATCH).contains(&self.queue.max_messages) {
            return Err(ConfigurationError::invalid_value(
                "queue.max_messages",
                self.queue.max_messages.to_string(),
                format!("must be between 1 and {MAX_RECEIVE_BATCH}"),
            ));
        }

        if self.queue.wait_time_seconds > MAX_WAIT_TIME_SECONDS {
            return Err(ConfigurationError::invalid_value(
                "queue.wait_time_seconds",
                self.queue.wait_time_seconds.to_string(),
                format!("must be at most {MAX_WAIT_TIME_SECONDS}"),
            ));
        }

        require_non_empty("job.cluster_id", &self.job.cluster_id, "job configuration")?;
        require_non_empty(
            "job.task_template_id",
            &self.job.task_template_id,
            "job configuration",
        )?;
        require_non_empty(
            "job.container_name",
            &self.job.container_name,
            "job configuration",
        )?;
        require_non_empty("job.bucket_env_var", &self.job.bucket_env_var, "job configuration")?;
        require_non_empty("job.key_env_var", &self.job.key_env_var, "job configuration")?;

        if self.job.bucket_env_var == self.job.key_env_var {
            return Err(ConfigurationError::invalid_value(
                "job.key_env_var",
                self.job.key_env_var.clone(),
                "must differ from job.bucket_env_var",
            ));
        }

        if self.network.subnets.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "network.subnets",
                "network configuration (at least one subnet)",
            ));
        }

        for subnet in &self.network.subnets {
            require_non_empty("network.subnets", subnet, "network configuration")?;
        }
        for group in &self.network.security_groups {
            require_non_empty("network.security_groups", group, "network configuration")?;
        }

        Ok(())
    }
}

fn require_non_empty(field: &str, value: &str, context: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigurationError::missing_required_field(field, context));
    }
    Ok(())
}
