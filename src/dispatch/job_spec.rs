//! # Job Specification
//!
//! The complete description needed to launch one transcoding job, and the
//! builder that derives it from a trigger record plus static configuration.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::config::{JobConfig, NetworkConfig};
use crate::events::TriggerRecord;

/// How the platform runs the job; only managed serverless capacity is supported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchMode {
    ManagedServerless,
}

/// Whether the job's network interface receives a public address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicIpPolicy {
    Enabled,
    Disabled,
}

impl From<bool> for PublicIpPolicy {
    fn from(assign_public_ip: bool) -> Self {
        if assign_public_ip {
            PublicIpPolicy::Enabled
        } else {
            PublicIpPolicy::Disabled
        }
    }
}

/// Network placement of a launched job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkPlacement {
    pub public_ip: PublicIpPolicy,
    pub security_groups: BTreeSet<String>,
    /// Order is preserved as configured
    pub subnets: Vec<String>,
}

impl From<&NetworkConfig> for NetworkPlacement {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            public_ip: config.assign_public_ip.into(),
            security_groups: config.security_groups.iter().cloned().collect(),
            subnets: config.subnets.clone(),
        }
    }
}

/// Environment overrides applied to one container of the task template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerOverride {
    pub container_name: String,
    pub environment: BTreeMap<String, String>,
}

/// Complete job launch request, built fresh per trigger record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub cluster_id: String,
    pub task_template_id: String,
    pub launch_mode: LaunchMode,
    pub network: NetworkPlacement,
    pub container_override: ContainerOverride,
}

impl JobSpec {
    /// Value of one injected environment variable
    pub fn env(&self, name: &str) -> Option<&str> {
        self.container_override
            .environment
            .get(name)
            .map(String::as_str)
    }
}

/// Platform-assigned identifier of a launched job
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobHandle(pub String);

impl JobHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maps trigger records onto job specs using static configuration
///
/// Total and deterministic: every field except the two injected environment
/// variables comes verbatim from configuration.
#[derive(Debug, Clone)]
pub struct JobSpecBuilder {
    job: JobConfig,
    network: NetworkPlacement,
}

impl JobSpecBuilder {
    pub fn new(job: JobConfig, network: &NetworkConfig) -> Self {
        Self {
            job,
            network: network.into(),
        }
    }

    pub fn build(&self, record: &TriggerRecord) -> JobSpec {
        let environment = BTreeMap::from([
            (self.job.bucket_env_var.clone(), record.bucket_name.clone()),
            (self.job.key_env_var.clone(), record.object_key.clone()),
        ]);

        JobSpec {
            cluster_id: self.job.cluster_id.clone(),
            task_template_id: self.job.task_template_id.clone(),
            launch_mode: LaunchMode::ManagedServerless,
            network: self.network.clone(),
            container_override: ContainerOverride {
                container_name: self.job.container_name.clone(),
                environment,
            },
        }
    }
}
