//! # ECS Job Launcher
//!
//! `JobLauncher` backed by ECS `RunTask` on Fargate capacity.

use async_trait::async_trait;
use aws_sdk_ecs::error::DisplayErrorContext;
use aws_sdk_ecs::types::{
    AssignPublicIp, AwsVpcConfiguration, ContainerOverride, KeyValuePair, LaunchType,
    NetworkConfiguration, TaskOverride,
};
use tracing::debug;

use crate::dispatch::errors::DispatchError;
use crate::dispatch::job_spec::{JobHandle, JobSpec, LaunchMode, PublicIpPolicy};
use crate::dispatch::traits::JobLauncher;

/// ECS-backed job launcher
#[derive(Debug, Clone)]
pub struct EcsJobLauncher {
    client: aws_sdk_ecs::Client,
}

impl EcsJobLauncher {
    pub fn new(client: aws_sdk_ecs::Client) -> Self {
        Self { client }
    }

    /// Create from a loaded AWS SDK configuration
    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig) -> Self {
        Self::new(aws_sdk_ecs::Client::new(sdk_config))
    }

    fn network_configuration(spec: &JobSpec) -> Result<NetworkConfiguration, DispatchError> {
        let assign_public_ip = match spec.network.public_ip {
            PublicIpPolicy::Enabled => AssignPublicIp::Enabled,
            PublicIpPolicy::Disabled => AssignPublicIp::Disabled,
        };

        let vpc = AwsVpcConfiguration::builder()
            .set_subnets(Some(spec.network.subnets.clone()))
            .set_security_groups(Some(
                spec.network.security_groups.iter().cloned().collect(),
            ))
            .assign_public_ip(assign_public_ip)
            .build()
            .map_err(|e| DispatchError::invalid_spec(e.to_string()))?;

        Ok(NetworkConfiguration::builder()
            .awsvpc_configuration(vpc)
            .build())
    }

    fn task_override(spec: &JobSpec) -> TaskOverride {
        let mut container =
            ContainerOverride::builder().name(&spec.container_override.container_name);
        for (name, value) in &spec.container_override.environment {
            container = container.environment(KeyValuePair::builder().name(name).value(value).build());
        }

        TaskOverride::builder()
            .container_overrides(container.build())
            .build()
    }
}

#[async_trait]
impl JobLauncher for EcsJobLauncher {
    async fn launch(&self, spec: &JobSpec) -> Result<JobHandle, DispatchError> {
        let launch_type = match spec.launch_mode {
            LaunchMode::ManagedServerless => LaunchType::Fargate,
        };

        let output = self
            .client
            .run_task()
            .cluster(&spec.cluster_id)
            .task_definition(&spec.task_template_id)
            .launch_type(launch_type)
            .network_configuration(Self::network_configuration(spec)?)
            .overrides(Self::task_override(spec))
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                if e.as_service_error().is_some() {
                    DispatchError::rejected(message)
                } else {
                    DispatchError::transport(message)
                }
            })?;

        // RunTask reports capacity/placement problems as a successful call with failures
        if let Some(failure) = output.failures().first() {
            return Err(DispatchError::rejected(format!(
                "{}: {}",
                failure.arn().unwrap_or("unknown"),
                failure.reason().unwrap_or("no reason given")
            )));
        }

        let task_arn = output
            .tasks()
            .first()
            .and_then(|task| task.task_arn())
            .ok_or_else(|| DispatchError::rejected("RunTask returned no task"))?;

        debug!(task_arn, cluster = %spec.cluster_id, "ECS task started");
        Ok(JobHandle::new(task_arn))
    }

    fn provider_name(&self) -> &'static str {
        "ecs"
    }
}
