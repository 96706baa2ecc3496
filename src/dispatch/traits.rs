//! # Job Launcher Trait
//!
//! The narrow interface the consumer needs from the job execution platform.

use async_trait::async_trait;

use super::errors::DispatchError;
use super::job_spec::{JobHandle, JobSpec};

/// Provider-agnostic job launch
///
/// One call issues exactly one launch request. Implementations never retry;
/// retries happen through message redelivery.
#[async_trait]
pub trait JobLauncher: Send + Sync + 'static {
    /// Start one job instance
    async fn launch(&self, spec: &JobSpec) -> Result<JobHandle, DispatchError>;

    /// Provider name for logging (e.g. "ecs", "dry_run")
    fn provider_name(&self) -> &'static str;
}
