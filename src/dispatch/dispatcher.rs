//! # Job Dispatcher
//!
//! Submits job specs to the configured launcher and reports the outcome.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument};

use super::errors::DispatchError;
use super::job_spec::{JobHandle, JobSpec};
use super::traits::JobLauncher;

/// Result of dispatching one trigger record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Launched(JobHandle),
    Failed(DispatchError),
}

impl DispatchOutcome {
    pub fn is_launched(&self) -> bool {
        matches!(self, DispatchOutcome::Launched(_))
    }
}

impl From<Result<JobHandle, DispatchError>> for DispatchOutcome {
    fn from(result: Result<JobHandle, DispatchError>) -> Self {
        match result {
            Ok(handle) => DispatchOutcome::Launched(handle),
            Err(error) => DispatchOutcome::Failed(error),
        }
    }
}

/// Thin wrapper over a [`JobLauncher`]: one launch request per call, no retries
#[derive(Clone)]
pub struct JobDispatcher {
    launcher: Arc<dyn JobLauncher>,
}

impl std::fmt::Debug for JobDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobDispatcher")
            .field("provider", &self.launcher.provider_name())
            .finish()
    }
}

impl JobDispatcher {
    pub fn new(launcher: Arc<dyn JobLauncher>) -> Self {
        Self { launcher }
    }

    #[instrument(skip(self, spec), fields(provider = self.launcher.provider_name(), cluster = %spec.cluster_id))]
    pub async fn dispatch(&self, spec: &JobSpec) -> Result<JobHandle, DispatchError> {
        let started = Instant::now();
        let result = self.launcher.launch(spec).await;

        debug!(
            duration_ms = started.elapsed().as_millis() as u64,
            launched = result.is_ok(),
            "Job launch request completed"
        );

        result
    }
}
