//! # Dry-Run Job Launcher
//!
//! Logs each launch request and returns a synthetic handle. Used for local
//! runs and for staging a new queue without starting real jobs.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::dispatch::errors::DispatchError;
use crate::dispatch::job_spec::{JobHandle, JobSpec};
use crate::dispatch::traits::JobLauncher;

#[derive(Debug, Default)]
pub struct DryRunJobLauncher {
    launched: AtomicU64,
}

impl DryRunJobLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of launches accepted so far
    pub fn launched(&self) -> u64 {
        self.launched.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl JobLauncher for DryRunJobLauncher {
    async fn launch(&self, spec: &JobSpec) -> Result<JobHandle, DispatchError> {
        self.launched.fetch_add(1, Ordering::Relaxed);
        let handle = JobHandle::new(format!("dry-run/{}", Uuid::new_v4()));

        info!(
            job_handle = %handle,
            cluster = %spec.cluster_id,
            task_template = %spec.task_template_id,
            container = %spec.container_override.container_name,
            environment = ?spec.container_override.environment,
            "DRY RUN: job launch skipped"
        );

        Ok(handle)
    }

    fn provider_name(&self) -> &'static str {
        "dry_run"
    }
}
