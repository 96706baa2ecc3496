//! # Dispatch Module
//!
//! Turning trigger records into launched jobs: the [`JobSpec`] model and its
//! builder, the [`JobLauncher`] seam with its providers, and the
//! [`JobDispatcher`] that classifies each launch as launched or failed.

pub mod dispatcher;
pub mod errors;
pub mod job_spec;
pub mod providers;
pub mod traits;

pub use dispatcher::{DispatchOutcome, JobDispatcher};
pub use errors::DispatchError;
pub use job_spec::{
    ContainerOverride, JobHandle, JobSpec, JobSpecBuilder, LaunchMode, NetworkPlacement,
    PublicIpPolicy,
};
pub use providers::DryRunJobLauncher;
#[cfg(feature = "aws")]
pub use providers::EcsJobLauncher;
pub use traits::JobLauncher;
