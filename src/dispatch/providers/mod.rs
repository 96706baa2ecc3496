//! Job launcher implementations

mod dry_run;
#[cfg(feature = "aws")]
mod ecs;

pub use dry_run::DryRunJobLauncher;
#[cfg(feature = "aws")]
pub use ecs::EcsJobLauncher;
