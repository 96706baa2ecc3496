//! # Consumer Bootstrap
//!
//! Wires a validated [`ConsumerConfig`] into a ready-to-run [`PollLoop`].
//! Provider construction is separate from wiring so tests and local runs can
//! supply their own queue and launcher.

use std::sync::Arc;

use crate::config::ConsumerConfig;
use crate::dispatch::{JobDispatcher, JobLauncher, JobSpecBuilder};
use crate::messaging::QueueClient;

use super::message_processor::MessageProcessor;
use super::poll_loop::{PollLoop, PollLoopConfig};

/// Assemble a poll loop from configuration and already-built providers
pub fn build_poll_loop(
    config: &ConsumerConfig,
    queue: Arc<dyn QueueClient>,
    launcher: Arc<dyn JobLauncher>,
) -> PollLoop {
    let builder = JobSpecBuilder::new(config.job.clone(), &config.network);
    let processor = MessageProcessor::new(builder, JobDispatcher::new(launcher))
        .with_redelivery_warn_threshold(config.poll.redelivery_warn_threshold);

    PollLoop::new(queue, processor, PollLoopConfig::from(config))
}

/// Validate the configuration and build the production poll loop
///
/// Uses SQS for the queue and ECS for jobs, or the dry-run launcher when
/// `job.dry_run` is set.
#[cfg(feature = "aws")]
pub async fn bootstrap(config: &ConsumerConfig) -> crate::error::Result<PollLoop> {
    use tracing::info;

    use crate::dispatch::{DryRunJobLauncher, EcsJobLauncher};
    use crate::messaging::SqsQueueClient;

    config.validate()?;

    let sdk_config = load_sdk_config(config).await;
    let queue: Arc<dyn QueueClient> =
        Arc::new(SqsQueueClient::from_sdk_config(&sdk_config, &config.queue.url));
    let launcher: Arc<dyn JobLauncher> = if config.job.dry_run {
        Arc::new(DryRunJobLauncher::new())
    } else {
        Arc::new(EcsJobLauncher::from_sdk_config(&sdk_config))
    };

    info!(
        queue = %config.queue.url,
        region = ?sdk_config.region(),
        cluster = %config.job.cluster_id,
        task_template = %config.job.task_template_id,
        launcher = launcher.provider_name(),
        "Consumer bootstrapped"
    );

    Ok(build_poll_loop(config, queue, launcher))
}

#[cfg(feature = "aws")]
async fn load_sdk_config(config: &ConsumerConfig) -> aws_config::SdkConfig {
    use aws_config::meta::region::RegionProviderChain;
    use aws_config::{BehaviorVersion, Region};

    use crate::constants::defaults;

    let region = RegionProviderChain::first_try(config.aws.region.clone().map(Region::new))
        .or_default_provider()
        .or_else(Region::new(defaults::AWS_REGION));

    let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region);
    if let Some(endpoint) = &config.aws.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    loader.load().await
}
