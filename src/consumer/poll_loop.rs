//! # Poll Loop
//!
//! The long-running consume, dispatch, acknowledge cycle.
//!
//! Each iteration long-polls the queue, hands every received message to the
//! [`MessageProcessor`], and deletes the ones it marks for deletion. Receive
//! failures are followed by a fixed backoff; empty receives are not. A
//! shutdown request is honoured between iterations and during the backoff, so
//! an in-flight message always runs to completion.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::config::ConsumerConfig;
use crate::error::Result;
use crate::messaging::{QueueClient, QueueError, QueueMessage};

use super::message_processor::{MessageDisposition, MessageProcessor};

/// Poll loop tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollLoopConfig {
    pub max_messages: i32,
    pub wait_time: Duration,
    pub error_backoff: Duration,
}

impl Default for PollLoopConfig {
    fn default() -> Self {
        Self::from(&ConsumerConfig::default())
    }
}

impl From<&ConsumerConfig> for PollLoopConfig {
    fn from(config: &ConsumerConfig) -> Self {
        Self {
            max_messages: config.queue.max_messages,
            wait_time: config.queue.wait_time(),
            error_backoff: config.poll.error_backoff(),
        }
    }
}

/// Running counters for one poll loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollStats {
    pub polls: u64,
    pub empty_polls: u64,
    pub poll_failures: u64,
    pub messages: u64,
    pub deleted: u64,
    pub retained: u64,
    pub delete_failures: u64,
    pub jobs_launched: u64,
    pub launch_failures: u64,
}

/// Result of a single iteration
#[derive(Debug)]
pub enum PollOutcome {
    /// The wait elapsed with nothing to receive
    Empty,
    /// This many messages were received and processed
    Processed(usize),
    /// The receive call failed; the caller should back off
    ReceiveFailed(QueueError),
}

pub struct PollLoop {
    queue: Arc<dyn QueueClient>,
    processor: MessageProcessor,
    config: PollLoopConfig,
    stats: PollStats,
}

impl std::fmt::Debug for PollLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollLoop")
            .field("queue", &self.queue.queue_name())
            .field("provider", &self.queue.provider_name())
            .field("processor", &self.processor)
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish()
    }
}

impl PollLoop {
    pub fn new(
        queue: Arc<dyn QueueClient>,
        processor: MessageProcessor,
        config: PollLoopConfig,
    ) -> Self {
        Self {
            queue,
            processor,
            config,
            stats: PollStats::default(),
        }
    }

    pub fn stats(&self) -> PollStats {
        self.stats
    }

    pub fn config(&self) -> &PollLoopConfig {
        &self.config
    }

    /// Run until shutdown is requested
    ///
    /// Shutdown is requested by sending `true` on the watch channel or by
    /// dropping its sender. Returns the final counters.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<PollStats> {
        info!(
            queue = %self.queue.queue_name(),
            provider = self.queue.provider_name(),
            max_messages = self.config.max_messages,
            wait_time_secs = self.config.wait_time.as_secs(),
            error_backoff_ms = self.config.error_backoff.as_millis() as u64,
            "Starting poll loop"
        );

        loop {
            if *shutdown.borrow() {
                info!("Shutdown requested; leaving poll loop");
                break;
            }

            match self.poll_once().await {
                PollOutcome::Empty | PollOutcome::Processed(_) => {}
                PollOutcome::ReceiveFailed(_) => {
                    debug!(
                        backoff_ms = self.config.error_backoff.as_millis() as u64,
                        "Backing off after receive failure"
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(self.config.error_backoff) => {}
                        changed = shutdown.changed() => {
                            if changed.is_err() {
                                info!("Shutdown channel closed during backoff; leaving poll loop");
                                break;
                            }
                        }
                    }
                }
            }

            if shutdown.has_changed().is_err() {
                info!("Shutdown channel closed; leaving poll loop");
                break;
            }
        }

        info!(
            polls = self.stats.polls,
            empty_polls = self.stats.empty_polls,
            poll_failures = self.stats.poll_failures,
            messages = self.stats.messages,
            deleted = self.stats.deleted,
            retained = self.stats.retained,
            delete_failures = self.stats.delete_failures,
            jobs_launched = self.stats.jobs_launched,
            launch_failures = self.stats.launch_failures,
            "Poll loop stopped"
        );

        Ok(self.stats)
    }

    /// One receive, process, acknowledge iteration
    #[instrument(skip(self), fields(queue = %self.queue.queue_name()))]
    pub async fn poll_once(&mut self) -> PollOutcome {
        self.stats.polls += 1;

        let received = AssertUnwindSafe(
            self.queue
                .receive(self.config.max_messages, self.config.wait_time),
        )
        .catch_unwind()
        .await
        .unwrap_or_else(|_| Err(QueueError::receive(self.queue.queue_name(), "receive panicked")));

        let messages = match received {
            Ok(messages) => messages,
            Err(receive_error) => {
                self.stats.poll_failures += 1;
                error!(error = %receive_error, "Failed to receive messages from queue");
                return PollOutcome::ReceiveFailed(receive_error);
            }
        };

        if messages.is_empty() {
            self.stats.empty_polls += 1;
            debug!("No messages received");
            return PollOutcome::Empty;
        }

        debug!(count = messages.len(), "Received messages");

        let count = messages.len();
        for message in &messages {
            self.handle_message(message).await;
        }

        PollOutcome::Processed(count)
    }

    async fn handle_message(&mut self, message: &QueueMessage) {
        self.stats.messages += 1;

        let report = self.processor.process_with_report(message).await;
        self.stats.jobs_launched += report.launched_count() as u64;
        self.stats.launch_failures += report.failed_count() as u64;

        match report.disposition {
            MessageDisposition::Delete => match self.queue.delete(&message.receipt_handle).await {
                Ok(()) => {
                    self.stats.deleted += 1;
                    info!(message_id = %message.id, "Message deleted from queue");
                }
                Err(delete_error) => {
                    // The message will be redelivered once its visibility timeout lapses
                    self.stats.delete_failures += 1;
                    warn!(
                        message_id = %message.id,
                        error = %delete_error,
                        "Failed to delete message; it will be redelivered"
                    );
                }
            },
            MessageDisposition::Retain => {
                self.stats.retained += 1;
                info!(
                    message_id = %message.id,
                    receive_count = message.receive_count,
                    "Message retained for redelivery"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_loop_config_from_defaults() {
        let config = PollLoopConfig::default();
        assert_eq!(config.max_messages, 1);
        assert_eq!(config.wait_time, Duration::from_secs(10));
        assert_eq!(config.error_backoff, Duration::from_millis(5000));
    }

    #[test]
    fn test_poll_stats_serialize() {
        let stats = PollStats {
            polls: 3,
            deleted: 1,
            ..PollStats::default()
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["polls"], 3);
        assert_eq!(json["deleted"], 1);
        assert_eq!(json["retained"], 0);
    }
}
