//! Shared test doubles for the consumer integration tests
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::{watch, Mutex};
use tokio::time::Instant;
use uuid::Uuid;

use transcode_consumer::config::ConsumerConfig;
use transcode_consumer::dispatch::{DispatchError, JobHandle, JobLauncher, JobSpec};
use transcode_consumer::messaging::{
    QueueClient, QueueError, QueueMessage, QueueResult, ReceiptHandle,
};

/// A notification body carrying the given (bucket, key) records in order
pub fn notification(records: &[(&str, &str)]) -> String {
    let records: Vec<_> = records
        .iter()
        .map(|(bucket, key)| {
            json!({
                "eventSource": "aws:s3",
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "bucket": { "name": bucket },
                    "object": { "key": key, "size": 1024 }
                }
            })
        })
        .collect();
    json!({ "Records": records }).to_string()
}

/// Connectivity probe sent when a bucket notification is first configured
pub fn probe_notification() -> String {
    json!({
        "Service": "Amazon S3",
        "Event": "s3:TestEvent",
        "Time": "2024-01-01T00:00:00.000Z",
        "Bucket": "uploads"
    })
    .to_string()
}

pub fn message(body: impl Into<String>) -> QueueMessage {
    let id = Uuid::new_v4().to_string();
    QueueMessage::new(id.clone(), Some(body.into()), format!("rh-{id}")).with_receive_count(1)
}

/// A configuration that passes validation
pub fn test_config() -> ConsumerConfig {
    let mut config = ConsumerConfig::default();
    config.queue.url = "https://sqs.us-east-1.amazonaws.com/123456789012/uploads".to_string();
    config.job.cluster_id = "transcode".to_string();
    config.job.task_template_id = "transcoder:7".to_string();
    config.job.container_name = "transcoder".to_string();
    config.network.subnets = vec!["subnet-a".to_string(), "subnet-b".to_string()];
    config.network.security_groups = vec!["sg-1".to_string()];
    config
}

/// Launcher that records every spec and fails on demand, keyed by object key
#[derive(Clone, Default)]
pub struct RecordingLauncher {
    pub launched: Arc<Mutex<Vec<JobSpec>>>,
    failures: Arc<Mutex<HashMap<String, u32>>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject launches for `key` the next `times` attempts
    pub async fn fail_key(&self, key: &str, times: u32) {
        self.failures.lock().await.insert(key.to_string(), times);
    }

    /// Reject every launch for `key`
    pub async fn always_fail_key(&self, key: &str) {
        self.fail_key(key, u32::MAX).await;
    }

    pub async fn specs(&self) -> Vec<JobSpec> {
        self.launched.lock().await.clone()
    }

    /// Object keys of every launch attempt, in order
    pub async fn attempted_keys(&self) -> Vec<String> {
        self.launched
            .lock()
            .await
            .iter()
            .filter_map(|spec| spec.env("KEY").map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl JobLauncher for RecordingLauncher {
    async fn launch(&self, spec: &JobSpec) -> Result<JobHandle, DispatchError> {
        self.launched.lock().await.push(spec.clone());

        let key = spec.env("KEY").unwrap_or_default().to_string();
        let mut failures = self.failures.lock().await;
        if let Some(remaining) = failures.get_mut(&key) {
            if *remaining > 0 {
                *remaining = remaining.saturating_sub(1);
                return Err(DispatchError::rejected(format!(
                    "RESOURCE:MEMORY insufficient capacity for {key}"
                )));
            }
        }

        Ok(JobHandle::new(format!(
            "arn:aws:ecs:us-east-1:123456789012:task/transcode/{}",
            Uuid::new_v4().simple()
        )))
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// Queue that replays a script of receive results
///
/// Once the script runs out it requests shutdown and returns empty batches.
pub struct ScriptedQueue {
    script: Mutex<VecDeque<(QueueResult<Vec<QueueMessage>>, bool)>>,
    pub receive_times: Mutex<Vec<Instant>>,
    pub deleted: Mutex<Vec<ReceiptHandle>>,
    fail_deletes: bool,
    shutdown: watch::Sender<bool>,
}

impl ScriptedQueue {
    pub fn new() -> Self {
        Self::build(false)
    }

    pub fn with_failing_deletes() -> Self {
        Self::build(true)
    }

    fn build(fail_deletes: bool) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            script: Mutex::new(VecDeque::new()),
            receive_times: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            fail_deletes,
            shutdown,
        }
    }

    pub async fn push_messages(&self, messages: Vec<QueueMessage>) {
        self.script.lock().await.push_back((Ok(messages), false));
    }

    /// Deliver `messages` and request shutdown in the same breath
    pub async fn push_messages_then_shutdown(&self, messages: Vec<QueueMessage>) {
        self.script.lock().await.push_back((Ok(messages), true));
    }

    pub async fn push_empty(&self) {
        self.push_messages(Vec::new()).await;
    }

    pub async fn push_error(&self, message: &str) {
        self.script
            .lock()
            .await
            .push_back((Err(QueueError::receive("scripted", message)), false));
    }

    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    pub async fn receive_gaps(&self) -> Vec<Duration> {
        self.receive_times
            .lock()
            .await
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .collect()
    }

    pub async fn deleted_count(&self) -> usize {
        self.deleted.lock().await.len()
    }
}

#[async_trait]
impl QueueClient for ScriptedQueue {
    async fn receive(&self, _max_messages: i32, _wait: Duration) -> QueueResult<Vec<QueueMessage>> {
        self.receive_times.lock().await.push(Instant::now());
        tokio::task::yield_now().await;

        match self.script.lock().await.pop_front() {
            Some((result, shutdown_after)) => {
                if shutdown_after {
                    self.request_shutdown();
                }
                result
            }
            None => {
                self.request_shutdown();
                Ok(Vec::new())
            }
        }
    }

    async fn delete(&self, receipt_handle: &ReceiptHandle) -> QueueResult<()> {
        if self.fail_deletes {
            return Err(QueueError::delete(
                "scripted",
                receipt_handle.as_str(),
                "ReceiptHandleIsInvalid",
            ));
        }
        self.deleted.lock().await.push(receipt_handle.clone());
        Ok(())
    }

    fn queue_name(&self) -> &str {
        "scripted"
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}
