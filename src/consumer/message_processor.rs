//! # Message Processor
//!
//! Handles one queue message end to end: parse, build and dispatch a job per
//! trigger record, then decide whether the message may leave the queue.
//!
//! A message is deleted only when every record it carries launched a job, or
//! when it carried nothing actionable. One failed launch retains the whole
//! message, so records that already launched will launch again on
//! redelivery.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::{debug, error, info, instrument, warn};

use crate::constants::defaults;
use crate::dispatch::{DispatchOutcome, JobDispatcher, JobSpecBuilder};
use crate::events::{self, ParseError, TriggerRecord};
use crate::messaging::{MessageId, QueueMessage};

/// What happens to a message after processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageDisposition {
    /// Remove from the queue
    Delete,
    /// Leave for redelivery after the visibility timeout
    Retain,
}

/// Dispatch outcome of one trigger record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    pub record: TriggerRecord,
    pub outcome: DispatchOutcome,
}

/// Everything that happened while processing one message
#[derive(Debug, Clone)]
pub struct ProcessingReport {
    pub message_id: MessageId,
    pub disposition: MessageDisposition,
    /// Per-record outcomes in body order; empty for probes and parse failures
    pub outcomes: Vec<RecordOutcome>,
    pub parse_error: Option<ParseError>,
    /// Processing panicked and was contained
    pub panicked: bool,
}

impl ProcessingReport {
    fn new(message_id: MessageId, disposition: MessageDisposition) -> Self {
        Self {
            message_id,
            disposition,
            outcomes: Vec::new(),
            parse_error: None,
            panicked: false,
        }
    }

    pub fn launched_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.outcome.is_launched())
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.launched_count()
    }
}

/// Orchestrates parse, build and dispatch for one message
#[derive(Debug, Clone)]
pub struct MessageProcessor {
    builder: JobSpecBuilder,
    dispatcher: JobDispatcher,
    redelivery_warn_threshold: u32,
}

impl MessageProcessor {
    pub fn new(builder: JobSpecBuilder, dispatcher: JobDispatcher) -> Self {
        Self {
            builder,
            dispatcher,
            redelivery_warn_threshold: defaults::REDELIVERY_WARN_THRESHOLD,
        }
    }

    pub fn with_redelivery_warn_threshold(mut self, threshold: u32) -> Self {
        self.redelivery_warn_threshold = threshold;
        self
    }

    /// Process one message and decide its disposition
    pub async fn process(&self, message: &QueueMessage) -> MessageDisposition {
        self.process_with_report(message).await.disposition
    }

    /// Process one message, returning the full report
    ///
    /// Never fails: parse errors, launch errors and panics are logged and
    /// folded into the disposition.
    #[instrument(skip(self, message), fields(message_id = %message.id))]
    pub async fn process_with_report(&self, message: &QueueMessage) -> ProcessingReport {
        let report = match AssertUnwindSafe(self.process_inner(message))
            .catch_unwind()
            .await
        {
            Ok(report) => report,
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!(
                    message_id = %message.id,
                    body = message.body_str(),
                    error = %reason,
                    "Unexpected failure while processing message; retaining it"
                );
                let mut report = ProcessingReport::new(message.id.clone(), MessageDisposition::Retain);
                report.panicked = true;
                report
            }
        };

        debug!(
            message_id = %message.id,
            disposition = ?report.disposition,
            elapsed_ms = message.elapsed_ms(),
            "Message processed"
        );
        report
    }

    async fn process_inner(&self, message: &QueueMessage) -> ProcessingReport {
        let body = message.body_str();

        info!(
            message_id = %message.id,
            receive_count = message.receive_count,
            body,
            "Message received"
        );

        if let Some(count) = message.receive_count {
            if count > self.redelivery_warn_threshold {
                warn!(
                    message_id = %message.id,
                    receive_count = count,
                    threshold = self.redelivery_warn_threshold,
                    "Message has been redelivered repeatedly; check the queue's redrive policy"
                );
            }
        }

        let records = match events::parse(body) {
            Ok(records) => records,
            Err(parse_error) => {
                error!(
                    message_id = %message.id,
                    body,
                    error = %parse_error,
                    "Failed to parse message body; retaining message"
                );
                let mut report = ProcessingReport::new(message.id.clone(), MessageDisposition::Retain);
                report.parse_error = Some(parse_error);
                return report;
            }
        };

        if records.is_empty() {
            info!(
                message_id = %message.id,
                "No actionable records (probe or empty notification)"
            );
            return ProcessingReport::new(message.id.clone(), MessageDisposition::Delete);
        }

        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            let spec = self.builder.build(&record);
            let outcome = DispatchOutcome::from(self.dispatcher.dispatch(&spec).await);

            match &outcome {
                DispatchOutcome::Launched(handle) => info!(
                    message_id = %message.id,
                    bucket = %record.bucket_name,
                    key = %record.object_key,
                    job_handle = %handle,
                    "Job launched for {record}"
                ),
                DispatchOutcome::Failed(dispatch_error) => error!(
                    message_id = %message.id,
                    bucket = %record.bucket_name,
                    key = %record.object_key,
                    error = %dispatch_error,
                    "Failed to launch job for {record}"
                ),
            }

            outcomes.push(RecordOutcome { record, outcome });
        }

        let disposition = if outcomes.iter().all(|o| o.outcome.is_launched()) {
            MessageDisposition::Delete
        } else {
            MessageDisposition::Retain
        };

        let mut report = ProcessingReport::new(message.id.clone(), disposition);
        report.outcomes = outcomes;

        if disposition == MessageDisposition::Retain {
            warn!(
                message_id = %message.id,
                launched = report.launched_count(),
                failed = report.failed_count(),
                "Retaining message for redelivery after launch failures"
            );
        }

        report
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
