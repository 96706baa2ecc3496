#![allow(clippy::doc_markdown)] // Allow technical terms like LocalStack, SQS in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Transcode Consumer
//!
//! At-least-once queue consumer that turns object-storage upload
//! notifications into launched container jobs.
//!
//! ## Overview
//!
//! A single poll loop long-polls a notification queue, decodes each message
//! into trigger records (bucket plus object key), launches one job per record
//! with the record injected into the job's environment, and deletes the
//! message only once every launch succeeded. Anything short of that leaves
//! the message on the queue, where its visibility timeout brings it back.
//!
//! ## Module Organization
//!
//! - [`messaging`] - Queue seam, message types, SQS and in-memory providers
//! - [`events`] - Notification decoding into [`events::TriggerRecord`]s
//! - [`dispatch`] - Job specs, the launcher seam, ECS and dry-run providers
//! - [`consumer`] - Per-message processing and the poll loop
//! - [`config`] - Layered configuration and validation
//! - [`logging`] - Structured console logging
//! - [`error`] - Crate-level error type
//!
//! ## Delivery Semantics
//!
//! Duplicate job launches are possible: when one record of a multi-record
//! message fails, the whole message is retained and every record launches
//! again on redelivery. Downstream jobs must be idempotent.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use transcode_consumer::config::ConsumerConfig;
//! use transcode_consumer::consumer::build_poll_loop;
//! use transcode_consumer::dispatch::DryRunJobLauncher;
//! use transcode_consumer::messaging::InMemoryQueueClient;
//!
//! # async fn example() -> transcode_consumer::Result<()> {
//! let queue = Arc::new(InMemoryQueueClient::new("uploads"));
//! queue.send(r#"{"Records":[{"s3":{"bucket":{"name":"b"},"object":{"key":"k"}}}]}"#);
//!
//! let mut poll_loop = build_poll_loop(
//!     &ConsumerConfig::default(),
//!     queue,
//!     Arc::new(DryRunJobLauncher::new()),
//! );
//! let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! tokio::spawn(async move {
//!     tokio::time::sleep(std::time::Duration::from_secs(1)).await;
//!     let _ = shutdown_tx.send(true);
//! });
//! let stats = poll_loop.run(shutdown_rx).await?;
//! println!("deleted {} messages", stats.deleted);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod consumer;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod logging;
pub mod messaging;

pub use config::{ConfigManager, ConsumerConfig};
pub use consumer::{MessageDisposition, MessageProcessor, PollLoop, PollStats};
pub use dispatch::{DispatchError, JobDispatcher, JobLauncher, JobSpec, JobSpecBuilder};
pub use error::{ConsumerError, Result};
pub use events::{ParseError, TriggerRecord};
pub use messaging::{QueueClient, QueueError, QueueMessage};
