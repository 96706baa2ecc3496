//! # System Constants
//!
//! Wire-format field names, defaults and environment variable names that define
//! the operational boundaries of the consumer.

/// Object-storage notification wire format
pub mod notifications {
    /// Field carrying the emitting service on probe events
    pub const SERVICE_FIELDS: &[&str] = &["Service", "service"];
    /// Field carrying the event type on probe events
    pub const EVENT_FIELDS: &[&str] = &["Event", "event"];
    /// Field carrying the ordered record list
    pub const RECORDS_FIELDS: &[&str] = &["Records", "records"];
    /// Event types that denote a connectivity test rather than an upload
    pub const PROBE_EVENT_TYPES: &[&str] = &["s3:TestEvent", "connectivity-test"];
}

/// Defaults applied when configuration leaves a value unset
pub mod defaults {
    /// Messages requested per receive call
    pub const MAX_MESSAGES: i32 = 1;
    /// Long-poll wait per receive call
    pub const WAIT_TIME_SECONDS: u64 = 10;
    /// Fixed delay after a failed receive
    pub const ERROR_BACKOFF_MS: u64 = 5000;
    /// Receive count above which a retained message is reported as stuck
    pub const REDELIVERY_WARN_THRESHOLD: u32 = 5;
    /// Environment variable carrying the bucket name into the job container
    pub const BUCKET_ENV_VAR: &str = "BUCKET_NAME";
    /// Environment variable carrying the object key into the job container
    pub const KEY_ENV_VAR: &str = "KEY";
    /// Region used when neither config nor the environment names one
    pub const AWS_REGION: &str = "us-east-1";
}

/// Environment variables read by the process itself
pub mod env {
    /// Deployment environment (development, test, production)
    pub const ENVIRONMENT: &str = "TRANSCODE_ENV";
    /// Explicit configuration file path
    pub const CONFIG_PATH: &str = "TRANSCODE_CONFIG_PATH";
    /// Log output format override (`json` or `pretty`)
    pub const LOG_FORMAT: &str = "TRANSCODE_LOG_FORMAT";
    /// Prefix for configuration overrides, e.g. `TRANSCODE_QUEUE__URL`
    pub const CONFIG_PREFIX: &str = "TRANSCODE";
}
