//! # Structured Logging Module
//!
//! Environment-aware console logging using the tracing ecosystem. The consumer
//! only emits structured events to stdout; shipping them anywhere is the job of
//! the container runtime.
//!
//! - `RUST_LOG` wins when set; otherwise the level follows `TRANSCODE_ENV`
//! - JSON lines in production (or with `TRANSCODE_LOG_FORMAT=json`), human-readable otherwise
//! - ANSI colours only when stdout is a terminal

use std::io::IsTerminal;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::loader::detect_environment;
use crate::constants::env as env_vars;

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Console output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Initialize tracing once per process; later calls are no-ops
pub fn init_tracing() {
    TRACING_INITIALIZED.get_or_init(|| {
        let environment = detect_environment();
        let format = get_log_format(
            &environment,
            std::env::var(env_vars::LOG_FORMAT).ok().as_deref(),
        );
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));
        let use_ansi = std::io::stdout().is_terminal();

        let json_layer = (format == LogFormat::Json).then(|| {
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_span_list(false)
        });
        let pretty_layer = (format == LogFormat::Pretty).then(|| {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(use_ansi)
        });

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .with(pretty_layer);

        if subscriber.try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        } else {
            tracing::info!(
                environment = %environment,
                format = ?format,
                ansi_colors = use_ansi,
                "Structured logging initialized"
            );
        }
    });
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        "test" => "debug",
        _ => "debug",
    }
}

/// Explicit format override wins; production defaults to JSON
fn get_log_format(environment: &str, requested: Option<&str>) -> LogFormat {
    match requested.map(str::to_lowercase).as_deref() {
        Some("json") => LogFormat::Json,
        Some("pretty") | Some("text") => LogFormat::Pretty,
        _ if environment == "production" => LogFormat::Json,
        _ => LogFormat::Pretty,
    }
}
