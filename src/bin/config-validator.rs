//! # Transcode Configuration Validator
//!
//! Command-line tool that loads configuration exactly the way the consumer
//! does and reports whether it would start. Useful in CI and before rolling
//! out a new environment file.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use transcode_consumer::config::{ConfigManager, ConfigSources};

#[derive(Parser)]
#[command(name = "config-validator")]
#[command(about = "Validate transcode consumer configuration")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Environment to validate (development, test, production)
    #[arg(short, long, env = "TRANSCODE_ENV", default_value = "development")]
    environment: String,

    /// Explicit configuration file; overrides directory discovery
    #[arg(short = 'f', long, env = "TRANSCODE_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Configuration directory searched when no file is given
    #[arg(short, long, default_value = "config")]
    config_dir: PathBuf,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: String,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let _subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .try_init();

    let sources = ConfigSources {
        config_path: cli.config.clone(),
        config_dir: cli.config_dir.clone(),
        environment: cli.environment.to_lowercase(),
        env_overrides: None,
    };
    debug!(?sources, "Resolved configuration sources");

    match ConfigManager::load_from(sources) {
        Ok(manager) => {
            if cli.format == "json" {
                println!(
                    "{}",
                    serde_json::json!({
                        "valid": true,
                        "environment": manager.environment(),
                        "files": manager.loaded_files(),
                        "config": manager.debug_config(),
                    })
                );
            } else {
                println!("Configuration is valid");
                println!("Environment: {}", manager.environment());
                if manager.loaded_files().is_empty() {
                    println!("Files: none (defaults and environment only)");
                }
                for file in manager.loaded_files() {
                    println!("File: {}", file.display());
                }
                println!(
                    "{}",
                    serde_json::to_string_pretty(&manager.debug_config())
                        .unwrap_or_else(|_| "<unprintable>".to_string())
                );
            }
        }
        Err(e) => {
            if cli.format == "json" {
                println!(
                    "{}",
                    serde_json::json!({ "valid": false, "error": e.to_string() })
                );
            } else {
                eprintln!("Configuration validation failed: {e}");
            }
            process::exit(1);
        }
    }
}
