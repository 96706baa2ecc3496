//! Configuration Tests
//!
//! Loads the configuration files shipped in `config/` the same way the
//! consumer does at startup.

use std::collections::HashMap;
use std::path::PathBuf;

use transcode_consumer::config::{ConfigManager, ConfigSources, ConfigurationError, ConsumerConfig};

fn shipped_sources(environment: &str, env: &[(&str, &str)]) -> ConfigSources {
    ConfigSources {
        config_path: None,
        config_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config"),
        environment: environment.to_string(),
        env_overrides: Some(
            env.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        ),
    }
}

#[test]
fn defaults_match_documented_values() {
    let config = ConsumerConfig::default();

    assert_eq!(config.queue.max_messages, 1);
    assert_eq!(config.queue.wait_time_seconds, 10);
    assert_eq!(config.poll.error_backoff_ms, 5000);
    assert_eq!(config.job.bucket_env_var, "BUCKET_NAME");
    assert_eq!(config.job.key_env_var, "KEY");
    assert!(config.network.assign_public_ip);
    assert!(!config.job.dry_run);
}

#[test]
fn defaults_alone_do_not_validate() {
    assert!(ConsumerConfig::default().validate().is_err());
}

#[test]
fn shipped_development_config_is_valid() {
    let manager = ConfigManager::load_from(shipped_sources("development", &[])).unwrap();
    let config = manager.config();

    assert!(config.job.dry_run);
    assert_eq!(config.job.container_name, "video-transcoder");
    assert_eq!(config.aws.endpoint_url.as_deref(), Some("http://localhost:4566"));
    assert_eq!(manager.loaded_files().len(), 2);
}

#[test]
fn shipped_production_config_needs_deploy_time_values() {
    let err = ConfigManager::load_from(shipped_sources("production", &[])).unwrap_err();
    assert!(matches!(err, ConfigurationError::MissingRequiredField { .. }));
}

#[test]
fn shipped_production_config_with_environment_is_valid() {
    let manager = ConfigManager::load_from(shipped_sources(
        "production",
        &[
            (
                "TRANSCODE_QUEUE__URL",
                "https://sqs.us-east-1.amazonaws.com/123456789012/transcode-uploads",
            ),
            ("TRANSCODE_NETWORK__SUBNETS", "subnet-a,subnet-b"),
            ("TRANSCODE_NETWORK__SECURITY_GROUPS", "sg-1"),
            ("TRANSCODE_POLL__ERROR_BACKOFF_MS", "2500"),
        ],
    ))
    .unwrap();
    let config = manager.config();

    assert!(!config.job.dry_run);
    assert_eq!(config.network.subnets, vec!["subnet-a", "subnet-b"]);
    assert_eq!(config.network.security_groups, vec!["sg-1"]);
    assert_eq!(config.poll.error_backoff_ms, 2500);
    assert_eq!(config.queue.max_messages, 1);
}

#[test]
fn out_of_range_receive_batch_is_rejected() {
    let err = ConfigManager::load_from(shipped_sources(
        "development",
        &[("TRANSCODE_QUEUE__MAX_MESSAGES", "25")],
    ))
    .unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidValue { .. }));
}

#[test]
fn debug_config_exposes_effective_values() {
    let manager = ConfigManager::load_from(shipped_sources("development", &[])).unwrap();
    let json = manager.debug_config();

    assert_eq!(json["queue"]["max_messages"], 1);
    assert_eq!(json["job"]["dry_run"], true);
}
