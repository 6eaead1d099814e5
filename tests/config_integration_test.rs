//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables should be run with --test-threads=1
//! to avoid interference between tests.

use sessionframe::config::{default_config, load_config, parse_config, SinkTarget};
use sessionframe::core::export::ExportOptions;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("SESSIONFRAME_APPLICATION_LOG_LEVEL");
    std::env::remove_var("SESSIONFRAME_APPLICATION_DRY_RUN");
    std::env::remove_var("SESSIONFRAME_EXPORT_BATCH_SIZE");
    std::env::remove_var("SESSIONFRAME_EXPORT_MAX_RETRIES");
    std::env::remove_var("SESSIONFRAME_EXPORT_SESSION_IDENTIFIER");
    std::env::remove_var("SESSIONFRAME_SINK_TARGET");
    std::env::remove_var("SESSIONFRAME_SINK_OUTPUT_DIR");
    std::env::remove_var("TEST_SESSIONFRAME_OUTPUT");
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
log_level = "debug"
dry_run = true

[export]
batch_size = 2500
max_retries = 5
retry_delay_ms = 250
session_identifier = "Bench run 12"
application_group = "Bench"

[sink]
target = "memory"
output_dir = "/tmp/sessions"

[logging]
local_enabled = true
local_path = "/tmp/sessionframe-logs"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);
    assert_eq!(config.export.batch_size, 2500);
    assert_eq!(config.export.max_retries, 5);
    assert_eq!(config.export.retry_delay_ms, 250);
    assert_eq!(
        config.export.session_identifier.as_deref(),
        Some("Bench run 12")
    );
    assert_eq!(config.export.application_group, "Bench");
    assert_eq!(config.sink.target, SinkTarget::Memory);
    assert_eq!(config.sink.output_dir, "/tmp/sessions");
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");

    let options = ExportOptions::from_config(&config).unwrap();
    assert_eq!(options.batch.batch_size, 2500);
    assert_eq!(options.batch.retry.max_retries, 5);
    assert_eq!(options.application_group, "Bench");
}

#[test]
fn test_environment_variable_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_SESSIONFRAME_OUTPUT", "/data/sessions");

    let config = parse_config(
        r#"
[sink]
target = "jsonl"
output_dir = "${TEST_SESSIONFRAME_OUTPUT}"
"#,
    )
    .unwrap();

    assert_eq!(config.sink.output_dir, "/data/sessions");
    cleanup_env_vars();
}

#[test]
fn test_missing_substitution_variable_is_an_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let err = parse_config(
        r#"
[sink]
output_dir = "${TEST_SESSIONFRAME_OUTPUT}"
"#,
    )
    .unwrap_err();

    assert!(err.to_string().contains("TEST_SESSIONFRAME_OUTPUT"));
}

#[test]
fn test_environment_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("SESSIONFRAME_APPLICATION_LOG_LEVEL", "trace");
    std::env::set_var("SESSIONFRAME_EXPORT_BATCH_SIZE", "3000");
    std::env::set_var("SESSIONFRAME_EXPORT_SESSION_IDENTIFIER", "From env");
    std::env::set_var("SESSIONFRAME_SINK_TARGET", "memory");

    let file = write_config(
        r#"
[application]
log_level = "info"

[export]
batch_size = 5000
"#,
    );
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "trace");
    assert_eq!(config.export.batch_size, 3000);
    assert_eq!(
        config.export.session_identifier.as_deref(),
        Some("From env")
    );
    assert_eq!(config.sink.target, SinkTarget::Memory);

    cleanup_env_vars();
}

#[test]
fn test_overrides_apply_without_a_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("SESSIONFRAME_APPLICATION_DRY_RUN", "true");

    let config = default_config().unwrap();
    assert!(config.application.dry_run);
    assert_eq!(config.export.batch_size, 5000);

    cleanup_env_vars();
}

#[test]
fn test_unparseable_override_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("SESSIONFRAME_EXPORT_MAX_RETRIES", "many");

    let result = default_config();
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("SESSIONFRAME_EXPORT_MAX_RETRIES"));

    cleanup_env_vars();
}

#[test]
fn test_override_out_of_range_fails_validation() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("SESSIONFRAME_EXPORT_BATCH_SIZE", "0");

    let err = default_config().unwrap_err();
    assert!(err.to_string().contains("batch_size"));

    cleanup_env_vars();
}

#[test]
fn test_validation_errors() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let cases = [
        "[export]\nbatch_size = 100001\n",
        "[export]\nmax_retries = 11\n",
        "[export]\napplication_group = \"  \"\n",
        "[export]\nsession_identifier = \"\"\n",
        "[sink]\ntarget = \"jsonl\"\noutput_dir = \"\"\n",
        "[logging]\nlocal_rotation = \"size\"\n",
        "[application]\nlog_level = \"verbose\"\n",
    ];

    for toml in cases {
        assert!(parse_config(toml).is_err(), "expected rejection of {toml:?}");
    }
}

#[test]
fn test_unknown_sink_target_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    assert!(parse_config("[sink]\ntarget = \"postgres\"\n").is_err());
}
