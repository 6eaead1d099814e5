//! Integration tests for logging functionality

use sessionframe::config::LoggingConfig;
use sessionframe::logging::{init_logging, parse_log_level};
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_path, "./logs");
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_parse_log_level_matches_config_levels() {
    for level in ["trace", "debug", "info", "warn", "error"] {
        assert!(parse_log_level(level).is_ok(), "level {level} rejected");
    }
    assert!(parse_log_level("verbose").is_err());
}

#[test]
fn test_invalid_rotation_is_rejected_before_install() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "size".to_string(),
    };

    assert!(init_logging("info", &config).is_err());
    assert!(!log_path.exists());
}

// Only one test in this binary may install the global subscriber
#[test]
fn test_file_logging_creates_directory_and_writes() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    let guard = init_logging("debug", &config).unwrap();
    assert!(guard.has_file_layer());
    assert!(log_path.is_dir());

    tracing::info!(target: "sessionframe", channels = 2, "Logging integration test");
    drop(guard);

    let written: usize = std::fs::read_dir(&log_path)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| std::fs::read_to_string(entry.path()).unwrap_or_default().len())
        .sum();
    assert!(written > 0);

    // A second subscriber cannot be installed
    let again = init_logging("info", &LoggingConfig::default());
    assert!(again.is_err());
}
