//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod check;
pub mod export;
pub mod init;
pub mod validate;

use crate::config::{default_config, load_config, SessionFrameConfig};
use std::path::Path;

/// Load the configuration file, falling back to defaults when it does not exist
///
/// Environment overrides apply in both cases.
pub fn load_or_default(config_path: &str) -> crate::domain::Result<SessionFrameConfig> {
    if Path::new(config_path).exists() {
        load_config(config_path)
    } else {
        tracing::info!(config_path = %config_path, "Configuration file not found, using defaults");
        default_config()
    }
}
