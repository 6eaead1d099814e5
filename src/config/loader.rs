//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::SessionFrameConfig;
use crate::domain::errors::SessionFrameError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into SessionFrameConfig
/// 4. Applies environment variable overrides (SESSIONFRAME_* prefix)
/// 5. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use sessionframe::config::loader::load_config;
///
/// let config = load_config("sessionframe.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SessionFrameConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SessionFrameError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SessionFrameError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text
///
/// Runs the same substitution, override and validation steps as [`load_config`].
///
/// # Errors
///
/// Returns an error if substitution, parsing or validation fails
pub fn parse_config(contents: &str) -> Result<SessionFrameConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: SessionFrameConfig = toml::from_str(&contents)?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        SessionFrameError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Configuration used when no file is present
///
/// Defaults with environment overrides applied, then validated.
///
/// # Errors
///
/// Returns an error if an override produces an invalid configuration
pub fn default_config() -> Result<SessionFrameConfig> {
    parse_config("")
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| SessionFrameError::Configuration(format!("Invalid pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });
        lines.push(processed.into_owned());
    }

    if !missing_vars.is_empty() {
        return Err(SessionFrameError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    let mut result = lines.join("\n");
    if input.ends_with('\n') {
        result.push('\n');
    }
    Ok(result)
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(val) => val.trim().parse().map(Some).map_err(|_| {
            SessionFrameError::Configuration(format!("Invalid value for {name}: '{val}'"))
        }),
        Err(_) => Ok(None),
    }
}

/// Applies environment variable overrides using SESSIONFRAME_* prefix
///
/// Environment variables follow the pattern: SESSIONFRAME_<SECTION>_<KEY>,
/// for example SESSIONFRAME_EXPORT_BATCH_SIZE or SESSIONFRAME_SINK_OUTPUT_DIR.
///
/// # Errors
///
/// Returns an error if a numeric or boolean override cannot be parsed
fn apply_env_overrides(config: &mut SessionFrameConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("SESSIONFRAME_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_parse("SESSIONFRAME_APPLICATION_DRY_RUN")? {
        config.application.dry_run = val;
    }

    // Export overrides
    if let Some(val) = env_parse("SESSIONFRAME_EXPORT_BATCH_SIZE")? {
        config.export.batch_size = val;
    }
    if let Some(val) = env_parse("SESSIONFRAME_EXPORT_MAX_RETRIES")? {
        config.export.max_retries = val;
    }
    if let Some(val) = env_parse("SESSIONFRAME_EXPORT_RETRY_DELAY_MS")? {
        config.export.retry_delay_ms = val;
    }
    if let Ok(val) = std::env::var("SESSIONFRAME_EXPORT_SESSION_IDENTIFIER") {
        config.export.session_identifier = Some(val);
    }
    if let Ok(val) = std::env::var("SESSIONFRAME_EXPORT_APPLICATION_GROUP") {
        config.export.application_group = val;
    }

    // Sink overrides
    if let Ok(val) = std::env::var("SESSIONFRAME_SINK_TARGET") {
        config.sink.target = val.parse().map_err(SessionFrameError::Configuration)?;
    }
    if let Ok(val) = std::env::var("SESSIONFRAME_SINK_OUTPUT_DIR") {
        config.sink.output_dir = val;
    }

    // Logging overrides
    if let Some(val) = env_parse("SESSIONFRAME_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Ok(val) = std::env::var("SESSIONFRAME_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("SESSIONFRAME_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
