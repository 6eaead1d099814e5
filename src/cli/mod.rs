//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for SessionFrame using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// SessionFrame - time-indexed tables into recording sessions
#[derive(Parser, Debug)]
#[command(name = "sessionframe")]
#[command(version, about, long_about = None)]
#[command(author = "SessionFrame Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "sessionframe.toml", env = "SESSIONFRAME_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SESSIONFRAME_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a CSV dataset as one session
    Export(commands::export::ExportArgs),

    /// Check that a CSV dataset can be exported, without touching a sink
    Check(commands::check::CheckArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from(["sessionframe", "export", "run.csv"]);
        assert_eq!(cli.config, "sessionframe.toml");
        assert!(matches!(cli.command, Commands::Export(ref args) if args.input.to_str() == Some("run.csv")));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["sessionframe", "--config", "custom.toml", "export", "run.csv"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["sessionframe", "--log-level", "debug", "check", "run.csv"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::Check(_)));
    }

    #[test]
    fn test_cli_parse_export_overrides() {
        let cli = Cli::parse_from([
            "sessionframe",
            "export",
            "run.csv",
            "--batch-size",
            "3000",
            "--sink",
            "memory",
            "--identifier",
            "Run 12",
            "--dry-run",
            "--yes",
        ]);
        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.batch_size, Some(3000));
        assert_eq!(args.sink, Some(crate::config::SinkTarget::Memory));
        assert_eq!(args.identifier.as_deref(), Some("Run 12"));
        assert!(args.dry_run && args.yes);
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["sessionframe", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["sessionframe", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }

    #[test]
    fn test_cli_rejects_unknown_sink() {
        assert!(Cli::try_parse_from(["sessionframe", "export", "run.csv", "--sink", "s3"]).is_err());
    }
}
