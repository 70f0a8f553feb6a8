//! CLI definition and command handling

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use altool_upload_core::{load_config_for, UploadConfig};

use commands::{InitCommand, InspectCommand, UploadCommand};

/// altool-upload - Upload IPA files to App Store Connect with altool
#[derive(Debug, Parser)]
#[command(name = "altool-upload")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Configuration file (default: search for altool-upload.toml/.yaml)
    #[arg(long, global = true, env = "ALTOOL_UPLOAD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upload an IPA to App Store Connect
    Upload(UploadCommand),

    /// Show the bundle metadata stored in an IPA
    Inspect(InspectCommand),

    /// Write a starter configuration file
    Init(InitCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Commands::Upload(ref cmd) => cmd.execute(&self),
            Commands::Inspect(ref cmd) => cmd.execute(&self),
            Commands::Init(ref cmd) => cmd.execute(&self),
        }
    }

    /// Whether human-readable progress should be printed
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Text
    }

    /// Load the project configuration for `dir`
    pub fn load_config(&self, dir: &Path) -> anyhow::Result<(UploadConfig, Option<PathBuf>)> {
        let (config, path) = load_config_for(self.config.as_deref(), dir)
            .map_err(altool_upload_core::UploadError::from)?;
        Ok((config, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "altool-upload",
            "--format",
            "json",
            "-q",
            "inspect",
            "App.ipa",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.quiet);
        assert!(!cli.show_progress());
        assert!(matches!(cli.command, Commands::Inspect(_)));
    }
}
