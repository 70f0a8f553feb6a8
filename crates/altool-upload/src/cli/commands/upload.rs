//! Upload command - Send an IPA to App Store Connect through altool

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::{debug, info};

use altool_upload_core::config::apply_env_fallbacks;
use altool_upload_core::{AuthFlagStyle, UploadOptions, Uploader};

use crate::cli::output;
use crate::cli::{Cli, OutputFormat};

/// Upload an IPA to App Store Connect
#[derive(Debug, Args)]
pub struct UploadCommand {
    /// Path to IPA file (default: most recent *.ipa in the working directory)
    #[arg(long, env = "ALTOOL_IPA_PATH")]
    pub ipa_path: Option<PathBuf>,

    /// Use --upload-package instead of --upload-app
    #[arg(long, env = "ALTOOL_USE_UPLOAD_PACKAGE")]
    pub use_upload_package: bool,

    /// Application type for --upload-app, e.g. ios, osx, appletvos
    #[arg(long, env = "ALTOOL_APP_TYPE")]
    pub app_type: Option<String>,

    /// Platform for --upload-package: ios, macos, appletvos, visionos
    #[arg(long, env = "ALTOOL_PLATFORM")]
    pub platform: Option<String>,

    /// altool output format
    #[arg(long, env = "ALTOOL_OUTPUT_FORMAT", value_parser = ["normal", "xml", "json"])]
    pub output_format: Option<String>,

    /// Apple ID username (falls back to FASTLANE_USER)
    #[arg(long, env = "ALTOOL_USERNAME")]
    pub username: Option<String>,

    /// App-specific password (falls back to FASTLANE_PASSWORD)
    #[arg(long, env = "ALTOOL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// App Store Connect API Key ID, without the AuthKey_ prefix and .p8 suffix
    #[arg(long, env = "ALTOOL_API_KEY_ID")]
    pub api_key_id: Option<String>,

    /// App Store Connect API Issuer ID
    #[arg(long, env = "ALTOOL_API_ISSUER")]
    pub api_issuer: Option<String>,

    /// App ID from App Store Connect (required for --upload-package)
    #[arg(long, env = "ALTOOL_APPLE_ID")]
    pub apple_id: Option<String>,

    /// CFBundleVersion (read from the IPA if omitted)
    #[arg(long, env = "ALTOOL_BUNDLE_VERSION")]
    pub bundle_version: Option<String>,

    /// CFBundleShortVersionString (read from the IPA if omitted)
    #[arg(long, env = "ALTOOL_BUNDLE_SHORT_VERSION_STRING")]
    pub bundle_short_version_string: Option<String>,

    /// CFBundleIdentifier (read from the IPA if omitted)
    #[arg(long, env = "ALTOOL_BUNDLE_ID")]
    pub bundle_id: Option<String>,

    /// Provider public ID, for accounts with several providers
    #[arg(long, env = "ALTOOL_PROVIDER_PUBLIC_ID")]
    pub provider_public_id: Option<String>,

    /// Pass the API key as --apiKey/--apiIssuer
    #[arg(long)]
    pub legacy_auth_flags: bool,

    /// altool binary to run instead of asking xcrun
    #[arg(long, env = "ALTOOL_PATH")]
    pub altool_path: Option<PathBuf>,

    /// Print the altool command without running it
    #[arg(long)]
    pub dry_run: bool,
}

impl UploadCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            dry_run = self.dry_run,
            upload_package = self.use_upload_package,
            "executing upload command"
        );
        let cwd = std::env::current_dir()?;

        let (config, config_path) = cli.load_config(&cwd)?;
        if let Some(path) = &config_path {
            debug!(path = %path.display(), "using config file");
        }

        let mut options = self.to_options();
        config.apply_to(&mut options);
        apply_env_fallbacks(&mut options);

        let altool_path = self.altool_path.clone().or_else(|| config.altool_path.clone());

        if cli.show_progress() {
            println!();
            println!("{}", style("Uploading to App Store Connect...").bold());
            println!("{}", output::key_value("Mode", &options.mode().to_string()));
            if let Some(ipa) = &options.ipa_path {
                println!(
                    "{}",
                    output::key_value("File", &style(ipa.display()).cyan().to_string())
                );
            }
            println!();
        }

        let uploader = Uploader::new(&cwd).with_altool_path(altool_path);
        let outcome = uploader.run(&options).await?;

        if cli.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        } else if !cli.quiet {
            if outcome.dry_run {
                output::info("Dry run, altool was not started");
                println!("{}", output::key_value("Command", &outcome.command));
            } else {
                output::success(&format!("Uploaded {}", outcome.ipa_path.display()));
                output::warning("App Store Connect processing can take a long time");
            }
            if cli.verbose {
                println!("{}", output::key_value("Command", &outcome.command));
            }
        }

        Ok(())
    }

    /// Options as given on the command line or through ALTOOL_* variables
    fn to_options(&self) -> UploadOptions {
        UploadOptions {
            use_upload_package: self.use_upload_package,
            app_type: self.app_type.clone(),
            platform: self.platform.clone(),
            ipa_path: self.ipa_path.clone(),
            output_format: self.output_format.clone(),
            api_key_id: self.api_key_id.clone(),
            api_issuer: self.api_issuer.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            apple_id: self.apple_id.clone(),
            bundle_version: self.bundle_version.clone(),
            bundle_short_version_string: self.bundle_short_version_string.clone(),
            bundle_id: self.bundle_id.clone(),
            provider_public_id: self.provider_public_id.clone(),
            auth_flag_style: if self.legacy_auth_flags {
                AuthFlagStyle::Legacy
            } else {
                AuthFlagStyle::Modern
            },
            dry_run: self.dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Commands;
    use altool_upload_core::UploadMode;
    use clap::Parser;

    fn parse(args: &[&str]) -> UploadCommand {
        let mut argv = vec!["altool-upload", "upload"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Upload(cmd) => cmd,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_package_options() {
        let cmd = parse(&[
            "--use-upload-package",
            "--ipa-path",
            "build/App.ipa",
            "--apple-id",
            "1234567890",
            "--bundle-id",
            "com.example.app",
            "--api-key-id",
            "KEY",
            "--api-issuer",
            "ISSUER",
            "--legacy-auth-flags",
            "--dry-run",
        ]);

        let options = cmd.to_options();
        assert_eq!(options.mode(), UploadMode::UploadPackage);
        assert_eq!(options.ipa_path, Some(PathBuf::from("build/App.ipa")));
        assert_eq!(options.apple_id.as_deref(), Some("1234567890"));
        assert_eq!(options.bundle_id.as_deref(), Some("com.example.app"));
        assert_eq!(options.auth_flag_style, AuthFlagStyle::Legacy);
        assert!(options.dry_run);
    }

    #[test]
    fn test_output_format_is_restricted() {
        let result = Cli::try_parse_from([
            "altool-upload",
            "upload",
            "--output-format",
            "html",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_password_is_not_debug_printed() {
        let cmd = parse(&["--username", "dev@example.com", "--password", "hunter2"]);
        let options = cmd.to_options();
        assert!(!format!("{:?}", options).contains("hunter2"));
        assert_eq!(options.password.as_deref(), Some("hunter2"));
    }
}
