//! Inspect command - Show the bundle metadata altool would be given

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use altool_upload_core::{extract_bundle_metadata, resolve_ipa_path, BundleMetadata};

use crate::cli::output;
use crate::cli::{Cli, OutputFormat};

/// Show the bundle metadata stored in an IPA
#[derive(Debug, Args)]
pub struct InspectCommand {
    /// Path to IPA file (default: most recent *.ipa in the working directory)
    pub ipa: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct InspectReport<'a> {
    ipa_path: &'a std::path::Path,
    #[serde(flatten)]
    metadata: &'a BundleMetadata,
}

impl InspectCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let cwd = std::env::current_dir()?;
        let ipa = resolve_ipa_path(self.ipa.as_deref(), &cwd)?;
        info!(ipa = %ipa.display(), "executing inspect command");

        let metadata = extract_bundle_metadata(&ipa).ok_or_else(|| {
            anyhow::anyhow!(
                "Could not read Payload/*.app/Info.plist from {}",
                ipa.display()
            )
        })?;

        if cli.format == OutputFormat::Json {
            let report = InspectReport {
                ipa_path: &ipa,
                metadata: &metadata,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        if cli.quiet {
            return Ok(());
        }

        println!("{}", style(ipa.display()).bold());
        let show = |value: &Option<String>| match value {
            Some(value) => value.clone(),
            None => style("(missing)").yellow().to_string(),
        };
        println!("{}", output::key_value("Bundle ID", &show(&metadata.bundle_id)));
        println!("{}", output::key_value("Bundle Version", &show(&metadata.bundle_version)));
        println!(
            "{}",
            output::key_value("Short Version", &show(&metadata.bundle_short_version_string))
        );

        Ok(())
    }
}
