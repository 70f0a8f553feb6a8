//! Upload execution
//!
//! [`Uploader`] ties the pieces together: find altool, settle on an IPA,
//! build the command and run it.

use crate::command::build_command;
use crate::error::{Result, UploadError};
use crate::metadata::{IpaMetadataExtractor, MetadataExtractor};
use crate::types::{UploadOptions, UploadOutcome};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Name of the uploader binary
pub const ALTOOL: &str = "altool";

/// Runs altool uploads
pub struct Uploader {
    /// Explicit altool path, skipping the `xcrun` lookup
    altool_path: Option<PathBuf>,

    /// Directory searched for a default IPA and used for relative paths
    working_dir: PathBuf,

    /// Source of bundle metadata for package uploads
    extractor: Box<dyn MetadataExtractor>,
}

impl Uploader {
    /// Create an uploader working in `working_dir`
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            altool_path: None,
            working_dir: working_dir.into(),
            extractor: Box::new(IpaMetadataExtractor),
        }
    }

    /// Use this altool binary instead of asking `xcrun`
    pub fn with_altool_path(mut self, path: Option<PathBuf>) -> Self {
        self.altool_path = path;
        self
    }

    /// Replace the bundle metadata source
    pub fn with_extractor(mut self, extractor: Box<dyn MetadataExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Validate options, build the altool command and run it
    ///
    /// altool's own output goes straight to this process's stdout and
    /// stderr. A non-zero exit is reported as [`UploadError::Subprocess`].
    pub async fn run(&self, options: &UploadOptions) -> Result<UploadOutcome> {
        let ipa_path = resolve_ipa_path(options.ipa_path.as_deref(), &self.working_dir)?;

        let altool = match &self.altool_path {
            Some(path) => path.clone(),
            None => locate_altool().await,
        };

        let mut resolved = options.clone();
        resolved.ipa_path = Some(ipa_path.clone());

        info!(
            ipa = %ipa_path.display(),
            mode = %resolved.mode(),
            "validating and uploading IPA to App Store Connect"
        );
        let command = build_command(&altool, &resolved, self.extractor.as_ref())?;

        let outcome = |dry_run| UploadOutcome {
            mode: command.mode(),
            ipa_path: ipa_path.clone(),
            command: command.to_string(),
            dry_run,
            finished_at: Utc::now(),
        };

        if options.dry_run {
            info!(command = %command, "dry run - not running altool");
            return Ok(outcome(true));
        }

        debug!(command = %command, "running altool");
        let status = command
            .to_command()
            .status()
            .await
            .map_err(|e| {
                UploadError::CommandFailed(format!(
                    "failed to launch {}: {}",
                    command.program().display(),
                    e
                ))
            })?;

        if !status.success() {
            return Err(UploadError::Subprocess {
                code: status.code(),
            });
        }

        info!("upload finished, App Store Connect processing can take a while");
        Ok(outcome(false))
    }
}

/// Find altool, preferring `xcrun -f altool`
///
/// The lookup never fails: problems are logged and the best guess is
/// returned, so a bad path only surfaces when the upload is launched.
pub async fn locate_altool() -> PathBuf {
    match Command::new("xcrun").args(["-f", ALTOOL]).output().await {
        Ok(output) if output.status.success() => {
            let path = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
            if !path.as_os_str().is_empty() {
                if path.exists() {
                    debug!(path = %path.display(), "found altool via xcrun");
                } else {
                    warn!(path = %path.display(), "altool binary doesn't exist at path");
                }
                return path;
            }
            warn!("xcrun returned an empty path for altool");
        }
        Ok(output) => {
            warn!(
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "xcrun could not find altool"
            );
        }
        Err(e) => {
            warn!(error = %e, "xcrun is not available");
        }
    }

    match which::which(ALTOOL) {
        Ok(path) => {
            debug!(path = %path.display(), "found altool on PATH");
            path
        }
        Err(_) => {
            warn!("altool not found on PATH, relying on the bare command name");
            PathBuf::from(ALTOOL)
        }
    }
}

/// Settle on the IPA to upload
///
/// Without an explicit path, the most recently modified `*.ipa` in `dir` is
/// used. The result must exist and end in `.ipa`.
pub fn resolve_ipa_path(explicit: Option<&Path>, dir: &Path) -> Result<PathBuf> {
    let path = match explicit.filter(|p| !p.as_os_str().is_empty()) {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => dir.join(path),
        None => find_latest_ipa(dir).ok_or_else(|| {
            UploadError::validation(format!(
                "missing ipa_path: no .ipa file found in {}",
                dir.display()
            ))
        })?,
    };

    if !path.exists() {
        return Err(UploadError::validation(format!(
            "Could not find ipa file at path '{}'",
            path.display()
        )));
    }

    let is_ipa = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".ipa"));
    if !is_ipa {
        return Err(UploadError::validation(format!(
            "'{}' doesn't seem to be an ipa file",
            path.display()
        )));
    }

    Ok(path)
}

/// Most recently modified `*.ipa` file in `dir`
pub fn find_latest_ipa(dir: &Path) -> Option<PathBuf> {
    let pattern = format!("{}/*.ipa", glob::Pattern::escape(&dir.to_string_lossy()));

    glob::glob(&pattern)
        .ok()?
        .flatten()
        .filter(|path| path.is_file())
        .map(|path| {
            let modified = std::fs::metadata(&path)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, path)
        })
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, path)| path)
}
