//! altool command construction
//!
//! Turns [`UploadOptions`] into the exact argument vector passed to altool.
//! The password never appears in the arguments: altool is told to read it
//! from `ALTOOL_PASSWORD`, which is set on the child process only.

use crate::error::{Result, UploadError};
use crate::metadata::MetadataExtractor;
use crate::types::{non_empty, UploadMode, UploadOptions, DEFAULT_APP_TYPE, DEFAULT_OUTPUT_FORMAT};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable altool reads the password from
pub const PASSWORD_ENV: &str = "ALTOOL_PASSWORD";

/// Argument telling altool where to find the password
pub const PASSWORD_REFERENCE: &str = "@env:ALTOOL_PASSWORD";

/// A value that must not be logged or displayed
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// A fully resolved altool invocation
#[derive(Debug, Clone)]
pub struct CommandLine {
    program: PathBuf,
    args: Vec<String>,
    env: Vec<(String, Secret)>,
    mode: UploadMode,
}

impl CommandLine {
    fn new(program: &Path, mode: UploadMode) -> Self {
        Self {
            program: program.to_path_buf(),
            args: Vec::new(),
            env: Vec::new(),
            mode,
        }
    }

    fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Path of the uploader binary
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments after the program, in order
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Upload sub-command this invocation uses
    pub fn mode(&self) -> UploadMode {
        self.mode
    }

    /// Names of the variables set on the child process
    pub fn env_names(&self) -> impl Iterator<Item = &str> {
        self.env.iter().map(|(name, _)| name.as_str())
    }

    /// Whether the arguments contain `flag` immediately followed by `value`
    pub fn contains_pair(&self, flag: &str, value: &str) -> bool {
        self.args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    /// Create the process to launch
    ///
    /// Arguments are passed as a vector, so nothing is re-parsed by a shell.
    /// Secrets are scoped to the child's environment.
    pub fn to_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args);
        for (name, value) in &self.env {
            cmd.env(name, value.expose());
        }
        cmd
    }
}

impl fmt::Display for CommandLine {
    /// Shell-quoted rendering for logs and dry runs, secrets excluded
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program.to_string_lossy()))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

fn shell_quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@,+".contains(c));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\\''"))
    }
}

/// Build the altool invocation for `options`
///
/// In package mode, missing bundle fields are filled from `extractor`;
/// explicitly supplied values are never replaced.
pub fn build_command(
    altool: &Path,
    options: &UploadOptions,
    extractor: &dyn MetadataExtractor,
) -> Result<CommandLine> {
    let ipa_path = ipa_argument(options)?;
    let output_format = non_empty(&options.output_format).unwrap_or(DEFAULT_OUTPUT_FORMAT);

    let mut command = match options.mode() {
        UploadMode::UploadApp => {
            let app_type = non_empty(&options.app_type).unwrap_or(DEFAULT_APP_TYPE);
            let mut command = CommandLine::new(altool, UploadMode::UploadApp);
            command.args([
                "--upload-app",
                "-f",
                ipa_path,
                "-t",
                app_type,
                "--output-format",
                output_format,
            ]);
            command
        }
        UploadMode::UploadPackage => {
            package_command(altool, options, ipa_path, output_format, extractor)?
        }
    };

    add_authentication(&mut command, options)?;
    debug!(command = %command, "built altool command");
    Ok(command)
}

fn ipa_argument(options: &UploadOptions) -> Result<&str> {
    let path = options
        .ipa_path
        .as_deref()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| UploadError::validation("missing ipa_path: no IPA file was provided"))?;

    path.to_str().ok_or_else(|| {
        UploadError::validation(format!("ipa_path is not valid UTF-8: {}", path.display()))
    })
}

fn package_command(
    altool: &Path,
    options: &UploadOptions,
    ipa_path: &str,
    output_format: &str,
    extractor: &dyn MetadataExtractor,
) -> Result<CommandLine> {
    let mut bundle_id = non_empty(&options.bundle_id).map(str::to_string);
    let mut bundle_version = non_empty(&options.bundle_version).map(str::to_string);
    let mut short_version = non_empty(&options.bundle_short_version_string).map(str::to_string);

    if bundle_id.is_none() || bundle_version.is_none() || short_version.is_none() {
        info!("attempting to extract bundle metadata from IPA");
        if let Some(extracted) = extractor.extract(Path::new(ipa_path)) {
            let keep = |v: Option<String>| v.filter(|s| !s.is_empty());
            bundle_id = bundle_id.or_else(|| keep(extracted.bundle_id));
            bundle_version = bundle_version.or_else(|| keep(extracted.bundle_version));
            short_version = short_version.or_else(|| keep(extracted.bundle_short_version_string));
        }
    }

    let apple_id = non_empty(&options.apple_id).ok_or_else(|| {
        UploadError::validation(
            "missing apple_id: --upload-package requires the App ID from App Store Connect",
        )
    })?;

    let (Some(bundle_id), Some(bundle_version), Some(short_version)) =
        (bundle_id, bundle_version, short_version)
    else {
        return Err(UploadError::validation(
            "missing bundle metadata: --upload-package requires bundle_version, \
             bundle_short_version_string and bundle_id, either as options or \
             readable from the IPA's Info.plist",
        ));
    };

    let platform = non_empty(&options.platform).unwrap_or(DEFAULT_APP_TYPE);

    let mut command = CommandLine::new(altool, UploadMode::UploadPackage);
    command.args([
        "--upload-package",
        ipa_path,
        "-t",
        platform,
        "--apple-id",
        apple_id,
        "--bundle-version",
        bundle_version.as_str(),
        "--bundle-short-version-string",
        short_version.as_str(),
        "--bundle-id",
        bundle_id.as_str(),
        "--output-format",
        output_format,
    ]);

    if let Some(provider_id) = non_empty(&options.provider_public_id) {
        command.args(["--provider-public-id", provider_id]);
    }

    Ok(command)
}

fn add_authentication(command: &mut CommandLine, options: &UploadOptions) -> Result<()> {
    if let (Some(key_id), Some(issuer)) =
        (non_empty(&options.api_key_id), non_empty(&options.api_issuer))
    {
        let style = options.auth_flag_style;
        command.args([style.key_flag(), key_id, style.issuer_flag(), issuer]);
        return Ok(());
    }

    match (non_empty(&options.username), non_empty(&options.password)) {
        (Some(username), Some(password)) => {
            command.env.push((PASSWORD_ENV.to_string(), Secret::new(password)));
            command.args(["--username", username, "--password", PASSWORD_REFERENCE]);
            Ok(())
        }
        _ => Err(UploadError::validation(
            "no valid authentication provided: set api_key_id and api_issuer, \
             or username and password",
        )),
    }
}
