//! Common types for altool uploads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default `-t` value for both upload modes
pub const DEFAULT_APP_TYPE: &str = "ios";

/// Default `--output-format` value
pub const DEFAULT_OUTPUT_FORMAT: &str = "normal";

/// Which altool sub-command performs the upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UploadMode {
    /// `--upload-app`
    UploadApp,
    /// `--upload-package`, requires an App ID and bundle metadata
    UploadPackage,
}

impl std::fmt::Display for UploadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadMode::UploadApp => write!(f, "upload-app"),
            UploadMode::UploadPackage => write!(f, "upload-package"),
        }
    }
}

/// Spelling of the API key flags passed to altool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthFlagStyle {
    /// `--api-key` / `--api-issuer`
    #[default]
    Modern,
    /// `--apiKey` / `--apiIssuer`
    Legacy,
}

impl AuthFlagStyle {
    pub(crate) fn key_flag(self) -> &'static str {
        match self {
            AuthFlagStyle::Modern => "--api-key",
            AuthFlagStyle::Legacy => "--apiKey",
        }
    }

    pub(crate) fn issuer_flag(self) -> &'static str {
        match self {
            AuthFlagStyle::Modern => "--api-issuer",
            AuthFlagStyle::Legacy => "--apiIssuer",
        }
    }
}

/// Options for a single upload
///
/// Empty strings are treated the same as missing values.
#[derive(Clone, Default)]
pub struct UploadOptions {
    /// Use `--upload-package` instead of `--upload-app`
    pub use_upload_package: bool,

    /// Application type for `--upload-app` (e.g. ios, osx, appletvos)
    pub app_type: Option<String>,

    /// Platform for `--upload-package` (e.g. ios, macos, appletvos, visionos)
    pub platform: Option<String>,

    /// Path to the IPA file
    pub ipa_path: Option<PathBuf>,

    /// altool output format (normal, xml, json)
    pub output_format: Option<String>,

    /// App Store Connect API key ID
    pub api_key_id: Option<String>,

    /// App Store Connect API issuer ID
    pub api_issuer: Option<String>,

    /// Apple ID username
    pub username: Option<String>,

    /// Apple ID password (app-specific password)
    pub password: Option<String>,

    /// App ID from App Store Connect
    pub apple_id: Option<String>,

    /// CFBundleVersion
    pub bundle_version: Option<String>,

    /// CFBundleShortVersionString
    pub bundle_short_version_string: Option<String>,

    /// CFBundleIdentifier
    pub bundle_id: Option<String>,

    /// Provider public ID for accounts with several providers
    pub provider_public_id: Option<String>,

    /// Spelling of the API key flags
    pub auth_flag_style: AuthFlagStyle,

    /// Build and report the command without running it
    pub dry_run: bool,
}

impl UploadOptions {
    /// The selected upload sub-command
    pub fn mode(&self) -> UploadMode {
        if self.use_upload_package {
            UploadMode::UploadPackage
        } else {
            UploadMode::UploadApp
        }
    }
}

impl std::fmt::Debug for UploadOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadOptions")
            .field("use_upload_package", &self.use_upload_package)
            .field("app_type", &self.app_type)
            .field("platform", &self.platform)
            .field("ipa_path", &self.ipa_path)
            .field("output_format", &self.output_format)
            .field("api_key_id", &self.api_key_id)
            .field("api_issuer", &self.api_issuer)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("apple_id", &self.apple_id)
            .field("bundle_version", &self.bundle_version)
            .field("bundle_short_version_string", &self.bundle_short_version_string)
            .field("bundle_id", &self.bundle_id)
            .field("provider_public_id", &self.provider_public_id)
            .field("auth_flag_style", &self.auth_flag_style)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

/// Bundle identity read from an IPA's Info.plist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleMetadata {
    /// CFBundleIdentifier
    pub bundle_id: Option<String>,

    /// CFBundleVersion
    pub bundle_version: Option<String>,

    /// CFBundleShortVersionString
    pub bundle_short_version_string: Option<String>,
}

/// Result of an upload run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadOutcome {
    /// Upload sub-command used
    pub mode: UploadMode,

    /// IPA that was (or would be) uploaded
    pub ipa_path: PathBuf,

    /// Redacted rendering of the altool invocation
    pub command: String,

    /// Whether altool was actually run
    pub dry_run: bool,

    /// When the run finished
    pub finished_at: DateTime<Utc>,
}

/// Returns the value when it is present and non-empty
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_follows_flag() {
        let mut options = UploadOptions::default();
        assert_eq!(options.mode(), UploadMode::UploadApp);

        options.use_upload_package = true;
        assert_eq!(options.mode(), UploadMode::UploadPackage);
        assert_eq!(options.mode().to_string(), "upload-package");
    }

    #[test]
    fn test_debug_redacts_password() {
        let options = UploadOptions {
            username: Some("dev@example.com".to_string()),
            password: Some("hunter2".to_string()),
            ..Default::default()
        };

        let rendered = format!("{:?}", options);
        assert!(rendered.contains("dev@example.com"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(&None), None);
        assert_eq!(non_empty(&Some(String::new())), None);
        assert_eq!(non_empty(&Some("ios".to_string())), Some("ios"));
    }
}
