//! Configuration file types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::{AuthFlagStyle, UploadOptions};

/// Project-level upload settings read from `altool-upload.toml` / `.yaml`
///
/// Every field is optional; values given on the command line or through
/// `ALTOOL_*` variables take precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    pub use_upload_package: Option<bool>,
    pub app_type: Option<String>,
    pub platform: Option<String>,
    pub ipa_path: Option<PathBuf>,
    pub output_format: Option<String>,
    pub api_key_id: Option<String>,
    pub api_issuer: Option<String>,
    pub username: Option<String>,
    pub apple_id: Option<String>,
    pub bundle_version: Option<String>,
    pub bundle_short_version_string: Option<String>,
    pub bundle_id: Option<String>,
    pub provider_public_id: Option<String>,
    pub auth_flag_style: Option<AuthFlagStyle>,

    /// Skip the `xcrun` lookup and run this binary
    pub altool_path: Option<PathBuf>,
}

impl UploadConfig {
    /// Fill options the caller left unset
    pub fn apply_to(&self, options: &mut UploadOptions) {
        fill(&mut options.app_type, &self.app_type);
        fill(&mut options.platform, &self.platform);
        fill(&mut options.output_format, &self.output_format);
        fill(&mut options.api_key_id, &self.api_key_id);
        fill(&mut options.api_issuer, &self.api_issuer);
        fill(&mut options.username, &self.username);
        fill(&mut options.apple_id, &self.apple_id);
        fill(&mut options.bundle_version, &self.bundle_version);
        fill(
            &mut options.bundle_short_version_string,
            &self.bundle_short_version_string,
        );
        fill(&mut options.bundle_id, &self.bundle_id);
        fill(&mut options.provider_public_id, &self.provider_public_id);

        if options.ipa_path.is_none() {
            options.ipa_path = self.ipa_path.clone();
        }
        if let Some(true) = self.use_upload_package {
            options.use_upload_package = true;
        }
        if let Some(style) = self.auth_flag_style {
            if options.auth_flag_style == AuthFlagStyle::default() {
                options.auth_flag_style = style;
            }
        }
    }
}

fn fill(target: &mut Option<String>, value: &Option<String>) {
    let unset = target.as_deref().map_or(true, str::is_empty);
    if unset {
        if let Some(value) = value {
            *target = Some(value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_fills_only_missing() {
        let config = UploadConfig {
            app_type: Some("osx".to_string()),
            apple_id: Some("111".to_string()),
            output_format: Some("xml".to_string()),
            use_upload_package: Some(true),
            ipa_path: Some(PathBuf::from("build/App.ipa")),
            ..Default::default()
        };
        let mut options = UploadOptions {
            apple_id: Some("222".to_string()),
            output_format: Some(String::new()),
            ..Default::default()
        };

        config.apply_to(&mut options);

        assert_eq!(options.app_type.as_deref(), Some("osx"));
        assert_eq!(options.apple_id.as_deref(), Some("222"));
        assert_eq!(options.output_format.as_deref(), Some("xml"));
        assert_eq!(options.ipa_path, Some(PathBuf::from("build/App.ipa")));
        assert!(options.use_upload_package);
    }

    #[test]
    fn test_apply_legacy_flag_style() {
        let config = UploadConfig {
            auth_flag_style: Some(AuthFlagStyle::Legacy),
            ..Default::default()
        };
        let mut options = UploadOptions::default();

        config.apply_to(&mut options);
        assert_eq!(options.auth_flag_style, AuthFlagStyle::Legacy);
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let result: Result<UploadConfig, _> = toml::from_str("passwrd = \"x\"\n");
        assert!(result.is_err());
    }
}
