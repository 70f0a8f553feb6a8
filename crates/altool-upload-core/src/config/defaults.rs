//! Default configuration values

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "altool-upload.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "altool-upload.yaml";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".altool-upload.toml",
        ".altool-upload.yaml",
    ]
}

/// Output formats altool accepts
pub const OUTPUT_FORMATS: &[&str] = &["normal", "xml", "json"];

/// Application types and platforms altool accepts for `-t`
pub const PLATFORMS: &[&str] = &["ios", "osx", "macos", "appletvos", "visionos"];

/// Starter configuration file
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# altool-upload configuration
# Credentials are best supplied through the environment
# (ALTOOL_API_KEY_ID / ALTOOL_API_ISSUER or FASTLANE_USER / FASTLANE_PASSWORD).

use_upload_package = false
app_type = "ios"
output_format = "normal"

# Required with use_upload_package
# apple_id = "1234567890"
# platform = "ios"
# provider_public_id = ""
"#;
