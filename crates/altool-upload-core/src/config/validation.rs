//! Configuration validation

use tracing::debug;

use crate::error::ConfigError;

use super::defaults::{OUTPUT_FORMATS, PLATFORMS};
use super::types::UploadConfig;

/// Validate configuration
pub fn validate_config(config: &UploadConfig) -> Result<(), ConfigError> {
    debug!("validating configuration");
    validate_choice("output_format", config.output_format.as_deref(), OUTPUT_FORMATS)?;
    validate_choice("app_type", config.app_type.as_deref(), PLATFORMS)?;
    validate_choice("platform", config.platform.as_deref(), PLATFORMS)?;

    if let Some(path) = &config.ipa_path {
        if path.extension().map_or(true, |e| e != "ipa") {
            return Err(ConfigError::InvalidValue {
                field: "ipa_path".to_string(),
                message: "must point to an .ipa file".to_string(),
            });
        }
    }

    debug!("configuration validation passed");
    Ok(())
}

fn validate_choice(
    field: &str,
    value: Option<&str>,
    allowed: &[&str],
) -> Result<(), ConfigError> {
    match value {
        Some(value) if !value.is_empty() && !allowed.contains(&value) => {
            Err(ConfigError::InvalidValue {
                field: field.to_string(),
                message: format!("must be one of: {}", allowed.join(", ")),
            })
        }
        _ => Ok(()),
    }
}
