//! Exit codes for the CLI

use altool_upload_core::UploadError;

/// Success
pub const SUCCESS: u8 = 0;

/// General error
pub const ERROR: u8 = 1;

/// Configuration error
pub const CONFIG_ERROR: u8 = 2;

/// Validation error
pub const VALIDATION_ERROR: u8 = 5;

/// Exit code for a failed command
///
/// A failing altool run exits with altool's own status.
pub fn for_error(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<UploadError>() {
        Some(UploadError::Validation(_)) => VALIDATION_ERROR,
        Some(UploadError::Config(_)) => CONFIG_ERROR,
        Some(UploadError::Subprocess { code: Some(code) }) => {
            u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(ERROR)
        }
        _ => ERROR,
    }
}
