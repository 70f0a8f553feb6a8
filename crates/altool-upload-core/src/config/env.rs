//! Environment fallbacks for credentials
//!
//! `ALTOOL_*` variables are handled by the command line parser. These are
//! the older, tool-agnostic names consulted only when nothing else set a
//! value.

use crate::types::UploadOptions;

/// Fallback for the Apple ID username
pub const FASTLANE_USER_ENV: &str = "FASTLANE_USER";

/// Fallback for the Apple ID password
pub const FASTLANE_PASSWORD_ENV: &str = "FASTLANE_PASSWORD";

/// Fallback for the API key ID
pub const API_KEY_ENV: &str = "ALTOOL_API_KEY";

/// Fill unset credentials from the process environment
pub fn apply_env_fallbacks(options: &mut UploadOptions) {
    apply_fallbacks_with(options, |name| std::env::var(name).ok());
}

/// Fill unset credentials using `lookup` to read variables
pub fn apply_fallbacks_with<F>(options: &mut UploadOptions, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let pairs = [
        (&mut options.username, FASTLANE_USER_ENV),
        (&mut options.password, FASTLANE_PASSWORD_ENV),
        (&mut options.api_key_id, API_KEY_ENV),
    ];

    for (target, name) in pairs {
        if target.as_deref().map_or(true, str::is_empty) {
            if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
                tracing::debug!(variable = name, "using environment fallback");
                *target = Some(value);
            }
        }
    }
}
