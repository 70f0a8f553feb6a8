//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::ConfigError;

use super::defaults::config_file_names;
use super::types::UploadConfig;
use super::validation::validate_config;

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<UploadConfig, ConfigError> {
    let format = if path.extension().is_some_and(|e| e == "toml") {
        "TOML"
    } else {
        "YAML"
    };
    info!(path = %path.display(), format, "loading config");

    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;

    let config: UploadConfig = if format == "TOML" {
        toml::from_str(&content)?
    } else if content.trim().is_empty() {
        UploadConfig::default()
    } else {
        serde_yaml::from_str(&content)?
    };

    validate_config(&config)?;
    debug!(path = %path.display(), "config loaded and validated");
    Ok(config)
}

/// Find configuration file in directory or parent directories.
///
/// At each directory level the search checks `<dir>/<name>` and then
/// `<dir>/.github/<name>`. The first match wins.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for config file");
    let mut current = start_dir.to_path_buf();

    loop {
        for name in config_file_names() {
            let config_path = current.join(name);
            if config_path.is_file() {
                info!(path = %config_path.display(), "found config file");
                return Some(config_path);
            }

            let github_path = current.join(".github").join(name);
            if github_path.is_file() {
                info!(path = %github_path.display(), "found config file in .github/");
                return Some(github_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    debug!("no config file found");
    None
}

/// Load an explicit config file, or search upwards from `dir`
///
/// A missing explicit file is an error; finding nothing while searching is
/// not.
pub fn load_config_for(
    explicit: Option<&Path>,
    dir: &Path,
) -> Result<(UploadConfig, Option<PathBuf>), ConfigError> {
    if let Some(path) = explicit {
        return Ok((load_config(path)?, Some(path.to_path_buf())));
    }

    match find_config(dir) {
        Some(path) => Ok((load_config(&path)?, Some(path))),
        None => Ok((UploadConfig::default(), None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AuthFlagStyle;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("altool-upload.toml");
        std::fs::write(&config_path, "app_type = \"ios\"\n").unwrap();

        let found = find_config(temp.path());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_prefers_toml_over_yaml() {
        let temp = TempDir::new().unwrap();
        let toml_path = temp.path().join("altool-upload.toml");
        let yaml_path = temp.path().join("altool-upload.yaml");
        std::fs::write(&toml_path, "app_type = \"ios\"\n").unwrap();
        std::fs::write(&yaml_path, "app_type: osx\n").unwrap();

        assert_eq!(find_config(temp.path()).unwrap(), toml_path);
    }

    #[test]
    fn test_find_config_in_github_dir() {
        let temp = TempDir::new().unwrap();
        let github_dir = temp.path().join(".github");
        std::fs::create_dir_all(&github_dir).unwrap();
        let config_path = github_dir.join("altool-upload.yaml");
        std::fs::write(&config_path, "app_type: ios\n").unwrap();

        assert_eq!(find_config(temp.path()), Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("altool-upload.toml");
        std::fs::write(&config_path, "app_type = \"ios\"\n").unwrap();
        let nested = temp.path().join("ios").join("build");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config(&nested), Some(config_path));
    }

    #[test]
    fn test_load_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("altool-upload.toml");
        std::fs::write(
            &config_path,
            "use_upload_package = true\napple_id = \"1234567890\"\nauth_flag_style = \"legacy\"\n",
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.use_upload_package, Some(true));
        assert_eq!(config.apple_id.as_deref(), Some("1234567890"));
        assert_eq!(config.auth_flag_style, Some(AuthFlagStyle::Legacy));
    }

    #[test]
    fn test_load_config_yaml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("altool-upload.yaml");
        std::fs::write(&config_path, "platform: visionos\noutput_format: json\n").unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.platform.as_deref(), Some("visionos"));
        assert_eq!(config.output_format.as_deref(), Some("json"));
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("altool-upload.toml");
        std::fs::write(&config_path, "output_format = \"html\"\n").unwrap();

        let err = load_config(&config_path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");

        let err = load_config_for(Some(&missing), temp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_no_config_found_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let (config, path) = load_config_for(None, temp.path()).unwrap();
        // A config further up the real filesystem could be picked up, but a
        // fresh temp dir normally has none.
        if path.is_none() {
            assert_eq!(config, UploadConfig::default());
        }
    }
}
