//! Bundle metadata extraction from IPA archives
//!
//! An IPA is a zip archive with the application bundle under
//! `Payload/<Name>.app/`. The bundle's `Info.plist` carries the identifier
//! and version fields needed by `altool --upload-package`.
//!
//! Extraction is best effort: every failure is logged as a warning and
//! reported as `None`, so callers fall back to explicitly supplied values.

use crate::error::{Result, UploadError};
use crate::types::BundleMetadata;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Location of the application manifest inside an IPA
pub const INFO_PLIST_PATTERN: &str = "Payload/*.app/Info.plist";

const MATCH_OPTIONS: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Source of bundle metadata for package uploads
pub trait MetadataExtractor: Send + Sync {
    /// Read bundle metadata for the IPA at `ipa_path`, if possible
    fn extract(&self, ipa_path: &Path) -> Option<BundleMetadata>;
}

/// Reads bundle metadata from the IPA's embedded Info.plist
#[derive(Debug, Clone, Copy, Default)]
pub struct IpaMetadataExtractor;

impl MetadataExtractor for IpaMetadataExtractor {
    fn extract(&self, ipa_path: &Path) -> Option<BundleMetadata> {
        extract_bundle_metadata(ipa_path)
    }
}

/// Extract bundle metadata from an IPA
///
/// The path may be wrapped in double quotes. Returns `None` when the
/// archive cannot be read, has no `Payload/*.app/Info.plist`, or the
/// manifest cannot be parsed.
pub fn extract_bundle_metadata(ipa_path: &Path) -> Option<BundleMetadata> {
    let ipa_path = strip_quotes(ipa_path);
    debug!(ipa = %ipa_path.display(), "extracting bundle metadata");

    match read_bundle_metadata(&ipa_path) {
        Ok(Some(metadata)) => {
            info!(
                bundle_id = metadata.bundle_id.as_deref().unwrap_or_default(),
                bundle_version = metadata.bundle_version.as_deref().unwrap_or_default(),
                short_version = metadata
                    .bundle_short_version_string
                    .as_deref()
                    .unwrap_or_default(),
                "extracted bundle metadata from IPA"
            );
            Some(metadata)
        }
        Ok(None) => None,
        Err(e) => {
            warn!(ipa = %ipa_path.display(), error = %e, "error extracting bundle metadata");
            None
        }
    }
}

fn read_bundle_metadata(ipa_path: &Path) -> Result<Option<BundleMetadata>> {
    let file = File::open(ipa_path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| UploadError::InvalidArtifact(format!("Invalid zip file: {}", e)))?;

    // Removed on drop, whichever way we leave this function
    let scratch = tempfile::tempdir()?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| UploadError::InvalidArtifact(format!("Failed to read zip entry: {}", e)))?;

        if entry.is_dir() {
            continue;
        }
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        if !is_info_plist_entry(&relative) {
            continue;
        }

        let dest = scratch.path().join(&relative);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&dest)?;
        std::io::copy(&mut entry, &mut out)?;
    }

    let Some(info_plist) = find_info_plist(scratch.path()) else {
        warn!(
            ipa = %ipa_path.display(),
            "could not find Info.plist in IPA, bundle parameters must be provided"
        );
        return Ok(None);
    };

    let value = match plist::Value::from_file(&info_plist) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "failed to parse Info.plist");
            return Ok(None);
        }
    };

    let Some(dict) = value.as_dictionary() else {
        warn!("Info.plist is not a dictionary");
        return Ok(None);
    };

    let field = |key: &str| {
        dict.get(key)
            .and_then(|v| v.as_string())
            .map(|s| s.to_string())
    };

    Ok(Some(BundleMetadata {
        bundle_id: field("CFBundleIdentifier"),
        bundle_version: field("CFBundleVersion"),
        bundle_short_version_string: field("CFBundleShortVersionString"),
    }))
}

fn is_info_plist_entry(relative: &Path) -> bool {
    glob::Pattern::new(INFO_PLIST_PATTERN)
        .map(|pattern| pattern.matches_path_with(relative, MATCH_OPTIONS))
        .unwrap_or(false)
}

/// First `Payload/*.app/Info.plist` under `root`, in sorted path order
fn find_info_plist(root: &Path) -> Option<PathBuf> {
    let pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&root.to_string_lossy()),
        INFO_PLIST_PATTERN
    );

    glob::glob_with(&pattern, MATCH_OPTIONS)
        .ok()?
        .flatten()
        .find(|path| path.is_file())
}

/// Strip one leading and one trailing double quote
fn strip_quotes(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(raw) => {
            let raw = raw.strip_prefix('"').unwrap_or(raw);
            let raw = raw.strip_suffix('"').unwrap_or(raw);
            PathBuf::from(raw)
        }
        None => path.to_path_buf(),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extracts_metadata_from_valid_ipa() {
        let temp = TempDir::new().unwrap();
        let ipa = write_app_ipa(temp.path(), "com.test.myapp", "42", "1.2.3");

        let metadata = extract_bundle_metadata(&ipa).unwrap();
        assert_eq!(metadata.bundle_id.as_deref(), Some("com.test.myapp"));
        assert_eq!(metadata.bundle_version.as_deref(), Some("42"));
        assert_eq!(metadata.bundle_short_version_string.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn test_accepts_quoted_path() {
        let temp = TempDir::new().unwrap();
        let ipa = write_app_ipa(temp.path(), "com.test.myapp", "42", "1.2.3");
        let quoted = PathBuf::from(format!("\"{}\"", ipa.display()));

        let metadata = IpaMetadataExtractor.extract(&quoted).unwrap();
        assert_eq!(metadata.bundle_id.as_deref(), Some("com.test.myapp"));
    }

    #[test]
    fn test_reads_binary_plist() {
        let temp = TempDir::new().unwrap();
        let mut dict = plist::Dictionary::new();
        dict.insert("CFBundleIdentifier".to_string(), "com.test.binary".into());
        dict.insert("CFBundleVersion".to_string(), "7".into());
        dict.insert("CFBundleShortVersionString".to_string(), "2.0".into());
        let mut buf = Vec::new();
        plist::Value::Dictionary(dict).to_writer_binary(&mut buf).unwrap();

        let ipa = write_ipa(
            temp.path(),
            "binary.ipa",
            &[("Payload/Binary.app/Info.plist", buf)],
        );

        let metadata = extract_bundle_metadata(&ipa).unwrap();
        assert_eq!(metadata.bundle_id.as_deref(), Some("com.test.binary"));
        assert_eq!(metadata.bundle_version.as_deref(), Some("7"));
    }

    #[test]
    fn test_nonexistent_path_returns_none() {
        let metadata = extract_bundle_metadata(Path::new("\"/nonexistent/file.ipa\""));
        assert!(metadata.is_none());
    }

    #[test]
    fn test_ipa_without_info_plist_returns_none() {
        let temp = TempDir::new().unwrap();
        let ipa = write_ipa(temp.path(), "empty.ipa", &[("Payload/", Vec::new())]);

        assert!(extract_bundle_metadata(&ipa).is_none());
    }

    #[test]
    fn test_nested_info_plist_is_ignored() {
        let temp = TempDir::new().unwrap();
        let plist = info_plist("com.test.framework", "1", "1.0");
        let ipa = write_ipa(
            temp.path(),
            "nested.ipa",
            &[("Payload/MyApp.app/Frameworks/Kit.framework/Info.plist", plist)],
        );

        assert!(extract_bundle_metadata(&ipa).is_none());
    }

    #[test]
    fn test_not_a_zip_returns_none() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.ipa");
        std::fs::write(&path, b"definitely not a zip archive").unwrap();

        assert!(extract_bundle_metadata(&path).is_none());
    }

    #[test]
    fn test_unparseable_plist_returns_none() {
        let temp = TempDir::new().unwrap();
        let ipa = write_ipa(
            temp.path(),
            "garbage.ipa",
            &[("Payload/MyApp.app/Info.plist", b"{ not a plist".to_vec())],
        );

        assert!(extract_bundle_metadata(&ipa).is_none());
    }

    #[test]
    fn test_missing_keys_are_absent() {
        let temp = TempDir::new().unwrap();
        let mut dict = plist::Dictionary::new();
        dict.insert("CFBundleIdentifier".to_string(), "com.test.partial".into());
        dict.insert("CFBundleVersion".to_string(), plist::Value::Integer(3i64.into()));
        let mut buf = Vec::new();
        plist::Value::Dictionary(dict).to_writer_xml(&mut buf).unwrap();

        let ipa = write_ipa(temp.path(), "partial.ipa", &[("Payload/P.app/Info.plist", buf)]);

        let metadata = extract_bundle_metadata(&ipa).unwrap();
        assert_eq!(metadata.bundle_id.as_deref(), Some("com.test.partial"));
        assert_eq!(metadata.bundle_version, None);
        assert_eq!(metadata.bundle_short_version_string, None);
    }

    #[test]
    fn test_is_info_plist_entry() {
        assert!(is_info_plist_entry(Path::new("Payload/MyApp.app/Info.plist")));
        assert!(!is_info_plist_entry(Path::new("Payload/MyApp/Info.plist")));
        assert!(!is_info_plist_entry(Path::new("Other/MyApp.app/Info.plist")));
        assert!(!is_info_plist_entry(Path::new(
            "Payload/MyApp.app/PlugIns/Ext.appex/Info.plist"
        )));
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes(Path::new("\"/tmp/a.ipa\"")), PathBuf::from("/tmp/a.ipa"));
        assert_eq!(strip_quotes(Path::new("/tmp/a.ipa")), PathBuf::from("/tmp/a.ipa"));
    }
}
