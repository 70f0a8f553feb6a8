//! altool-upload core
//!
//! Builds and runs Apple `altool` invocations that upload IPA files to App
//! Store Connect.
//!
//! ## Upload modes
//!
//! - **upload-app** (default): `altool --upload-app -f <ipa> -t <type>`
//! - **upload-package**: `altool --upload-package <ipa>` with the App ID and
//!   bundle identity. Missing bundle fields are read from the IPA's
//!   `Info.plist`.
//!
//! ## Authentication
//!
//! An App Store Connect API key (key ID + issuer) is used when both parts
//! are present. Otherwise an Apple ID username and password are required;
//! the password is handed to altool through the child's environment and
//! never appears in its arguments.
//!
//! ## Usage
//!
//! ```ignore
//! use altool_upload_core::{UploadOptions, Uploader};
//!
//! let options = UploadOptions {
//!     api_key_id: Some("ABC123".into()),
//!     api_issuer: Some("69a6de7e-...".into()),
//!     ..Default::default()
//! };
//! let outcome = Uploader::new(".").run(&options).await?;
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod metadata;
pub mod types;
pub mod uploader;

pub use command::{build_command, CommandLine};
pub use config::{load_config_for, UploadConfig};
pub use error::{ConfigError, Result, UploadError};
pub use metadata::{extract_bundle_metadata, IpaMetadataExtractor, MetadataExtractor};
pub use types::*;
pub use uploader::{find_latest_ipa, locate_altool, resolve_ipa_path, Uploader};
