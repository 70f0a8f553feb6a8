//! CLI commands

mod init;
mod inspect;
mod upload;

pub use init::InitCommand;
pub use inspect::InspectCommand;
pub use upload::UploadCommand;
