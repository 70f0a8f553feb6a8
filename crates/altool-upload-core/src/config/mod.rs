//! Configuration for altool uploads

pub mod defaults;
mod env;
mod loader;
mod types;
pub mod validation;

pub use defaults::*;
pub use env::*;
pub use loader::*;
pub use types::*;
pub use validation::*;
