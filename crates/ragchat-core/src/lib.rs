pub mod config;
pub mod error;
pub mod types;

pub use config::RagchatConfig;
pub use error::{RagchatError, Result};
pub use types::*;
