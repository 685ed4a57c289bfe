// Stages
pub mod deploy;
pub mod logs;
pub mod release;
pub mod sync;

// External tools
pub mod bridge;
pub mod git;

pub mod cancel;
pub mod config;
pub mod error;
pub mod version;

// Re-export common types for convenience
pub use config::{Config, Project};
pub use error::{Error, ErrorCode, Result};
