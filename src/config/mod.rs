//! # Configuration
//!
//! - `cleanup`: sweep settings read from the environment
//! - `error`: startup validation failures

pub mod cleanup;
pub mod error;

pub use cleanup::CleanupConfig;
pub use error::ConfigError;
