//! # Runtime
//!
//! Process startup for the `serve` and `run` commands.

pub mod initialization;

pub use initialization::{initialize, install_crypto_provider};
