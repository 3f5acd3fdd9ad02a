//! ReelKit Common Utilities
//!
//! Shared infrastructure for all ReelKit crates:
//! - Error types and result aliases
//! - Pause-aware recording clock
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
