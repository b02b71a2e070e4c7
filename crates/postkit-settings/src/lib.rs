//! postkit Settings Crate
//!
//! Handles post-processor configuration: defaults, argument strings and
//! config files. A [`PostConfig`] is an explicit value passed to each export;
//! nothing here is process-wide state.

pub mod args;
pub mod config;

pub use args::PostArgs;
pub use config::{DustCollection, PostConfig, MAX_PRECISION};
