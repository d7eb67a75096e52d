//! `jobtrack-core` — configuration and domain types shared by every crate.

pub mod config;
pub mod error;
pub mod types;

pub use config::JobtrackConfig;
pub use error::{CoreError, Result};
