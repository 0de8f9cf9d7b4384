//! Infrastructure layer module
//!
//! Process-level concerns shared by the CLI:
//! - Configuration management
//! - Logging infrastructure

pub mod config;
pub mod logging;
