//! Domain layer for the runcheck checklist system
//!
//! This module contains core business logic, domain models and repository ports.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult, ErrorKind};
