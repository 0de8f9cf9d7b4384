//! CLI command implementations.

pub mod checklist;
pub mod device;
pub mod group;
pub mod history;
pub mod init;
pub mod slot;
pub mod status;
pub mod subject;
