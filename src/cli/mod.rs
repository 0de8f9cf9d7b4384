//! Operator command-line interface.

pub mod commands;
pub mod context;
pub mod output;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::errors::DomainError;
use commands::{
    checklist::ChecklistArgs, device::DeviceArgs, group::GroupArgs, history::HistoryArgs,
    init::InitArgs, slot::SlotArgs, status::StatusArgs, subject::SubjectArgs,
};

#[derive(Parser, Debug)]
#[command(name = "runcheck")]
#[command(about = "Checklist approval tracking for devices, slots and groups", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Acting user name
    #[arg(short, long, global = true, env = "RUNCHECK_USER")]
    pub user: Option<String>,

    /// Role held by the acting user, e.g. GRP:EE#LEADER (repeatable)
    #[arg(short, long = "role", global = true, value_delimiter = ',', env = "RUNCHECK_ROLES")]
    pub roles: Vec<String>,

    /// Configuration file, replacing the project files under .runcheck/
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration, database and default subjects
    Init(InitArgs),
    /// Device registry
    Device(DeviceArgs),
    /// Slot registry
    Slot(SlotArgs),
    /// Groups and their members
    Group(GroupArgs),
    /// Checklist assignment and views
    Checklist(ChecklistArgs),
    /// Custom subjects and subject overrides
    Subject(SubjectArgs),
    /// Subject approval statuses
    Status(StatusArgs),
    /// Change history of a target or checklist
    History(HistoryArgs),
}

#[derive(Debug, serde::Serialize)]
struct ErrorOutput {
    error: String,
    kind: &'static str,
    status: u16,
}

/// Print the error and exit with a non-zero code.
///
/// Domain errors keep their kind and transport status in JSON mode.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let (kind, status, code) = match err.downcast_ref::<DomainError>() {
        Some(domain) => (domain.kind().as_str(), domain.status_code(), 2),
        None => ("internal", 500, 1),
    };

    if json_mode {
        let out = ErrorOutput {
            error: err.to_string(),
            kind,
            status,
        };
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
    } else {
        eprintln!("{} {err:#}", console::style("error:").red().bold());
    }
    std::process::exit(code)
}
