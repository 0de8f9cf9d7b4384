//! Checklist CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use comfy_table::Cell;
use uuid::Uuid;

use crate::cli::context::CliContext;
use crate::cli::output::{approval_label, detail, list_table, output, status_cell, truncate, CommandOutput};
use crate::domain::models::{ChecklistView, TargetType};

#[derive(Args, Debug)]
pub struct ChecklistArgs {
    #[command(subcommand)]
    pub command: ChecklistCommands,
}

#[derive(Subcommand, Debug)]
pub enum ChecklistCommands {
    /// Assign a checklist to a device, slot or group
    Create {
        /// Target kind (device, slot, group)
        #[arg(value_parser = parse_target_type)]
        target_type: TargetType,
        /// Target ID
        target_id: Uuid,
    },
    /// Show a checklist with its subjects and statuses
    Show {
        /// Checklist ID
        id: Uuid,
    },
    /// Show the checklist governing a target, following group membership
    Target {
        /// Target kind (device, slot, group)
        #[arg(value_parser = parse_target_type)]
        target_type: TargetType,
        /// Target ID
        target_id: Uuid,
    },
}

pub(crate) fn parse_target_type(s: &str) -> Result<TargetType, String> {
    TargetType::from_str(s).ok_or_else(|| format!("unknown target type '{s}' (device, slot, group)"))
}

#[derive(Debug, serde::Serialize)]
#[serde(transparent)]
pub struct ChecklistOutput {
    pub view: ChecklistView,
}

impl CommandOutput for ChecklistOutput {
    fn to_human(&self) -> String {
        let view = &self.view;
        let mut text = detail(
            &format!("Checklist {}", view.id),
            &[
                ("Type", view.checklist_type.as_str().to_string()),
                ("Target", format!("{} {}", view.target_type.as_str().to_lowercase(), view.target_id)),
                ("Progress", format!("{}/{}", view.checked, view.total)),
                ("State", approval_label(view.approved)),
            ],
        );

        let mut table = list_table(&["name", "subject", "req", "assignees", "status", "by", "comment"]);
        for subject in &view.subjects {
            let status = view.status_for(&subject.name);
            let value = status.map_or("-", |s| s.value.as_str());
            let name = if subject.is_final {
                format!("{}*", subject.name)
            } else {
                subject.name.clone()
            };
            table.add_row(vec![
                Cell::new(name),
                Cell::new(truncate(&subject.desc, 40)),
                Cell::new(if subject.is_required() { "yes" } else { "no" }),
                Cell::new(subject.assignees.join(", ")),
                status_cell(value),
                Cell::new(status.map_or("", |s| s.input_by.as_str())),
                Cell::new(truncate(status.map_or("", |s| s.comment.as_str()), 30)),
            ]);
        }

        text.push_str("\n\n");
        text.push_str(&table.to_string());
        text
    }
}

/// Checklist state shown alongside a target.
#[derive(Debug, serde::Serialize)]
pub struct ChecklistSummaryOutput {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub checklist_type: String,
    pub approved: bool,
    pub checked: usize,
    pub total: usize,
}

impl From<&ChecklistView> for ChecklistSummaryOutput {
    fn from(view: &ChecklistView) -> Self {
        Self {
            id: view.id,
            checklist_type: view.checklist_type.as_str().to_string(),
            approved: view.approved,
            checked: view.checked,
            total: view.total,
        }
    }
}

impl ChecklistSummaryOutput {
    pub fn line(summary: Option<&Self>) -> String {
        match summary {
            Some(s) => format!("{} {}/{} {}", s.id, s.checked, s.total, approval_label(s.approved)),
            None => "-".to_string(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct NoChecklistOutput {
    pub target_type: String,
    pub target_id: Uuid,
    pub checklist: Option<ChecklistView>,
}

impl CommandOutput for NoChecklistOutput {
    fn to_human(&self) -> String {
        format!("No checklist assigned to {} {}", self.target_type, self.target_id)
    }
}

pub async fn execute(args: ChecklistArgs, ctx: &CliContext) -> Result<()> {
    let checklists = &ctx.engine.checklists;

    match args.command {
        ChecklistCommands::Create { target_type, target_id } => {
            let actor = ctx.actor()?;
            let view = checklists.create_checklist(&actor, target_type, target_id).await?;
            output(&ChecklistOutput { view }, ctx.json);
        }

        ChecklistCommands::Show { id } => {
            let view = checklists.get_checklist(id).await?;
            output(&ChecklistOutput { view }, ctx.json);
        }

        ChecklistCommands::Target { target_type, target_id } => {
            match checklists.get_checklist_for_target(target_type, target_id).await? {
                Some(view) => output(&ChecklistOutput { view }, ctx.json),
                None => output(
                    &NoChecklistOutput {
                        target_type: target_type.as_str().to_lowercase(),
                        target_id,
                        checklist: None,
                    },
                    ctx.json,
                ),
            }
        }
    }

    Ok(())
}
