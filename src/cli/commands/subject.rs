//! Subject CLI commands: custom subjects and per-checklist overrides.

use anyhow::Result;
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::cli::context::CliContext;
use crate::cli::output::{detail, output, CommandOutput};
use crate::domain::models::{ChecklistSubject, SubjectUpdate};

#[derive(Args, Debug)]
pub struct SubjectArgs {
    #[command(subcommand)]
    pub command: SubjectCommands,
}

#[derive(Subcommand, Debug)]
pub enum SubjectCommands {
    /// Add a custom subject to one checklist
    Add {
        /// Checklist ID
        checklist_id: Uuid,
        /// Subject description
        #[arg(short, long)]
        desc: String,
        /// Role allowed to set the status (repeatable)
        #[arg(short, long = "assignee", required = true)]
        assignees: Vec<String>,
    },
    /// Change a subject for one checklist
    Update {
        /// Checklist ID
        checklist_id: Uuid,
        /// Subject name
        name: String,
        /// New description
        #[arg(short, long)]
        desc: Option<String>,
        /// Whether the subject counts towards approval
        #[arg(long)]
        required: Option<bool>,
        /// Replacement assignee roles (repeatable)
        #[arg(short, long = "assignee")]
        assignees: Vec<String>,
    },
    /// Remove a custom subject from a checklist
    Remove {
        /// Checklist ID
        checklist_id: Uuid,
        /// Subject name
        name: String,
    },
}

#[derive(Debug, serde::Serialize)]
#[serde(transparent)]
pub struct SubjectOutput {
    pub subject: ChecklistSubject,
}

impl CommandOutput for SubjectOutput {
    fn to_human(&self) -> String {
        let s = &self.subject;
        let scope = match s.checklist_id {
            Some(id) => format!("custom on {id}"),
            None => format!("default for {}", s.checklist_type.as_str()),
        };
        detail(
            &format!("Subject {}", s.name),
            &[
                ("Description", s.desc.clone()),
                ("Scope", scope),
                ("Required", s.is_required().to_string()),
                ("Mandatory", s.mandatory.to_string()),
                ("Final", s.is_final.to_string()),
                ("Assignees", s.assignees.join(", ")),
            ],
        )
    }
}

#[derive(Debug, serde::Serialize)]
pub struct SubjectRemovedOutput {
    pub checklist_id: Uuid,
    pub name: String,
    pub removed: bool,
}

impl CommandOutput for SubjectRemovedOutput {
    fn to_human(&self) -> String {
        format!("Subject {} removed from checklist {}", self.name, self.checklist_id)
    }
}

pub async fn execute(args: SubjectArgs, ctx: &CliContext) -> Result<()> {
    let checklists = &ctx.engine.checklists;
    let actor = ctx.actor()?;

    match args.command {
        SubjectCommands::Add { checklist_id, desc, assignees } => {
            let subject = checklists
                .create_custom_subject(&actor, checklist_id, &desc, &assignees)
                .await?;
            output(&SubjectOutput { subject }, ctx.json);
        }

        SubjectCommands::Update { checklist_id, name, desc, required, assignees } => {
            let update = SubjectUpdate {
                desc,
                required,
                assignees: (!assignees.is_empty()).then_some(assignees),
            };
            let subject = checklists.update_subject(&actor, checklist_id, &name, &update).await?;
            output(&SubjectOutput { subject }, ctx.json);
        }

        SubjectCommands::Remove { checklist_id, name } => {
            checklists.remove_custom_subject(&actor, checklist_id, &name).await?;
            output(&SubjectRemovedOutput { checklist_id, name, removed: true }, ctx.json);
        }
    }

    Ok(())
}
