//! Status CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::cli::context::CliContext;
use crate::cli::output::{approval_label, detail, output, CommandOutput};
use crate::services::StatusOutcome;

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(subcommand)]
    pub command: StatusCommands,
}

#[derive(Subcommand, Debug)]
pub enum StatusCommands {
    /// Set the status of a subject on a checklist
    Set {
        /// Checklist ID
        checklist_id: Uuid,
        /// Subject name
        subject: String,
        /// Status value: N, Y or YC (YC requires a comment)
        value: String,
        /// Comment
        #[arg(short = 'm', long, default_value = "")]
        comment: String,
    },
}

#[derive(Debug, serde::Serialize)]
#[serde(transparent)]
pub struct StatusOutput {
    pub outcome: StatusOutcome,
}

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        let status = &self.outcome.status;
        let summary = &self.outcome.summary;
        detail(
            &format!("{} = {}", status.subject_name, status.value.as_str()),
            &[
                ("Checklist", status.checklist_id.to_string()),
                ("Comment", status.comment.clone()),
                ("By", status.input_by.clone()),
                ("On", status.input_on.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
                ("Progress", format!("{}/{}", summary.checked, summary.total)),
                ("State", approval_label(summary.approved)),
            ],
        )
    }
}

pub async fn execute(args: StatusArgs, ctx: &CliContext) -> Result<()> {
    match args.command {
        StatusCommands::Set { checklist_id, subject, value, comment } => {
            let actor = ctx.actor()?;
            let outcome = ctx
                .engine
                .checklists
                .set_status(&actor, checklist_id, &subject, &value, &comment)
                .await?;
            output(&StatusOutput { outcome }, ctx.json);
        }
    }

    Ok(())
}
