//! History CLI command.

use anyhow::Result;
use clap::Args;
use comfy_table::Cell;
use uuid::Uuid;

use crate::cli::context::CliContext;
use crate::cli::output::{list_table, output, truncate, CommandOutput};
use crate::domain::models::{HistoryEntry, HistoryTarget};

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Entity kind (device, slot, group, checklist)
    #[arg(value_parser = parse_history_target)]
    pub kind: HistoryTarget,

    /// Entity ID
    pub id: Uuid,

    /// With a checklist, show the status history of this subject instead
    #[arg(short, long)]
    pub subject: Option<String>,
}

fn parse_history_target(s: &str) -> Result<HistoryTarget, String> {
    HistoryTarget::from_str(s).ok_or_else(|| format!("unknown history kind '{s}'"))
}

#[derive(Debug, serde::Serialize)]
pub struct HistoryOutput {
    pub entries: Vec<HistoryEntry>,
    pub total: usize,
}

impl CommandOutput for HistoryOutput {
    fn to_human(&self) -> String {
        if self.entries.is_empty() {
            return "No history found.".to_string();
        }

        let mut table = list_table(&["at", "by", "field", "value"]);
        for entry in &self.entries {
            let at = entry.at.format("%Y-%m-%d %H:%M:%S").to_string();
            for (i, change) in entry.changes.iter().enumerate() {
                let (at, by) = if i == 0 { (at.as_str(), entry.by.as_str()) } else { ("", "") };
                table.add_row(vec![
                    Cell::new(at),
                    Cell::new(by),
                    Cell::new(&change.path),
                    Cell::new(truncate(&change.value.to_string(), 50)),
                ]);
            }
        }
        format!("{} entr{}:\n{table}", self.total, if self.total == 1 { "y" } else { "ies" })
    }
}

pub async fn execute(args: HistoryArgs, ctx: &CliContext) -> Result<()> {
    let checklists = &ctx.engine.checklists;

    let entries = match (&args.kind, &args.subject) {
        (HistoryTarget::Checklist, Some(subject)) => checklists.status_history(args.id, subject).await?,
        (_, Some(_)) => anyhow::bail!("--subject is only valid with checklist history"),
        (kind, None) => checklists.history_for(*kind, args.id).await?,
    };

    output(&HistoryOutput { total: entries.len(), entries }, ctx.json);
    Ok(())
}
