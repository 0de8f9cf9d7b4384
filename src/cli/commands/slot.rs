//! Slot CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use uuid::Uuid;

use super::checklist::ChecklistSummaryOutput;
use crate::cli::context::CliContext;
use crate::cli::output::{detail, or_dash, output, CommandOutput};
use crate::domain::models::{SafetyLevel, Slot, TargetType};

#[derive(Args, Debug)]
pub struct SlotArgs {
    #[command(subcommand)]
    pub command: SlotCommands,
}

#[derive(Subcommand, Debug)]
pub enum SlotCommands {
    /// Register a slot
    Add {
        /// Slot name
        name: String,
        /// Owning area
        #[arg(short, long)]
        area: String,
        /// Responsible department
        #[arg(short, long)]
        dept: Option<String>,
        /// Safety level (NONE, CONTROL, CONTROL_ESH, CREDITED, CREDITED_ESH, CREDITED_PPS)
        #[arg(short, long, default_value = "NONE", value_parser = parse_safety_level)]
        safety_level: SafetyLevel,
        /// Description
        #[arg(long, default_value = "")]
        desc: String,
    },
    /// Show a slot and its checklist state
    Show {
        /// Slot ID
        id: Uuid,
    },
}

pub(crate) fn parse_safety_level(s: &str) -> Result<SafetyLevel, String> {
    SafetyLevel::from_str(s).ok_or_else(|| format!("unknown safety level '{s}'"))
}

#[derive(Debug, serde::Serialize)]
pub struct SlotOutput {
    pub slot: Slot,
    pub checklist: Option<ChecklistSummaryOutput>,
}

impl CommandOutput for SlotOutput {
    fn to_human(&self) -> String {
        let s = &self.slot;
        detail(
            &format!("Slot {}", s.name),
            &[
                ("ID", s.id.to_string()),
                ("Area", s.area.clone()),
                ("Department", or_dash(s.dept.as_deref())),
                ("Safety level", s.safety_level.as_str().to_string()),
                ("Description", s.desc.clone()),
                ("Group", or_dash(s.group_id)),
                ("Checklist", ChecklistSummaryOutput::line(self.checklist.as_ref())),
            ],
        )
    }
}

pub async fn execute(args: SlotArgs, ctx: &CliContext) -> Result<()> {
    match args.command {
        SlotCommands::Add { name, area, dept, safety_level, desc } => {
            let actor = ctx.actor()?;
            let mut slot = Slot::new(name, area).with_safety_level(safety_level).with_desc(desc);
            if let Some(dept) = dept {
                slot = slot.with_dept(dept);
            }
            let slot = ctx.engine.targets.create_slot(&actor, slot).await?;
            output(&SlotOutput { slot, checklist: None }, ctx.json);
        }

        SlotCommands::Show { id } => {
            let slot = ctx.engine.targets.get_slot(id).await?;
            let checklist = ctx
                .engine
                .checklists
                .get_checklist_for_target(TargetType::Slot, id)
                .await?;
            output(
                &SlotOutput {
                    slot,
                    checklist: checklist.as_ref().map(ChecklistSummaryOutput::from),
                },
                ctx.json,
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_safety_level() {
        assert_eq!(parse_safety_level("credited_pps"), Ok(SafetyLevel::CreditedPps));
        assert!(parse_safety_level("HIGH").is_err());
    }
}
