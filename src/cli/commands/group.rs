//! Group CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use comfy_table::Cell;
use uuid::Uuid;

use super::checklist::{parse_target_type, ChecklistSummaryOutput};
use super::slot::parse_safety_level;
use crate::cli::context::CliContext;
use crate::cli::output::{detail, list_table, output, CommandOutput};
use crate::domain::models::{Group, SafetyLevel, Target, TargetType};

#[derive(Args, Debug)]
pub struct GroupArgs {
    #[command(subcommand)]
    pub command: GroupCommands,
}

#[derive(Subcommand, Debug)]
pub enum GroupCommands {
    /// Create a group of slots or devices
    Add {
        /// Group name
        name: String,
        /// Owning unit (area or department)
        #[arg(short, long)]
        owner: String,
        /// Kind of member (slot or device)
        #[arg(short, long, value_parser = parse_target_type)]
        member_type: TargetType,
        /// Safety level for slot groups
        #[arg(short, long, default_value = "NONE", value_parser = parse_safety_level)]
        safety_level: SafetyLevel,
        /// Description
        #[arg(long, default_value = "")]
        desc: String,
    },
    /// Show a group, its members and its checklist state
    Show {
        /// Group ID
        id: Uuid,
    },
    /// Add a slot or device to a group
    AddMember {
        /// Group ID
        group_id: Uuid,
        /// Member ID
        member_id: Uuid,
    },
    /// Remove a slot or device from a group
    RemoveMember {
        /// Group ID
        group_id: Uuid,
        /// Member ID
        member_id: Uuid,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct MemberOutput {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub target_type: TargetType,
    pub group_id: Option<Uuid>,
}

impl From<&Target> for MemberOutput {
    fn from(target: &Target) -> Self {
        Self {
            id: target.id(),
            name: target.name().to_string(),
            target_type: target.target_type(),
            group_id: target.group_id(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct GroupOutput {
    pub group: Group,
    pub members: Vec<MemberOutput>,
    pub checklist: Option<ChecklistSummaryOutput>,
}

impl CommandOutput for GroupOutput {
    fn to_human(&self) -> String {
        let g = &self.group;
        let mut text = detail(
            &format!("Group {}", g.name),
            &[
                ("ID", g.id.to_string()),
                ("Owner", g.owner.clone()),
                ("Members", format!("{} ({})", self.members.len(), g.member_type.as_str().to_lowercase())),
                ("Safety level", g.safety_level.as_str().to_string()),
                ("Description", g.desc.clone()),
                ("Checklist", ChecklistSummaryOutput::line(self.checklist.as_ref())),
            ],
        );

        if !self.members.is_empty() {
            let mut table = list_table(&["id", "name"]);
            for member in &self.members {
                table.add_row(vec![Cell::new(member.id), Cell::new(&member.name)]);
            }
            text.push_str("\n\n");
            text.push_str(&table.to_string());
        }
        text
    }
}

#[derive(Debug, serde::Serialize)]
pub struct MembershipOutput {
    pub message: String,
    pub member: MemberOutput,
}

impl CommandOutput for MembershipOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }
}

pub async fn execute(args: GroupArgs, ctx: &CliContext) -> Result<()> {
    let engine = &ctx.engine;

    match args.command {
        GroupCommands::Add { name, owner, member_type, safety_level, desc } => {
            let actor = ctx.actor()?;
            let group = Group::new(name, owner, member_type)
                .with_safety_level(safety_level)
                .with_desc(desc);
            let group = engine.targets.create_group(&actor, group).await?;
            output(&GroupOutput { group, members: vec![], checklist: None }, ctx.json);
        }

        GroupCommands::Show { id } => {
            let group = engine.targets.get_group(id).await?;
            let members = engine.groups.list_members(id).await?;
            let checklist = engine.checklists.get_checklist_for_target(TargetType::Group, id).await?;
            output(
                &GroupOutput {
                    group,
                    members: members.iter().map(MemberOutput::from).collect(),
                    checklist: checklist.as_ref().map(ChecklistSummaryOutput::from),
                },
                ctx.json,
            );
        }

        GroupCommands::AddMember { group_id, member_id } => {
            let actor = ctx.actor()?;
            let member = engine.groups.add_member(&actor, group_id, member_id).await?;
            let out = MembershipOutput {
                message: format!("{} {} is a member of group {group_id}", member.target_type(), member.name()),
                member: MemberOutput::from(&member),
            };
            output(&out, ctx.json);
        }

        GroupCommands::RemoveMember { group_id, member_id } => {
            let actor = ctx.actor()?;
            let member = engine.groups.remove_member(&actor, group_id, member_id).await?;
            let out = MembershipOutput {
                message: format!("{} {} removed from group {group_id}", member.target_type(), member.name()),
                member: MemberOutput::from(&member),
            };
            output(&out, ctx.json);
        }
    }

    Ok(())
}
