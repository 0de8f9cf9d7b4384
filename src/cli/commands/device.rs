//! Device CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use uuid::Uuid;

use super::checklist::ChecklistSummaryOutput;
use crate::cli::context::CliContext;
use crate::cli::output::{detail, or_dash, output, CommandOutput};
use crate::domain::models::{Device, TargetType};

#[derive(Args, Debug)]
pub struct DeviceArgs {
    #[command(subcommand)]
    pub command: DeviceCommands,
}

#[derive(Subcommand, Debug)]
pub enum DeviceCommands {
    /// Register a device
    Add {
        /// Device name
        name: String,
        /// Device type, e.g. magnet
        #[arg(short = 't', long = "type")]
        device_type: String,
        /// Owning department
        #[arg(short, long)]
        dept: String,
        /// Description
        #[arg(long, default_value = "")]
        desc: String,
    },
    /// Show a device and its checklist state
    Show {
        /// Device ID
        id: Uuid,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct DeviceOutput {
    pub device: Device,
    pub checklist: Option<ChecklistSummaryOutput>,
}

impl CommandOutput for DeviceOutput {
    fn to_human(&self) -> String {
        let d = &self.device;
        detail(
            &format!("Device {}", d.name),
            &[
                ("ID", d.id.to_string()),
                ("Type", d.device_type.clone()),
                ("Department", d.dept.clone()),
                ("Description", d.desc.clone()),
                ("Group", or_dash(d.group_id)),
                ("Checklist", ChecklistSummaryOutput::line(self.checklist.as_ref())),
            ],
        )
    }
}

pub async fn execute(args: DeviceArgs, ctx: &CliContext) -> Result<()> {
    match args.command {
        DeviceCommands::Add { name, device_type, dept, desc } => {
            let actor = ctx.actor()?;
            let device = Device::new(name, device_type, dept).with_desc(desc);
            let device = ctx.engine.targets.create_device(&actor, device).await?;
            output(&DeviceOutput { device, checklist: None }, ctx.json);
        }

        DeviceCommands::Show { id } => {
            let device = ctx.engine.targets.get_device(id).await?;
            let checklist = ctx
                .engine
                .checklists
                .get_checklist_for_target(TargetType::Device, id)
                .await?;
            output(
                &DeviceOutput {
                    device,
                    checklist: checklist.as_ref().map(ChecklistSummaryOutput::from),
                },
                ctx.json,
            );
        }
    }

    Ok(())
}
