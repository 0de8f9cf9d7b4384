//! runcheck CLI entry point.

use clap::Parser;

use runcheck::cli::commands;
use runcheck::cli::context::CliContext;
use runcheck::cli::{handle_error, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.global.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let global = cli.global;
    let command = match cli.command {
        Commands::Init(args) => return commands::init::execute(args, &global).await,
        command => command,
    };

    let ctx = CliContext::open(&global).await?;
    match command {
        Commands::Init(_) => Ok(()),
        Commands::Device(args) => commands::device::execute(args, &ctx).await,
        Commands::Slot(args) => commands::slot::execute(args, &ctx).await,
        Commands::Group(args) => commands::group::execute(args, &ctx).await,
        Commands::Checklist(args) => commands::checklist::execute(args, &ctx).await,
        Commands::Subject(args) => commands::subject::execute(args, &ctx).await,
        Commands::Status(args) => commands::status::execute(args, &ctx).await,
        Commands::History(args) => commands::history::execute(args, &ctx).await,
    }
}
