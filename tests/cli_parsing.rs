use clap::Parser;
use runcheck::cli::commands::checklist::ChecklistCommands;
use runcheck::cli::commands::status::StatusCommands;
use runcheck::cli::commands::subject::SubjectCommands;
use runcheck::cli::{Cli, Commands};
use runcheck::domain::models::{HistoryTarget, TargetType};
use uuid::Uuid;

const ID: &str = "6f1f8f0e-6c52-4f43-9d47-3f3a3b8a9c10";

#[test]
fn test_global_identity_flags() {
    let cli = Cli::try_parse_from([
        "runcheck", "--json", "--user", "amy", "--role", "GRP:EE#LEADER", "-r", "GRP:ME#LEADER",
        "checklist", "show", ID,
    ])
    .unwrap();

    assert!(cli.global.json);
    assert_eq!(cli.global.user.as_deref(), Some("amy"));
    assert_eq!(cli.global.roles, vec!["GRP:EE#LEADER", "GRP:ME#LEADER"]);
    match cli.command {
        Commands::Checklist(args) => match args.command {
            ChecklistCommands::Show { id } => assert_eq!(id, Uuid::parse_str(ID).unwrap()),
            other => panic!("unexpected command {other:?}"),
        },
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["runcheck", "status", "set", ID, "EE", "YC", "-m", "ok", "--user", "amy"]).unwrap();

    assert_eq!(cli.global.user.as_deref(), Some("amy"));
    match cli.command {
        Commands::Status(args) => {
            let StatusCommands::Set { subject, value, comment, .. } = args.command;
            assert_eq!((subject.as_str(), value.as_str(), comment.as_str()), ("EE", "YC", "ok"));
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_target_type_parsed_case_insensitively() {
    let cli = Cli::try_parse_from(["runcheck", "checklist", "create", "Slot", ID]).unwrap();
    match cli.command {
        Commands::Checklist(args) => match args.command {
            ChecklistCommands::Create { target_type, .. } => assert_eq!(target_type, TargetType::Slot),
            other => panic!("unexpected command {other:?}"),
        },
        other => panic!("unexpected command {other:?}"),
    }

    assert!(Cli::try_parse_from(["runcheck", "checklist", "create", "rack", ID]).is_err());
    assert!(Cli::try_parse_from(["runcheck", "checklist", "create", "slot", "not-a-uuid"]).is_err());
}

#[test]
fn test_subject_update_optional_fields() {
    let cli = Cli::try_parse_from(["runcheck", "subject", "update", ID, "EE", "--required", "false"]).unwrap();
    match cli.command {
        Commands::Subject(args) => match args.command {
            SubjectCommands::Update { name, desc, required, assignees, .. } => {
                assert_eq!(name, "EE");
                assert_eq!(desc, None);
                assert_eq!(required, Some(false));
                assert!(assignees.is_empty());
            }
            other => panic!("unexpected command {other:?}"),
        },
        other => panic!("unexpected command {other:?}"),
    }

    // A custom subject needs at least one assignee
    assert!(Cli::try_parse_from(["runcheck", "subject", "add", ID, "--desc", "Leak check"]).is_err());
}

#[test]
fn test_history_kind() {
    let cli = Cli::try_parse_from(["runcheck", "history", "checklist", ID, "--subject", "AM"]).unwrap();
    match cli.command {
        Commands::History(args) => {
            assert_eq!(args.kind, HistoryTarget::Checklist);
            assert_eq!(args.subject.as_deref(), Some("AM"));
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_cli_definition_is_consistent() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}
