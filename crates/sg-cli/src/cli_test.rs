use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn test_global_defaults() {
    let cli = Cli::try_parse_from(["sg", "recover"]).unwrap();

    assert!(!cli.global.verbose);
    assert_eq!(cli.global.project_dir, ".");
    assert!(cli.global.config.is_none());
    assert!(matches!(cli.command, Commands::Recover));
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["sg", "status", "--json", "-v", "-p", "proj", "-c", "alt.yml"])
        .unwrap();

    assert!(cli.global.verbose);
    assert_eq!(cli.global.project_dir, "proj");
    assert_eq!(cli.global.config.as_deref(), Some("alt.yml"));
    match cli.command {
        Commands::Status(args) => assert!(args.json),
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_up_target_is_optional() {
    let cli = Cli::try_parse_from(["sg", "up"]).unwrap();
    match cli.command {
        Commands::Up(args) => assert_eq!(args.target, None),
        other => panic!("unexpected command: {:?}", other),
    }

    let cli = Cli::try_parse_from(["sg", "up", "--target", "42"]).unwrap();
    match cli.command {
        Commands::Up(args) => assert_eq!(args.target, Some(42)),
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_prune_requires_target() {
    assert!(Cli::try_parse_from(["sg", "prune"]).is_err());

    let cli = Cli::try_parse_from(["sg", "prune", "-t", "3"]).unwrap();
    match cli.command {
        Commands::Prune(args) => assert_eq!(args.target, 3),
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_negative_target_rejected() {
    assert!(Cli::try_parse_from(["sg", "sync", "--target", "-1"]).is_err());
}
