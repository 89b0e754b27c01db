// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn output_flag_is_global() {
    let cli = Cli::try_parse_from(["ci", "list", "-o", "json"]).unwrap();
    assert_eq!(cli.output, OutputFormat::Json);
    assert!(matches!(cli.command, Commands::List));
}

#[test]
fn add_takes_three_positionals() {
    let cli = Cli::try_parse_from(["ci", "add", "mrepo", "git@host:mrepo.git", "master"]).unwrap();
    match cli.command {
        Commands::Add { name, remote, branch } => {
            assert_eq!((name.as_str(), remote.as_str(), branch.as_str()), ("mrepo", "git@host:mrepo.git", "master"));
        }
        _ => panic!("expected add"),
    }
    assert!(Cli::try_parse_from(["ci", "add", "mrepo"]).is_err());
}

#[test]
fn log_tail_flag() {
    let cli = Cli::try_parse_from(["ci", "log", "mrepo", "--tail"]).unwrap();
    assert!(matches!(cli.command, Commands::Log { tail: true, .. }));
}

#[test]
fn daemon_subcommand_parses() {
    let cli = Cli::try_parse_from(["ci", "daemon", "status"]).unwrap();
    assert!(matches!(cli.command, Commands::Daemon(_)));
}
