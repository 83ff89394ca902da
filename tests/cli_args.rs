// tests/cli_args.rs

use clap::Parser;

use simrun::cli::{CliArgs, Command};
use simrun::types::Platform;

#[test]
fn run_subcommand_parses_parameters() {
    let args = CliArgs::try_parse_from([
        "simrun",
        "--config",
        "conf/Simrun.toml",
        "run",
        "--cmd",
        "python sim.py",
        "--steps",
        "500",
        "--platform",
        "spell",
        "--data-points",
        "20",
    ])
    .unwrap();

    assert_eq!(args.config, "conf/Simrun.toml");
    match args.command {
        Command::Run(run) => {
            assert_eq!(run.command, "python sim.py");
            assert_eq!(run.steps, 500);
            assert_eq!(run.platform, Platform::Remote);
            assert_eq!(run.data_points, Some(20));
            assert_eq!(run.run_id, None);
        }
        other => panic!("expected run subcommand, got {other:?}"),
    }
}

#[test]
fn platform_defaults_to_local() {
    let args = CliArgs::try_parse_from(["simrun", "run", "--cmd", "true"]).unwrap();
    match args.command {
        Command::Run(run) => assert_eq!(run.platform, Platform::Local),
        other => panic!("expected run subcommand, got {other:?}"),
    }
}

#[test]
fn unknown_platform_is_rejected() {
    assert!(CliArgs::try_parse_from(["simrun", "run", "--cmd", "true", "--platform", "cloud"]).is_err());
}

#[test]
fn show_takes_a_run_id() {
    let args = CliArgs::try_parse_from(["simrun", "show", "3", "--lines"]).unwrap();
    assert!(matches!(
        args.command,
        Command::Show {
            run_id: 3,
            lines: true
        }
    ));
}
