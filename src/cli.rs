// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

use crate::types::{Platform, RunId};

/// Command-line arguments for `simrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "simrun",
    version,
    about = "Launch simulation runs, track their progress and collect their artifacts.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Simrun.toml` in the current working directory. A missing
    /// file means "use defaults".
    #[arg(long, value_name = "PATH", default_value = "Simrun.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SIMRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Submit a run and supervise it until its process exits and its
    /// artifacts are collected.
    Run(RunArgs),

    /// List persisted runs.
    List,

    /// Print one persisted run record as JSON.
    Show {
        run_id: RunId,

        /// Include the raw output lines.
        #[arg(long)]
        lines: bool,
    },

    /// Advance the persisted run counter and print the new id.
    NextId,
}

#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    /// Shell command that starts the simulation.
    #[arg(long = "cmd", value_name = "CMD")]
    pub command: String,

    /// Number of simulation steps requested.
    #[arg(long, default_value_t = 0)]
    pub steps: u64,

    /// Where the simulation executes.
    #[arg(long, value_parser = parse_platform, default_value = "local")]
    pub platform: Platform,

    /// Requested number of data points.
    #[arg(long)]
    pub data_points: Option<u64>,

    /// Simulation version tag stored with the run.
    #[arg(long)]
    pub sim_version: Option<String>,

    /// Explicit run id; assigned from the persisted counter when omitted.
    #[arg(long)]
    pub run_id: Option<RunId>,
}

fn parse_platform(s: &str) -> Result<Platform, String> {
    s.parse()
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
