use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Marco Furrer",
    version,
    about = "towerstack - plan and run layered block tower builds with a vacuum-gripping robot arm.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute and print every pick and place pose of a build without moving anything.
    Plan(PlanArgs),
    /// Run a complete build against the simulated cell.
    Build(BuildArgs),
    /// Take a finished tower down into the magazine again, on the simulated cell.
    Reset(ResetArgs),
}

/// Configuration sources shared by all subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to the build configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the number of units to build.
    #[arg(short = 'n', long = "units", value_name = "INT")]
    pub unit_count: Option<usize>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S structure.hover-height=40
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `plan` subcommand.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `build` subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Extra attempts for a failed pick or place, each restarted from home.
    #[arg(short, long, value_name = "INT", default_value_t = 0)]
    pub retries: u32,

    /// Make the pick pose of this ordinal unreachable, to exercise the failure path.
    #[arg(long, value_name = "ORDINAL")]
    pub fail_at_pick: Option<u32>,
}

/// Arguments for the `reset` subcommand.
#[derive(Args, Debug)]
pub struct ResetArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Extra attempts for a failed lift or return, each restarted from home.
    #[arg(short, long, value_name = "INT", default_value_t = 0)]
    pub retries: u32,
}
