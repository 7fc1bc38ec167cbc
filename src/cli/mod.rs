//! Command-line interface definitions.

pub mod check;
pub mod output;
pub mod run;
pub mod summary;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ratewise - dual-price rate limiting and admission control.
#[derive(Parser, Debug)]
#[command(name = "ratewise")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Raise the log level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a workload through the allocator and admission controller
    Run(RunArgs),

    /// Validate a configuration file
    Check(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value = "ratewise.toml")]
    pub config: PathBuf,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "ratewise.toml")]
    pub config: PathBuf,

    /// Path to the JSON workload scenario
    #[arg(short, long)]
    pub workload: PathBuf,

    /// Write per-period JSON lines to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,
}

impl Cli {
    /// Log level implied by `-v` flags, if any.
    #[must_use]
    pub fn log_level_override(&self) -> Option<&'static str> {
        match self.verbose {
            0 => None,
            1 => Some("debug"),
            _ => Some("trace"),
        }
    }
}
