//! Command-line arguments

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::logging::{LogConfig, LogFormat};
use crate::runner::RunnerConfig;

/// Conformance runner and interactive trap shell for proxy objects
#[derive(Debug, Parser)]
#[command(name = "proxy-cli", version, about)]
pub struct Cli {
    /// Log filter in RUST_LOG syntax
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the bundled conformance scenarios
    Run(RunArgs),
    /// List the bundled scenarios
    List,
    /// Interactive shell over a map-backed proxy
    Shell,
}

/// Options for `run`
#[derive(Debug, Args, Default)]
pub struct RunArgs {
    /// Run only the named scenario
    #[arg(long, short)]
    pub scenario: Option<String>,

    /// Stop at the first failed assertion
    #[arg(long)]
    pub fail_fast: bool,

    /// Print the report as JSON instead of progress lines
    #[arg(long)]
    pub json: bool,

    /// Also write the JSON report to this file
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

impl Cli {
    /// Logging settings from the global flags
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            format: self.log_format,
            level: self.log_level.clone(),
        }
    }
}

impl From<&RunArgs> for RunnerConfig {
    fn from(args: &RunArgs) -> Self {
        RunnerConfig {
            scenario: args.scenario.clone(),
            fail_fast: args.fail_fast,
            json: args.json,
            report_path: args.report.clone(),
        }
    }
}
