//! proxy-cli library
//!
//! Conformance scenarios, the scenario runner and the interactive trap
//! shell for `proxy_runtime`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod fixtures;
pub mod logging;
pub mod repl;
pub mod runner;
pub mod scenarios;

pub use cli::{Cli, Command, RunArgs};
pub use error::{CliError, CliResult};
pub use logging::{init_logging, LogConfig, LogFormat};
pub use repl::{Shell, ShellOutcome};
pub use runner::{RunReport, Runner, RunnerConfig};
