//! proxy-cli
//!
//! Parses arguments, installs logging and dispatches to the runner or the
//! shell.

use std::io;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use proxy_cli::{init_logging, repl, runner, Cli, CliResult, Command, Runner, RunnerConfig};

fn run(cli: &Cli) -> CliResult<bool> {
    match &cli.command {
        Command::Run(args) => {
            let report = Runner::new(RunnerConfig::from(args)).run(&mut io::stdout().lock())?;
            Ok(report.success())
        }
        Command::List => {
            runner::list_scenarios(&mut io::stdout().lock())?;
            Ok(true)
        }
        Command::Shell => {
            repl::run_shell()?;
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_config()) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
