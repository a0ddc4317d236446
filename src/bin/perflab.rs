//! `perflab`: one invocation runs one scenario to completion and exits.
//! No interactive menu, no daemon.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use perflab::emit::OverwritePolicy;
use perflab::error::LabError;
use perflab::registry;

#[derive(Parser)]
#[command(name = "perflab", version, about = "Linux performance-measurement scenarios")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Runs a scenario to completion, writing `<out>/<scenario>.csv`.
    Run {
        scenario: String,

        #[arg(long, default_value = "data")]
        out: PathBuf,

        /// Overwrite the output file if it already exists.
        #[arg(long)]
        force: bool,
    },
    /// Lists every known scenario name.
    List,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::List => {
            for name in registry::NAMES {
                println!("{name}");
            }
            ExitCode::SUCCESS
        }
        Command::Run { scenario, out, force } => match run_scenario(&scenario, &out, force) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("perflab: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run_scenario(name: &str, out: &PathBuf, force: bool) -> perflab::error::Result<()> {
    let scenario = registry::lookup(name).ok_or_else(|| LabError::UnknownScenario(name.to_string()))?;
    let policy = if force { OverwritePolicy::Overwrite } else { OverwritePolicy::Reject };
    scenario.run(out, policy)
}
