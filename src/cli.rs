//! CLI surface: wrap a command, buzz the phone when it finishes.

use std::process::{ExitCode, ExitStatus};

use clap::Parser;
use tracing::{debug, warn};

use crate::config::Config;
use crate::display::TerminalDisplay;
use crate::error::Error;
use crate::manager::TokenManager;
use crate::store::FileCredentialStore;

/// Exit code when chime itself fails.
const EXIT_CODE_ERROR: u8 = 1;

#[derive(Parser, Debug)]
#[command(name = "chime")]
#[command(about = "Run a command and get a buzz on your phone when it finishes")]
#[command(version)]
pub struct Cli {
    /// Seconds to wait for the phone subscription before giving up
    #[arg(long)]
    pub wait_threshold: Option<u64>,

    /// Suppress status output (errors are still printed)
    #[arg(
        short,
        long,
        env = "CHIME_SILENT",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub silent: bool,

    /// The command to run, followed by its arguments
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Run the CLI to completion, translating failures into the error exit
/// code after printing their display message.
pub async fn run(cli: Cli) -> ExitCode {
    match run_inner(cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("chime: {error}");
            log_error_chain(&error);
            ExitCode::from(EXIT_CODE_ERROR)
        }
    }
}

async fn run_inner(cli: Cli) -> Result<ExitCode, Error> {
    let mut config = Config::from_env()?;
    if let Some(threshold) = cli.wait_threshold {
        config.wait_threshold = threshold;
    }

    let store = FileCredentialStore::open()?;
    let mut manager = TokenManager::new(config, store, TerminalDisplay)?;

    manager.login().await?;

    let status = execute_program(&cli.command).await;

    manager.trigger_notification().await?;
    if !cli.silent {
        eprintln!("chime: notification sent");
    }

    Ok(ExitCode::from(status))
}

/// Spawn the wrapped command with inherited stdio and report its exit
/// code.
///
/// A command that cannot be spawned still counts as finished; the user
/// asked to be buzzed when it is over, and it is over.
async fn execute_program(command: &[String]) -> u8 {
    let Some((program, args)) = command.split_first() else {
        // clap guarantees at least one element.
        return EXIT_CODE_ERROR;
    };

    debug!(program = %program, args = ?args, "spawning wrapped command");

    match tokio::process::Command::new(program).args(args).status().await {
        Ok(status) => {
            debug!(code = ?status.code(), "wrapped command finished");
            exit_code_from_status(status)
        }
        Err(error) => {
            warn!(error = %error, "failed to spawn wrapped command");
            EXIT_CODE_ERROR
        }
    }
}

/// Propagate the child's exit code; a signal death maps to the generic
/// error code.
fn exit_code_from_status(status: ExitStatus) -> u8 {
    match status.code() {
        Some(code) => code.clamp(0, 255) as u8,
        None => EXIT_CODE_ERROR,
    }
}

/// Debug-level dump of the error source chain; never shown by default.
fn log_error_chain(error: &Error) {
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        debug!(cause = %cause, "caused by");
        source = cause.source();
    }
}
