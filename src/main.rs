use std::process::ExitCode;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use chime::cli::{self, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    // Pick up CHIME_* overrides from a local .env during development.
    dotenvy::dotenv().ok();

    // Logs go to stderr so the wrapped command owns stdout.
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .init();

    let cli = Cli::parse();
    cli::run(cli).await
}
