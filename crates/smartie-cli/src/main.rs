//! CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use smartie_cli::{Cli, bootstrap, repl};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let session = bootstrap(&cli)?;
    repl::run(session).await
}
