//! TruScope CLI - tiered claim verification from the command line.

use anyhow::Context;
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use truscope_cli::commands;
use truscope_cli::{Cli, Command, Config, Formatter, Session};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // Load config, falling back to defaults when the file is absent
    let config_path = Config::resolve_path(cli.config.as_deref())?;
    let config = Config::load_from(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    // Determine output format and color setting
    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Config(args) => {
            commands::execute_config(args, &config, &config_path, &formatter)?;
        }
        cmd => {
            let session = Session::open(&config, cli.fixtures.as_deref().map(Path::new), cli.ollama_model.as_deref())
                .await
                .context("Failed to initialize verification pipeline")?;

            let outcome = match cmd {
                Command::Check(args) => commands::execute_check(args, &session, &formatter).await,
                Command::Batch(args) => commands::execute_batch(args, &session, &formatter).await,
                Command::Config(_) => Ok(()),
            };
            session.close().await;
            outcome?;
        }
    }

    Ok(())
}
