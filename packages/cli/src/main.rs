mod cli;
mod commands;
mod confirm;
mod render;

use std::process::ExitCode;

use admin::config::AdminConfig;
use anyhow::Context as _;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use commands::Context;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            render::failure(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AdminConfig::load().context("Failed to load config")?;
    info!(api = %config.api.base_url, backend = ?config.storage.backend, "Configuration loaded");
    let ctx = Context::load(config).await?;

    match cli.command {
        Command::Login { token, username } => commands::login(&ctx, token, username).await,
        Command::Logout => commands::logout(&ctx).await,
        Command::Course { action } => commands::course(&ctx, action).await,
        Command::Badge { action } => {
            if let Some(badge) = commands::entity(&ctx, action).await? {
                commands::after_badge_save(&ctx, &badge).await;
            }
            Ok(())
        }
        Command::Trade { action } => commands::entity(&ctx, action).await.map(drop),
        Command::Assignment { action } => commands::assignment(&ctx, action).await,
        Command::Chapter { action } => commands::chapters(&ctx, action).await,
    }
}
