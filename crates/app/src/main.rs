//! Farmhand - Main Entry Point
//!
//! Loads the configuration, installs tracing, wires the reqwest transport
//! and the file token store into the authenticated client, and runs one
//! command.

mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use farmhand_infrastructure::{ClientConfig, init_tracing};

use cli::Cli;
use commands::Console;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ClientConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    init_tracing(&config.log_filter);

    let console = Console::connect(&config)?;
    console.run(cli.command).await
}
