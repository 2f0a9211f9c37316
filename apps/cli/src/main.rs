//! orderbridge CLI: ERP order transformation and CRM merge.
//!
//! Runs either pipeline stage against a configured blob store and prints
//! the stage response.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
