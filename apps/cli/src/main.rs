//! BidIQ CLI: RFP analysis for equipment-rental bids.
//!
//! Reads the plain text of a Request for Proposal and prints a structured
//! analysis, the required items it found, and clarification questions.

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
