//! bookmuse CLI — taste-profile book recommendation tool.
//!
//! Turns a survey answers file into search keywords, queries book-catalog
//! services, filters the results, and prints a recommendation list.

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
