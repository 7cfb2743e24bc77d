//! pdfbind - combine PDF files and folders into a single document.

use anyhow::Context;
use clap::Parser;
use std::process;

use pdfbind::cli::Cli;
use pdfbind::output::OutputFormatter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    pdfbind::logging::init(&cli.log_filter()).context("failed to initialize logging")?;

    if let Err(err) = pdfbind::run(cli).await {
        OutputFormatter::new(false, false).error(&format!("Error: {err}"));
        process::exit(err.exit_code());
    }

    Ok(())
}
