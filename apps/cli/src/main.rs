//! Brain Guide CLI, the document-production pipeline for medical guide articles.
//!
//! Concatenates authored section files into per-drug, per-language guide
//! documents, rewrites internal wiki links into public URLs, and drives
//! pandoc for the final render.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
