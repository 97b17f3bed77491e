//! ## sparhund-cli
//! **Command line front end**
//!
//! `sparhund analyze <capture>` reads an offline capture and prints the
//! security report; `sparhund config` prints the effective configuration.

use clap::Parser;

mod commands;

use commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    commands::run_command(cli).await
}
