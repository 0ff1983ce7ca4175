//! bugzilla - query Bugzilla servers from the command line

use anyhow::Context;
use bugzilla_cli::{cli, logging, Cli, ConfigLoader, Session};
use clap::Parser;
use colored::Colorize;
use std::io::Write;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ConfigLoader::new()
        .with_explicit(cli.global.config.clone())
        .load()
        .context("Failed to load configuration")?;

    logging::init(cli.global.debug, &config.logging.level);

    let session = Session::connect(&cli.global, &cli.command, &config)?;
    let output = cli::run(&cli.command, &session)?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .and_then(|_| stdout.flush())
        .context("Failed to write output")?;
    Ok(())
}
