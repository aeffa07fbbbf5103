//! hidden-heaven CLI
//!
//! Hides package clutter behind a link folder and VS Code `files.exclude`.

mod cli;
mod error;
mod logging;
mod output;

use clap::Parser;
use colored::Colorize;
use heaven_core::Engine;

use cli::Cli;
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let cwd = std::env::current_dir()?;
    let options = cli.run_options(&cwd);
    let packages = cli.package_roots(&cwd);
    tracing::debug!(?options, packages = packages.len(), "starting run");

    let report = Engine::new(options).run(&packages);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_report(&report);
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::PackagesFailed {
            failed: report.failures().count(),
            total: report.packages.len(),
        })
    }
}
