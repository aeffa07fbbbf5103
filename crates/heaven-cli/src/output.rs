//! Human-readable rendering of a run report

use colored::Colorize;
use heaven_core::{Mode, PackageReport, RunReport};

pub fn print_report(report: &RunReport) {
    let verb = match report.mode {
        Mode::Hide => "Hiding",
        Mode::Reset => "Resetting",
    };
    let suffix = if report.dry_run { " (dry run)" } else { "" };
    println!(
        "{} {} {} package(s){}",
        "=>".blue().bold(),
        verb,
        report.packages.len(),
        suffix
    );

    for package in &report.packages {
        print_package(package, report.dry_run);
    }

    let failed = report.failures().count();
    println!();
    if failed == 0 {
        println!(
            "{} {} package(s) processed, {} warning(s).",
            "OK".green().bold(),
            report.packages.len(),
            report.warning_count()
        );
    } else {
        println!(
            "{} {} of {} package(s) failed.",
            "FAILED".red().bold(),
            failed,
            report.packages.len()
        );
    }
}

fn print_package(package: &PackageReport, dry_run: bool) {
    println!();
    match &package.failure {
        Some(failure) => {
            println!("{} {}", "ERROR".red().bold(), package.root.cyan());
            println!("   {} {}", "!".red(), failure.message);
        }
        None if package.actions.is_empty() => {
            println!("{} {} {}", "OK".green().bold(), package.root.cyan(), "(up to date)".dimmed());
        }
        None => {
            println!("{} {}", "OK".green().bold(), package.root.cyan());
            let prefix = if dry_run { "[dry-run] would " } else { "" };
            for action in &package.actions {
                println!("   {} {}{}", "+".green(), prefix, action);
            }
        }
    }

    for warning in &package.warnings {
        println!("   {} {}", "WARN".yellow().bold(), warning);
    }
}
