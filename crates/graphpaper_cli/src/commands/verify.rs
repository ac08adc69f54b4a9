//! File verification command.

use super::{explain, open_existing};
use anyhow::Result;
use console::style;
use graphpaper_core::{verify, VerifyConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Verify file integrity.
pub fn run(path: &Path, objects_only: bool) -> Result<()> {
    let file = open_existing(path)?;

    let config = VerifyConfig {
        check_objects: true,
        check_commits: !objects_only,
    };
    let check_commits = config.check_commits;

    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message("Verifying objects...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let report = verify(file.store(), file.head(), config).map_err(explain);
    spinner.finish_and_clear();
    let report = report?;

    println!();
    println!("{}", style("Verification Report:").bold());

    println!(
        "  Objects checked:    {}",
        style(report.objects_checked).cyan()
    );
    if !report.objects_corrupted.is_empty() {
        println!(
            "  Corrupted objects:  {}",
            style(report.objects_corrupted.len()).red()
        );
        for id in &report.objects_corrupted {
            println!("    {} {}", style("×").red(), id.as_hex());
        }
    }
    if !report.objects_noncanonical.is_empty() {
        println!(
            "  Non-canonical:      {}",
            style(report.objects_noncanonical.len()).yellow()
        );
        for id in &report.objects_noncanonical {
            println!("    {} {}", style("⚠").yellow(), id.as_hex());
        }
    }

    if check_commits {
        println!(
            "  Commits checked:    {}",
            style(report.commits_checked).cyan()
        );
        if !report.commits_invalid.is_empty() {
            println!(
                "  Invalid commits:    {}",
                style(report.commits_invalid.len()).red()
            );
            for (id, reason) in &report.commits_invalid {
                println!("    {} {}: {}", style("×").red(), id.short(), reason);
            }
        }
        println!(
            "  Unreachable:        {}",
            style(report.unreachable.len()).dim()
        );
    }

    println!();
    if report.has_issues() {
        println!("{}", style(&report.summary()).yellow().bold());
    } else {
        println!(
            "{} {}",
            style("✓").green(),
            style(&report.summary()).green()
        );
    }

    if !report.commits_invalid.is_empty() {
        println!();
        println!("{}", style("Recommendations:").bold());
        println!(
            "  {} Invalid commits may require restoring the file from a backup",
            style("→").cyan()
        );
    }

    Ok(())
}
