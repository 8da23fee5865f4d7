//! Index command - build the semantic index once and report on it

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use super::ui::{colors, symbols, truncate_path};
use crate::config::Config;
use crate::index::{IndexReport, SemanticIndexer};

pub async fn run(config: Config, base_dir: &Path, path: Option<&str>, force: bool) -> Result<()> {
    let mut indexer = SemanticIndexer::new(base_dir.to_path_buf(), &config.index, config.search.clone());
    let verbose = config.verbose;

    index_with_progress(&mut indexer, path.unwrap_or("."), force, verbose)?;
    print_status(&indexer);
    Ok(())
}

/// Index with a spinner and print the summary box
pub fn index_with_progress(
    indexer: &mut SemanticIndexer,
    path: &str,
    force: bool,
    verbose: bool,
) -> Result<IndexReport> {
    print_header(indexer.base_dir(), path);

    let pb = create_spinner();
    let base = indexer.base_dir().to_path_buf();
    let outcome = indexer.index_codebase_with(path, force, |file| {
        let relative = file.strip_prefix(&base).unwrap_or(file);
        pb.set_message(relative.display().to_string());
        pb.inc(1);
    });
    pb.finish_and_clear();

    let report = match outcome {
        Ok(report) => report,
        Err(failure) => {
            return Err(failure.error)
                .with_context(|| format!("Indexing stopped after {} files", failure.indexed));
        }
    };
    print_summary(&report, verbose);
    Ok(report)
}

/// Create a styled spinner; the walk is lazy so the total is unknown
fn create_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();

    if let Ok(style) = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {prefix:.bold} {pos} files {msg:.dim}")
    {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }

    pb.set_prefix("Embedding");
    pb.enable_steady_tick(std::time::Duration::from_millis(80));

    pb
}

fn print_header(base: &Path, path: &str) {
    println!();
    println!(
        "{}{}╭─ {} Semantic Index ─────────────────────────────────────────────╮{}",
        colors::PRIMARY, colors::BOLD, symbols::SEARCH, colors::RESET
    );
    println!(
        "{}│{}  Base:   {}{}{}",
        colors::PRIMARY, colors::RESET, colors::FG, truncate_path(base, 50), colors::RESET
    );
    println!(
        "{}│{}  Target: {}{}{}",
        colors::PRIMARY, colors::RESET, colors::FG, path, colors::RESET
    );
    println!(
        "{}╰──────────────────────────────────────────────────────────────╯{}",
        colors::PRIMARY, colors::RESET
    );
    println!();
}

fn print_summary(report: &IndexReport, verbose: bool) {
    let (icon, color, title) = if report.skipped.is_empty() {
        (symbols::SUCCESS, colors::SUCCESS, "Indexing Successful")
    } else {
        (symbols::WARNING, colors::WARNING, "Indexing Completed with Warnings")
    };

    println!(
        "{}{}╭─ {} {} ─────────────────────────────────────────╮{}",
        color, colors::BOLD, icon, title, colors::RESET
    );
    println!(
        "{}│{}  {}Files Indexed:{}     {}{:>6}{}",
        color, colors::RESET, colors::MUTED, colors::RESET, colors::FG, report.indexed, colors::RESET
    );
    println!(
        "{}│{}  {}Files Found:{}       {}{:>6}{}",
        color, colors::RESET, colors::MUTED, colors::RESET, colors::FG, report.total_files, colors::RESET
    );
    println!(
        "{}│{}  {}Time Elapsed:{}      {}{:.2}s{}",
        color, colors::RESET, colors::MUTED, colors::RESET,
        colors::FG, report.time_taken_ms as f64 / 1000.0, colors::RESET
    );

    if !report.skipped.is_empty() {
        println!(
            "{}│{}  {}Skipped Files: {}{}",
            color, colors::RESET, colors::ERROR, report.skipped.len(), colors::RESET
        );
        if verbose {
            for (path, reason) in &report.skipped {
                println!(
                    "{}│{}    {}{} {}: {}{}",
                    color, colors::RESET, colors::MUTED, symbols::FILE, path.display(), reason, colors::RESET
                );
            }
        }
    }
    if report.limit_reached {
        println!(
            "{}│{}  {}File limit reached, remaining files were not walked{}",
            color, colors::RESET, colors::WARNING, colors::RESET
        );
    }

    println!(
        "{}╰──────────────────────────────────────────────────────────────╯{}",
        color, colors::RESET
    );
    println!();
}

fn print_status(indexer: &SemanticIndexer) {
    let status = indexer.status();
    let updated = status
        .last_updated
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());
    println!(
        "{}  Index holds {} files, last updated {}{}",
        colors::MUTED, status.count, updated, colors::RESET
    );
    println!();
}
