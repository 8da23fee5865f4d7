//! Search command - index a directory and query it by meaning

use anyhow::Result;
use std::path::Path;

use super::index::index_with_progress;
use super::ui::{colors, print_warning, symbols};
use crate::config::Config;
use crate::core::language::Language;
use crate::core::SearchError;
use crate::index::search::Relevance;
use crate::index::{SearchMatch, SemanticIndexer};

pub async fn run(
    config: Config,
    base_dir: &Path,
    query: &str,
    path: Option<&str>,
    limit: Option<i64>,
    threshold: Option<f32>,
) -> Result<()> {
    let verbose = config.verbose;
    let mut indexer = SemanticIndexer::new(base_dir.to_path_buf(), &config.index, config.search);

    index_with_progress(&mut indexer, path.unwrap_or("."), false, verbose)?;

    print_query(query);

    match indexer.semantic_search(query, limit, threshold) {
        Ok(matches) if matches.is_empty() => print_no_results(query),
        Ok(matches) => print_results(&matches, query, base_dir),
        Err(SearchError::NotIndexed) => print_warning("No supported files found to search"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

fn print_query(query: &str) {
    println!(
        "{}{}  {} Semantic Search{}",
        colors::PRIMARY, colors::BOLD, symbols::SEARCH, colors::RESET
    );
    println!(
        "{}  │ Query: {}\"{}\"{}",
        colors::MUTED, colors::HIGHLIGHT, query, colors::RESET
    );
    println!(
        "{}  ╰{}─{}",
        colors::MUTED, "─".repeat(50), colors::RESET
    );
    println!();
}

fn print_results(matches: &[SearchMatch], query: &str, base_dir: &Path) {
    println!(
        "{}{}  {} Found {} results for \"{}\"{}",
        colors::SUCCESS, colors::BOLD, symbols::SUCCESS, matches.len(), query, colors::RESET
    );
    println!();

    for (i, m) in matches.iter().enumerate() {
        let relevance_color = match m.relevance {
            Relevance::High => colors::SUCCESS,
            Relevance::Medium => colors::WARNING,
            Relevance::Low => colors::MUTED,
        };
        let relative = m.path.strip_prefix(base_dir).unwrap_or(&m.path);

        println!(
            "{}  {}. {} {}{}{} ({}) {:.3} [{}{}{}]",
            colors::MUTED,
            i + 1,
            symbols::FILE,
            colors::FG,
            relative.display(),
            colors::MUTED,
            Language::from_path(&m.path),
            m.similarity,
            relevance_color,
            m.relevance.as_str(),
            colors::RESET
        );

        for line in &m.context.lines {
            let text: String = line.text.trim().chars().take(100).collect();
            println!(
                "{}      {:>5} │ {}{}",
                colors::MUTED, line.line_number, text, colors::RESET
            );
        }

        let summary = &m.context.summary;
        println!(
            "{}      {} lines, {} declarations, {} comments{}",
            colors::MUTED, summary.lines, summary.functions, summary.comments, colors::RESET
        );
        println!();
    }
}

fn print_no_results(query: &str) {
    println!(
        "{}  {} No results found for \"{}\"{}",
        colors::WARNING, symbols::SEARCH, query, colors::RESET
    );
    println!();
    println!(
        "{}  Try:{}",
        colors::MUTED, colors::RESET
    );
    println!(
        "{}  • Using different keywords{}",
        colors::MUTED, colors::RESET
    );
    println!(
        "{}  • Lowering the similarity threshold (--threshold 0.1){}",
        colors::MUTED, colors::RESET
    );
    println!();
}
