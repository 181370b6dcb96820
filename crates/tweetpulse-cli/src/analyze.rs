//! `analyze` command: one pipeline run printed to stdout.

use std::fmt::Write as _;

use tweetpulse_core::AppConfig;
use tweetpulse_sentiment::{analyze_term, Classifier, SearchClient, SearchQuery, SentimentReport};

/// Runs the pipeline for `term` and prints a table or JSON.
///
/// `pages` and `page_size` override the configured values; the item budget
/// is their product.
///
/// # Errors
///
/// Returns an error if the overrides are invalid, a client cannot be built,
/// or the search or classification fails.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    term: &str,
    pages: Option<u32>,
    page_size: Option<u8>,
    json: bool,
) -> anyhow::Result<()> {
    let page_count = pages.unwrap_or(config.search_page_count);
    if page_count == 0 {
        anyhow::bail!("--pages must be at least 1");
    }
    let page_size = page_size.unwrap_or(config.search_page_size);
    let budget = item_budget(page_size, page_count)?;

    let query = SearchQuery::new(term, config.search_exclusions.clone(), page_size, budget)?;
    let search = SearchClient::from_app_config(config)?;
    let classifier = Classifier::from_app_config(config)?;

    tracing::info!(
        term = query.term(),
        query = %query.query_text(),
        pages = page_count,
        classifier = %classifier.kind(),
        "running analysis"
    );

    let report = analyze_term(
        &search,
        &classifier,
        &query,
        page_count,
        config.classify_concurrency,
    )
    .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_table(&report));
    }
    Ok(())
}

/// Upper bound on items fetched: `page_size` items on each of `page_count` pages.
pub(crate) fn item_budget(page_size: u8, page_count: u32) -> anyhow::Result<usize> {
    let pages = usize::try_from(page_count)?;
    usize::from(page_size)
        .checked_mul(pages)
        .ok_or_else(|| anyhow::anyhow!("item budget for {page_count} pages overflows"))
}

/// Plain-text summary table for terminal output.
pub(crate) fn render_table(report: &SentimentReport) -> String {
    let summary = &report.summary;
    let mut out = String::new();

    let _ = writeln!(out, "term: {}", report.term);
    let _ = writeln!(
        out,
        "posts: {} fetched, {} unique, {} page(s){}",
        report.fetched_count,
        report.corpus_size,
        report.pages_fetched,
        if report.exhausted {
            " (results exhausted)"
        } else {
            ""
        }
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "{:<12}{:>10}{:>8}", "LABEL", "PERCENT", "COUNT");
    for (label, pct) in &summary.percentages {
        let _ = writeln!(
            out,
            "{:<12}{:>10}{:>8}",
            label.as_str(),
            pct.to_string(),
            summary.count(*label)
        );
    }
    if let Some(threshold) = summary.confidence_threshold {
        let _ = writeln!(
            out,
            "{:<12}{:>10}{:>8}",
            "UNCLASSIFIED",
            format!("<= {threshold:.2}"),
            summary.count_unclassified
        );
    }
    out
}
