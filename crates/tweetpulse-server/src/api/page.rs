//! Server-rendered HTML search form and result page.

use std::fmt::Write as _;

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use html_escape::{encode_double_quoted_attribute, encode_text};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use tweetpulse_sentiment::{SentimentError, SentimentReport};

use super::{status_for_code, AppState};

const PAGE_HEAD: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>tweetpulse</title>
<style>
body { font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }
table { border-collapse: collapse; }
td, th { padding: 0.25rem 0.75rem; text-align: left; }
</style>
</head>
<body>
<h1>tweetpulse</h1>
<form action="/search" method="get">
<input type="text" name="term" placeholder="search term" required>
<button type="submit">Analyze</button>
</form>
"#;

const PAGE_TAIL: &str = "</body>\n</html>\n";

#[derive(Debug, Deserialize)]
pub(super) struct SearchParams {
    pub term: Option<String>,
}

pub(super) async fn index() -> Html<String> {
    Html(layout(""))
}

pub(super) async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let term = params.term.unwrap_or_default();
    if term.trim().is_empty() {
        return Html(layout("")).into_response();
    }

    match state.analyze(&term, None, None).await {
        Ok(report) => Html(layout(&render_report(&report))).into_response(),
        Err(e @ (SentimentError::FetchFailed(_) | SentimentError::MalformedResponse(_))) => {
            tracing::warn!(term = %term, error = %e, "search failed, rendering empty result");
            Html(layout(&render_no_results(&term))).into_response()
        }
        Err(e) => {
            tracing::error!(term = %term, error = %e, "sentiment page failed");
            let body = format!(
                "<p class=\"error\">Could not analyze &ldquo;{}&rdquo;: {}</p>\n",
                encode_text(&term),
                encode_text(&e.to_string())
            );
            (status_for_code(e.code()), Html(layout(&body))).into_response()
        }
    }
}

fn layout(content: &str) -> String {
    format!("{PAGE_HEAD}{content}{PAGE_TAIL}")
}

fn render_no_results(term: &str) -> String {
    format!(
        "<p class=\"empty\">No results for &ldquo;{}&rdquo;.</p>\n",
        encode_text(term)
    )
}

fn render_report(report: &SentimentReport) -> String {
    let summary = &report.summary;
    let mut html = String::new();

    let _ = writeln!(
        html,
        "<h2>Sentiment for &ldquo;{}&rdquo;</h2>",
        encode_text(&report.term)
    );

    if report.corpus_size == 0 {
        html.push_str(&render_no_results(&report.term));
        return html;
    }

    html.push_str("<table>\n<tr><th>Label</th><th>Share</th><th>Posts</th></tr>\n");
    for (label, pct) in &summary.percentages {
        let _ = writeln!(
            html,
            "<tr><td>{label}</td><td>{pct}%</td><td>{}</td></tr>",
            summary.count(*label)
        );
    }
    html.push_str("</table>\n");

    let _ = writeln!(
        html,
        "<p>{} unique posts from {} fetched across {} page(s).</p>",
        report.corpus_size, report.fetched_count, report.pages_fetched
    );
    if summary.count_unclassified > 0 {
        let _ = writeln!(
            html,
            "<p>{} post(s) fell below the confidence cutoff and were left out.</p>",
            summary.count_unclassified
        );
    }
    if report.exhausted {
        html.push_str("<p>The search ran out of results early.</p>\n");
    }

    let _ = writeln!(
        html,
        "<p><a href=\"{}\">JSON</a></p>",
        json_link(&report.term)
    );
    html
}

/// Attribute-safe URL of the JSON report for `term`.
fn json_link(term: &str) -> String {
    let url = format!(
        "/api/v1/sentiment/{}",
        utf8_percent_encode(term, NON_ALPHANUMERIC)
    );
    encode_double_quoted_attribute(&url).into_owned()
}
