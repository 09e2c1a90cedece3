//! Validators - Per-category SEO rule sets
//!
//! Each validator is a pure function of its inputs emitting zero or more
//! [`AuditIssue`]s; none perform I/O and none panic on malformed input.

pub mod canonical;
pub mod hreflang;
pub mod http;
pub mod links;
pub mod metadata;
pub mod robots;
pub mod schema;
pub mod sitemap;
pub mod types;

pub use types::{AuditIssue, FixScope, IssueCategory, Severity, SuggestedFix};

use std::collections::{HashMap, HashSet};

use url::Url;

use crate::config::AuditConfig;
use crate::crawler::CrawlResult;
use crate::extractor::ExtractedSignals;

/// Robots meta content as a case-insensitive directive set.
pub fn parse_robots_directives(signals: &ExtractedSignals) -> HashSet<String> {
    signals
        .robots_meta
        .as_deref()
        .map(|content| {
            content
                .split(',')
                .map(|d| d.trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Whether validators that only apply to indexable pages should skip this one.
pub fn is_noindexed(signals: &ExtractedSignals) -> bool {
    let directives = parse_robots_directives(signals);
    directives.contains("noindex") || directives.contains("none")
}

/// Normalize a URL for self-reference comparisons: lowercase host,
/// trailing slash stripped, query preserved.
pub fn normalize_for_compare(raw: &str) -> String {
    let Ok(parsed) = Url::parse(raw) else {
        return raw.trim_end_matches('/').to_string();
    };
    let Some(host) = parsed.host_str() else {
        return raw.trim_end_matches('/').to_string();
    };

    let mut out = format!("{}://{}", parsed.scheme(), host.to_lowercase());
    if let Some(port) = parsed.port() {
        out.push_str(&format!(":{}", port));
    }
    let path = parsed.path().trim_end_matches('/');
    out.push_str(if path.is_empty() { "/" } else { path });
    if let Some(query) = parsed.query() {
        out.push('?');
        out.push_str(query);
    }
    out
}

/// Run every validator over its scope and collect the issues in category
/// order: per-result checks first, then per-page checks, then cross-page
/// checks. Output order is deterministic for identical inputs.
pub fn run_validators(
    config: &AuditConfig,
    results: &HashMap<String, CrawlResult>,
    all_signals: &HashMap<String, ExtractedSignals>,
    sitemap_xml: &str,
    sitemap_urls: &[String],
) -> Vec<AuditIssue> {
    let mut issues = Vec::new();

    let mut urls: Vec<&String> = results.keys().collect();
    urls.sort();
    for url in &urls {
        issues.extend(http::validate_http(&results[*url], &config.crawl));
    }

    let mut pages: Vec<&String> = all_signals.keys().collect();
    pages.sort();

    let sitemap_set: HashSet<String> = sitemap_urls.iter().cloned().collect();

    for page in &pages {
        let signals = &all_signals[*page];
        issues.extend(canonical::validate_canonical(page, signals, &config.validators));
        issues.extend(hreflang::validate_hreflang(
            page,
            signals,
            all_signals,
            &config.validators,
        ));
        issues.extend(schema::validate_schema(page, signals, &config.validators));
        issues.extend(robots::validate_robots(page, signals, &sitemap_set));
    }

    issues.extend(sitemap::validate_sitemap(
        sitemap_xml,
        &config.base_url,
        results,
        &config.validators,
    ));
    issues.extend(links::validate_links(all_signals, results));
    issues.extend(metadata::validate_metadata(all_signals, &config.validators));

    issues
}
