//! Site reputation abuse scanner
//!
//! Detects content sections drifting away from the site's core topic,
//! outbound-link dominance, and content pages without editorial ownership.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::config::RiskScannerConfig;
use crate::extractor::ExtractedSignals;
use crate::validators::{AuditIssue, IssueCategory, Severity};

use super::{topic_words, EXTENDED_STOPWORDS};

const KEY_PAGES: [&str; 5] = ["/", "/blog", "/about", "/hotels", "/experiences"];
const CONTENT_PREFIXES: [&str; 3] = ["/blog/", "/information/", "/news/"];
const MIN_CORE_VOCABULARY: usize = 5;
const MAX_LISTED_URLS: usize = 10;

pub fn scan(
    config: &RiskScannerConfig,
    base_url: &str,
    all_signals: &HashMap<String, ExtractedSignals>,
) -> Vec<AuditIssue> {
    let mut issues = Vec::new();

    let mut pages: Vec<&String> = all_signals.keys().collect();
    pages.sort();

    // Core topic vocabulary from the key pages. Too few words means there
    // is not enough data to judge drift.
    let mut core_vocabulary: HashSet<String> = HashSet::new();
    for url in &pages {
        if KEY_PAGES.contains(&pathname(url).as_str()) {
            core_vocabulary.extend(topic_words(&all_signals[*url], 3, &EXTENDED_STOPWORDS));
        }
    }

    if core_vocabulary.len() >= MIN_CORE_VOCABULARY {
        let mut drifted: Vec<&String> = Vec::new();
        for url in &pages {
            if !is_content_page(url) {
                continue;
            }
            let topics = topic_words(&all_signals[*url], 3, &EXTENDED_STOPWORDS);
            if topics.len() <= 3 {
                continue;
            }
            let overlap = topics.intersection(&core_vocabulary).count();
            let relevance = overlap as f64 / topics.len() as f64;
            if relevance < 0.1 {
                drifted.push(*url);
            }
        }
        if !drifted.is_empty() {
            let sample: Vec<String> = drifted
                .iter()
                .take(MAX_LISTED_URLS)
                .map(|u| u.to_string())
                .collect();
            issues.push(
                AuditIssue::new(
                    Severity::P2,
                    IssueCategory::Risk,
                    base_url,
                    format!(
                        "{} content page(s) drift from the site's core topic",
                        drifted.len()
                    ),
                )
                .with_evidence(sample.join(", ")),
            );
        }
    }

    // Outbound link dominance.
    for url in &pages {
        let signals = &all_signals[*url];
        let internal = signals.internal_links.len();
        let external = signals.external_links.len();
        if external <= 5 {
            continue;
        }
        let ratio = external as f64 / (internal + external) as f64;
        if ratio >= config.outbound_dominance_threshold {
            issues.push(AuditIssue::new(
                Severity::P2,
                IssueCategory::Risk,
                (*url).clone(),
                format!(
                    "Outbound links dominate: {} external vs {} internal",
                    external, internal
                ),
            ));
        }
    }

    // Missing editorial ownership on content pages.
    let mut unowned: Vec<&String> = Vec::new();
    for url in &pages {
        if !is_content_page(url) {
            continue;
        }
        if !has_author(&all_signals[*url]) {
            unowned.push(*url);
        }
    }
    if !unowned.is_empty() {
        let sample: Vec<String> = unowned
            .iter()
            .take(MAX_LISTED_URLS)
            .map(|u| u.to_string())
            .collect();
        issues.push(
            AuditIssue::new(
                Severity::P2,
                IssueCategory::Risk,
                base_url,
                format!(
                    "{} content page(s) declare no author in structured data",
                    unowned.len()
                ),
            )
            .with_evidence(sample.join(", ")),
        );
    }

    issues
}

fn pathname(url: &str) -> String {
    url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string())
}

fn is_content_page(url: &str) -> bool {
    let path = pathname(url);
    CONTENT_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// Any JSON-LD block with an `author` field, searching `@graph` one level.
fn has_author(signals: &ExtractedSignals) -> bool {
    signals.json_ld.iter().any(|block| {
        if block.get("author").is_some() {
            return true;
        }
        matches!(block.get("@graph"), Some(Value::Array(graph))
            if graph.iter().any(|node| node.get("author").is_some()))
    })
}
