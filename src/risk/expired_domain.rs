//! Expired domain abuse scanner
//!
//! Compares topics implied by the domain name itself against what the
//! pages actually talk about. A repurposed (bought) domain shows a high
//! pivot score: little overlap between domain words and page topics.

use std::collections::{HashMap, HashSet};

use crate::config::RiskScannerConfig;
use crate::extractor::ExtractedSignals;
use crate::validators::links::inbound_link_targets;
use crate::validators::{AuditIssue, IssueCategory, Severity};

use super::{topic_words, EXTENDED_STOPWORDS};

const MAX_LISTED_URLS: usize = 10;
const MAX_PIVOTED_PAGES: usize = 3;

pub fn scan(
    config: &RiskScannerConfig,
    base_url: &str,
    all_signals: &HashMap<String, ExtractedSignals>,
) -> Vec<AuditIssue> {
    let mut issues = Vec::new();

    let domain_topics = domain_topics(base_url);
    if domain_topics.is_empty() {
        return issues;
    }

    let mut pages: Vec<&String> = all_signals.keys().collect();
    pages.sort();

    let mut page_pivots: Vec<(&String, f64)> = Vec::new();
    for url in &pages {
        let topics = topic_words(&all_signals[*url], 3, &EXTENDED_STOPWORDS);
        if topics.is_empty() {
            continue;
        }
        page_pivots.push((*url, pivot_score(&domain_topics, &topics)));
    }

    if page_pivots.is_empty() {
        return issues;
    }

    let site_pivot: f64 =
        page_pivots.iter().map(|(_, p)| p).sum::<f64>() / page_pivots.len() as f64;
    if site_pivot >= config.topic_pivot_score_threshold {
        issues.push(
            AuditIssue::new(
                Severity::P1,
                IssueCategory::Risk,
                base_url,
                format!(
                    "Site topics pivot away from the domain name (pivot score {:.2})",
                    site_pivot
                ),
            )
            .with_evidence(format!(
                "domain topics: {}",
                sorted_list(&domain_topics).join(", ")
            )),
        );
    }

    let pivoted: Vec<&String> = page_pivots
        .iter()
        .filter(|(_, p)| *p >= config.topic_pivot_score_threshold)
        .map(|(url, _)| *url)
        .collect();
    if pivoted.len() > MAX_PIVOTED_PAGES {
        let sample: Vec<String> = pivoted
            .iter()
            .take(MAX_LISTED_URLS)
            .map(|u| u.to_string())
            .collect();
        issues.push(
            AuditIssue::new(
                Severity::P2,
                IssueCategory::Risk,
                base_url,
                format!("{} page(s) individually pivot from the domain topic", pivoted.len()),
            )
            .with_evidence(sample.join(", ")),
        );
    }

    // Orphaned pages that also pivot look like parasite content.
    let inbound = inbound_link_targets(all_signals);
    let orphaned_pivots: Vec<&String> = page_pivots
        .iter()
        .filter(|(url, p)| {
            *p >= config.topic_pivot_score_threshold && !inbound.contains(url.as_str())
        })
        .map(|(url, _)| *url)
        .collect();
    if !orphaned_pivots.is_empty() {
        let sample: Vec<String> = orphaned_pivots
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
                    "{} orphaned page(s) with off-domain topics",
                    orphaned_pivots.len()
                ),
            )
            .with_evidence(sample.join(", ")),
        );
    }

    issues
}

/// Topic words implied by the hostname: `www.` stripped, TLD dropped,
/// labels split on separators and camelCase, short fragments discarded.
/// The host is taken from the raw string because URL parsers lowercase
/// it, which would erase the camelCase boundaries.
pub(crate) fn domain_topics(base_url: &str) -> HashSet<String> {
    let after_scheme = base_url.split("://").nth(1).unwrap_or(base_url);
    let host = after_scheme
        .split(['/', ':', '?', '#'])
        .next()
        .unwrap_or("");
    if host.is_empty() {
        return HashSet::new();
    }

    let host = host.strip_prefix("www.").unwrap_or(host);
    let labels: Vec<&str> = host.split('.').collect();
    let without_tld = if labels.len() > 1 {
        &labels[..labels.len() - 1]
    } else {
        &labels[..]
    };

    let mut topics = HashSet::new();
    for label in without_tld {
        for part in label.split(['-', '_', '.']) {
            for word in split_camel_case(part) {
                if word.len() > 2 {
                    topics.insert(word.to_lowercase());
                }
            }
        }
    }
    topics
}

fn split_camel_case(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    for c in s.chars() {
        if c.is_uppercase() && !current.is_empty() {
            words.push(current.clone());
            current.clear();
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// 1 - matched/|domainTopics|, where a domain topic matches when it and
/// any content topic contain each other either way.
fn pivot_score(domain_topics: &HashSet<String>, content_topics: &HashSet<String>) -> f64 {
    let matched = domain_topics
        .iter()
        .filter(|d| {
            content_topics
                .iter()
                .any(|t| t.contains(d.as_str()) || d.contains(t.as_str()))
        })
        .count();
    1.0 - matched as f64 / domain_topics.len() as f64
}

fn sorted_list(set: &HashSet<String>) -> Vec<String> {
    let mut list: Vec<String> = set.iter().cloned().collect();
    list.sort();
    list
}
