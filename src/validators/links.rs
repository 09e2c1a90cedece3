//! Links validator
//!
//! Cross-references every internal link against the crawl results and
//! detects orphan pages with no inbound internal links.

use std::collections::{HashMap, HashSet};

use crate::crawler::CrawlResult;
use crate::extractor::ExtractedSignals;
use crate::inventory::normalize_url;

use super::types::{AuditIssue, IssueCategory, Severity};

pub fn validate_links(
    all_signals: &HashMap<String, ExtractedSignals>,
    results: &HashMap<String, CrawlResult>,
) -> Vec<AuditIssue> {
    let mut issues = Vec::new();
    let mut flagged: HashSet<(String, String)> = HashSet::new();

    let mut pages: Vec<&String> = all_signals.keys().collect();
    pages.sort();

    for page_url in &pages {
        let signals = &all_signals[*page_url];
        for link in &signals.internal_links {
            let target = normalize_url(&link.href);
            let Some(result) = results.get(&target) else {
                continue;
            };
            if result.status == 200 {
                continue;
            }
            if !flagged.insert(((*page_url).clone(), target.clone())) {
                continue;
            }

            let issue = if result.status == 404 {
                AuditIssue::new(
                    Severity::P1,
                    IssueCategory::Links,
                    (*page_url).clone(),
                    format!("Internal link to {} returns 404", target),
                )
            } else if result.status == 0 {
                AuditIssue::new(
                    Severity::P1,
                    IssueCategory::Links,
                    (*page_url).clone(),
                    format!("Internal link to {} fails to connect", target),
                )
            } else {
                AuditIssue::new(
                    Severity::P2,
                    IssueCategory::Links,
                    (*page_url).clone(),
                    format!("Internal link to {} returns HTTP {}", target, result.status),
                )
            };
            issues.push(issue.with_evidence(link.text.clone()));
        }
    }

    let inbound = inbound_link_targets(all_signals);
    for page_url in &pages {
        if inbound.contains(*page_url) {
            continue;
        }
        if is_root_like(page_url) {
            continue;
        }
        issues.push(
            AuditIssue::new(
                Severity::P2,
                IssueCategory::Links,
                (*page_url).clone(),
                "Orphan page: no internal links point here",
            )
            .with_page_fix(
                (*page_url).clone(),
                "Link to this page from navigation or related content",
            ),
        );
    }

    issues
}

/// Set of normalized URLs that receive at least one internal link from a
/// different page. Shared with the expired-domain scanner.
pub fn inbound_link_targets(all_signals: &HashMap<String, ExtractedSignals>) -> HashSet<String> {
    let mut inbound = HashSet::new();
    for (page_url, signals) in all_signals {
        for link in &signals.internal_links {
            let target = normalize_url(&link.href);
            if &target != page_url {
                inbound.insert(target);
            }
        }
    }
    inbound
}

/// Home pages are never orphans.
fn is_root_like(url: &str) -> bool {
    url::Url::parse(url)
        .map(|u| matches!(u.path(), "/" | "/ar" | "/ar/"))
        .unwrap_or(false)
}
