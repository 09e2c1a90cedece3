//! Sitemap validator
//!
//! Structural checks on the raw sitemap XML plus cross-references against
//! the crawl results: status of listed URLs, duplicates, and noindex
//! headers contradicting sitemap membership.

use std::collections::HashMap;
use std::collections::HashSet;

use regex::Regex;

use crate::config::ValidatorConfig;
use crate::crawler::CrawlResult;
use crate::inventory::{extract_loc_values, normalize_url};

use super::types::{AuditIssue, IssueCategory, Severity};

const SITEMAP_XMLNS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const MAX_INDIVIDUAL_STATUS_ISSUES: usize = 20;
const MAX_DUPLICATE_EXAMPLES: usize = 10;

pub fn validate_sitemap(
    sitemap_xml: &str,
    base_url: &str,
    results: &HashMap<String, CrawlResult>,
    config: &ValidatorConfig,
) -> Vec<AuditIssue> {
    let mut issues = Vec::new();
    let sitemap_url = format!("{}/sitemap.xml", base_url.trim_end_matches('/'));

    if sitemap_xml.trim().is_empty() {
        issues.push(
            AuditIssue::new(
                Severity::P0,
                IssueCategory::Sitemap,
                &sitemap_url,
                "Sitemap is empty or missing",
            )
            .with_systemic_fix("sitemap", "Publish a sitemaps.org/0.9 sitemap at /sitemap.xml"),
        );
        return issues;
    }

    let lower = sitemap_xml.to_lowercase();
    if !lower.contains("<urlset") && !lower.contains("<sitemapindex") {
        issues.push(AuditIssue::new(
            Severity::P0,
            IssueCategory::Sitemap,
            &sitemap_url,
            "Sitemap XML has neither <urlset> nor <sitemapindex>",
        ));
        return issues;
    }

    let urlset_re = Regex::new(r"(?is)<urlset[^>]*>").expect("valid regex");
    for open_tag in urlset_re.find_iter(sitemap_xml) {
        if !open_tag.as_str().contains(SITEMAP_XMLNS) {
            issues.push(
                AuditIssue::new(
                    Severity::P2,
                    IssueCategory::Sitemap,
                    &sitemap_url,
                    "Sitemap <urlset> is missing the sitemaps.org namespace",
                )
                .with_evidence(open_tag.as_str().to_string()),
            );
            break;
        }
    }

    let locs = extract_loc_values(sitemap_xml);
    if locs.is_empty() {
        issues.push(AuditIssue::new(
            Severity::P0,
            IssueCategory::Sitemap,
            &sitemap_url,
            "Sitemap contains zero <loc> entries",
        ));
        return issues;
    }

    if locs.len() > config.max_sitemap_urls {
        issues.push(AuditIssue::new(
            Severity::P1,
            IssueCategory::Sitemap,
            &sitemap_url,
            format!(
                "Sitemap lists {} URLs, above the limit of {}",
                locs.len(),
                config.max_sitemap_urls
            ),
        ));
    }

    let mut bad_status: Vec<(String, u16)> = Vec::new();
    for loc in &locs {
        let key = normalize_url(loc);
        if let Some(result) = results.get(&key) {
            if result.status != 200 {
                bad_status.push((key.clone(), result.status));
            }
            if let Some(tag) = result.headers.get("x-robots-tag") {
                if tag.to_lowercase().contains("noindex") {
                    issues.push(AuditIssue::new(
                        Severity::P1,
                        IssueCategory::Sitemap,
                        &key,
                        "Sitemap URL responds with an x-robots-tag noindex header",
                    ));
                }
            }
        }
    }

    for (url, status) in bad_status.iter().take(MAX_INDIVIDUAL_STATUS_ISSUES) {
        issues.push(AuditIssue::new(
            Severity::P1,
            IssueCategory::Sitemap,
            url,
            format!("Sitemap URL returns HTTP {}", status),
        ));
    }
    if bad_status.len() > MAX_INDIVIDUAL_STATUS_ISSUES {
        issues.push(AuditIssue::new(
            Severity::P1,
            IssueCategory::Sitemap,
            &sitemap_url,
            format!(
                "{} further sitemap URLs return a non-200 status",
                bad_status.len() - MAX_INDIVIDUAL_STATUS_ISSUES
            ),
        ));
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut duplicates: Vec<String> = Vec::new();
    for loc in &locs {
        let key = normalize_url(loc);
        if !seen.insert(key.clone()) {
            duplicates.push(key);
        }
    }
    if !duplicates.is_empty() {
        let examples: Vec<String> = duplicates
            .iter()
            .take(MAX_DUPLICATE_EXAMPLES)
            .cloned()
            .collect();
        issues.push(
            AuditIssue::new(
                Severity::P2,
                IssueCategory::Sitemap,
                &sitemap_url,
                format!("Sitemap lists {} duplicate URL(s)", duplicates.len()),
            )
            .with_evidence(examples.join(", ")),
        );
    }

    issues
}
