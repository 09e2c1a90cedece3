//! Robots validator
//!
//! Parses the robots meta directives and flags indexing restrictions,
//! including the contradiction of a noindexed page listed in the sitemap.

use std::collections::HashSet;

use crate::extractor::ExtractedSignals;
use crate::inventory::normalize_url;

use super::types::{AuditIssue, IssueCategory, Severity};
use super::parse_robots_directives;

pub fn validate_robots(
    page_url: &str,
    signals: &ExtractedSignals,
    sitemap_urls: &HashSet<String>,
) -> Vec<AuditIssue> {
    let mut issues = Vec::new();

    let directives = parse_robots_directives(signals);
    if directives.is_empty() {
        return issues;
    }

    let noindex = directives.contains("noindex") || directives.contains("none");
    let nofollow = directives.contains("nofollow") || directives.contains("none");

    if noindex {
        if sitemap_urls.contains(&normalize_url(page_url)) {
            issues.push(
                AuditIssue::new(
                    Severity::P1,
                    IssueCategory::Robots,
                    page_url,
                    "Noindexed page found in sitemap (contradictory signals)",
                )
                .with_systemic_fix(
                    "sitemap",
                    "Drop noindexed URLs from the sitemap or remove the noindex directive",
                ),
            );
        }
        issues.push(AuditIssue::new(
            Severity::P2,
            IssueCategory::Robots,
            page_url,
            "Page is noindexed",
        ));
    }

    if nofollow {
        issues.push(AuditIssue::new(
            Severity::P2,
            IssueCategory::Robots,
            page_url,
            "Page is nofollowed",
        ));
    }

    if directives.contains("noarchive") {
        issues.push(AuditIssue::new(
            Severity::P2,
            IssueCategory::Robots,
            page_url,
            "Page disallows caching (noarchive)",
        ));
    }

    if directives.contains("nosnippet") {
        issues.push(AuditIssue::new(
            Severity::P1,
            IssueCategory::Robots,
            page_url,
            "Page suppresses search snippets (nosnippet)",
        ));
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(robots: &str) -> ExtractedSignals {
        ExtractedSignals {
            robots_meta: Some(robots.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_noindex_in_sitemap_is_contradictory() {
        let mut sitemap = HashSet::new();
        sitemap.insert("https://ex.com/draft".to_string());
        let issues = validate_robots("https://ex.com/draft", &page("noindex"), &sitemap);
        assert!(issues
            .iter()
            .any(|i| i.severity == Severity::P1 && i.message.contains("contradictory signals")));
    }

    #[test]
    fn test_noindex_outside_sitemap_is_informational() {
        let issues = validate_robots("https://ex.com/draft", &page("NOINDEX"), &HashSet::new());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::P2);
    }

    #[test]
    fn test_none_counts_as_noindex_and_nofollow() {
        let issues = validate_robots("https://ex.com/x", &page("none"), &HashSet::new());
        assert!(issues.iter().any(|i| i.message.contains("noindexed")));
        assert!(issues.iter().any(|i| i.message.contains("nofollowed")));
    }

    #[test]
    fn test_nosnippet_is_p1() {
        let issues = validate_robots("https://ex.com/x", &page("nosnippet"), &HashSet::new());
        assert_eq!(issues[0].severity, Severity::P1);
    }

    #[test]
    fn test_plain_index_follow_is_clean() {
        let issues = validate_robots("https://ex.com/x", &page("index, follow"), &HashSet::new());
        assert!(issues.is_empty());
    }
}
