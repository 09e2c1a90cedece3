//! Canonical validator
//!
//! Every indexable page needs a parseable, HTTPS, self-referencing
//! canonical on its own hostname with only whitelisted query parameters.

use url::Url;

use crate::config::ValidatorConfig;
use crate::extractor::ExtractedSignals;

use super::types::{AuditIssue, IssueCategory, Severity};
use super::{is_noindexed, normalize_for_compare};

pub fn validate_canonical(
    page_url: &str,
    signals: &ExtractedSignals,
    config: &ValidatorConfig,
) -> Vec<AuditIssue> {
    let mut issues = Vec::new();

    if is_noindexed(signals) {
        return issues;
    }

    let Some(canonical) = signals.canonical.as_deref() else {
        issues.push(
            AuditIssue::new(
                Severity::P1,
                IssueCategory::Canonical,
                page_url,
                "Missing canonical tag on indexable page",
            )
            .with_systemic_fix(
                "canonical-tags",
                "Emit a self-referencing <link rel=\"canonical\"> from the page template",
            ),
        );
        return issues;
    };

    let parsed = match Url::parse(canonical) {
        Ok(parsed) => parsed,
        Err(e) => {
            issues.push(
                AuditIssue::new(
                    Severity::P0,
                    IssueCategory::Canonical,
                    page_url,
                    format!("Canonical URL does not parse: {}", e),
                )
                .with_evidence(canonical.to_string()),
            );
            return issues;
        }
    };

    if parsed.scheme() != "https" {
        issues.push(
            AuditIssue::new(
                Severity::P1,
                IssueCategory::Canonical,
                page_url,
                "Canonical URL is not HTTPS",
            )
            .with_evidence(canonical.to_string()),
        );
    }

    let page_parsed = Url::parse(page_url).ok();
    let page_host = page_parsed.as_ref().and_then(|u| u.host_str());

    match (parsed.host_str(), page_host) {
        (Some(canonical_host), Some(host)) if !canonical_host.eq_ignore_ascii_case(host) => {
            issues.push(
                AuditIssue::new(
                    Severity::P1,
                    IssueCategory::Canonical,
                    page_url,
                    format!("Canonical points to a different host: {}", canonical_host),
                )
                .with_evidence(canonical.to_string()),
            );
        }
        _ => {
            if normalize_for_compare(canonical) != normalize_for_compare(page_url) {
                issues.push(
                    AuditIssue::new(
                        Severity::P2,
                        IssueCategory::Canonical,
                        page_url,
                        "Canonical is not self-referencing",
                    )
                    .with_evidence(canonical.to_string()),
                );
            }
        }
    }

    let disallowed: Vec<String> = parsed
        .query_pairs()
        .map(|(key, _)| key.into_owned())
        .filter(|key| !config.allowed_canonical_params.iter().any(|p| p == key))
        .collect();
    if !disallowed.is_empty() {
        issues.push(
            AuditIssue::new(
                Severity::P1,
                IssueCategory::Canonical,
                page_url,
                format!("Canonical carries disallowed query parameters: {}", disallowed.join(", ")),
            )
            .with_evidence(canonical.to_string()),
        );
    }

    issues
}
