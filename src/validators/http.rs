//! HTTP validator
//!
//! Checks the transport-level outcome of one fetch: connection failures,
//! error statuses, redirect chains, and slow responses.

use crate::config::CrawlSettings;
use crate::crawler::CrawlResult;

use super::types::{AuditIssue, IssueCategory, Severity};

pub fn validate_http(result: &CrawlResult, settings: &CrawlSettings) -> Vec<AuditIssue> {
    let mut issues = Vec::new();
    let url = &result.url;

    if result.status == 0 {
        let reason = result.error.as_deref().unwrap_or("unknown transport error");
        issues.push(
            AuditIssue::new(
                Severity::P0,
                IssueCategory::Http,
                url,
                format!("Connection failed: {}", reason),
            )
            .with_page_fix(url.clone(), "Verify the URL resolves and the server accepts requests"),
        );
        return issues;
    }

    let mut status_flagged = false;
    if result.status >= 500 {
        status_flagged = true;
        issues.push(AuditIssue::new(
            Severity::P0,
            IssueCategory::Http,
            url,
            format!("Server error: HTTP {}", result.status),
        ));
    } else if result.status == 404 {
        status_flagged = true;
        issues.push(AuditIssue::new(
            Severity::P1,
            IssueCategory::Http,
            url,
            "Page not found: HTTP 404",
        ));
    } else if result.status >= 400 {
        status_flagged = true;
        issues.push(AuditIssue::new(
            Severity::P2,
            IssueCategory::Http,
            url,
            format!("Client error: HTTP {}", result.status),
        ));
    }

    if !status_flagged && !settings.allowed_statuses.contains(&result.status) {
        issues.push(AuditIssue::new(
            Severity::P2,
            IssueCategory::Http,
            url,
            format!("Unexpected status: HTTP {}", result.status),
        ));
    }

    let hops = result.redirect_chain.len();
    if hops > settings.max_redirects {
        issues.push(
            AuditIssue::new(
                Severity::P1,
                IssueCategory::Http,
                url,
                format!(
                    "Redirect chain of {} hops exceeds the limit of {}",
                    hops, settings.max_redirects
                ),
            )
            .with_evidence(format_chain(result)),
        );
    } else if hops > 0 {
        issues.push(
            AuditIssue::new(
                Severity::P2,
                IssueCategory::Http,
                url,
                format!("Redirects {} time(s) before resolving", hops),
            )
            .with_evidence(format_chain(result)),
        );
    }

    if result.duration_ms > 5000 {
        issues.push(AuditIssue::new(
            Severity::P1,
            IssueCategory::Http,
            url,
            format!("Very slow response: {}ms", result.duration_ms),
        ));
    } else if result.duration_ms > 3000 {
        issues.push(AuditIssue::new(
            Severity::P2,
            IssueCategory::Http,
            url,
            format!("Slow response: {}ms", result.duration_ms),
        ));
    }

    issues
}

fn format_chain(result: &CrawlResult) -> String {
    let mut parts: Vec<String> = result
        .redirect_chain
        .iter()
        .map(|hop| format!("{} ({})", hop.url, hop.status))
        .collect();
    parts.push(format!("{} ({})", result.final_url, result.status));
    parts.join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::RedirectHop;
    use chrono::Utc;
    use std::collections::HashMap;

    fn result(status: u16) -> CrawlResult {
        let now = Utc::now();
        CrawlResult {
            url: "https://ex.com/page".to_string(),
            final_url: "https://ex.com/page".to_string(),
            status,
            redirect_chain: Vec::new(),
            headers: HashMap::new(),
            body: String::new(),
            started_at: now,
            finished_at: now,
            duration_ms: 100,
            error: None,
        }
    }

    fn settings() -> CrawlSettings {
        CrawlSettings::default()
    }

    #[test]
    fn test_connection_failure_is_p0_and_stops() {
        let mut r = result(0);
        r.error = Some("dns failure".to_string());
        let issues = validate_http(&r, &settings());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::P0);
        assert!(issues[0].message.contains("dns failure"));
    }

    #[test]
    fn test_status_severities() {
        assert_eq!(validate_http(&result(503), &settings())[0].severity, Severity::P0);
        assert_eq!(validate_http(&result(404), &settings())[0].severity, Severity::P1);
        assert_eq!(validate_http(&result(403), &settings())[0].severity, Severity::P2);
        assert!(validate_http(&result(200), &settings()).is_empty());
    }

    #[test]
    fn test_disallowed_status_not_double_flagged() {
        // 301 final status is not in allowedStatuses and not an error class
        let issues = validate_http(&result(301), &settings());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::P2);

        // 404 is already flagged; no extra allowed-status issue
        let issues = validate_http(&result(404), &settings());
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_redirect_chain_boundary() {
        let mut r = result(200);
        r.redirect_chain = (0..5)
            .map(|i| RedirectHop {
                url: format!("https://ex.com/hop{}", i),
                status: 301,
            })
            .collect();
        let issues = validate_http(&r, &settings());
        // exactly maxRedirects hops: informational only
        assert!(issues.iter().all(|i| i.severity == Severity::P2));

        r.redirect_chain.push(RedirectHop {
            url: "https://ex.com/hop5".to_string(),
            status: 301,
        });
        let issues = validate_http(&r, &settings());
        assert!(issues.iter().any(|i| i.severity == Severity::P1));
    }

    #[test]
    fn test_slow_response_thresholds() {
        let mut r = result(200);
        r.duration_ms = 3500;
        assert_eq!(validate_http(&r, &settings())[0].severity, Severity::P2);
        r.duration_ms = 5500;
        assert_eq!(validate_http(&r, &settings())[0].severity, Severity::P1);
    }
}
