//! Executive summary renderer

use crate::audit::AuditRunResult;
use crate::inventory::UrlSource;
use crate::validators::{IssueCategory, Severity};

const MAX_GATE_DETAIL_URLS: usize = 10;
const MAX_TOP_ISSUES: usize = 30;

/// Render the executive summary as markdown.
pub fn generate_exec_summary(result: &AuditRunResult) -> String {
    let mut out = String::new();

    out.push_str("# Audit Executive Summary\n\n");
    out.push_str(&format!("- **Run:** {}\n", result.run_id));
    out.push_str(&format!("- **Mode:** {}\n", result.mode));
    out.push_str(&format!("- **Duration:** {}ms\n", result.duration_ms()));
    out.push_str(&format!("- **URLs audited:** {}\n\n", result.total_urls));

    out.push_str(&format!("## Verdict: {}\n\n", result.verdict()));

    out.push_str("## Issues by severity\n\n");
    for severity in [Severity::P0, Severity::P1, Severity::P2] {
        out.push_str(&format!(
            "- {}: {}\n",
            severity,
            result.severity_count(severity)
        ));
    }
    out.push('\n');

    out.push_str("## Issues by category\n\n");
    for category in IssueCategory::ALL {
        let count = result.category_count(category);
        if count > 0 {
            out.push_str(&format!("- {}: {}\n", category, count));
        }
    }
    out.push('\n');

    out.push_str("## Hard gates\n\n");
    out.push_str("| Gate | Category | P0 (max) | Total (max) | Result |\n");
    out.push_str("|------|----------|----------|-------------|--------|\n");
    for gate in &result.gate_results {
        let max_total = if gate.max_total < 0 {
            "unlimited".to_string()
        } else {
            gate.max_total.to_string()
        };
        out.push_str(&format!(
            "| {} | {} | {} ({}) | {} ({}) | {} |\n",
            gate.name,
            gate.category,
            gate.p0_count,
            gate.max_p0,
            gate.total_count,
            max_total,
            if gate.passed { "PASS" } else { "FAIL" }
        ));
    }
    out.push('\n');

    for gate in result.gate_results.iter().filter(|g| !g.passed) {
        out.push_str(&format!("### Failed gate: {}\n\n", gate.name));
        let urls: Vec<&str> = result
            .issues
            .iter()
            .filter(|i| i.category == gate.category)
            .map(|i| i.url.as_str())
            .collect();
        for url in urls.iter().take(MAX_GATE_DETAIL_URLS) {
            out.push_str(&format!("- {}\n", url));
        }
        if urls.len() > MAX_GATE_DETAIL_URLS {
            out.push_str(&format!(
                "- and {} more\n",
                urls.len() - MAX_GATE_DETAIL_URLS
            ));
        }
        out.push('\n');
    }

    if !result.soft_gates.is_empty() {
        out.push_str("## Soft gates (informational)\n\n");
        for gate in &result.soft_gates {
            out.push_str(&format!("- {}: {} page(s)\n", gate.name, gate.count));
        }
        out.push('\n');
    }

    let mut top: Vec<_> = result
        .issues
        .iter()
        .filter(|i| i.severity != Severity::P2)
        .collect();
    top.sort_by_key(|i| i.severity);
    top.truncate(MAX_TOP_ISSUES);
    if !top.is_empty() {
        out.push_str("## Top issues\n\n");
        for issue in top {
            out.push_str(&format!(
                "- **{} {}** {}: {}\n",
                issue.severity, issue.category, issue.url, issue.message
            ));
            if let Some(evidence) = &issue.evidence {
                out.push_str(&format!("  - evidence: {}\n", evidence));
            }
            if let Some(fix) = &issue.suggested_fix {
                out.push_str(&format!("  - fix ({}): {}\n", fix.scope, fix.notes));
            }
        }
        out.push('\n');
    }

    out.push_str("## Inventory sources\n\n");
    for source in [UrlSource::Sitemap, UrlSource::Static, UrlSource::ArVariant] {
        let count = result
            .inventory
            .iter()
            .filter(|e| e.source == source)
            .count();
        out.push_str(&format!("- {}: {}\n", source, count));
    }

    out
}
