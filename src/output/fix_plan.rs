//! Fix plan renderer
//!
//! Groups the issue list by remediation priority: P0s first, then systemic
//! fixes by target, then page-level P1s and P2s, ending with a checklist.

use std::collections::BTreeMap;

use crate::audit::AuditRunResult;
use crate::validators::{AuditIssue, FixScope, Severity};

const MAX_SAMPLE_URLS: usize = 10;

/// Render the fix plan as markdown.
pub fn generate_fix_plan(result: &AuditRunResult) -> String {
    let mut out = String::new();
    let mut checklist: Vec<String> = Vec::new();

    out.push_str("# Fix Plan\n\n");
    out.push_str(&format!("Run {} found {} issue(s).\n\n", result.run_id, result.issues.len()));

    // 1. Fatal issues, by category.
    let p0s: Vec<&AuditIssue> = result
        .issues
        .iter()
        .filter(|i| i.severity == Severity::P0)
        .collect();
    if !p0s.is_empty() {
        out.push_str("## 1. Fix fatal issues first (P0)\n\n");
        for (category, issues) in by_category(&p0s) {
            out.push_str(&format!("### {}\n\n", category));
            for issue in issues {
                out.push_str(&format!("- {}: {}\n", issue.url, issue.message));
            }
            out.push('\n');
            checklist.push(format!("Resolve all P0 {} issues", category));
        }
    }

    // 2. Systemic fixes, grouped by target: one template or config change
    // repairs every affected page.
    let systemic: Vec<&AuditIssue> = result
        .issues
        .iter()
        .filter(|i| {
            i.suggested_fix
                .as_ref()
                .is_some_and(|f| f.scope == FixScope::Systemic)
        })
        .collect();
    if !systemic.is_empty() {
        out.push_str("## 2. Systemic fixes\n\n");
        let mut by_target: BTreeMap<&str, Vec<&AuditIssue>> = BTreeMap::new();
        for issue in &systemic {
            let target = issue
                .suggested_fix
                .as_ref()
                .map(|f| f.target.as_str())
                .unwrap_or("");
            by_target.entry(target).or_default().push(issue);
        }

        for (target, issues) in by_target {
            let p0 = issues.iter().filter(|i| i.severity == Severity::P0).count();
            let p1 = issues.iter().filter(|i| i.severity == Severity::P1).count();
            let p2 = issues.iter().filter(|i| i.severity == Severity::P2).count();
            out.push_str(&format!(
                "### {} ({} issue(s): {} P0, {} P1, {} P2)\n\n",
                target,
                issues.len(),
                p0,
                p1,
                p2
            ));
            if let Some(notes) = issues[0].suggested_fix.as_ref().map(|f| f.notes.as_str()) {
                out.push_str(&format!("{}\n\n", notes));
            }
            out.push_str("Affected URLs:\n");
            for issue in issues.iter().take(MAX_SAMPLE_URLS) {
                out.push_str(&format!("- {}\n", issue.url));
            }
            if issues.len() > MAX_SAMPLE_URLS {
                out.push_str(&format!("- and {} more\n", issues.len() - MAX_SAMPLE_URLS));
            }
            out.push('\n');
            checklist.push(format!("Apply systemic fix: {}", target));
        }
    }

    // 3. Page-level P1 issues by category.
    let p1_page_level: Vec<&AuditIssue> = result
        .issues
        .iter()
        .filter(|i| i.severity == Severity::P1)
        .filter(|i| {
            !i.suggested_fix
                .as_ref()
                .is_some_and(|f| f.scope == FixScope::Systemic)
        })
        .collect();
    if !p1_page_level.is_empty() {
        out.push_str("## 3. Page-level fixes (P1)\n\n");
        for (category, issues) in by_category(&p1_page_level) {
            out.push_str(&format!("### {}\n\n", category));
            for issue in issues {
                out.push_str(&format!("- {}: {}\n", issue.url, issue.message));
            }
            out.push('\n');
            checklist.push(format!("Work through P1 {} issues page by page", category));
        }
    }

    // 4. Low-priority cleanups with sample URLs.
    let p2s: Vec<&AuditIssue> = result
        .issues
        .iter()
        .filter(|i| i.severity == Severity::P2)
        .filter(|i| {
            !i.suggested_fix
                .as_ref()
                .is_some_and(|f| f.scope == FixScope::Systemic)
        })
        .collect();
    if !p2s.is_empty() {
        out.push_str("## 4. Low-priority cleanups (P2)\n\n");
        for (category, issues) in by_category(&p2s) {
            let samples: Vec<&str> = issues
                .iter()
                .take(MAX_SAMPLE_URLS)
                .map(|i| i.url.as_str())
                .collect();
            out.push_str(&format!(
                "- {}: {} issue(s), e.g. {}\n",
                category,
                issues.len(),
                samples.join(", ")
            ));
        }
        out.push('\n');
        checklist.push("Schedule P2 cleanups".to_string());
    }

    out.push_str("## Checklist\n\n");
    checklist.push("Re-run audit to verify fixes".to_string());
    for (index, item) in checklist.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", index + 1, item));
    }

    out
}

fn by_category<'a>(issues: &[&'a AuditIssue]) -> BTreeMap<String, Vec<&'a AuditIssue>> {
    let mut grouped: BTreeMap<String, Vec<&AuditIssue>> = BTreeMap::new();
    for issue in issues {
        grouped
            .entry(issue.category.to_string())
            .or_default()
            .push(issue);
    }
    grouped
}
