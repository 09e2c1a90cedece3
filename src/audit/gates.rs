//! Gate evaluation
//!
//! Hard gates are pass/fail thresholds over issue categories and set the
//! exit code. Soft gates are informational URL groupings that never block.

use std::collections::HashMap;

use crate::config::{HardGateConfig, ValidatorConfig};
use crate::extractor::ExtractedSignals;
use crate::validators::{AuditIssue, Severity};

use super::result::{GateResult, SoftGateSummary};

/// A gate passes iff `p0 <= maxP0` and (`maxTotal < 0` or `total <= maxTotal`).
pub fn evaluate_hard_gates(issues: &[AuditIssue], gates: &[HardGateConfig]) -> Vec<GateResult> {
    gates
        .iter()
        .map(|gate| {
            let in_category: Vec<&AuditIssue> = issues
                .iter()
                .filter(|i| i.category == gate.category)
                .collect();
            let p0_count = in_category
                .iter()
                .filter(|i| i.severity == Severity::P0)
                .count();
            let total_count = in_category.len();

            let passed = p0_count as i64 <= gate.max_p0
                && (gate.max_total < 0 || total_count as i64 <= gate.max_total);

            GateResult {
                name: gate.name.clone(),
                category: gate.category,
                max_p0: gate.max_p0,
                max_total: gate.max_total,
                p0_count,
                total_count,
                passed,
            }
        })
        .collect()
}

/// The four informational groupings, URLs sorted for determinism.
pub fn evaluate_soft_gates(
    all_signals: &HashMap<String, ExtractedSignals>,
    config: &ValidatorConfig,
) -> Vec<SoftGateSummary> {
    let mut pages: Vec<&String> = all_signals.keys().collect();
    pages.sort();

    let mut gates = vec![
        collect(&pages, "pages-without-meta-description", |signals| {
            signals.meta_description.is_none()
        }, all_signals),
        collect(&pages, "thin-content", |signals| {
            signals.word_count < config.min_word_count
        }, all_signals),
        collect(&pages, "pages-without-structured-data", |signals| {
            signals.json_ld.is_empty()
        }, all_signals),
    ];

    if !config.expected_hreflang_langs.is_empty() {
        gates.push(collect(&pages, "pages-without-hreflang", |signals| {
            signals.hreflang.is_empty()
        }, all_signals));
    }

    gates
}

fn collect(
    pages: &[&String],
    name: &str,
    predicate: impl Fn(&ExtractedSignals) -> bool,
    all_signals: &HashMap<String, ExtractedSignals>,
) -> SoftGateSummary {
    let urls: Vec<String> = pages
        .iter()
        .filter(|url| predicate(&all_signals[url.as_str()]))
        .map(|url| url.to_string())
        .collect();
    SoftGateSummary {
        name: name.to_string(),
        count: urls.len(),
        urls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::IssueCategory;

    fn issue(severity: Severity, category: IssueCategory) -> AuditIssue {
        AuditIssue::new(severity, category, "https://ex.com/", "m")
    }

    fn gate(category: IssueCategory, max_p0: i64, max_total: i64) -> HardGateConfig {
        HardGateConfig {
            name: "g".to_string(),
            category,
            max_p0,
            max_total,
        }
    }

    #[test]
    fn test_gate_passes_with_unlimited_total() {
        let issues = vec![
            issue(Severity::P1, IssueCategory::Http),
            issue(Severity::P2, IssueCategory::Http),
        ];
        let results = evaluate_hard_gates(&issues, &[gate(IssueCategory::Http, 0, -1)]);
        assert!(results[0].passed);
        assert_eq!(results[0].total_count, 2);
    }

    #[test]
    fn test_gate_fails_on_p0() {
        let issues = vec![issue(Severity::P0, IssueCategory::Http)];
        let results = evaluate_hard_gates(&issues, &[gate(IssueCategory::Http, 0, -1)]);
        assert!(!results[0].passed);
        assert_eq!(results[0].p0_count, 1);
    }

    #[test]
    fn test_gate_fails_on_total_cap() {
        let issues = vec![issue(Severity::P1, IssueCategory::Canonical)];
        let results = evaluate_hard_gates(&issues, &[gate(IssueCategory::Canonical, 0, 0)]);
        assert!(!results[0].passed);
    }

    #[test]
    fn test_gate_ignores_other_categories() {
        let issues = vec![issue(Severity::P0, IssueCategory::Metadata)];
        let results = evaluate_hard_gates(&issues, &[gate(IssueCategory::Http, 0, -1)]);
        assert!(results[0].passed);
        assert_eq!(results[0].total_count, 0);
    }

    #[test]
    fn test_soft_gates_without_expected_langs() {
        let mut all = HashMap::new();
        all.insert("https://ex.com/".to_string(), ExtractedSignals::default());
        let gates = evaluate_soft_gates(&all, &ValidatorConfig::default());
        let names: Vec<&str> = gates.iter().map(|g| g.name.as_str()).collect();
        assert!(names.contains(&"pages-without-structured-data"));
        assert!(!names.contains(&"pages-without-hreflang"));

        let structured = gates
            .iter()
            .find(|g| g.name == "pages-without-structured-data")
            .unwrap();
        assert_eq!(structured.urls, vec!["https://ex.com/"]);
    }

    #[test]
    fn test_hreflang_soft_gate_when_langs_expected() {
        let mut all = HashMap::new();
        all.insert("https://ex.com/".to_string(), ExtractedSignals::default());
        let config = ValidatorConfig {
            expected_hreflang_langs: vec!["en-GB".to_string()],
            ..Default::default()
        };
        let gates = evaluate_soft_gates(&all, &config);
        assert!(gates.iter().any(|g| g.name == "pages-without-hreflang"));
    }
}
