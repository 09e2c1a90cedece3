//! Audit run result
//!
//! The engine's public output: everything the reporter and the CLI need.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::inventory::UrlInventoryEntry;
use crate::validators::{AuditIssue, IssueCategory, Severity};

/// Outcome of one hard gate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateResult {
    pub name: String,
    pub category: IssueCategory,
    pub max_p0: i64,
    pub max_total: i64,
    pub p0_count: usize,
    pub total_count: usize,
    pub passed: bool,
}

/// One informational soft gate: a named group of URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftGateSummary {
    pub name: String,
    pub count: usize,
    pub urls: Vec<String>,
}

/// Overall verdict rendered in reports and the terminal summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Warn => write!(f, "WARN"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// The engine's public output for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRunResult {
    pub run_id: String,
    pub site_id: String,
    pub mode: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total_urls: usize,
    pub issues: Vec<AuditIssue>,
    pub gate_results: Vec<GateResult>,
    pub soft_gates: Vec<SoftGateSummary>,
    pub inventory: Vec<UrlInventoryEntry>,
}

impl AuditRunResult {
    pub fn severity_count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn category_count(&self, category: IssueCategory) -> usize {
        self.issues.iter().filter(|i| i.category == category).count()
    }

    pub fn all_gates_passed(&self) -> bool {
        self.gate_results.iter().all(|g| g.passed)
    }

    /// FAIL when a hard gate failed; WARN when gates pass but P0/P1 issues
    /// remain; PASS otherwise.
    pub fn verdict(&self) -> Verdict {
        if !self.all_gates_passed() {
            Verdict::Fail
        } else if self.severity_count(Severity::P0) + self.severity_count(Severity::P1) > 0 {
            Verdict::Warn
        } else {
            Verdict::Pass
        }
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(issues: Vec<AuditIssue>, gates: Vec<GateResult>) -> AuditRunResult {
        let now = Utc::now();
        AuditRunResult {
            run_id: "demo-20260801-101500-ab12".to_string(),
            site_id: "demo".to_string(),
            mode: "full".to_string(),
            started_at: now,
            finished_at: now,
            total_urls: 1,
            issues,
            gate_results: gates,
            soft_gates: Vec::new(),
            inventory: Vec::new(),
        }
    }

    fn gate(passed: bool) -> GateResult {
        GateResult {
            name: "g".to_string(),
            category: IssueCategory::Http,
            max_p0: 0,
            max_total: -1,
            p0_count: 0,
            total_count: 0,
            passed,
        }
    }

    #[test]
    fn test_verdict_fail_on_gate() {
        let result = result_with(Vec::new(), vec![gate(false)]);
        assert_eq!(result.verdict(), Verdict::Fail);
    }

    #[test]
    fn test_verdict_warn_on_p1() {
        let issue = AuditIssue::new(Severity::P1, IssueCategory::Metadata, "u", "m");
        let result = result_with(vec![issue], vec![gate(true)]);
        assert_eq!(result.verdict(), Verdict::Warn);
    }

    #[test]
    fn test_verdict_pass_with_only_p2() {
        let issue = AuditIssue::new(Severity::P2, IssueCategory::Metadata, "u", "m");
        let result = result_with(vec![issue], vec![gate(true)]);
        assert_eq!(result.verdict(), Verdict::Pass);
    }
}
