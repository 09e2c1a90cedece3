//! Issue types - Common types for SEO validation
//!
//! Defines audit issues, severities, categories, and suggested fixes.

use serde::{Deserialize, Serialize};

/// Severity of an audit issue
///
/// P0 is fatal for SEO, P1 is high priority, P2 is low priority.
/// The ordering places more severe issues first when sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    P0,
    P1,
    P2,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::P0 => write!(f, "P0"),
            Severity::P1 => write!(f, "P1"),
            Severity::P2 => write!(f, "P2"),
        }
    }
}

/// Closed set of issue categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Http,
    Canonical,
    Hreflang,
    Sitemap,
    Schema,
    Links,
    Metadata,
    Robots,
    Risk,
}

impl IssueCategory {
    /// All categories in declaration order
    pub const ALL: [IssueCategory; 9] = [
        IssueCategory::Http,
        IssueCategory::Canonical,
        IssueCategory::Hreflang,
        IssueCategory::Sitemap,
        IssueCategory::Schema,
        IssueCategory::Links,
        IssueCategory::Metadata,
        IssueCategory::Robots,
        IssueCategory::Risk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::Http => "http",
            IssueCategory::Canonical => "canonical",
            IssueCategory::Hreflang => "hreflang",
            IssueCategory::Sitemap => "sitemap",
            IssueCategory::Schema => "schema",
            IssueCategory::Links => "links",
            IssueCategory::Metadata => "metadata",
            IssueCategory::Robots => "robots",
            IssueCategory::Risk => "risk",
        }
    }
}

impl std::fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Scope of a suggested fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixScope {
    /// One change fixes every affected page (template, config, server rule)
    #[serde(rename = "systemic")]
    Systemic,
    /// Must be fixed on the individual page
    #[serde(rename = "page-level")]
    PageLevel,
}

impl std::fmt::Display for FixScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FixScope::Systemic => write!(f, "systemic"),
            FixScope::PageLevel => write!(f, "page-level"),
        }
    }
}

/// Suggested remediation attached to an issue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedFix {
    pub scope: FixScope,
    /// Grouping key for systemic fixes (e.g. "canonical-tags")
    pub target: String,
    pub notes: String,
}

/// One audit finding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditIssue {
    pub severity: Severity,
    pub category: IssueCategory,
    /// The offending URL
    pub url: String,
    pub message: String,
    /// Snippet, JSON path, or redirect chain supporting the finding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<SuggestedFix>,
}

impl AuditIssue {
    /// Create a new issue
    pub fn new(
        severity: Severity,
        category: IssueCategory,
        url: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            url: url.into(),
            message: message.into(),
            evidence: None,
            suggested_fix: None,
        }
    }

    /// Attach supporting evidence
    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = Some(evidence.into());
        self
    }

    /// Attach a systemic fix suggestion
    pub fn with_systemic_fix(mut self, target: impl Into<String>, notes: impl Into<String>) -> Self {
        self.suggested_fix = Some(SuggestedFix {
            scope: FixScope::Systemic,
            target: target.into(),
            notes: notes.into(),
        });
        self
    }

    /// Attach a page-level fix suggestion
    pub fn with_page_fix(mut self, target: impl Into<String>, notes: impl Into<String>) -> Self {
        self.suggested_fix = Some(SuggestedFix {
            scope: FixScope::PageLevel,
            target: target.into(),
            notes: notes.into(),
        });
        self
    }
}
