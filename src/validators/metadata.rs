//! Metadata validator
//!
//! Title and description presence, length bounds, cross-page duplicates,
//! and language/direction consistency.

use std::collections::HashMap;

use crate::config::ValidatorConfig;
use crate::extractor::ExtractedSignals;

use super::types::{AuditIssue, IssueCategory, Severity};
use super::is_noindexed;

pub fn validate_metadata(
    all_signals: &HashMap<String, ExtractedSignals>,
    config: &ValidatorConfig,
) -> Vec<AuditIssue> {
    let mut issues = Vec::new();
    let mut titles: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut descriptions: HashMap<&str, Vec<&str>> = HashMap::new();

    let mut pages: Vec<&String> = all_signals.keys().collect();
    pages.sort();

    for page_url in &pages {
        let signals = &all_signals[*page_url];
        if is_noindexed(signals) {
            continue;
        }

        match signals.title.as_deref().filter(|t| !t.is_empty()) {
            None => {
                issues.push(
                    AuditIssue::new(
                        Severity::P0,
                        IssueCategory::Metadata,
                        (*page_url).clone(),
                        "Missing <title>",
                    )
                    .with_page_fix((*page_url).clone(), "Add a descriptive title tag"),
                );
            }
            Some(title) => {
                let len = title.chars().count();
                if len < config.title_length.min {
                    issues.push(AuditIssue::new(
                        Severity::P1,
                        IssueCategory::Metadata,
                        (*page_url).clone(),
                        format!(
                            "Title too short: {} chars, minimum {}",
                            len, config.title_length.min
                        ),
                    ));
                } else if len > config.title_length.max {
                    issues.push(AuditIssue::new(
                        Severity::P2,
                        IssueCategory::Metadata,
                        (*page_url).clone(),
                        format!(
                            "Title too long: {} chars, maximum {}",
                            len, config.title_length.max
                        ),
                    ));
                }
                titles.entry(title).or_default().push(page_url.as_str());
            }
        }

        match signals.meta_description.as_deref().filter(|d| !d.is_empty()) {
            None => {
                issues.push(
                    AuditIssue::new(
                        Severity::P1,
                        IssueCategory::Metadata,
                        (*page_url).clone(),
                        "Missing meta description",
                    )
                    .with_systemic_fix(
                        "meta-descriptions",
                        "Generate a unique meta description per page",
                    ),
                );
            }
            Some(description) => {
                let len = description.chars().count();
                if len < config.description_length.min {
                    issues.push(AuditIssue::new(
                        Severity::P2,
                        IssueCategory::Metadata,
                        (*page_url).clone(),
                        format!(
                            "Description too short: {} chars, minimum {}",
                            len, config.description_length.min
                        ),
                    ));
                } else if len > config.description_length.max {
                    issues.push(AuditIssue::new(
                        Severity::P2,
                        IssueCategory::Metadata,
                        (*page_url).clone(),
                        format!(
                            "Description too long: {} chars, maximum {}",
                            len, config.description_length.max
                        ),
                    ));
                }
                descriptions
                    .entry(description)
                    .or_default()
                    .push(page_url.as_str());
            }
        }

        match signals.lang.as_deref() {
            None => {
                issues.push(AuditIssue::new(
                    Severity::P2,
                    IssueCategory::Metadata,
                    (*page_url).clone(),
                    "Missing lang attribute on <html>",
                ));
            }
            Some(lang) if lang.to_lowercase().starts_with("ar") => {
                if signals.dir.as_deref() != Some("rtl") {
                    issues.push(AuditIssue::new(
                        Severity::P1,
                        IssueCategory::Metadata,
                        (*page_url).clone(),
                        "Arabic page without dir=\"rtl\"",
                    ));
                }
            }
            Some(_) => {}
        }
    }

    report_duplicates(&mut issues, titles, Severity::P1, "title");
    report_duplicates(&mut issues, descriptions, Severity::P2, "description");

    issues
}

/// Report each duplicated value once, on the lexicographically smallest URL.
fn report_duplicates(
    issues: &mut Vec<AuditIssue>,
    groups: HashMap<&str, Vec<&str>>,
    severity: Severity,
    field: &str,
) {
    let mut duplicated: Vec<(&str, Vec<&str>)> = groups
        .into_iter()
        .filter(|(_, urls)| urls.len() > 1)
        .collect();
    duplicated.sort_by_key(|(value, _)| value.to_string());

    for (value, mut urls) in duplicated {
        urls.sort();
        let others: Vec<String> = urls[1..].iter().map(|u| u.to_string()).collect();
        issues.push(
            AuditIssue::new(
                severity,
                IssueCategory::Metadata,
                urls[0].to_string(),
                format!("Duplicate {} shared by {} pages", field, urls.len()),
            )
            .with_evidence(format!("\"{}\" also on: {}", value, others.join(", "))),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(title: Option<&str>, description: Option<&str>) -> ExtractedSignals {
        ExtractedSignals {
            title: title.map(str::to_string),
            meta_description: description.map(str::to_string),
            lang: Some("en".to_string()),
            ..Default::default()
        }
    }

    const GOOD_TITLE: &str = "Welcome to Example Site Homepage Today";
    const GOOD_DESC: &str =
        "A description long enough to sit comfortably within the default bounds for metas.";

    #[test]
    fn test_missing_title_is_p0() {
        let mut all = HashMap::new();
        all.insert("https://ex.com/".to_string(), page(None, Some(GOOD_DESC)));
        let issues = validate_metadata(&all, &ValidatorConfig::default());
        assert!(issues
            .iter()
            .any(|i| i.severity == Severity::P0 && i.message.contains("<title>")));
    }

    #[test]
    fn test_title_boundary_lengths() {
        let config = ValidatorConfig::default();
        let exact_min = "x".repeat(config.title_length.min);
        let one_short = "x".repeat(config.title_length.min - 1);

        let mut all = HashMap::new();
        all.insert(
            "https://ex.com/a".to_string(),
            page(Some(&exact_min), Some(GOOD_DESC)),
        );
        let issues = validate_metadata(&all, &config);
        assert!(!issues.iter().any(|i| i.message.contains("Title too short")));

        let mut all = HashMap::new();
        all.insert(
            "https://ex.com/a".to_string(),
            page(Some(&one_short), Some(GOOD_DESC)),
        );
        let issues = validate_metadata(&all, &config);
        assert!(issues
            .iter()
            .any(|i| i.severity == Severity::P1 && i.message.contains("Title too short")));
    }

    #[test]
    fn test_duplicate_title_reported_once_on_smaller_url() {
        let mut all = HashMap::new();
        all.insert(
            "https://ex.com/b".to_string(),
            page(Some(GOOD_TITLE), Some(GOOD_DESC)),
        );
        all.insert(
            "https://ex.com/a".to_string(),
            page(Some(GOOD_TITLE), Some(GOOD_DESC)),
        );
        let issues = validate_metadata(&all, &ValidatorConfig::default());
        let dup: Vec<_> = issues
            .iter()
            .filter(|i| i.message.contains("Duplicate title"))
            .collect();
        assert_eq!(dup.len(), 1);
        assert_eq!(dup[0].url, "https://ex.com/a");
        assert_eq!(dup[0].severity, Severity::P1);
    }

    #[test]
    fn test_missing_description_is_p1() {
        let mut all = HashMap::new();
        all.insert(
            "https://ex.com/".to_string(),
            page(Some(GOOD_TITLE), None),
        );
        let issues = validate_metadata(&all, &ValidatorConfig::default());
        assert!(issues
            .iter()
            .any(|i| i.severity == Severity::P1 && i.message.contains("meta description")));
    }

    #[test]
    fn test_arabic_lang_requires_rtl() {
        let mut signals = page(Some(GOOD_TITLE), Some(GOOD_DESC));
        signals.lang = Some("ar".to_string());
        signals.dir = Some("ltr".to_string());
        let mut all = HashMap::new();
        all.insert("https://ex.com/ar".to_string(), signals);
        let issues = validate_metadata(&all, &ValidatorConfig::default());
        assert!(issues
            .iter()
            .any(|i| i.severity == Severity::P1 && i.message.contains("rtl")));
    }

    #[test]
    fn test_noindexed_pages_skipped() {
        let mut signals = page(None, None);
        signals.robots_meta = Some("noindex".to_string());
        let mut all = HashMap::new();
        all.insert("https://ex.com/draft".to_string(), signals);
        let issues = validate_metadata(&all, &ValidatorConfig::default());
        assert!(issues.is_empty());
    }
}
