//! Hreflang validator
//!
//! Checks alternate-language annotations: BCP-47 shape, coverage of the
//! expected languages, self-reference, x-default, duplicates, and
//! reciprocity between crawled pages.

use std::collections::HashMap;
use std::collections::HashSet;

use regex::Regex;

use crate::config::ValidatorConfig;
use crate::extractor::ExtractedSignals;

use super::types::{AuditIssue, IssueCategory, Severity};
use super::{is_noindexed, normalize_for_compare};

pub fn validate_hreflang(
    page_url: &str,
    signals: &ExtractedSignals,
    all_signals: &HashMap<String, ExtractedSignals>,
    config: &ValidatorConfig,
) -> Vec<AuditIssue> {
    let mut issues = Vec::new();

    if is_noindexed(signals) {
        return issues;
    }

    let expected: Vec<&str> = config
        .expected_hreflang_langs
        .iter()
        .map(String::as_str)
        .collect();

    if signals.hreflang.is_empty() {
        if !expected.is_empty() {
            issues.push(
                AuditIssue::new(
                    Severity::P1,
                    IssueCategory::Hreflang,
                    page_url,
                    "Missing hreflang tags",
                )
                .with_systemic_fix(
                    "hreflang-tags",
                    "Emit alternate-language links for every configured locale",
                ),
            );
        }
        return issues;
    }

    let lang_re = Regex::new(r"^[a-z]{2}(-[A-Z]{2})?$|^x-default$").expect("valid regex");
    for alternate in &signals.hreflang {
        if !lang_re.is_match(&alternate.lang) {
            issues.push(
                AuditIssue::new(
                    Severity::P1,
                    IssueCategory::Hreflang,
                    page_url,
                    format!("Invalid hreflang value '{}'", alternate.lang),
                )
                .with_evidence(alternate.href.clone()),
            );
        }
    }

    let present: Vec<&str> = signals.hreflang.iter().map(|a| a.lang.as_str()).collect();
    for lang in expected.iter().filter(|l| **l != "x-default") {
        if !present.contains(lang) {
            issues.push(AuditIssue::new(
                Severity::P1,
                IssueCategory::Hreflang,
                page_url,
                format!("Missing hreflang alternate for expected language '{}'", lang),
            ));
        }
    }

    let page_normalized = normalize_for_compare(page_url);
    let self_referenced = signals
        .hreflang
        .iter()
        .any(|a| normalize_for_compare(&a.href) == page_normalized);
    if !self_referenced {
        issues.push(AuditIssue::new(
            Severity::P1,
            IssueCategory::Hreflang,
            page_url,
            "Page is not listed among its own hreflang alternates",
        ));
    }

    if expected.contains(&"x-default") && !present.contains(&"x-default") {
        issues.push(AuditIssue::new(
            Severity::P2,
            IssueCategory::Hreflang,
            page_url,
            "Missing x-default hreflang alternate",
        ));
    }

    // Reciprocity: targets we crawled must link back. Targets outside the
    // signals map were not crawled and are skipped, not flagged.
    for alternate in &signals.hreflang {
        let target_key = crate::inventory::normalize_url(&alternate.href);
        if target_key == crate::inventory::normalize_url(page_url) {
            continue;
        }
        let Some(target_signals) = all_signals.get(&target_key) else {
            continue;
        };
        let links_back = target_signals
            .hreflang
            .iter()
            .any(|back| normalize_for_compare(&back.href) == page_normalized);
        if !links_back {
            issues.push(
                AuditIssue::new(
                    Severity::P1,
                    IssueCategory::Hreflang,
                    page_url,
                    format!("Hreflang alternate {} does not link back", alternate.href),
                )
                .with_evidence(format!(
                    "{} declares {} but the target's alternates omit this page",
                    page_url, alternate.href
                )),
            );
        }
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for alternate in &signals.hreflang {
        if !seen.insert(alternate.lang.as_str()) {
            issues.push(AuditIssue::new(
                Severity::P1,
                IssueCategory::Hreflang,
                page_url,
                format!("Duplicate hreflang value '{}'", alternate.lang),
            ));
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::HreflangAlternate;

    fn page(alternates: &[(&str, &str)]) -> ExtractedSignals {
        ExtractedSignals {
            hreflang: alternates
                .iter()
                .map(|(lang, href)| HreflangAlternate {
                    lang: lang.to_string(),
                    href: href.to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn config(langs: &[&str]) -> ValidatorConfig {
        ValidatorConfig {
            expected_hreflang_langs: langs.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_alternates_with_expected_langs() {
        let issues = validate_hreflang(
            "https://ex.com/page",
            &page(&[]),
            &HashMap::new(),
            &config(&["en-GB", "ar"]),
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "Missing hreflang tags");
    }

    #[test]
    fn test_no_alternates_without_expectations_is_clean() {
        let issues = validate_hreflang(
            "https://ex.com/page",
            &page(&[]),
            &HashMap::new(),
            &config(&[]),
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_invalid_lang_pattern() {
        let issues = validate_hreflang(
            "https://ex.com/page",
            &page(&[("english", "https://ex.com/page"), ("en-GB", "https://ex.com/page")]),
            &HashMap::new(),
            &config(&[]),
        );
        assert!(issues.iter().any(|i| i.message.contains("'english'")));
        assert!(!issues.iter().any(|i| i.message.contains("'en-GB'")));
    }

    #[test]
    fn test_missing_expected_language() {
        let issues = validate_hreflang(
            "https://ex.com/page",
            &page(&[("en-GB", "https://ex.com/page")]),
            &HashMap::new(),
            &config(&["en-GB", "ar"]),
        );
        assert!(issues.iter().any(|i| i.message.contains("'ar'")));
    }

    #[test]
    fn test_missing_self_reference() {
        let issues = validate_hreflang(
            "https://ex.com/page",
            &page(&[("ar", "https://ex.com/ar/page")]),
            &HashMap::new(),
            &config(&[]),
        );
        assert!(issues
            .iter()
            .any(|i| i.message.contains("own hreflang alternates")));
    }

    #[test]
    fn test_x_default_expected_but_absent_is_p2() {
        let issues = validate_hreflang(
            "https://ex.com/page",
            &page(&[("en-GB", "https://ex.com/page")]),
            &HashMap::new(),
            &config(&["en-GB", "x-default"]),
        );
        let x_default = issues
            .iter()
            .find(|i| i.message.contains("x-default"))
            .unwrap();
        assert_eq!(x_default.severity, Severity::P2);
    }

    #[test]
    fn test_reciprocity_violation() {
        let en = page(&[
            ("en-GB", "https://ex.com/en"),
            ("ar", "https://ex.com/ar"),
        ]);
        let ar = page(&[("ar", "https://ex.com/ar")]);

        let mut all = HashMap::new();
        all.insert("https://ex.com/en".to_string(), en.clone());
        all.insert("https://ex.com/ar".to_string(), ar);

        let issues = validate_hreflang("https://ex.com/en", &en, &all, &config(&[]));
        assert!(issues
            .iter()
            .any(|i| i.message.contains("https://ex.com/ar") && i.severity == Severity::P1));
    }

    #[test]
    fn test_reciprocity_satisfied_and_uncrawled_target_skipped() {
        let en = page(&[
            ("en-GB", "https://ex.com/en"),
            ("ar", "https://ex.com/ar"),
            ("fr", "https://ex.com/fr"),
        ]);
        let ar = page(&[
            ("ar", "https://ex.com/ar"),
            ("en-GB", "https://ex.com/en"),
        ]);

        let mut all = HashMap::new();
        all.insert("https://ex.com/en".to_string(), en.clone());
        all.insert("https://ex.com/ar".to_string(), ar);
        // /fr was never crawled

        let issues = validate_hreflang("https://ex.com/en", &en, &all, &config(&[]));
        assert!(!issues.iter().any(|i| i.message.contains("link back")));
    }

    #[test]
    fn test_duplicate_lang_values() {
        let issues = validate_hreflang(
            "https://ex.com/page",
            &page(&[
                ("en-GB", "https://ex.com/page"),
                ("en-GB", "https://ex.com/other"),
            ]),
            &HashMap::new(),
            &config(&[]),
        );
        assert!(issues.iter().any(|i| i.message.contains("Duplicate")));
    }
}
