//! Scaled content abuse scanner
//!
//! Finds clusters of near-duplicate pages via shingle similarity, thin
//! content at scale, and headings the title/description never cover.

use std::collections::HashMap;

use crate::config::RiskScannerConfig;
use crate::extractor::ExtractedSignals;
use crate::validators::{AuditIssue, IssueCategory, Severity};

use super::{head_text, jaccard, shingles3, tokenize, UnionFind, SHORT_STOPWORDS};

const MAX_LISTED_URLS: usize = 10;

pub fn scan(
    config: &RiskScannerConfig,
    base_url: &str,
    all_signals: &HashMap<String, ExtractedSignals>,
) -> Vec<AuditIssue> {
    let mut issues = Vec::new();

    let mut pages: Vec<&String> = all_signals.keys().collect();
    pages.sort();

    // Near-duplicate clustering over pages with enough body text.
    let eligible: Vec<&String> = pages
        .iter()
        .copied()
        .filter(|url| all_signals[*url].word_count > 50)
        .collect();

    let shingle_sets: Vec<_> = eligible
        .iter()
        .map(|url| shingles3(&tokenize(&head_text(&all_signals[*url]))))
        .collect();

    let mut clusters = UnionFind::new(eligible.len());
    for i in 0..eligible.len() {
        for j in (i + 1)..eligible.len() {
            if jaccard(&shingle_sets[i], &shingle_sets[j])
                >= config.duplicate_similarity_threshold
            {
                clusters.union(i, j);
            }
        }
    }

    let mut members: HashMap<usize, Vec<&String>> = HashMap::new();
    for (index, url) in eligible.iter().enumerate() {
        members.entry(clusters.find(index)).or_default().push(*url);
    }
    let mut cluster_list: Vec<Vec<&String>> = members
        .into_values()
        .filter(|m| m.len() >= config.scaled_content_min_cluster_size)
        .collect();
    cluster_list.sort_by(|a, b| a[0].cmp(b[0]));

    for cluster in cluster_list {
        let sample: Vec<String> = cluster
            .iter()
            .take(MAX_LISTED_URLS)
            .map(|u| u.to_string())
            .collect();
        issues.push(
            AuditIssue::new(
                Severity::P1,
                IssueCategory::Risk,
                base_url,
                format!("Near-duplicate content cluster of {} pages", cluster.len()),
            )
            .with_evidence(sample.join(", "))
            .with_systemic_fix(
                "scaled-content",
                "Consolidate or differentiate templated pages with near-identical head content",
            ),
        );
    }

    // Thin content at scale.
    let thin: Vec<&String> = pages
        .iter()
        .copied()
        .filter(|url| all_signals[*url].word_count < config.thin_content_threshold)
        .collect();
    if thin.len() >= config.scaled_content_min_cluster_size {
        let sample: Vec<String> = thin
            .iter()
            .take(MAX_LISTED_URLS)
            .map(|u| u.to_string())
            .collect();
        issues.push(
            AuditIssue::new(
                Severity::P1,
                IssueCategory::Risk,
                base_url,
                format!(
                    "Thin content cluster: {} pages below {} words",
                    thin.len(),
                    config.thin_content_threshold
                ),
            )
            .with_evidence(sample.join(", ")),
        );
    }

    // Entity coverage: heading terms the title and description never mention.
    for url in &pages {
        let signals = &all_signals[*url];
        let heading_text: String = signals
            .headings
            .iter()
            .map(|h| h.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let entities: Vec<String> = tokenize(&heading_text)
            .into_iter()
            .filter(|w| w.len() > 2 && !SHORT_STOPWORDS.contains(&w.as_str()))
            .collect();
        if entities.is_empty() {
            continue;
        }

        let mut summary_text = String::new();
        if let Some(title) = signals.title.as_deref() {
            summary_text.push_str(title);
            summary_text.push(' ');
        }
        if let Some(description) = signals.meta_description.as_deref() {
            summary_text.push_str(description);
        }
        let summary_words = tokenize(&summary_text);

        let covered = entities
            .iter()
            .filter(|e| summary_words.contains(e))
            .count();
        let coverage = covered as f64 / entities.len() as f64;
        if coverage < config.entity_coverage_min_score {
            issues.push(AuditIssue::new(
                Severity::P2,
                IssueCategory::Risk,
                (*url).clone(),
                format!(
                    "Headings poorly covered by title and description ({:.0}% coverage)",
                    coverage * 100.0
                ),
            ));
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::Heading;

    /// Title and description shared verbatim; only the last heading token
    /// differs, so pairwise similarity stays well above 0.8.
    fn near_dup_page(suffix: &str) -> ExtractedSignals {
        ExtractedSignals {
            title: Some("Cheap hotel deals in the sunny coastal town".to_string()),
            meta_description: Some(
                "Compare nightly rates across beachfront resorts and family apartments"
                    .to_string(),
            ),
            headings: vec![Heading {
                level: 1,
                text: format!("Local visitor guide {}", suffix),
            }],
            word_count: 900,
            ..Default::default()
        }
    }

    fn distinct_page(title: &str, description: &str, word_count: usize) -> ExtractedSignals {
        ExtractedSignals {
            title: Some(title.to_string()),
            meta_description: Some(description.to_string()),
            headings: vec![Heading {
                level: 1,
                text: title.to_string(),
            }],
            word_count,
            ..Default::default()
        }
    }

    fn config() -> RiskScannerConfig {
        RiskScannerConfig {
            thin_content_threshold: 150,
            ..Default::default()
        }
    }

    #[test]
    fn test_near_duplicate_cluster_of_four() {
        let mut all = HashMap::new();
        for suffix in ["one", "two", "three", "four"] {
            all.insert(format!("https://ex.com/city-{}", suffix), near_dup_page(suffix));
        }
        let issues = scan(&config(), "https://ex.com", &all);
        let cluster: Vec<_> = issues
            .iter()
            .filter(|i| i.message.contains("Near-duplicate"))
            .collect();
        assert_eq!(cluster.len(), 1);
        assert!(cluster[0].message.contains("4 pages"));
        let evidence = cluster[0].evidence.as_deref().unwrap();
        assert!(evidence.contains("city-one") && evidence.contains("city-four"));
    }

    #[test]
    fn test_distinct_pages_do_not_cluster() {
        let mut all = HashMap::new();
        all.insert(
            "https://ex.com/a".to_string(),
            distinct_page(
                "Ancient pottery restoration techniques explained",
                "Workshop notes on kiln repair and ceramic glazes",
                900,
            ),
        );
        all.insert(
            "https://ex.com/b".to_string(),
            distinct_page(
                "Modern skyscraper engineering challenges reviewed",
                "Structural load analysis for supertall towers",
                900,
            ),
        );
        all.insert(
            "https://ex.com/c".to_string(),
            distinct_page(
                "Deep sea fishing equipment buying advice",
                "Choosing rods reels and sonar for offshore trips",
                900,
            ),
        );
        let issues = scan(&config(), "https://ex.com", &all);
        assert!(!issues.iter().any(|i| i.message.contains("Near-duplicate")));
    }

    #[test]
    fn test_thin_content_cluster_boundary() {
        let thin_titles = [
            "Ancient pottery restoration techniques explained",
            "Modern skyscraper engineering challenges reviewed",
            "Deep sea fishing equipment buying advice",
        ];

        let mut all = HashMap::new();
        for (i, title) in thin_titles.iter().enumerate() {
            all.insert(
                format!("https://ex.com/thin-{}", i),
                distinct_page(title, "Short stub", 149),
            );
        }
        let issues = scan(&config(), "https://ex.com", &all);
        assert!(issues.iter().any(|i| i.message.contains("Thin content cluster")));

        // At exactly the threshold the pages are not thin.
        let mut all = HashMap::new();
        for (i, title) in thin_titles.iter().enumerate() {
            all.insert(
                format!("https://ex.com/ok-{}", i),
                distinct_page(title, "Short stub", 150),
            );
        }
        let issues = scan(&config(), "https://ex.com", &all);
        assert!(!issues.iter().any(|i| i.message.contains("Thin content cluster")));
    }

    #[test]
    fn test_entity_coverage_flags_uncovered_headings() {
        let mut all = HashMap::new();
        all.insert(
            "https://ex.com/page".to_string(),
            ExtractedSignals {
                title: Some("Generic travel site".to_string()),
                meta_description: Some("Book trips online".to_string()),
                headings: vec![Heading {
                    level: 2,
                    text: "Cryptocurrency mining hardware comparison".to_string(),
                }],
                word_count: 400,
                ..Default::default()
            },
        );
        let issues = scan(&config(), "https://ex.com", &all);
        assert!(issues
            .iter()
            .any(|i| i.severity == Severity::P2 && i.message.contains("coverage")));
    }
}
