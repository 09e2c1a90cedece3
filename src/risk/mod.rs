//! Risk scanners - Cross-page spam-policy heuristics
//!
//! Syntactic proxies for the public search-engine spam policies: scaled
//! content abuse, site reputation abuse, and expired domain abuse. Each
//! scanner is guarded by an enable flag and never performs I/O.

pub mod expired_domain;
pub mod reputation;
pub mod scaled_content;

use std::collections::{HashMap, HashSet};

use crate::config::RiskScannerConfig;
use crate::extractor::ExtractedSignals;
use crate::validators::AuditIssue;

/// Stoplist for entity-coverage checks (short everyday words).
pub(crate) const SHORT_STOPWORDS: [&str; 20] = [
    "the", "and", "for", "with", "your", "from", "this", "that", "are", "was", "our", "you",
    "has", "have", "will", "can", "all", "how", "what", "why",
];

/// Extended stoplist for topic vocabularies.
pub(crate) const EXTENDED_STOPWORDS: [&str; 40] = [
    "the", "and", "for", "with", "your", "from", "this", "that", "are", "was", "our", "you",
    "has", "have", "will", "can", "all", "how", "what", "why", "about", "more", "best", "guide",
    "page", "home", "site", "website", "read", "find", "here", "when", "where", "which", "their",
    "them", "they", "into", "over", "also",
];

/// Lowercase words with every non-alphanumeric character treated as a gap.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// 3-word shingle set over a token stream.
pub(crate) fn shingles3(tokens: &[String]) -> HashSet<String> {
    tokens.windows(3).map(|w| w.join(" ")).collect()
}

/// |A intersect B| / |A union B|; 0.0 when both sets are empty.
pub(crate) fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Title + description + headings as one text blob.
pub(crate) fn head_text(signals: &ExtractedSignals) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(title) = signals.title.as_deref() {
        parts.push(title);
    }
    if let Some(description) = signals.meta_description.as_deref() {
        parts.push(description);
    }
    for heading in &signals.headings {
        parts.push(&heading.text);
    }
    parts.join(" ")
}

/// Significant topic words: longer than `min_len`, not in the stoplist.
pub(crate) fn topic_words(
    signals: &ExtractedSignals,
    min_len: usize,
    stoplist: &[&str],
) -> HashSet<String> {
    tokenize(&head_text(signals))
        .into_iter()
        .filter(|w| w.len() > min_len && !stoplist.contains(&w.as_str()))
        .collect()
}

/// Union-find over page indices for near-duplicate clustering.
pub(crate) struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    pub fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    pub fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}

/// Run every enabled scanner over the full signals map.
pub fn run_risk_scanners(
    config: &RiskScannerConfig,
    base_url: &str,
    all_signals: &HashMap<String, ExtractedSignals>,
) -> Vec<AuditIssue> {
    let mut issues = Vec::new();

    if config.enable_scaled_content {
        issues.extend(scaled_content::scan(config, base_url, all_signals));
    }
    if config.enable_site_reputation {
        issues.extend(reputation::scan(config, base_url, all_signals));
    }
    if config.enable_expired_domain {
        issues.extend(expired_domain::scan(config, base_url, all_signals));
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_strips_punctuation() {
        assert_eq!(
            tokenize("Hello, World! Re-use 2026"),
            vec!["hello", "world", "re", "use", "2026"]
        );
    }

    #[test]
    fn test_shingles_need_three_tokens() {
        let tokens = tokenize("one two");
        assert!(shingles3(&tokens).is_empty());
        let tokens = tokenize("one two three four");
        let shingles = shingles3(&tokens);
        assert!(shingles.contains("one two three"));
        assert!(shingles.contains("two three four"));
        assert_eq!(shingles.len(), 2);
    }

    #[test]
    fn test_jaccard_bounds() {
        let a: HashSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        let b: HashSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(jaccard(&a, &b), 1.0);
        let empty = HashSet::new();
        assert_eq!(jaccard(&a, &empty), 0.0);
        assert_eq!(jaccard(&empty, &empty), 0.0);
    }

    #[test]
    fn test_union_find_clusters() {
        let mut uf = UnionFind::new(4);
        uf.union(0, 1);
        uf.union(1, 2);
        assert_eq!(uf.find(0), uf.find(2));
        assert_ne!(uf.find(0), uf.find(3));
    }
}
