//! Audit configuration types
//!
//! Value records materialized once per run and frozen. Serialized as
//! camelCase JSON to match the `config/sites/*.audit.json` file schema.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::validators::types::IssueCategory;

/// Complete audit configuration for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditConfig {
    /// Site identifier, always forced to the loader argument
    pub site_id: String,
    /// Base URL of the site under audit
    pub base_url: String,
    /// Root directory for per-run output
    pub output_dir: String,
    pub crawl: CrawlSettings,
    pub inventory: InventorySettings,
    pub validators: ValidatorConfig,
    pub risk: RiskScannerConfig,
    pub hard_gates: Vec<HardGateConfig>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            site_id: String::new(),
            base_url: String::new(),
            output_dir: "audit-output".to_string(),
            crawl: CrawlSettings::default(),
            inventory: InventorySettings::default(),
            validators: ValidatorConfig::default(),
            risk: RiskScannerConfig::default(),
            hard_gates: default_hard_gates(),
        }
    }
}

/// Crawler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrawlSettings {
    /// Maximum in-flight requests
    pub concurrency: usize,
    /// URLs per batch
    pub batch_size: usize,
    /// Minimum gap between request starts, in milliseconds
    pub rate_delay_ms: u64,
    /// Per-attempt timeout in milliseconds
    pub timeout_ms: u64,
    /// Retries after the first attempt (transport failures only)
    pub max_retries: u32,
    /// Base delay for exponential retry backoff, in milliseconds
    pub retry_base_delay_ms: u64,
    /// Redirect hop budget per request
    pub max_redirects: usize,
    pub user_agent: String,
    /// Statuses that pass the HTTP validator without comment
    pub allowed_statuses: Vec<u16>,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            concurrency: 3,
            batch_size: 10,
            rate_delay_ms: 500,
            timeout_ms: 15_000,
            max_retries: 2,
            retry_base_delay_ms: 500,
            max_redirects: 5,
            user_agent: "siteaudit/0.3 (+https://github.com/siteaudit)".to_string(),
            allowed_statuses: vec![200],
        }
    }
}

/// Inventory builder settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct InventorySettings {
    /// Routes audited even when absent from the sitemap, resolved against baseUrl
    pub static_routes: Vec<String>,
    /// Emit a parallel `/ar`-prefixed entry for every non-`/ar` URL
    pub include_ar_variants: bool,
    /// Glob patterns matched against `pathname + search`; matches are dropped
    pub exclude_patterns: Vec<String>,
}

/// Length bounds for titles and descriptions, in characters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LengthBounds {
    pub min: usize,
    pub max: usize,
}

/// Validator rule settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidatorConfig {
    pub title_length: LengthBounds,
    pub description_length: LengthBounds,
    /// Query parameter keys a canonical URL may carry
    pub allowed_canonical_params: Vec<String>,
    /// Languages every indexable page must declare alternates for
    pub expected_hreflang_langs: Vec<String>,
    pub deprecated_schema_types: Vec<String>,
    /// Route glob -> schema types that must appear on matching pages
    pub required_schema_by_route: BTreeMap<String, Vec<String>>,
    pub max_sitemap_urls: usize,
    /// Soft-gate threshold for thin content
    pub min_word_count: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            title_length: LengthBounds { min: 30, max: 60 },
            description_length: LengthBounds { min: 70, max: 160 },
            allowed_canonical_params: Vec::new(),
            expected_hreflang_langs: Vec::new(),
            deprecated_schema_types: vec![
                "Blog".to_string(),
                "WebPageElement".to_string(),
            ],
            required_schema_by_route: BTreeMap::new(),
            max_sitemap_urls: 50_000,
            min_word_count: 250,
        }
    }
}

/// Risk scanner settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RiskScannerConfig {
    pub enable_scaled_content: bool,
    pub enable_site_reputation: bool,
    pub enable_expired_domain: bool,
    /// Jaccard similarity at or above which two pages are near-duplicates
    pub duplicate_similarity_threshold: f64,
    /// Minimum near-duplicate cluster size worth reporting
    pub scaled_content_min_cluster_size: usize,
    /// Pages below this word count are thin
    pub thin_content_threshold: usize,
    /// Minimum fraction of heading entities covered by title + description
    pub entity_coverage_min_score: f64,
    /// external / (internal + external) ratio that flags outbound dominance
    pub outbound_dominance_threshold: f64,
    /// Site topic pivot score at or above which the domain looks repurposed
    pub topic_pivot_score_threshold: f64,
}

impl Default for RiskScannerConfig {
    fn default() -> Self {
        Self {
            enable_scaled_content: true,
            enable_site_reputation: true,
            enable_expired_domain: true,
            duplicate_similarity_threshold: 0.8,
            scaled_content_min_cluster_size: 3,
            thin_content_threshold: 150,
            entity_coverage_min_score: 0.3,
            outbound_dominance_threshold: 0.7,
            topic_pivot_score_threshold: 0.7,
        }
    }
}

/// One hard gate: pass/fail criterion over a single issue category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardGateConfig {
    pub name: String,
    pub category: IssueCategory,
    /// Maximum P0 issues tolerated in the category
    pub max_p0: i64,
    /// Maximum total issues tolerated; negative means unlimited
    pub max_total: i64,
}

/// Default gate set applied when config files define none
pub fn default_hard_gates() -> Vec<HardGateConfig> {
    vec![
        HardGateConfig {
            name: "no-server-errors".to_string(),
            category: IssueCategory::Http,
            max_p0: 0,
            max_total: -1,
        },
        HardGateConfig {
            name: "no-missing-canonical".to_string(),
            category: IssueCategory::Canonical,
            max_p0: 0,
            max_total: 0,
        },
        HardGateConfig {
            name: "hreflang-integrity".to_string(),
            category: IssueCategory::Hreflang,
            max_p0: 0,
            max_total: -1,
        },
        HardGateConfig {
            name: "sitemap-integrity".to_string(),
            category: IssueCategory::Sitemap,
            max_p0: 0,
            max_total: -1,
        },
        HardGateConfig {
            name: "schema-validity".to_string(),
            category: IssueCategory::Schema,
            max_p0: 0,
            max_total: -1,
        },
        HardGateConfig {
            name: "no-spam-signals".to_string(),
            category: IssueCategory::Risk,
            max_p0: 0,
            max_total: -1,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AuditConfig::default();
        assert!(config.crawl.concurrency >= 1);
        assert!(config.crawl.batch_size >= 1);
        assert!(config.crawl.timeout_ms >= 1000);
        assert!(config.validators.title_length.min < config.validators.title_length.max);
        assert!(!config.hard_gates.is_empty());
    }

    #[test]
    fn test_config_round_trips_as_camel_case() {
        let config = AuditConfig::default();
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("baseUrl").is_some());
        assert!(json["crawl"].get("batchSize").is_some());
        assert!(json["risk"].get("duplicateSimilarityThreshold").is_some());

        let back: AuditConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back.crawl.batch_size, config.crawl.batch_size);
    }
}
