//! URL inventory construction
//!
//! Produces the ordered, deduplicated list of URLs to crawl from three
//! sources: the sitemap, configured static routes, and `/ar` variants.

mod glob;
mod sitemap;

pub use glob::{glob_match, glob_to_regex};
pub use sitemap::{extract_loc_values, fetch_sitemap, SitemapFetch};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::AuditConfig;
use crate::error::Result;

/// Where an inventory entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrlSource {
    #[serde(rename = "sitemap")]
    Sitemap,
    #[serde(rename = "static")]
    Static,
    #[serde(rename = "ar-variant")]
    ArVariant,
}

impl std::fmt::Display for UrlSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrlSource::Sitemap => write!(f, "sitemap"),
            UrlSource::Static => write!(f, "static"),
            UrlSource::ArVariant => write!(f, "ar-variant"),
        }
    }
}

/// One URL in the inventory, decorated after the run completes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlInventoryEntry {
    pub url: String,
    pub source: UrlSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_count: Option<usize>,
}

/// The built inventory plus the raw sitemap text for validation
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    /// Crawl order, deduplicated and filtered
    pub urls: Vec<String>,
    pub entries: Vec<UrlInventoryEntry>,
    pub sitemap_xml: String,
    /// Sitemap URLs (normalized) for robots/sitemap cross-references
    pub sitemap_urls: Vec<String>,
}

/// Normalize a URL for deduplication and map keys: trailing slash stripped,
/// empty path becomes `/`.
pub fn normalize_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut parsed) => {
            let stripped = parsed.path().trim_end_matches('/').to_string();
            let path = if stripped.is_empty() { "/" } else { &stripped };
            parsed.set_path(path);
            parsed.to_string()
        }
        Err(_) => raw.trim_end_matches('/').to_string(),
    }
}

/// Build the crawl inventory for a site.
///
/// A sitemap fetch failure is logged and treated as an empty sitemap; the
/// inventory can still be built from static routes.
pub async fn build_inventory(client: &Client, config: &AuditConfig) -> Result<Inventory> {
    let base_url = config.base_url.trim_end_matches('/');
    let mut inventory = Inventory::default();

    let sitemap = match fetch_sitemap(client, base_url, config.crawl.timeout_ms).await {
        Ok(fetch) => fetch,
        Err(e) => {
            warn!("Sitemap unavailable, continuing with static routes: {}", e);
            SitemapFetch::default()
        }
    };
    inventory.sitemap_xml = sitemap.xml;

    for url in &sitemap.urls {
        push_entry(&mut inventory, config, url, UrlSource::Sitemap);
    }
    inventory.sitemap_urls = inventory.urls.clone();

    for route in &config.inventory.static_routes {
        let url = resolve_route(base_url, route);
        push_entry(&mut inventory, config, &url, UrlSource::Static);
    }

    if config.inventory.include_ar_variants {
        let existing: Vec<String> = inventory.urls.clone();
        for url in existing {
            if let Some(variant) = ar_variant(&url) {
                push_entry(&mut inventory, config, &variant, UrlSource::ArVariant);
            }
        }
    }

    Ok(inventory)
}

/// Normalize, filter, and dedup-insert one candidate URL.
fn push_entry(inventory: &mut Inventory, config: &AuditConfig, raw: &str, source: UrlSource) {
    let normalized = normalize_url(raw);

    if is_excluded(&normalized, &config.inventory.exclude_patterns) {
        debug!("Excluded by pattern: {}", normalized);
        return;
    }
    if inventory.urls.iter().any(|u| u == &normalized) {
        return;
    }

    inventory.urls.push(normalized.clone());
    inventory.entries.push(UrlInventoryEntry {
        url: normalized,
        source,
        final_status: None,
        issue_count: None,
    });
}

/// Match `pathname + search` against the exclude globs.
fn is_excluded(url: &str, patterns: &[String]) -> bool {
    if patterns.is_empty() {
        return false;
    }
    let target = match Url::parse(url) {
        Ok(parsed) => match parsed.query() {
            Some(q) => format!("{}?{}", parsed.path(), q),
            None => parsed.path().to_string(),
        },
        Err(_) => url.to_string(),
    };
    patterns.iter().any(|p| glob_match(p, &target))
}

/// Resolve a static route against the base URL.
fn resolve_route(base_url: &str, route: &str) -> String {
    if route.starts_with("http://") || route.starts_with("https://") {
        route.to_string()
    } else {
        format!("{}/{}", base_url, route.trim_start_matches('/'))
    }
}

/// Parallel `/ar` entry for a URL whose path does not already start `/ar`.
fn ar_variant(url: &str) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    let path = parsed.path().to_string();
    if path == "/ar" || path.starts_with("/ar/") {
        return None;
    }
    let new_path = if path == "/" {
        "/ar".to_string()
    } else {
        format!("/ar{}", path)
    };
    parsed.set_path(&new_path);
    Some(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_trailing_slash() {
        assert_eq!(
            normalize_url("https://ex.com/page/"),
            "https://ex.com/page"
        );
    }

    #[test]
    fn test_normalize_empty_path_becomes_root() {
        assert_eq!(normalize_url("https://ex.com"), "https://ex.com/");
        assert_eq!(normalize_url("https://ex.com/"), "https://ex.com/");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["https://ex.com/a/b/", "https://ex.com", "https://ex.com/x?q=1"] {
            let once = normalize_url(raw);
            assert_eq!(normalize_url(&once), once);
        }
    }

    #[test]
    fn test_ar_variant_prepends_path() {
        assert_eq!(
            ar_variant("https://ex.com/hotels").as_deref(),
            Some("https://ex.com/ar/hotels")
        );
        assert_eq!(
            ar_variant("https://ex.com/").as_deref(),
            Some("https://ex.com/ar")
        );
        assert_eq!(ar_variant("https://ex.com/ar/hotels"), None);
        assert_eq!(ar_variant("https://ex.com/ar"), None);
    }

    #[test]
    fn test_exclusion_matches_path_and_query() {
        let patterns = vec!["/admin/**".to_string(), "/search**".to_string()];
        assert!(is_excluded("https://ex.com/admin/users", &patterns));
        assert!(is_excluded("https://ex.com/search?q=x", &patterns));
        assert!(!is_excluded("https://ex.com/blog", &patterns));
    }

    #[test]
    fn test_resolve_route() {
        assert_eq!(
            resolve_route("https://ex.com", "/about"),
            "https://ex.com/about"
        );
        assert_eq!(
            resolve_route("https://ex.com", "about"),
            "https://ex.com/about"
        );
    }
}
