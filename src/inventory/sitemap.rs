//! Sitemap fetching and parsing
//!
//! Supports standard sitemaps.org/0.9 `<urlset>` documents and sitemap
//! indexes nested one level deep. Parsing is regex-level; `<loc>` values
//! are HTML-entity decoded and emitted in document order.

use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::{AuditError, Result};

/// URLs plus the raw XML payload(s), kept for downstream sitemap validation.
#[derive(Debug, Clone, Default)]
pub struct SitemapFetch {
    pub urls: Vec<String>,
    pub xml: String,
}

/// Fetch `<base_url>/sitemap.xml` and extract every page URL.
///
/// When the payload contains a `<sitemap>` element anywhere it is treated
/// as a sitemap index: every child sitemap is fetched in turn, the URL
/// lists are concatenated, and so are the raw child payloads (separated by
/// a newline) so validators can see the full text.
pub async fn fetch_sitemap(client: &Client, base_url: &str, timeout_ms: u64) -> Result<SitemapFetch> {
    let sitemap_url = format!("{}/sitemap.xml", base_url.trim_end_matches('/'));
    info!("Fetching sitemap from: {}", sitemap_url);

    let content = fetch_xml(client, &sitemap_url, timeout_ms).await?;

    if is_sitemap_index(&content) {
        info!("Detected sitemap index, extracting child sitemaps...");
        let mut urls = Vec::new();
        let mut payloads = Vec::new();

        for child_url in extract_child_sitemap_urls(&content) {
            debug!("Processing child sitemap: {}", child_url);
            match fetch_xml(client, &child_url, timeout_ms).await {
                Ok(child_xml) => {
                    urls.extend(extract_loc_values(&child_xml));
                    payloads.push(child_xml);
                }
                Err(e) => warn!("Failed to fetch child sitemap {}: {}", child_url, e),
            }
        }

        let fetch = SitemapFetch {
            urls,
            xml: payloads.join("\n"),
        };
        info!("Found {} URLs across child sitemaps", fetch.urls.len());
        return Ok(fetch);
    }

    let urls = extract_loc_values(&content);
    info!("Found {} URLs in sitemap", urls.len());

    Ok(SitemapFetch { urls, xml: content })
}

async fn fetch_xml(client: &Client, url: &str, timeout_ms: u64) -> Result<String> {
    let response = client
        .get(url)
        .timeout(Duration::from_millis(timeout_ms))
        .send()
        .await
        .map_err(|e| AuditError::SitemapFetchFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    response
        .text()
        .await
        .map_err(|e| AuditError::SitemapFetchFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })
}

/// A `<sitemap>` element anywhere marks the document as an index.
fn is_sitemap_index(content: &str) -> bool {
    let lower = content.to_lowercase();
    lower.contains("<sitemap>") || lower.contains("<sitemap ")
}

/// Extract `<sitemap><loc>` child URLs from an index document.
fn extract_child_sitemap_urls(content: &str) -> Vec<String> {
    let block_re =
        Regex::new(r"(?is)<sitemap[\s>].*?</sitemap>").expect("valid regex");
    let mut urls = Vec::new();
    for block in block_re.find_iter(content) {
        urls.extend(extract_loc_values(block.as_str()));
    }
    urls
}

/// Extract every `<loc>` value in document order, entity-decoded.
pub fn extract_loc_values(content: &str) -> Vec<String> {
    let loc_re = Regex::new(r"(?is)<loc>\s*(.*?)\s*</loc>").expect("valid regex");
    loc_re
        .captures_iter(content)
        .filter_map(|cap| cap.get(1))
        .map(|m| html_escape::decode_html_entities(m.as_str()).into_owned())
        .filter(|url| !url.is_empty())
        .collect()
}
