//! Signal extraction - Regex-level parsing of the HTML head and body
//!
//! Projects one HTML document into a fixed [`ExtractedSignals`] record.
//! Parsing is deliberately regex-based: the signal set (title, meta, link,
//! JSON-LD scripts, anchors, headings) is tractable with disciplined
//! patterns and stays robust on malformed markup. Extraction never fails;
//! a missing signal is `None` or an empty list.

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::inventory::normalize_url;

/// One `<link rel="alternate" hreflang>` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HreflangAlternate {
    pub lang: String,
    pub href: String,
}

/// One heading with its level (1-6)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

/// One anchor, resolved absolute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLink {
    pub href: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
}

/// The parsed head-level projection of one HTML document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedSignals {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub canonical: Option<String>,
    pub robots_meta: Option<String>,
    pub hreflang: Vec<HreflangAlternate>,
    pub headings: Vec<Heading>,
    /// Parsed JSON-LD blocks; parse failures become
    /// `{"_parseError": true, "_raw": <first 500 chars>}` sentinels
    pub json_ld: Vec<Value>,
    pub internal_links: Vec<PageLink>,
    pub external_links: Vec<PageLink>,
    pub lang: Option<String>,
    pub dir: Option<String>,
    pub word_count: usize,
}

/// Compiles the pattern set once; reused for every page in a run.
pub struct Extractor {
    re_title: Regex,
    re_meta: Regex,
    re_link: Regex,
    re_heading: Regex,
    re_script: Regex,
    re_anchor: Regex,
    re_html_open: Regex,
    re_body_open: Regex,
    re_body_block: Regex,
    re_strip_script: Regex,
    re_strip_style: Regex,
    re_strip_noscript: Regex,
    re_strip_tags: Regex,
    attr_name: Regex,
    attr_content: Regex,
    attr_rel: Regex,
    attr_href: Regex,
    attr_hreflang: Regex,
    attr_type: Regex,
    attr_lang: Regex,
    attr_dir: Regex,
}

/// Attribute matcher tolerant of double-quoted, single-quoted, and
/// unquoted forms.
fn attr_regex(name: &str) -> Regex {
    Regex::new(&format!(
        r#"(?i)\b{}\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#,
        name
    ))
    .expect("valid regex")
}

impl Extractor {
    pub fn new() -> Self {
        Self {
            re_title: Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"),
            re_meta: Regex::new(r"(?i)<meta\b[^>]*>").expect("valid regex"),
            re_link: Regex::new(r"(?i)<link\b[^>]*>").expect("valid regex"),
            re_heading: Regex::new(r"(?is)<h([1-6])\b[^>]*>(.*?)</h[1-6]\s*>")
                .expect("valid regex"),
            re_script: Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>")
                .expect("valid regex"),
            re_anchor: Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a\s*>").expect("valid regex"),
            re_html_open: Regex::new(r"(?i)<html\b([^>]*)>").expect("valid regex"),
            re_body_open: Regex::new(r"(?i)<body\b([^>]*)>").expect("valid regex"),
            re_body_block: Regex::new(r"(?is)<body\b[^>]*>(.*?)</body\s*>").expect("valid regex"),
            re_strip_script: Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>")
                .expect("valid regex"),
            re_strip_style: Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("valid regex"),
            re_strip_noscript: Regex::new(r"(?is)<noscript\b[^>]*>.*?</noscript\s*>")
                .expect("valid regex"),
            re_strip_tags: Regex::new(r"(?s)<[^>]*>").expect("valid regex"),
            attr_name: attr_regex("name"),
            attr_content: attr_regex("content"),
            attr_rel: attr_regex("rel"),
            attr_href: attr_regex("href"),
            attr_hreflang: attr_regex("hreflang"),
            attr_type: attr_regex("type"),
            attr_lang: attr_regex("lang"),
            attr_dir: attr_regex("dir"),
        }
    }

    /// Extract all signals from one document.
    pub fn extract(&self, html: &str, page_url: &str, base_url: &str) -> ExtractedSignals {
        let mut signals = ExtractedSignals {
            title: self.extract_title(html),
            meta_description: self.extract_meta(html, "description"),
            robots_meta: self.extract_meta(html, "robots"),
            canonical: self.extract_canonical(html),
            hreflang: self.extract_hreflang(html),
            headings: self.extract_headings(html),
            json_ld: self.extract_json_ld(html),
            ..Default::default()
        };

        let (internal, external) = self.extract_links(html, page_url, base_url);
        signals.internal_links = internal;
        signals.external_links = external;

        let (lang, dir) = self.extract_lang_dir(html);
        signals.lang = lang;
        signals.dir = dir;
        signals.word_count = self.count_words(html);

        signals
    }

    fn attr(&self, tag: &str, which: &Regex) -> Option<String> {
        which.captures(tag).map(|cap| {
            let raw = cap
                .get(1)
                .or_else(|| cap.get(2))
                .or_else(|| cap.get(3))
                .map(|m| m.as_str())
                .unwrap_or("");
            decode(raw)
        })
    }

    fn extract_title(&self, html: &str) -> Option<String> {
        self.re_title
            .captures(html)
            .and_then(|cap| cap.get(1))
            .map(|m| self.to_text(m.as_str()))
    }

    fn extract_meta(&self, html: &str, name: &str) -> Option<String> {
        for tag in self.re_meta.find_iter(html) {
            let tag = tag.as_str();
            if let Some(tag_name) = self.attr(tag, &self.attr_name) {
                if tag_name.eq_ignore_ascii_case(name) {
                    return self.attr(tag, &self.attr_content);
                }
            }
        }
        None
    }

    fn extract_canonical(&self, html: &str) -> Option<String> {
        for tag in self.re_link.find_iter(html) {
            let tag = tag.as_str();
            if let Some(rel) = self.attr(tag, &self.attr_rel) {
                if rel.trim().eq_ignore_ascii_case("canonical") {
                    return self.attr(tag, &self.attr_href);
                }
            }
        }
        None
    }

    /// Hreflang alternates. The per-attribute matcher is order-insensitive
    /// so both rel-then-hreflang and hreflang-then-rel forms are covered;
    /// duplicates collapse.
    fn extract_hreflang(&self, html: &str) -> Vec<HreflangAlternate> {
        let mut alternates = Vec::new();
        for tag in self.re_link.find_iter(html) {
            let tag = tag.as_str();
            let rel = self.attr(tag, &self.attr_rel);
            if !rel.is_some_and(|r| r.trim().eq_ignore_ascii_case("alternate")) {
                continue;
            }
            let (Some(lang), Some(href)) = (
                self.attr(tag, &self.attr_hreflang),
                self.attr(tag, &self.attr_href),
            ) else {
                continue;
            };
            let alternate = HreflangAlternate { lang, href };
            if !alternates.contains(&alternate) {
                alternates.push(alternate);
            }
        }
        alternates
    }

    fn extract_headings(&self, html: &str) -> Vec<Heading> {
        self.re_heading
            .captures_iter(html)
            .filter_map(|cap| {
                let level: u8 = cap.get(1)?.as_str().parse().ok()?;
                let text = self.to_text(cap.get(2)?.as_str());
                Some(Heading { level, text })
            })
            .collect()
    }

    fn extract_json_ld(&self, html: &str) -> Vec<Value> {
        let mut blocks = Vec::new();
        for cap in self.re_script.captures_iter(html) {
            let attrs = cap.get(1).map(|m| m.as_str()).unwrap_or("");
            let script_type = self.attr(attrs, &self.attr_type).unwrap_or_default();
            if !script_type.trim().eq_ignore_ascii_case("application/ld+json") {
                continue;
            }
            let raw = cap.get(2).map(|m| m.as_str()).unwrap_or("").trim().to_string();
            match serde_json::from_str::<Value>(&raw) {
                Ok(value) => blocks.push(value),
                Err(_) => blocks.push(json!({
                    "_parseError": true,
                    "_raw": raw.chars().take(500).collect::<String>(),
                })),
            }
        }
        blocks
    }

    fn extract_links(
        &self,
        html: &str,
        page_url: &str,
        base_url: &str,
    ) -> (Vec<PageLink>, Vec<PageLink>) {
        let page = Url::parse(page_url).ok();
        let base_host = Url::parse(base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string));

        let mut internal = Vec::new();
        let mut external = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for cap in self.re_anchor.captures_iter(html) {
            let attrs = cap.get(1).map(|m| m.as_str()).unwrap_or("");
            let Some(href) = self.attr(attrs, &self.attr_href) else {
                continue;
            };
            let href = href.trim().to_string();
            if href.is_empty() || href == "#" || has_skipped_scheme(&href) {
                continue;
            }

            let Some(resolved) = page.as_ref().and_then(|p| p.join(&href).ok()) else {
                continue;
            };

            let dedup_key = normalize_url(resolved.as_ref());
            if !seen.insert(dedup_key) {
                continue;
            }

            let link = PageLink {
                href: resolved.to_string(),
                text: self.to_text(cap.get(2).map(|m| m.as_str()).unwrap_or("")),
                rel: self.attr(attrs, &self.attr_rel),
            };

            let is_internal = match (&base_host, resolved.host_str()) {
                (Some(base), Some(host)) => base.eq_ignore_ascii_case(host),
                _ => href.starts_with('/') || href.starts_with('#') || href.starts_with('?'),
            };

            if is_internal {
                internal.push(link);
            } else {
                external.push(link);
            }
        }

        (internal, external)
    }

    fn extract_lang_dir(&self, html: &str) -> (Option<String>, Option<String>) {
        let html_attrs = self
            .re_html_open
            .captures(html)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        let lang = self.attr(&html_attrs, &self.attr_lang);
        let mut dir = self.attr(&html_attrs, &self.attr_dir);

        if dir.is_none() {
            if let Some(body_attrs) = self
                .re_body_open
                .captures(html)
                .and_then(|cap| cap.get(1))
                .map(|m| m.as_str())
            {
                dir = self.attr(body_attrs, &self.attr_dir);
            }
        }

        (lang, dir)
    }

    fn count_words(&self, html: &str) -> usize {
        let body = self
            .re_body_block
            .captures(html)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str())
            .unwrap_or(html);
        self.to_text(body).split_whitespace().count()
    }

    /// Strip scripts, styles, noscript, and tags down to collapsed text.
    fn to_text(&self, fragment: &str) -> String {
        let without_script = self.re_strip_script.replace_all(fragment, " ");
        let without_style = self.re_strip_style.replace_all(&without_script, " ");
        let without_noscript = self.re_strip_noscript.replace_all(&without_style, " ");
        let without_tags = self.re_strip_tags.replace_all(&without_noscript, " ");
        let decoded = decode(&without_tags);
        decoded.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

fn decode(raw: &str) -> String {
    html_escape::decode_html_entities(raw).into_owned()
}

fn has_skipped_scheme(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    lower.starts_with("mailto:") || lower.starts_with("tel:") || lower.starts_with("javascript:")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://ex.com";
    const PAGE: &str = "https://ex.com/page";

    fn extract(html: &str) -> ExtractedSignals {
        Extractor::new().extract(html, PAGE, BASE)
    }

    #[test]
    fn test_title_and_description() {
        let signals = extract(
            r#"<html><head><title> Hello &amp; Welcome </title>
            <meta name="description" content="A fine page"></head></html>"#,
        );
        assert_eq!(signals.title.as_deref(), Some("Hello & Welcome"));
        assert_eq!(signals.meta_description.as_deref(), Some("A fine page"));
    }

    #[test]
    fn test_unquoted_and_single_quoted_attributes() {
        let signals = extract(
            r#"<meta name=robots content='noindex, nofollow'>
               <link rel=canonical href=https://ex.com/page>"#,
        );
        assert_eq!(signals.robots_meta.as_deref(), Some("noindex, nofollow"));
        assert_eq!(signals.canonical.as_deref(), Some("https://ex.com/page"));
    }

    #[test]
    fn test_hreflang_both_attribute_orders_dedup() {
        let signals = extract(
            r#"<link rel="alternate" hreflang="en-GB" href="https://ex.com/page">
               <link hreflang="en-GB" rel="alternate" href="https://ex.com/page">
               <link rel="alternate" hreflang="ar" href="https://ex.com/ar/page">"#,
        );
        assert_eq!(signals.hreflang.len(), 2);
        assert_eq!(signals.hreflang[0].lang, "en-GB");
        assert_eq!(signals.hreflang[1].lang, "ar");
    }

    #[test]
    fn test_headings_are_ordered_and_stripped() {
        let signals = extract(
            "<h1>Main <em>Topic</em></h1><h2> Sub &gt; Section </h2><h3></h3>",
        );
        assert_eq!(signals.headings.len(), 3);
        assert_eq!(signals.headings[0].level, 1);
        assert_eq!(signals.headings[0].text, "Main Topic");
        assert_eq!(signals.headings[1].text, "Sub > Section");
        assert_eq!(signals.headings[2].text, "");
    }

    #[test]
    fn test_json_ld_parse_error_sentinel() {
        let signals = extract(
            r#"<script type="application/ld+json">{"@type": "WebSite"}</script>
               <script type="application/ld+json">{broken</script>
               <script>var x = 1;</script>"#,
        );
        assert_eq!(signals.json_ld.len(), 2);
        assert_eq!(signals.json_ld[0]["@type"], "WebSite");
        assert_eq!(signals.json_ld[1]["_parseError"], true);
        assert_eq!(signals.json_ld[1]["_raw"], "{broken");
    }

    #[test]
    fn test_links_resolved_classified_deduped() {
        let signals = extract(
            r##"<a href="/blog">Blog</a>
               <a href="/blog/">Blog again</a>
               <a href="https://other.com/x" rel="nofollow">Out</a>
               <a href="mailto:hi@ex.com">Mail</a>
               <a href="#">Anchor</a>
               <a href="//cdn.other.com/lib">Proto-relative</a>"##,
        );
        assert_eq!(signals.internal_links.len(), 1);
        assert_eq!(signals.internal_links[0].href, "https://ex.com/blog");
        assert_eq!(signals.external_links.len(), 2);
        assert_eq!(signals.external_links[0].rel.as_deref(), Some("nofollow"));
    }

    #[test]
    fn test_lang_dir_with_body_fallback() {
        let signals = extract(r#"<html lang="ar"><body dir="rtl">text</body></html>"#);
        assert_eq!(signals.lang.as_deref(), Some("ar"));
        assert_eq!(signals.dir.as_deref(), Some("rtl"));
    }

    #[test]
    fn test_word_count_ignores_scripts_and_tags() {
        let signals = extract(
            r#"<body><p>one two</p><script>ignored tokens here</script>
               <style>.a{color:red}</style> three</body>"#,
        );
        assert_eq!(signals.word_count, 3);
    }

    #[test]
    fn test_malformed_html_yields_empty_signals() {
        let signals = extract("<<<>>> not even close <title>ok");
        assert!(signals.title.is_none());
        assert!(signals.headings.is_empty());
        assert!(signals.json_ld.is_empty());
    }
}
