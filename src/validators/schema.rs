//! Schema validator
//!
//! Validates JSON-LD blocks: parse errors, @context and @type presence,
//! deprecated types, and route-required types.

use serde_json::Value;

use crate::config::ValidatorConfig;
use crate::extractor::ExtractedSignals;
use crate::inventory::glob_match;

use super::types::{AuditIssue, IssueCategory, Severity};

pub fn validate_schema(
    page_url: &str,
    signals: &ExtractedSignals,
    config: &ValidatorConfig,
) -> Vec<AuditIssue> {
    let mut issues = Vec::new();

    let pathname = url::Url::parse(page_url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| page_url.to_string());

    let required_types: Vec<&str> = config
        .required_schema_by_route
        .iter()
        .filter(|(pattern, _)| glob_match(pattern, &pathname))
        .flat_map(|(_, types)| types.iter().map(String::as_str))
        .collect();

    if signals.json_ld.is_empty() {
        if !required_types.is_empty() {
            issues.push(
                AuditIssue::new(
                    Severity::P1,
                    IssueCategory::Schema,
                    page_url,
                    "No structured data on a route that requires it",
                )
                .with_evidence(format!("expected types: {}", required_types.join(", "))),
            );
        }
        return issues;
    }

    let mut blocks: Vec<&Value> = Vec::new();
    for block in &signals.json_ld {
        match block {
            Value::Array(items) => blocks.extend(items.iter()),
            other => blocks.push(other),
        }
    }

    for block in &blocks {
        if block.get("_parseError").and_then(Value::as_bool) == Some(true) {
            let raw = block.get("_raw").and_then(Value::as_str).unwrap_or("");
            issues.push(
                AuditIssue::new(
                    Severity::P0,
                    IssueCategory::Schema,
                    page_url,
                    "JSON-LD block is not valid JSON",
                )
                .with_evidence(raw.to_string()),
            );
            continue;
        }

        match block.get("@context") {
            None => {
                issues.push(AuditIssue::new(
                    Severity::P1,
                    IssueCategory::Schema,
                    page_url,
                    "JSON-LD block is missing @context",
                ));
            }
            Some(context) => {
                if !context.to_string().contains("schema.org") {
                    issues.push(
                        AuditIssue::new(
                            Severity::P2,
                            IssueCategory::Schema,
                            page_url,
                            "JSON-LD @context does not reference schema.org",
                        )
                        .with_evidence(context.to_string()),
                    );
                }
            }
        }

        if block.get("@type").is_none() && block.get("@graph").is_none() {
            issues.push(AuditIssue::new(
                Severity::P1,
                IssueCategory::Schema,
                page_url,
                "JSON-LD block has neither @type nor @graph",
            ));
        }

        for block_type in type_values(block) {
            if config.deprecated_schema_types.iter().any(|t| t == &block_type) {
                issues.push(AuditIssue::new(
                    Severity::P1,
                    IssueCategory::Schema,
                    page_url,
                    format!("Deprecated schema type '{}'", block_type),
                ));
            }
        }
    }

    if !required_types.is_empty() {
        let mut page_types: Vec<String> = Vec::new();
        for block in &blocks {
            collect_types(block, &mut page_types);
        }
        for required in required_types {
            if !page_types.iter().any(|t| t == required) {
                issues.push(AuditIssue::new(
                    Severity::P1,
                    IssueCategory::Schema,
                    page_url,
                    format!("Required schema type '{}' is absent", required),
                ));
            }
        }
    }

    issues
}

/// @type values directly on one block (string or array of strings).
fn type_values(block: &Value) -> Vec<String> {
    match block.get("@type") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Union of @type values, recursing into @graph arrays.
fn collect_types(block: &Value, out: &mut Vec<String>) {
    out.extend(type_values(block));
    if let Some(Value::Array(graph)) = block.get("@graph") {
        for node in graph {
            collect_types(node, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PAGE: &str = "https://ex.com/blog/post";

    fn signals(blocks: Vec<Value>) -> ExtractedSignals {
        ExtractedSignals {
            json_ld: blocks,
            ..Default::default()
        }
    }

    fn config_requiring(pattern: &str, types: &[&str]) -> ValidatorConfig {
        let mut config = ValidatorConfig::default();
        config.required_schema_by_route.insert(
            pattern.to_string(),
            types.iter().map(|s| s.to_string()).collect(),
        );
        config
    }

    #[test]
    fn test_parse_error_sentinel_is_p0() {
        let blocks = vec![json!({"_parseError": true, "_raw": "{broken"})];
        let issues = validate_schema(PAGE, &signals(blocks), &ValidatorConfig::default());
        assert_eq!(issues[0].severity, Severity::P0);
        assert_eq!(issues[0].evidence.as_deref(), Some("{broken"));
    }

    #[test]
    fn test_missing_context_and_type() {
        let blocks = vec![json!({"name": "nothing else"})];
        let issues = validate_schema(PAGE, &signals(blocks), &ValidatorConfig::default());
        assert!(issues.iter().any(|i| i.message.contains("@context")));
        assert!(issues.iter().any(|i| i.message.contains("neither @type")));
    }

    #[test]
    fn test_non_schema_org_context_is_p2() {
        let blocks = vec![json!({"@context": "https://example.org/vocab", "@type": "Thing"})];
        let issues = validate_schema(PAGE, &signals(blocks), &ValidatorConfig::default());
        assert!(issues
            .iter()
            .any(|i| i.severity == Severity::P2 && i.message.contains("schema.org")));
    }

    #[test]
    fn test_deprecated_type() {
        let blocks = vec![json!({"@context": "https://schema.org", "@type": "Blog"})];
        let issues = validate_schema(PAGE, &signals(blocks), &ValidatorConfig::default());
        assert!(issues.iter().any(|i| i.message.contains("Deprecated")));
    }

    #[test]
    fn test_required_type_found_in_graph() {
        let blocks = vec![json!({
            "@context": "https://schema.org",
            "@graph": [
                {"@type": "WebPage"},
                {"@type": "BlogPosting", "author": {"name": "A"}}
            ]
        })];
        let config = config_requiring("/blog/**", &["BlogPosting"]);
        let issues = validate_schema(PAGE, &signals(blocks), &config);
        assert!(!issues.iter().any(|i| i.message.contains("absent")));
    }

    #[test]
    fn test_required_type_missing() {
        let blocks = vec![json!({"@context": "https://schema.org", "@type": "WebPage"})];
        let config = config_requiring("/blog/**", &["BlogPosting"]);
        let issues = validate_schema(PAGE, &signals(blocks), &config);
        assert!(issues
            .iter()
            .any(|i| i.severity == Severity::P1 && i.message.contains("'BlogPosting'")));
    }

    #[test]
    fn test_no_json_ld_on_required_route() {
        let config = config_requiring("/blog/**", &["BlogPosting"]);
        let issues = validate_schema(PAGE, &signals(vec![]), &config);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("No structured data"));
    }

    #[test]
    fn test_no_json_ld_off_required_route_is_clean() {
        let config = config_requiring("/products/**", &["Product"]);
        let issues = validate_schema(PAGE, &signals(vec![]), &config);
        assert!(issues.is_empty());
    }
}
