//! Layered config loading
//!
//! Resolution order, later layers winning: hardcoded defaults, the shared
//! `_default.audit.json`, the per-site `<siteId>.audit.json`, then runtime
//! overrides. Missing files are skipped silently; malformed JSON logs a
//! warning and is skipped.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use super::merge::deep_merge;
use super::types::AuditConfig;
use crate::error::{AuditError, Result};

/// Load the effective config for a site.
///
/// `site_id` is always forced to the argument value after the final merge,
/// so a stray `siteId` key in a config file cannot redirect a run.
pub fn load_audit_config(
    site_id: &str,
    config_dir: &Path,
    overrides: Option<Value>,
) -> Result<AuditConfig> {
    let mut merged = serde_json::to_value(AuditConfig::default())?;

    for file_name in [
        "_default.audit.json".to_string(),
        format!("{}.audit.json", site_id),
    ] {
        let path = config_dir.join(&file_name);
        if let Some(layer) = read_config_layer(&path) {
            debug!("Applying config layer: {}", path.display());
            deep_merge(&mut merged, &layer);
        }
    }

    if let Some(overrides) = overrides {
        deep_merge(&mut merged, &overrides);
    }

    if let Value::Object(map) = &mut merged {
        map.insert("siteId".to_string(), Value::String(site_id.to_string()));
    }

    let config: AuditConfig = serde_json::from_value(merged)?;
    validate(&config)?;
    Ok(config)
}

/// Read one JSON config layer, tolerating absence and malformation.
fn read_config_layer(path: &Path) -> Option<Value> {
    let text = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Skipping malformed config file {}: {}", path.display(), e);
            None
        }
    }
}

/// Validate the merged config, reporting every violation at once.
fn validate(config: &AuditConfig) -> Result<()> {
    let mut violations = Vec::new();

    if config.site_id.trim().is_empty() {
        violations.push("siteId must not be empty".to_string());
    }
    if config.base_url.trim().is_empty() {
        violations.push("baseUrl must not be empty".to_string());
    }
    if config.crawl.concurrency < 1 {
        violations.push("crawl.concurrency must be at least 1".to_string());
    }
    if config.crawl.batch_size < 1 {
        violations.push("crawl.batchSize must be at least 1".to_string());
    }
    if config.crawl.timeout_ms < 1000 {
        violations.push("crawl.timeoutMs must be at least 1000".to_string());
    }
    if config.validators.title_length.min >= config.validators.title_length.max {
        violations.push("validators.titleLength.min must be below max".to_string());
    }
    if config.validators.description_length.min >= config.validators.description_length.max {
        violations.push("validators.descriptionLength.min must be below max".to_string());
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(AuditError::ConfigError(violations.join("; ")))
    }
}
