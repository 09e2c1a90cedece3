//! Report and artifact writers
//!
//! Renders the markdown reports and writes every per-run JSON artifact
//! under `<outputDir>/<runId>/`.

mod exec_summary;
mod fix_plan;

pub use exec_summary::generate_exec_summary;
pub use fix_plan::generate_fix_plan;

use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::audit::AuditRunResult;
use crate::config::AuditConfig;
use crate::error::{AuditError, Result};

/// Write every end-of-run artifact.
///
/// State and crawl snapshots are owned by the state manager; this covers
/// the final structured outputs and the human-readable reports.
pub fn write_run_artifacts(
    run_dir: &Path,
    result: &AuditRunResult,
    config: &AuditConfig,
) -> Result<()> {
    std::fs::create_dir_all(run_dir)?;

    write_json(run_dir.join("result.json"), result)?;
    write_json(run_dir.join("issues.json"), &result.issues)?;
    write_json(run_dir.join("url_inventory.json"), &result.inventory)?;
    write_json(run_dir.join("config_snapshot.json"), config)?;

    write_text(
        run_dir.join("EXEC_SUMMARY.md"),
        &generate_exec_summary(result),
    )?;
    write_text(run_dir.join("FIX_PLAN.md"), &generate_fix_plan(result))?;
    append_changelog(run_dir, result)?;

    info!("Wrote run artifacts to {}", run_dir.display());
    Ok(())
}

fn write_json<T: Serialize>(path: std::path::PathBuf, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_text(path, &json)
}

fn write_text(path: std::path::PathBuf, content: &str) -> Result<()> {
    std::fs::write(&path, content).map_err(|e| AuditError::FileError {
        path,
        reason: e.to_string(),
    })
}

/// Append one run entry to CHANGELOG.md, creating the file on first use.
fn append_changelog(run_dir: &Path, result: &AuditRunResult) -> Result<()> {
    let path = run_dir.join("CHANGELOG.md");
    let mut log = std::fs::read_to_string(&path).unwrap_or_default();
    if log.is_empty() {
        log.push_str("# Audit Changelog\n");
    }

    log.push_str(&format!(
        "\n## {} run {}\n- verdict: {}\n- urls: {}\n- issues: {} (P0 {}, P1 {}, P2 {})\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        result.run_id,
        result.verdict(),
        result.total_urls,
        result.issues.len(),
        result.severity_count(crate::validators::Severity::P0),
        result.severity_count(crate::validators::Severity::P1),
        result.severity_count(crate::validators::Severity::P2),
    ));

    write_text(path, &log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn empty_result() -> AuditRunResult {
        let now = Utc::now();
        AuditRunResult {
            run_id: "demo-20260801-101500-ab12".to_string(),
            site_id: "demo".to_string(),
            mode: "full".to_string(),
            started_at: now,
            finished_at: now,
            total_urls: 0,
            issues: Vec::new(),
            gate_results: Vec::new(),
            soft_gates: Vec::new(),
            inventory: Vec::new(),
        }
    }

    #[test]
    fn test_all_artifacts_written() {
        let dir = tempfile::tempdir().unwrap();
        let config = AuditConfig {
            site_id: "demo".to_string(),
            base_url: "https://ex.com".to_string(),
            ..Default::default()
        };
        write_run_artifacts(dir.path(), &empty_result(), &config).unwrap();

        for file in [
            "result.json",
            "issues.json",
            "url_inventory.json",
            "config_snapshot.json",
            "EXEC_SUMMARY.md",
            "FIX_PLAN.md",
            "CHANGELOG.md",
        ] {
            assert!(dir.path().join(file).exists(), "missing {}", file);
        }
    }

    #[test]
    fn test_changelog_appends() {
        let dir = tempfile::tempdir().unwrap();
        let result = empty_result();
        append_changelog(dir.path(), &result).unwrap();
        append_changelog(dir.path(), &result).unwrap();

        let log = std::fs::read_to_string(dir.path().join("CHANGELOG.md")).unwrap();
        assert_eq!(log.matches("## ").count(), 2);
        assert_eq!(log.matches("# Audit Changelog").count(), 1);
    }
}
