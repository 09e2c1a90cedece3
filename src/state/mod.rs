//! Run state persistence
//!
//! One directory per run under the output root. `state.json` is rewritten
//! after every batch as a monotonically-growing view of progress;
//! `crawl-results.json` snapshots the fetched pages so a resumed run picks
//! up exactly where the previous one stopped.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::crawler::CrawlResult;
use crate::error::{AuditError, Result};

/// Overall run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Paused,
    Completed,
    Failed,
}

/// Status of one crawl batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Pending,
    Completed,
    Failed,
}

/// One slice of the inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlBatch {
    pub index: usize,
    pub urls: Vec<String>,
    pub status: BatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Progress counters recomputed on every save
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub total_urls: usize,
    pub processed_urls: usize,
}

/// One recorded run-level error
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunError {
    pub time: DateTime<Utc>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Durable run descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditState {
    pub run_id: String,
    pub site_id: String,
    pub mode: String,
    pub base_url: String,
    pub status: RunStatus,
    pub batches: Vec<CrawlBatch>,
    pub completed_batches: BTreeSet<usize>,
    pub issues_found: usize,
    pub progress: Progress,
    pub errors: Vec<RunError>,
    pub started_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl AuditState {
    pub fn mark_batch_started(&mut self, index: usize) {
        if let Some(batch) = self.batches.get_mut(index) {
            batch.started_at = Some(Utc::now());
        }
    }

    pub fn mark_batch_completed(&mut self, index: usize, issues_found: usize) {
        if let Some(batch) = self.batches.get_mut(index) {
            batch.status = BatchStatus::Completed;
            batch.finished_at = Some(Utc::now());
            self.completed_batches.insert(index);
            self.issues_found += issues_found;
        }
    }

    pub fn mark_batch_failed(&mut self, index: usize, error: impl Into<String>) {
        if let Some(batch) = self.batches.get_mut(index) {
            batch.status = BatchStatus::Failed;
            batch.finished_at = Some(Utc::now());
            batch.error = Some(error.into());
        }
    }

    pub fn record_error(&mut self, message: impl Into<String>, url: Option<String>) {
        self.errors.push(RunError {
            time: Utc::now(),
            message: message.into(),
            url,
        });
    }

    /// Batch indices still pending, in ascending order.
    pub fn pending_batch_indices(&self) -> Vec<usize> {
        self.batches
            .iter()
            .filter(|b| b.status == BatchStatus::Pending)
            .map(|b| b.index)
            .collect()
    }
}

/// Unique per site: `<siteId>-YYYYMMDD-HHMMSS-<4hex>`.
pub fn generate_run_id(site_id: &str) -> String {
    let stamp = Utc::now().format("%Y%m%d-%H%M%S");
    let nonce = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", site_id, stamp, &nonce[..4])
}

/// Owns the output root and all state file I/O.
pub struct StateManager {
    output_dir: PathBuf,
}

impl StateManager {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.output_dir.join(run_id)
    }

    /// Materialize a fresh state: URLs sliced into batches, all pending.
    pub fn create_state(
        &self,
        run_id: &str,
        site_id: &str,
        mode: &str,
        base_url: &str,
        urls: &[String],
        batch_size: usize,
    ) -> AuditState {
        let batches: Vec<CrawlBatch> = urls
            .chunks(batch_size.max(1))
            .enumerate()
            .map(|(index, chunk)| CrawlBatch {
                index,
                urls: chunk.to_vec(),
                status: BatchStatus::Pending,
                started_at: None,
                finished_at: None,
                error: None,
            })
            .collect();

        let now = Utc::now();
        AuditState {
            run_id: run_id.to_string(),
            site_id: site_id.to_string(),
            mode: mode.to_string(),
            base_url: base_url.to_string(),
            status: RunStatus::Running,
            batches,
            completed_batches: BTreeSet::new(),
            issues_found: 0,
            progress: Progress {
                total_urls: urls.len(),
                processed_urls: 0,
            },
            errors: Vec::new(),
            started_at: now,
            last_updated: now,
        }
    }

    /// Recompute progress, bump `lastUpdated`, and rewrite `state.json`.
    pub fn save_state(&self, state: &mut AuditState) -> Result<()> {
        state.progress.processed_urls = state
            .batches
            .iter()
            .filter(|b| b.status == BatchStatus::Completed)
            .map(|b| b.urls.len())
            .sum();
        state.last_updated = Utc::now();

        let dir = self.run_dir(&state.run_id);
        std::fs::create_dir_all(&dir)?;
        let json = serde_json::to_string_pretty(state)?;
        std::fs::write(dir.join("state.json"), json)?;
        debug!("Saved state for run {}", state.run_id);
        Ok(())
    }

    pub fn load_state(&self, run_id: &str) -> Result<AuditState> {
        let path = self.run_dir(run_id).join("state.json");
        let text = std::fs::read_to_string(&path).map_err(|e| AuditError::StateError {
            run_id: run_id.to_string(),
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        serde_json::from_str(&text).map_err(|e| AuditError::StateError {
            run_id: run_id.to_string(),
            reason: format!("state.json does not parse: {}", e),
        })
    }

    /// Latest run for a site: directory scan filtered by prefix,
    /// reverse-sorted lexicographically.
    pub fn find_latest_run_id(&self, site_id: &str) -> Result<Option<String>> {
        let prefix = format!("{}-", site_id);
        let entries = match std::fs::read_dir(&self.output_dir) {
            Ok(entries) => entries,
            Err(_) => return Ok(None),
        };

        let mut run_ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.starts_with(&prefix))
            .collect();
        run_ids.sort_by(|a, b| b.cmp(a));

        Ok(run_ids.into_iter().next())
    }

    /// Full snapshot of crawl results as `[url, result]` pairs, sorted by
    /// URL so reruns produce identical files.
    pub fn save_crawl_results(
        &self,
        run_id: &str,
        results: &HashMap<String, CrawlResult>,
    ) -> Result<()> {
        let mut pairs: Vec<(&String, &CrawlResult)> = results.iter().collect();
        pairs.sort_by_key(|(url, _)| url.to_string());

        let dir = self.run_dir(run_id);
        std::fs::create_dir_all(&dir)?;
        let json = serde_json::to_string(&pairs)?;
        std::fs::write(dir.join("crawl-results.json"), json)?;
        Ok(())
    }

    pub fn load_crawl_results(&self, run_id: &str) -> Result<HashMap<String, CrawlResult>> {
        let path = self.run_dir(run_id).join("crawl-results.json");
        if !path.exists() {
            info!("No cached crawl results for run {}", run_id);
            return Ok(HashMap::new());
        }
        let text = std::fs::read_to_string(&path)?;
        let pairs: Vec<(String, CrawlResult)> = serde_json::from_str(&text)?;
        Ok(pairs.into_iter().collect())
    }

    /// Inventory entries written at run creation (undecorated) and again,
    /// decorated, when the run completes. Resume reads them back.
    pub fn save_inventory(
        &self,
        run_id: &str,
        entries: &[crate::inventory::UrlInventoryEntry],
    ) -> Result<()> {
        let dir = self.run_dir(run_id);
        std::fs::create_dir_all(&dir)?;
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(dir.join("url_inventory.json"), json)?;
        Ok(())
    }

    pub fn load_inventory(&self, run_id: &str) -> Result<Vec<crate::inventory::UrlInventoryEntry>> {
        let path = self.run_dir(run_id).join("url_inventory.json");
        if !path.exists() {
            return Ok(Vec::new());
        }
        let text = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Raw sitemap text cached at run creation so resumed runs can still
    /// validate it without refetching.
    pub fn save_sitemap_snapshot(&self, run_id: &str, xml: &str) -> Result<()> {
        let dir = self.run_dir(run_id);
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join("sitemap.xml"), xml)?;
        Ok(())
    }

    pub fn load_sitemap_snapshot(&self, run_id: &str) -> String {
        std::fs::read_to_string(self.run_dir(run_id).join("sitemap.xml")).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://ex.com/p{}", i)).collect()
    }

    #[test]
    fn test_run_id_shape() {
        let run_id = generate_run_id("demo");
        assert!(run_id.starts_with("demo-"));
        let parts: Vec<&str> = run_id.split('-').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 6);
        assert_eq!(parts[3].len(), 4);
    }

    #[test]
    fn test_create_state_slices_batches() {
        let manager = StateManager::new(tempfile::tempdir().unwrap().path());
        let state = manager.create_state("r", "demo", "full", "https://ex.com", &urls(5), 2);
        assert_eq!(state.batches.len(), 3);
        assert_eq!(state.batches[0].urls.len(), 2);
        assert_eq!(state.batches[2].urls.len(), 1);
        assert_eq!(state.progress.total_urls, 5);
        assert_eq!(state.pending_batch_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let manager = StateManager::new(dir.path());
        let mut state =
            manager.create_state("demo-20260801-101500-ab12", "demo", "full", "https://ex.com", &urls(4), 2);

        state.mark_batch_started(0);
        state.mark_batch_completed(0, 3);
        manager.save_state(&mut state).unwrap();

        let loaded = manager.load_state("demo-20260801-101500-ab12").unwrap();
        assert_eq!(loaded.progress.processed_urls, 2);
        assert_eq!(loaded.issues_found, 3);
        assert!(loaded.completed_batches.contains(&0));
        assert_eq!(loaded.pending_batch_indices(), vec![1]);
    }

    #[test]
    fn test_completed_batches_matches_status_invariant() {
        let manager = StateManager::new(tempfile::tempdir().unwrap().path());
        let mut state = manager.create_state("r", "demo", "full", "https://ex.com", &urls(6), 2);
        state.mark_batch_completed(0, 0);
        state.mark_batch_completed(2, 1);
        state.mark_batch_failed(1, "boom");

        for index in &state.completed_batches {
            assert_eq!(state.batches[*index].status, BatchStatus::Completed);
        }
        assert!(!state.completed_batches.contains(&1));
    }

    #[test]
    fn test_find_latest_run_id() {
        let dir = tempfile::tempdir().unwrap();
        let manager = StateManager::new(dir.path());
        for run in [
            "demo-20260710-090000-aaaa",
            "demo-20260801-110000-bbbb",
            "other-20260801-120000-cccc",
        ] {
            std::fs::create_dir_all(dir.path().join(run)).unwrap();
        }

        let latest = manager.find_latest_run_id("demo").unwrap();
        assert_eq!(latest.as_deref(), Some("demo-20260801-110000-bbbb"));
        assert_eq!(manager.find_latest_run_id("missing").unwrap(), None);
    }

    #[test]
    fn test_crawl_results_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let manager = StateManager::new(dir.path());
        let now = Utc::now();
        let mut results = HashMap::new();
        results.insert(
            "https://ex.com/a".to_string(),
            CrawlResult {
                url: "https://ex.com/a".to_string(),
                final_url: "https://ex.com/a".to_string(),
                status: 200,
                redirect_chain: Vec::new(),
                headers: HashMap::new(),
                body: "<html></html>".to_string(),
                started_at: now,
                finished_at: now,
                duration_ms: 12,
                error: None,
            },
        );

        manager.save_crawl_results("r1", &results).unwrap();
        let loaded = manager.load_crawl_results("r1").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["https://ex.com/a"].status, 200);
        assert_eq!(manager.load_crawl_results("r2").unwrap().len(), 0);
    }
}
