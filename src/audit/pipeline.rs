//! Audit pipeline - Orchestrates the complete audit
//!
//! Sequences inventory, batched crawling with durable state, signal
//! extraction, validators, risk scanners, gate evaluation, and report
//! writing. Batch failures are recorded in state and never abort the run.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::AuditConfig;
use crate::crawler::{build_client, crawl_batch, CrawlResult, RateGate};
use crate::error::{AuditError, Result};
use crate::extractor::{ExtractedSignals, Extractor};
use crate::inventory::{build_inventory, extract_loc_values, normalize_url, UrlInventoryEntry};
use crate::output::write_run_artifacts;
use crate::risk::run_risk_scanners;
use crate::state::{generate_run_id, AuditState, RunStatus, StateManager};
use crate::validators::run_validators;

use super::gates::{evaluate_hard_gates, evaluate_soft_gates};
use super::result::AuditRunResult;

/// Progress callback: (processed URLs, total URLs, last URL)
pub type ProgressCallback = Arc<dyn Fn(usize, usize, &str) + Send + Sync>;

const QUICK_MODE_URL_CAP: usize = 25;

/// The audit engine for one site
pub struct AuditEngine {
    config: AuditConfig,
    mode: String,
    client: Client,
    state_manager: StateManager,
    extractor: Extractor,
    progress: Option<ProgressCallback>,
}

impl AuditEngine {
    pub fn new(config: AuditConfig, mode: impl Into<String>) -> Result<Self> {
        let client = build_client(&config.crawl)?;
        let state_manager = StateManager::new(&config.output_dir);
        Ok(Self {
            config,
            mode: mode.into(),
            client,
            state_manager,
            extractor: Extractor::new(),
            progress: None,
        })
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Run a fresh audit from a new inventory.
    pub async fn run(&self) -> Result<AuditRunResult> {
        let base_url = self.config.base_url.trim_end_matches('/').to_string();
        info!("Building inventory for {}", base_url);

        let mut inventory = build_inventory(&self.client, &self.config).await?;
        if self.mode == "quick" && inventory.urls.len() > QUICK_MODE_URL_CAP {
            info!(
                "Quick mode: capping inventory from {} to {} URLs",
                inventory.urls.len(),
                QUICK_MODE_URL_CAP
            );
            inventory.urls.truncate(QUICK_MODE_URL_CAP);
            inventory.entries.truncate(QUICK_MODE_URL_CAP);
        }

        let run_id = generate_run_id(&self.config.site_id);
        info!("Starting run {} over {} URLs", run_id, inventory.urls.len());

        let mut state = self.state_manager.create_state(
            &run_id,
            &self.config.site_id,
            &self.mode,
            &base_url,
            &inventory.urls,
            self.config.crawl.batch_size,
        );
        self.state_manager.save_state(&mut state)?;
        self.state_manager
            .save_sitemap_snapshot(&run_id, &inventory.sitemap_xml)?;
        self.state_manager
            .save_inventory(&run_id, &inventory.entries)?;
        self.write_config_snapshot(&run_id)?;

        let mut results = HashMap::new();
        self.execute_pending_batches(&mut state, &mut results).await?;

        self.finish(state, results, inventory.entries, inventory.sitemap_xml)
    }

    /// Resume an interrupted run, picking up at the first pending batch.
    pub async fn resume(&self, run_id: Option<&str>) -> Result<AuditRunResult> {
        let run_id = match run_id {
            Some(id) => id.to_string(),
            None => self
                .state_manager
                .find_latest_run_id(&self.config.site_id)?
                .ok_or_else(|| AuditError::RunNotFound {
                    site_id: self.config.site_id.clone(),
                })?,
        };
        info!("Resuming run {}", run_id);

        let mut state = self.state_manager.load_state(&run_id)?;
        state.status = RunStatus::Running;
        self.state_manager.save_state(&mut state)?;

        let mut results = self.state_manager.load_crawl_results(&run_id)?;
        info!(
            "Restored {} cached crawl results, {} batch(es) pending",
            results.len(),
            state.pending_batch_indices().len()
        );

        let sitemap_xml = self.state_manager.load_sitemap_snapshot(&run_id);
        let entries = self.state_manager.load_inventory(&run_id)?;

        self.execute_pending_batches(&mut state, &mut results).await?;

        self.finish(state, results, entries, sitemap_xml)
    }

    /// Crawl every pending batch in ascending index order, saving state and
    /// the crawl-results snapshot after each batch.
    async fn execute_pending_batches(
        &self,
        state: &mut AuditState,
        results: &mut HashMap<String, CrawlResult>,
    ) -> Result<()> {
        let gate = Arc::new(RateGate::new(self.config.crawl.rate_delay_ms));
        let total_urls = state.progress.total_urls;

        for index in state.pending_batch_indices() {
            let urls = state.batches[index].urls.clone();
            debug!("Crawling batch {} ({} URLs)", index, urls.len());

            state.mark_batch_started(index);
            self.state_manager.save_state(state)?;

            match crawl_batch(&self.client, &urls, &self.config.crawl, Arc::clone(&gate)).await {
                Ok(batch_results) => {
                    let mut failures = 0;
                    for result in batch_results {
                        if let Some(error) = &result.error {
                            failures += 1;
                            state.record_error(error.clone(), Some(result.url.clone()));
                        }
                        results.insert(result.url.clone(), result);
                    }
                    state.mark_batch_completed(index, failures);
                }
                Err(e) => {
                    warn!("Batch {} failed: {}", index, e);
                    state.mark_batch_failed(index, e.to_string());
                    state.record_error(format!("batch {} failed: {}", index, e), None);
                }
            }

            self.state_manager.save_state(state)?;
            self.state_manager
                .save_crawl_results(&state.run_id, results)?;

            if let Some(progress) = &self.progress {
                let last_url = state.batches[index].urls.last().cloned().unwrap_or_default();
                progress(state.progress.processed_urls, total_urls, &last_url);
            }
        }

        Ok(())
    }

    /// Extract, validate, scan, gate, decorate, persist, and report.
    fn finish(
        &self,
        mut state: AuditState,
        results: HashMap<String, CrawlResult>,
        mut entries: Vec<UrlInventoryEntry>,
        sitemap_xml: String,
    ) -> Result<AuditRunResult> {
        let mut all_signals: HashMap<String, ExtractedSignals> = HashMap::new();
        for (url, result) in &results {
            if result.status == 200 && !result.body.is_empty() {
                let signals = self
                    .extractor
                    .extract(&result.body, url, &self.config.base_url);
                all_signals.insert(url.clone(), signals);
            }
        }
        info!("Extracted signals for {} page(s)", all_signals.len());

        let sitemap_urls: Vec<String> = extract_loc_values(&sitemap_xml)
            .iter()
            .map(|u| normalize_url(u))
            .collect();

        let mut issues = run_validators(
            &self.config,
            &results,
            &all_signals,
            &sitemap_xml,
            &sitemap_urls,
        );
        issues.extend(run_risk_scanners(
            &self.config.risk,
            self.config.base_url.trim_end_matches('/'),
            &all_signals,
        ));
        info!("Found {} issue(s)", issues.len());

        let gate_results = evaluate_hard_gates(&issues, &self.config.hard_gates);
        let soft_gates = evaluate_soft_gates(&all_signals, &self.config.validators);

        for entry in &mut entries {
            if let Some(result) = results.get(&entry.url) {
                entry.final_status = Some(result.status);
            }
            entry.issue_count = Some(issues.iter().filter(|i| i.url == entry.url).count());
        }

        state.status = RunStatus::Completed;
        state.issues_found = issues.len();
        self.state_manager.save_state(&mut state)?;

        let result = AuditRunResult {
            run_id: state.run_id.clone(),
            site_id: state.site_id.clone(),
            mode: state.mode.clone(),
            started_at: state.started_at,
            finished_at: Utc::now(),
            total_urls: state.progress.total_urls,
            issues,
            gate_results,
            soft_gates,
            inventory: entries,
        };

        write_run_artifacts(
            &self.state_manager.run_dir(&result.run_id),
            &result,
            &self.config,
        )?;

        Ok(result)
    }

    fn write_config_snapshot(&self, run_id: &str) -> Result<()> {
        let dir = self.state_manager.run_dir(run_id);
        std::fs::create_dir_all(&dir)?;
        let json = serde_json::to_string_pretty(&self.config)?;
        std::fs::write(dir.join("config_snapshot.json"), json)?;
        Ok(())
    }
}
