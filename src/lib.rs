//! siteaudit - SEO compliance and spam-policy risk auditor
//!
//! Audits a public website end to end: enumerates every indexable URL,
//! fetches each once, extracts head-level SEO signals, runs a battery of
//! validators and risk scanners, and produces a deterministic verdict plus
//! a human-readable fix plan. Long runs survive interruption and resume
//! exactly where they stopped.
//!
//! ## Quick Start
//!
//! ```no_run
//! use siteaudit::audit::AuditEngine;
//! use siteaudit::config::load_audit_config;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let overrides = serde_json::json!({ "baseUrl": "https://example.com" });
//!     let config = load_audit_config("example", Path::new("config/sites"), Some(overrides))?;
//!
//!     let engine = AuditEngine::new(config, "full")?;
//!     let result = engine.run().await?;
//!
//!     println!("Verdict: {}", result.verdict());
//!     println!("Issues: {}", result.issues.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Layered configuration loading and deep merge
//! - [`inventory`]: URL inventory from sitemap, static routes, and variants
//! - [`crawler`]: Batched fetching with rate limiting and manual redirects
//! - [`extractor`]: Regex-level HTML signal extraction
//! - [`validators`]: Per-category SEO rule sets
//! - [`risk`]: Cross-page spam-policy scanners
//! - [`state`]: Durable run state and resume
//! - [`audit`]: Orchestration, gates, and run results
//! - [`output`]: Markdown reports and JSON artifacts
//! - [`cli`]: Command-line interface
//! - [`error`]: Error types

pub mod audit;
pub mod cli;
pub mod config;
pub mod crawler;
pub mod error;
pub mod extractor;
pub mod inventory;
pub mod output;
pub mod risk;
pub mod state;
pub mod validators;

// Re-export commonly used types
pub use audit::{AuditEngine, AuditRunResult, GateResult, SoftGateSummary, Verdict};
pub use config::{load_audit_config, AuditConfig};
pub use crawler::{crawl_batch, CrawlResult, RateGate};
pub use error::{AuditError, Result};
pub use extractor::{ExtractedSignals, Extractor};
pub use inventory::{build_inventory, UrlInventoryEntry, UrlSource};
pub use output::{generate_exec_summary, generate_fix_plan};
pub use state::{AuditState, StateManager};
pub use validators::{AuditIssue, IssueCategory, Severity};
