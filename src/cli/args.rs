//! CLI argument parsing using clap
//!
//! Defines all command-line arguments and their validation.

use clap::{Parser, ValueEnum};
use serde_json::{json, Value};
use std::path::PathBuf;

/// siteaudit - SEO compliance and spam-policy risk auditor
///
/// Crawls a site's indexable URLs, extracts head-level SEO signals, runs
/// validators and risk scanners, and writes a verdict plus a fix plan.
#[derive(Parser, Debug)]
#[command(
    name = "siteaudit",
    version,
    about = "SEO compliance and spam-policy risk auditor",
    long_about = "siteaudit enumerates a site's indexable URLs from its sitemap and\n\
                  configured routes, fetches each once, and audits the responses for:\n\
                  - HTTP, canonical, hreflang, sitemap, and robots problems\n\
                  - Structured-data and metadata defects\n\
                  - Scaled-content, site-reputation, and expired-domain risk\n\n\
                  Interrupted runs can be resumed batch by batch."
)]
pub struct Args {
    /// Site identifier, matching config/sites/<siteId>.audit.json
    ///
    /// Required unless --resume names a run to pick up.
    #[arg(short = 's', long, value_name = "SITE_ID")]
    pub site: Option<String>,

    /// Audit mode
    #[arg(short = 'm', long, default_value = "full", value_enum)]
    pub mode: AuditMode,

    /// URLs per crawl batch
    #[arg(long, value_name = "NUM")]
    pub batch_size: Option<usize>,

    /// Maximum concurrent requests
    #[arg(short = 'c', long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Base URL override
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Resume a previous run by ID
    #[arg(long, value_name = "RUN_ID")]
    pub resume: Option<String>,

    /// Directory holding the site config files
    #[arg(long, value_name = "DIR", default_value = "config/sites")]
    pub config_dir: PathBuf,

    /// Output root for run artifacts
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Verbose output (show progress and debug info)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Quiet mode (only show errors)
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

/// Audit modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuditMode {
    /// Crawl the full inventory
    #[value(name = "full")]
    Full,
    /// Cap the inventory at 25 URLs for a fast pass
    #[value(name = "quick")]
    Quick,
    /// Full audit against a local dev server (default baseUrl localhost:3000)
    #[value(name = "preview")]
    Preview,
    /// Full audit with polite production defaults (concurrency 6)
    #[value(name = "prod")]
    Prod,
    /// Resume the latest (or a named) interrupted run
    #[value(name = "resume")]
    Resume,
}

impl std::fmt::Display for AuditMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditMode::Full => write!(f, "full"),
            AuditMode::Quick => write!(f, "quick"),
            AuditMode::Preview => write!(f, "preview"),
            AuditMode::Prod => write!(f, "prod"),
            AuditMode::Resume => write!(f, "resume"),
        }
    }
}

impl Args {
    /// Validate arguments
    pub fn validate(&self) -> Result<(), String> {
        if self.site.is_none() && self.resume.is_none() {
            return Err("No site specified. Provide --site or --resume <runId>.".to_string());
        }

        if let Some(concurrency) = self.concurrency {
            if concurrency == 0 {
                return Err("Concurrency must be at least 1".to_string());
            }
        }

        if let Some(batch_size) = self.batch_size {
            if batch_size == 0 {
                return Err("Batch size must be at least 1".to_string());
            }
        }

        if let Some(ref base_url) = self.base_url {
            url::Url::parse(base_url)
                .map_err(|e| format!("Invalid base URL '{}': {}", base_url, e))?;
        }

        if self.verbose && self.quiet {
            return Err("Cannot use --verbose and --quiet together".to_string());
        }

        Ok(())
    }

    /// Whether this invocation resumes an existing run.
    pub fn is_resume(&self) -> bool {
        self.mode == AuditMode::Resume || self.resume.is_some()
    }

    /// Site ID from --site, or derived from the run ID's
    /// `<siteId>-YYYYMMDD-HHMMSS-<hex>` shape when only --resume is given.
    pub fn effective_site_id(&self) -> Option<String> {
        if let Some(site) = &self.site {
            return Some(site.clone());
        }
        let run_id = self.resume.as_deref()?;
        let parts: Vec<&str> = run_id.split('-').collect();
        if parts.len() < 4 {
            return None;
        }
        Some(parts[..parts.len() - 3].join("-"))
    }

    /// Runtime config overrides derived from flags and mode defaults.
    pub fn config_overrides(&self) -> Value {
        let base_url = match (&self.base_url, self.mode) {
            (Some(url), _) => Some(url.clone()),
            (None, AuditMode::Preview) => Some("http://localhost:3000".to_string()),
            _ => None,
        };
        let concurrency = match (self.concurrency, self.mode) {
            (Some(n), _) => Some(n),
            (None, AuditMode::Prod) => Some(6),
            _ => None,
        };

        json!({
            "baseUrl": base_url,
            "outputDir": self.output_dir,
            "crawl": {
                "concurrency": concurrency,
                "batchSize": self.batch_size,
            },
        })
    }
}
