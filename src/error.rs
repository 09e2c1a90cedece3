//! Error types for siteaudit
//!
//! Centralized error handling using thiserror for derive macros
//! and anyhow for error context propagation in the binary.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the siteaudit application
#[derive(Debug, Error)]
pub enum AuditError {
    /// Configuration error (aggregated validation message)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid URL provided
    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Sitemap fetch or parse failed
    #[error("Failed to fetch sitemap from '{url}': {reason}")]
    SitemapFetchFailed { url: String, reason: String },

    /// Run state could not be loaded or saved
    #[error("State error for run '{run_id}': {reason}")]
    StateError { run_id: String, reason: String },

    /// No resumable run found for a site
    #[error("No previous run found for site '{site_id}'")]
    RunNotFound { site_id: String },

    /// File read/write error
    #[error("File operation failed for '{path}': {reason}")]
    FileError { path: PathBuf, reason: String },

    /// Report generation failed
    #[error("Failed to generate report: {reason}")]
    ReportGenerationFailed { reason: String },

    /// Generic IO error wrapper
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Result type alias for AuditError
pub type Result<T> = std::result::Result<T, AuditError>;
