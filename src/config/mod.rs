//! Configuration loading and merging
//!
//! Defaults, shared and per-site JSON files, and runtime overrides are
//! merged into a frozen [`AuditConfig`] before any I/O happens.

mod loader;
mod merge;
mod types;

pub use loader::load_audit_config;
pub use merge::deep_merge;
pub use types::{
    default_hard_gates, AuditConfig, CrawlSettings, HardGateConfig, InventorySettings,
    LengthBounds, RiskScannerConfig, ValidatorConfig,
};
