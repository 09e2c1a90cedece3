//! Audit orchestration
//!
//! The engine that sequences inventory, crawling, validation, risk
//! scanning, gate evaluation, and reporting, plus the result types the
//! rest of the crate consumes.

mod gates;
mod pipeline;
mod result;

pub use gates::{evaluate_hard_gates, evaluate_soft_gates};
pub use pipeline::{AuditEngine, ProgressCallback};
pub use result::{AuditRunResult, GateResult, SoftGateSummary, Verdict};
