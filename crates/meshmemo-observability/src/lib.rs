//! # meshmemo-observability
//!
//! Tracing setup and span macros, the degradation tracker that records every
//! fallback, and the per-request query log.

pub mod degradation;
pub mod query_log;
pub mod tracing_setup;

pub use degradation::{DegradationTracker, RecoveryStatus, TrackedDegradation};
pub use query_log::{QueryLog, QueryLogEntry};
