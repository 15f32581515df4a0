//! Structured events shared across crates, so field names stay consistent.

use tracing::{info, warn};

pub fn degradation_triggered(component: &str, failure: &str, fallback: &str) {
    warn!(
        event = "degradation_triggered",
        component,
        failure,
        fallback,
        "component degraded, using fallback"
    );
}

pub fn degradation_recovered(component: &str) {
    info!(event = "degradation_recovered", component, "component recovered");
}

pub fn search_completed(result_count: usize, candidate_count: usize, latency_ms: u64) {
    info!(
        event = "search_completed",
        result_count,
        candidate_count,
        latency_ms,
        "search completed"
    );
}

pub fn wave_rag_completed(trace_id: &str, result_count: usize, expansion_tags: usize, latency_ms: f64) {
    info!(
        event = "wave_rag_completed",
        trace_id,
        result_count,
        expansion_tags,
        latency_ms,
        "wave rag completed"
    );
}
