//! Per-request performance log: latency, result count, dynamic K used.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A single query log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLogEntry {
    pub query: Option<String>,
    pub latency: Duration,
    pub candidate_count: usize,
    pub result_count: usize,
    /// K chosen by the dynamic K calculator, when it ran.
    pub dynamic_k: Option<usize>,
    pub timestamp_epoch_ms: i64,
}

impl QueryLogEntry {
    pub fn new(
        query: Option<String>,
        latency: Duration,
        candidate_count: usize,
        result_count: usize,
        dynamic_k: Option<usize>,
    ) -> Self {
        Self {
            query,
            latency,
            candidate_count,
            result_count,
            dynamic_k,
            timestamp_epoch_ms: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Ring buffer of recent queries.
#[derive(Debug, Clone)]
pub struct QueryLog {
    entries: VecDeque<QueryLogEntry>,
    max_entries: usize,
}

impl Default for QueryLog {
    fn default() -> Self {
        Self::with_capacity(meshmemo_core::config::defaults::DEFAULT_QUERY_LOG_CAPACITY)
    }
}

impl QueryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn record(&mut self, entry: QueryLogEntry) {
        tracing::debug!(
            event = "query_logged",
            latency_ms = entry.latency.as_millis() as u64,
            candidate_count = entry.candidate_count,
            result_count = entry.result_count,
            dynamic_k = ?entry.dynamic_k,
            "query logged"
        );
        if self.entries.len() == self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &QueryLogEntry> {
        self.entries.iter()
    }

    pub fn avg_latency(&self) -> Duration {
        if self.entries.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.entries.iter().map(|e| e.latency).sum();
        total / self.entries.len() as u32
    }

    /// Latency at the given percentile (0.0 to 1.0).
    pub fn latency_percentile(&self, p: f64) -> Duration {
        if self.entries.is_empty() {
            return Duration::ZERO;
        }
        let mut latencies: Vec<Duration> = self.entries.iter().map(|e| e.latency).collect();
        latencies.sort();
        let p = p.clamp(0.0, 1.0);
        let idx = ((p * (latencies.len() - 1) as f64).round() as usize).min(latencies.len() - 1);
        latencies[idx]
    }

    /// Mean of the dynamic K values that were recorded.
    pub fn avg_dynamic_k(&self) -> Option<f64> {
        let ks: Vec<usize> = self.entries.iter().filter_map(|e| e.dynamic_k).collect();
        if ks.is_empty() {
            None
        } else {
            Some(ks.iter().sum::<usize>() as f64 / ks.len() as f64)
        }
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }
}
