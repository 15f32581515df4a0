use serde::{Deserialize, Serialize};

use super::defaults;
use super::validation::{clamp_f64, clamp_usize};

/// Retrieval pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Minimum cosine similarity a chunk needs to survive semantic recall.
    pub semantic_threshold: f64,
    /// Maximum candidates kept after semantic recall.
    pub recall_top_k: usize,
    /// Result count when dynamic K is disabled or no query text is given.
    pub final_k: usize,
    pub enable_tag_boost: bool,
    pub enable_time_decay: bool,
    pub enable_rerank: bool,
    pub enable_diversity: bool,
    pub enable_dynamic_k: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            semantic_threshold: defaults::DEFAULT_SEMANTIC_THRESHOLD,
            recall_top_k: defaults::DEFAULT_RECALL_TOP_K,
            final_k: defaults::DEFAULT_FINAL_K,
            enable_tag_boost: true,
            enable_time_decay: true,
            enable_rerank: true,
            enable_diversity: true,
            enable_dynamic_k: true,
        }
    }
}

impl RetrievalConfig {
    pub fn clamped(mut self) -> Self {
        self.semantic_threshold = clamp_f64(
            "retrieval.semantic_threshold",
            self.semantic_threshold,
            -1.0,
            1.0,
            defaults::DEFAULT_SEMANTIC_THRESHOLD,
        );
        self.recall_top_k = clamp_usize("retrieval.recall_top_k", self.recall_top_k, 1, 10_000);
        self.final_k = clamp_usize("retrieval.final_k", self.final_k, 1, 10_000);
        self
    }
}
