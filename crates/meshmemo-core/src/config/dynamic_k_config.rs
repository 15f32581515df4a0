use serde::{Deserialize, Serialize};

use super::defaults;
use super::validation::{clamp_f64, clamp_usize};

/// Adaptive top-K sizing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicKConfig {
    pub base_k: usize,
    pub min_k: usize,
    pub max_k: usize,
    pub complexity_threshold: f64,
    /// Corpus size above which K grows logarithmically.
    pub corpus_size_threshold: usize,
    /// Corpus size below which K shrinks by one.
    pub small_corpus_size: usize,
    pub low_relevance_threshold: f64,
    pub high_relevance_threshold: f64,
    pub high_variance_threshold: f64,
    pub low_high_quality_ratio: f64,
}

impl Default for DynamicKConfig {
    fn default() -> Self {
        Self {
            base_k: defaults::DEFAULT_BASE_K,
            min_k: defaults::DEFAULT_MIN_K,
            max_k: defaults::DEFAULT_MAX_K,
            complexity_threshold: defaults::DEFAULT_COMPLEXITY_THRESHOLD,
            corpus_size_threshold: defaults::DEFAULT_CORPUS_SIZE_THRESHOLD,
            small_corpus_size: defaults::DEFAULT_SMALL_CORPUS_SIZE,
            low_relevance_threshold: defaults::DEFAULT_LOW_RELEVANCE,
            high_relevance_threshold: defaults::DEFAULT_HIGH_RELEVANCE,
            high_variance_threshold: defaults::DEFAULT_HIGH_VARIANCE,
            low_high_quality_ratio: defaults::DEFAULT_LOW_HIGH_QUALITY_RATIO,
        }
    }
}

impl DynamicKConfig {
    /// Clamp bounds so that `1 <= min_k <= base_k <= max_k` holds.
    pub fn clamped(mut self) -> Self {
        self.min_k = clamp_usize("dynamic_k.min_k", self.min_k, 1, 10_000);
        self.max_k = clamp_usize("dynamic_k.max_k", self.max_k, self.min_k, 10_000);
        self.base_k = clamp_usize("dynamic_k.base_k", self.base_k, self.min_k, self.max_k);
        self.complexity_threshold = clamp_f64(
            "dynamic_k.complexity_threshold",
            self.complexity_threshold,
            0.0,
            1.0,
            defaults::DEFAULT_COMPLEXITY_THRESHOLD,
        );
        self.corpus_size_threshold =
            clamp_usize("dynamic_k.corpus_size_threshold", self.corpus_size_threshold, 1, usize::MAX);
        self.low_relevance_threshold = clamp_f64(
            "dynamic_k.low_relevance_threshold",
            self.low_relevance_threshold,
            0.0,
            1.0,
            defaults::DEFAULT_LOW_RELEVANCE,
        );
        self.high_relevance_threshold = clamp_f64(
            "dynamic_k.high_relevance_threshold",
            self.high_relevance_threshold,
            self.low_relevance_threshold,
            1.0,
            defaults::DEFAULT_HIGH_RELEVANCE,
        );
        self.high_variance_threshold = clamp_f64(
            "dynamic_k.high_variance_threshold",
            self.high_variance_threshold,
            0.0,
            f64::MAX,
            defaults::DEFAULT_HIGH_VARIANCE,
        );
        self.low_high_quality_ratio = clamp_f64(
            "dynamic_k.low_high_quality_ratio",
            self.low_high_quality_ratio,
            0.0,
            1.0,
            defaults::DEFAULT_LOW_HIGH_QUALITY_RATIO,
        );
        self
    }
}
