use serde::{Deserialize, Serialize};

use super::defaults;
use super::validation::{clamp_f64, clamp_usize};

/// Reciprocal Rank Fusion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Smoothing constant. Higher values flatten the rank curve.
    pub rrf_k: f64,
    pub bm25_weight: f64,
    pub vector_weight: f64,
    pub tag_boost_weight: f64,
    pub limit: usize,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            rrf_k: defaults::DEFAULT_RRF_K,
            bm25_weight: defaults::DEFAULT_BM25_WEIGHT,
            vector_weight: defaults::DEFAULT_VECTOR_WEIGHT,
            tag_boost_weight: defaults::DEFAULT_TAG_BOOST_WEIGHT,
            limit: defaults::DEFAULT_FUSION_LIMIT,
        }
    }
}

impl FusionConfig {
    pub fn clamped(mut self) -> Self {
        self.rrf_k = clamp_f64("fusion.rrf_k", self.rrf_k, 0.0, 10_000.0, defaults::DEFAULT_RRF_K);
        self.bm25_weight = clamp_f64(
            "fusion.bm25_weight",
            self.bm25_weight,
            0.0,
            100.0,
            defaults::DEFAULT_BM25_WEIGHT,
        );
        self.vector_weight = clamp_f64(
            "fusion.vector_weight",
            self.vector_weight,
            0.0,
            100.0,
            defaults::DEFAULT_VECTOR_WEIGHT,
        );
        self.tag_boost_weight = clamp_f64(
            "fusion.tag_boost_weight",
            self.tag_boost_weight,
            0.0,
            100.0,
            defaults::DEFAULT_TAG_BOOST_WEIGHT,
        );
        self.limit = clamp_usize("fusion.limit", self.limit, 1, 100_000);
        self
    }
}
