use serde::{Deserialize, Serialize};

use super::defaults;
use super::validation::{clamp_f64, clamp_usize};
use crate::constants::{MAX_EXPANSION_DEPTH, MAX_EXPANSION_TAGS};

/// Lens → Expansion → Focus configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveRagConfig {
    pub lens_max_tags: usize,
    pub lens_expansion_factor: f64,
    pub expansion_depth: u32,
    /// Edges lighter than this are not followed during expansion.
    pub expansion_threshold: f64,
    pub expansion_max_tags: usize,
    /// Neighbours followed per tag per hop.
    pub expansion_fanout: usize,
    /// Multiplier applied per hop to the propagated tag weight.
    pub expansion_decay: f64,
    pub focus_top_k: usize,
    /// Relative cut-off, not an absolute score: results below
    /// `top_fused_score * focus_score_threshold` are dropped. `0.0` keeps all.
    pub focus_score_threshold: f64,
    pub tag_memo_weight: f64,
    pub bm25_weight: f64,
    pub vector_weight: f64,
}

impl Default for WaveRagConfig {
    fn default() -> Self {
        Self {
            lens_max_tags: defaults::DEFAULT_LENS_MAX_TAGS,
            lens_expansion_factor: defaults::DEFAULT_EXPANSION_FACTOR,
            expansion_depth: defaults::DEFAULT_EXPANSION_DEPTH,
            expansion_threshold: defaults::DEFAULT_EXPANSION_THRESHOLD,
            expansion_max_tags: defaults::DEFAULT_EXPANSION_MAX_TAGS,
            expansion_fanout: defaults::DEFAULT_EXPANSION_FANOUT,
            expansion_decay: defaults::DEFAULT_EXPANSION_DECAY,
            focus_top_k: defaults::DEFAULT_FOCUS_TOP_K,
            focus_score_threshold: defaults::DEFAULT_FOCUS_SCORE_THRESHOLD,
            tag_memo_weight: defaults::DEFAULT_TAG_MEMO_WEIGHT,
            bm25_weight: defaults::DEFAULT_BM25_WEIGHT,
            vector_weight: defaults::DEFAULT_VECTOR_WEIGHT,
        }
    }
}

impl WaveRagConfig {
    pub fn clamped(mut self) -> Self {
        self.lens_max_tags =
            clamp_usize("wave_rag.lens_max_tags", self.lens_max_tags, 1, MAX_EXPANSION_TAGS);
        self.lens_expansion_factor = clamp_f64(
            "wave_rag.lens_expansion_factor",
            self.lens_expansion_factor,
            0.0,
            10.0,
            defaults::DEFAULT_EXPANSION_FACTOR,
        );
        if self.expansion_depth > MAX_EXPANSION_DEPTH {
            tracing::warn!(
                field = "wave_rag.expansion_depth",
                value = self.expansion_depth,
                clamped = MAX_EXPANSION_DEPTH,
                "config value out of range, clamped"
            );
            self.expansion_depth = MAX_EXPANSION_DEPTH;
        }
        self.expansion_threshold = clamp_f64(
            "wave_rag.expansion_threshold",
            self.expansion_threshold,
            0.0,
            f64::MAX,
            defaults::DEFAULT_EXPANSION_THRESHOLD,
        );
        self.expansion_max_tags = clamp_usize(
            "wave_rag.expansion_max_tags",
            self.expansion_max_tags,
            1,
            MAX_EXPANSION_TAGS,
        );
        self.expansion_fanout =
            clamp_usize("wave_rag.expansion_fanout", self.expansion_fanout, 1, 100);
        self.expansion_decay = clamp_f64(
            "wave_rag.expansion_decay",
            self.expansion_decay,
            0.0,
            1.0,
            defaults::DEFAULT_EXPANSION_DECAY,
        );
        self.focus_top_k = clamp_usize("wave_rag.focus_top_k", self.focus_top_k, 1, 10_000);
        self.focus_score_threshold = clamp_f64(
            "wave_rag.focus_score_threshold",
            self.focus_score_threshold,
            0.0,
            1.0,
            defaults::DEFAULT_FOCUS_SCORE_THRESHOLD,
        );
        self.tag_memo_weight = clamp_f64(
            "wave_rag.tag_memo_weight",
            self.tag_memo_weight,
            0.0,
            100.0,
            defaults::DEFAULT_TAG_MEMO_WEIGHT,
        );
        self.bm25_weight = clamp_f64(
            "wave_rag.bm25_weight",
            self.bm25_weight,
            0.0,
            100.0,
            defaults::DEFAULT_BM25_WEIGHT,
        );
        self.vector_weight = clamp_f64(
            "wave_rag.vector_weight",
            self.vector_weight,
            0.0,
            100.0,
            defaults::DEFAULT_VECTOR_WEIGHT,
        );
        self
    }
}
