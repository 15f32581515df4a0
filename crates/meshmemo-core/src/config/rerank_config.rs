use serde::{Deserialize, Serialize};

use super::defaults;
use super::validation::{clamp_f64, clamp_usize};

/// Local keyword rerank and neural delegate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankConfig {
    pub min_keyword_len: usize,
    /// Multiplier on keyword density before the cap is applied.
    pub keyword_density_weight: f64,
    /// Cap on the density contribution (boost term is `1 + min(...)`).
    pub max_density_boost: f64,
    pub first_paragraph_boost: f64,
    pub exact_phrase_boost: f64,
    /// Exact-phrase boost only applies to queries at least this long.
    pub min_phrase_len: usize,
    pub neural_max_documents: usize,
    pub neural_min_score: f64,
    pub neural_timeout_ms: u64,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            min_keyword_len: defaults::DEFAULT_MIN_KEYWORD_LEN,
            keyword_density_weight: defaults::DEFAULT_KEYWORD_DENSITY_WEIGHT,
            max_density_boost: defaults::DEFAULT_MAX_DENSITY_BOOST,
            first_paragraph_boost: defaults::DEFAULT_FIRST_PARAGRAPH_BOOST,
            exact_phrase_boost: defaults::DEFAULT_EXACT_PHRASE_BOOST,
            min_phrase_len: defaults::DEFAULT_MIN_PHRASE_LEN,
            neural_max_documents: defaults::DEFAULT_NEURAL_MAX_DOCUMENTS,
            neural_min_score: defaults::DEFAULT_NEURAL_MIN_SCORE,
            neural_timeout_ms: defaults::DEFAULT_NEURAL_TIMEOUT_MS,
        }
    }
}

impl RerankConfig {
    pub fn clamped(mut self) -> Self {
        self.min_keyword_len = clamp_usize("rerank.min_keyword_len", self.min_keyword_len, 1, 64);
        self.keyword_density_weight = clamp_f64(
            "rerank.keyword_density_weight",
            self.keyword_density_weight,
            0.0,
            100.0,
            defaults::DEFAULT_KEYWORD_DENSITY_WEIGHT,
        );
        self.max_density_boost = clamp_f64(
            "rerank.max_density_boost",
            self.max_density_boost,
            0.0,
            10.0,
            defaults::DEFAULT_MAX_DENSITY_BOOST,
        );
        // Boost multipliers below 1.0 would turn a match into a penalty.
        self.first_paragraph_boost = clamp_f64(
            "rerank.first_paragraph_boost",
            self.first_paragraph_boost,
            1.0,
            10.0,
            defaults::DEFAULT_FIRST_PARAGRAPH_BOOST,
        );
        self.exact_phrase_boost = clamp_f64(
            "rerank.exact_phrase_boost",
            self.exact_phrase_boost,
            1.0,
            10.0,
            defaults::DEFAULT_EXACT_PHRASE_BOOST,
        );
        self.neural_max_documents =
            clamp_usize("rerank.neural_max_documents", self.neural_max_documents, 1, 1_000);
        self.neural_min_score = clamp_f64(
            "rerank.neural_min_score",
            self.neural_min_score,
            0.0,
            1.0,
            defaults::DEFAULT_NEURAL_MIN_SCORE,
        );
        if self.neural_timeout_ms == 0 {
            tracing::warn!(
                field = "rerank.neural_timeout_ms",
                clamped = defaults::DEFAULT_NEURAL_TIMEOUT_MS,
                "zero timeout replaced with default"
            );
            self.neural_timeout_ms = defaults::DEFAULT_NEURAL_TIMEOUT_MS;
        }
        self
    }
}
