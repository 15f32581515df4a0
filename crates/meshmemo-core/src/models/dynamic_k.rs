use serde::{Deserialize, Serialize};

/// Signals extracted from a query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    /// Clamped weighted sum in [0, 1].
    pub complexity: f64,
    pub intent_count: usize,
    pub has_multiple_entities: bool,
    pub is_question: bool,
    pub keyword_count: usize,
}

/// Historical retrieval quality used to nudge K.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityStats {
    pub avg_relevance: f64,
    pub score_variance: f64,
    /// Fraction of past results that scored as high quality.
    pub high_quality_ratio: f64,
}

/// One signed contribution to the final K.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KAdjustment {
    pub factor: String,
    pub delta: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicKResult {
    /// Always within `[min_k, max_k]`.
    pub k: usize,
    pub reasons: Vec<String>,
    pub adjustments: Vec<KAdjustment>,
    pub confidence: f64,
}
