use serde::{Deserialize, Serialize};

/// A tag ranked by PMI against a source tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagAssociation {
    pub tag: String,
    pub pmi: f64,
    pub cooccurrence: f64,
    /// Number of updates that touched the pair.
    pub count: u64,
}

/// Read-only snapshot of matrix size and parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagMatrixStats {
    pub tag_count: usize,
    /// Unordered pairs.
    pub pair_count: usize,
    pub total_updates: u64,
    pub total_count: f64,
    pub alpha: f64,
    pub beta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagPairUpdate {
    pub tag_a: String,
    pub tag_b: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl TagPairUpdate {
    pub fn new(tag_a: impl Into<String>, tag_b: impl Into<String>, weight: f64) -> Self {
        Self {
            tag_a: tag_a.into(),
            tag_b: tag_b.into(),
            weight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpikeKind {
    /// The query tag itself appears in the content.
    Direct,
    /// A neighbour of a query tag appears in the content.
    Expansion,
}

/// One contribution to a tag boost score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeDetail {
    pub tag: String,
    pub kind: SpikeKind,
    pub weight: f64,
    pub global_freq: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagBoostResult {
    /// `min(original * boost_factor, 1.0)`.
    pub boosted_score: f64,
    /// In `[1.0, 1.5)`.
    pub boost_factor: f64,
    pub tag_match_score: f64,
    pub matched_tags: Vec<String>,
    pub expansion_tags: Vec<String>,
    pub spike_details: Vec<SpikeDetail>,
    pub dynamic_alpha: f64,
    pub dynamic_beta: f64,
}

impl TagBoostResult {
    /// A result that leaves the score unchanged.
    pub fn neutral(original_score: f64) -> Self {
        Self {
            boosted_score: original_score,
            boost_factor: 1.0,
            tag_match_score: 0.0,
            matched_tags: Vec::new(),
            expansion_tags: Vec::new(),
            spike_details: Vec::new(),
            dynamic_alpha: 0.0,
            dynamic_beta: 0.0,
        }
    }
}
