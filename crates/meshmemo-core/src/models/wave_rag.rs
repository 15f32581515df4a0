use serde::{Deserialize, Serialize};

use super::ResultSource;

/// One fused and focused WaveRAG result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveRagItem {
    pub id: String,
    pub content: String,
    pub final_score: f64,
    /// Best raw score across the input lists.
    pub original_score: f64,
    pub bm25_score: f64,
    pub vector_score: f64,
    pub tag_boost_score: f64,
    pub matched_tags: Vec<String>,
    pub source: ResultSource,
    pub trace_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LensPhase {
    pub tags: Vec<String>,
    pub duration_ms: f64,
    /// The matrix was unavailable and the phase passed its input through.
    pub degraded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpansionPhase {
    pub tags: Vec<String>,
    pub depth_reached: u32,
    pub duration_ms: f64,
    pub degraded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FocusPhase {
    pub result_count: usize,
    pub tag_boost_applied: bool,
    pub duration_ms: f64,
}

/// Full WaveRAG output. The phase records are telemetry only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveRagResult {
    pub results: Vec<WaveRagItem>,
    pub lens_phase: LensPhase,
    pub expansion_phase: ExpansionPhase,
    pub focus_phase: FocusPhase,
    pub query_tags: Vec<String>,
    pub expansion_tags: Vec<String>,
    pub total_duration_ms: f64,
    pub trace_id: String,
}
