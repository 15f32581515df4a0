use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Chunk, Metadata};

/// A pipeline result.
///
/// `final_score` starts at `semantic_score` and each stage multiplies it.
/// No stage resets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub content: String,
    /// Fraction of filter conditions the chunk satisfied. 1.0 when unfiltered.
    pub filter_score: f64,
    pub semantic_score: f64,
    pub final_score: f64,
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl SearchResult {
    pub fn from_chunk(chunk: &Chunk, filter_score: f64, semantic_score: f64) -> Self {
        Self {
            id: chunk.id.clone(),
            content: chunk.content.clone(),
            filter_score,
            semantic_score,
            final_score: semantic_score,
            metadata: chunk.metadata.clone(),
            created_at: chunk.created_at,
        }
    }
}
