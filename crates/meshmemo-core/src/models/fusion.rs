use serde::{Deserialize, Serialize};

use super::Metadata;

/// An item in a single-source ranked list (BM25 hits, vector hits).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    pub id: String,
    #[serde(default)]
    pub content: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl RankedItem {
    pub fn new(id: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            content: String::new(),
            score,
            metadata: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

/// Which input lists an item appeared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    Bm25,
    Vector,
    Both,
}

/// Output of rank fusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridSearchResult {
    pub id: String,
    pub content: String,
    pub final_score: f64,
    pub bm25_score: f64,
    pub bm25_rank: Option<usize>,
    pub vector_score: f64,
    pub vector_rank: Option<usize>,
    pub tag_boost_score: f64,
    pub source: ResultSource,
}
