use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RerankMode {
    Local,
    Neural,
    /// Neural was requested but failed or timed out.
    LocalFallback,
}

/// How a rerank pass was actually carried out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankOutcome {
    pub mode: RerankMode,
    pub fallback_reason: Option<String>,
    pub reranked_count: usize,
}

impl RerankOutcome {
    pub fn local(reranked_count: usize) -> Self {
        Self {
            mode: RerankMode::Local,
            fallback_reason: None,
            reranked_count,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.mode == RerankMode::LocalFallback
    }
}

/// Relevance assigned by a neural provider to the document at `index`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeuralScore {
    pub index: usize,
    pub relevance_score: f64,
}
