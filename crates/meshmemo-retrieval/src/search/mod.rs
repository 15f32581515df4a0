//! Candidate scoring: semantic recall over embeddings, and rank fusion of
//! externally produced lexical/vector lists.

pub mod rrf_fusion;
pub mod semantic_recall;

pub use rrf_fusion::{compute_rrf_score, multi_source_fusion, normalize_scores, RankFusion};
pub use semantic_recall::semantic_recall;
