//! Semantic recall: score filtered candidates against the query embedding.

use std::cmp::Ordering;

use meshmemo_core::models::{Chunk, SearchResult};
use meshmemo_core::traits::IVectorBackend;
use tracing::debug;

/// Score `candidates` (chunk, filter score) by cosine similarity to
/// `query_embedding`, keep scores `>= threshold`, and return the best
/// `top_k` descending.
///
/// Chunks with no embedding, or one of a different dimension, are skipped.
pub fn semantic_recall(
    candidates: &[(&Chunk, f64)],
    query_embedding: &[f32],
    backend: &dyn IVectorBackend,
    threshold: f64,
    top_k: usize,
) -> Vec<SearchResult> {
    if candidates.is_empty() || query_embedding.is_empty() || top_k == 0 {
        return Vec::new();
    }

    let (usable, vectors): (Vec<(&Chunk, f64)>, Vec<&[f32]>) = candidates
        .iter()
        .filter_map(|&(chunk, filter_score)| match chunk.embedding.as_deref() {
            Some(e) if e.len() == query_embedding.len() => Some(((chunk, filter_score), e)),
            _ => None,
        })
        .unzip();

    let skipped = candidates.len() - usable.len();
    if skipped > 0 {
        debug!(skipped, "candidates without a usable embedding skipped");
    }

    let scores = backend.batch_cosine_similarity(query_embedding, &vectors);
    let mut results: Vec<SearchResult> = usable
        .into_iter()
        .zip(scores)
        .filter(|(_, score)| *score >= threshold)
        .map(|((chunk, filter_score), score)| SearchResult::from_chunk(chunk, filter_score, score))
        .collect();

    results.sort_by(|a, b| {
        b.semantic_score
            .partial_cmp(&a.semantic_score)
            .unwrap_or(Ordering::Equal)
    });
    results.truncate(top_k);

    debug!(
        backend = backend.name(),
        recalled = results.len(),
        threshold,
        "semantic recall complete"
    );
    results
}
