use std::future::Future;

use crate::errors::MeshResult;
use crate::models::NeuralScore;

/// Remote cross-encoder style relevance provider.
///
/// Implementations return one score per document they were able to judge,
/// keyed by the document's index in the input slice. The caller owns the
/// deadline.
pub trait INeuralReranker: Send + Sync {
    fn rerank(
        &self,
        query: &str,
        documents: &[String],
    ) -> impl Future<Output = MeshResult<Vec<NeuralScore>>> + Send;

    fn name(&self) -> &str;
}
