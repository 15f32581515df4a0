/// Similarity computation strategy.
///
/// Every implementation must produce the same scores as the scalar reference
/// for the same input; only latency may differ.
pub trait IVectorBackend: Send + Sync {
    /// Cosine similarity of `query` against each vector, in input order.
    fn batch_cosine_similarity(&self, query: &[f32], vectors: &[&[f32]]) -> Vec<f64>;

    fn name(&self) -> &str;

    fn is_accelerated(&self) -> bool {
        false
    }
}
