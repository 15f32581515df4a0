use crate::errors::MeshResult;

/// Embedding generation provider. May be slow or unavailable.
pub trait IEmbeddingProvider: Send + Sync {
    /// Embed a single text into a fixed-dimension vector.
    fn embed(&self, text: &str) -> MeshResult<Vec<f32>>;

    /// The dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Human-readable provider name.
    fn name(&self) -> &str;

    fn is_available(&self) -> bool {
        true
    }
}
