/// Retrieval subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("empty query embedding")]
    EmptyQueryEmbedding,

    #[error("search failed: {reason}")]
    SearchFailed { reason: String },
}
