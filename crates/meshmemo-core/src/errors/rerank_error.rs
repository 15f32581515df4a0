/// Rerank provider errors. These never escape the reranker: they are turned
/// into a local-mode fallback annotated with the error text.
#[derive(Debug, thiserror::Error)]
pub enum RerankError {
    #[error("rerank provider {provider} failed: {reason}")]
    ProviderFailed { provider: String, reason: String },

    #[error("rerank provider {provider} timed out after {timeout_ms}ms")]
    Timeout { provider: String, timeout_ms: u64 },

    #[error("rerank provider {provider} returned index {index} for {documents} documents")]
    InvalidIndex {
        provider: String,
        index: usize,
        documents: usize,
    },
}
