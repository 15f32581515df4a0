mod embedding_error;
mod rerank_error;
mod retrieval_error;
mod tag_matrix_error;

pub use embedding_error::EmbeddingError;
pub use rerank_error::RerankError;
pub use retrieval_error::RetrievalError;
pub use tag_matrix_error::TagMatrixError;

/// Top-level error for every MeshMemo crate.
///
/// Most search-path failures never reach this type: they are absorbed at the
/// item or stage level and logged. `HandleNotFound` is the one variant that
/// callers must always expect from registry operations.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("{kind} handle not found: {handle}")]
    HandleNotFound { kind: String, handle: u64 },

    #[error("invalid config: {0}")]
    ConfigError(String),

    #[error("degraded mode: {component} fell back to {fallback}")]
    DegradedMode { component: String, fallback: String },

    #[error(transparent)]
    TagMatrixError(#[from] TagMatrixError),

    #[error(transparent)]
    RetrievalError(#[from] RetrievalError),

    #[error(transparent)]
    RerankError(#[from] RerankError),

    #[error(transparent)]
    EmbeddingError(#[from] EmbeddingError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("toml error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type MeshResult<T> = Result<T, MeshError>;

impl MeshError {
    /// Build a `HandleNotFound` for the given engine kind.
    pub fn handle_not_found(kind: impl Into<String>, handle: u64) -> Self {
        Self::HandleNotFound {
            kind: kind.into(),
            handle,
        }
    }

    /// Whether this error is the hard "unknown handle" class.
    pub fn is_handle_not_found(&self) -> bool {
        matches!(self, Self::HandleNotFound { .. })
    }
}
