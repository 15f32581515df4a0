/// MeshMemo version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version stamped into every tag matrix snapshot.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Upper bound on the number of tags a single WaveRAG request may carry
/// through the expansion phase, regardless of config.
pub const MAX_EXPANSION_TAGS: usize = 256;

/// Upper bound on BFS depth in the expansion phase.
pub const MAX_EXPANSION_DEPTH: u32 = 8;

/// Seconds per day, used for age computations.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Component names used in degradation events.
pub mod components {
    pub const VECTOR_BACKEND: &str = "vector_backend";
    pub const RERANK: &str = "rerank";
    pub const TAG_MATRIX: &str = "tag_matrix";
    pub const EMBEDDINGS: &str = "embeddings";
}
