//! Span definitions per operation: search, WaveRAG, rerank, tag update.

/// Create a pipeline search span.
#[macro_export]
macro_rules! search_span {
    ($candidates:expr, $has_query:expr) => {
        tracing::info_span!(
            "meshmemo.search",
            candidates = $candidates,
            has_query = $has_query
        )
    };
}

/// Create a WaveRAG span.
#[macro_export]
macro_rules! wave_rag_span {
    ($trace_id:expr, $query_tags:expr) => {
        tracing::info_span!(
            "meshmemo.wave_rag",
            trace_id = %$trace_id,
            query_tags = $query_tags
        )
    };
}

/// Create a rerank span.
#[macro_export]
macro_rules! rerank_span {
    ($mode:expr, $documents:expr) => {
        tracing::debug_span!("meshmemo.rerank", mode = %$mode, documents = $documents)
    };
}

/// Create a tag update span.
#[macro_export]
macro_rules! tag_update_span {
    ($handle:expr, $pairs:expr) => {
        tracing::debug_span!("meshmemo.tag_update", handle = $handle, pairs = $pairs)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const SEARCH: &str = "meshmemo.search";
    pub const WAVE_RAG: &str = "meshmemo.wave_rag";
    pub const RERANK: &str = "meshmemo.rerank";
    pub const TAG_UPDATE: &str = "meshmemo.tag_update";
}
