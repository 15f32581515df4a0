mod chunk;
mod degradation_event;
mod dynamic_k;
mod filter;
mod fusion;
mod rerank;
mod search_result;
mod tag_matrix;
mod wave_rag;

pub use chunk::{resolve_path, Chunk, Metadata};
pub use degradation_event::DegradationEvent;
pub use dynamic_k::{DynamicKResult, KAdjustment, QualityStats, QueryAnalysis};
pub use filter::{FilterCondition, FilterLogic, FilterOperator, FilterSpec};
pub use fusion::{HybridSearchResult, RankedItem, ResultSource};
pub use rerank::{NeuralScore, RerankMode, RerankOutcome};
pub use search_result::SearchResult;
pub use tag_matrix::{
    SpikeDetail, SpikeKind, TagAssociation, TagBoostResult, TagMatrixStats, TagPairUpdate,
};
pub use wave_rag::{ExpansionPhase, FocusPhase, LensPhase, WaveRagItem, WaveRagResult};
