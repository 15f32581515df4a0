//! # meshmemo-retrieval
//!
//! Filter-then-recall retrieval over in-memory chunks, plus the hybrid fusion
//! and WaveRAG paths that work on externally produced rankings.
//!
//! ```text
//! MeshContext (registry: config, backend, tag matrices by handle, tracker, query log)
//! ├── RetrievalPipeline::search
//! │   ├── filter            metadata predicates, fraction-of-conditions score
//! │   ├── semantic_recall   cosine via IVectorBackend (scalar | rayon)
//! │   ├── tag boost         TagCooccurrenceMatrix::batch_compute_tag_boost
//! │   ├── time decay        TimeDecayScorer
//! │   ├── rerank            Reranker (local | neural with timeout fallback)
//! │   ├── diversity         DiversitySampler (MMR over schema fields)
//! │   └── truncate          fixed K or DynamicKCalculator
//! ├── RankFusion::fuse_results      BM25 + vector RRF with tag boosts
//! └── WaveRagOrchestrator::search   Lens → Expansion → Focus
//! ```

pub mod backend;
pub mod context;
pub mod diversity;
pub mod dynamic_k;
pub mod engine;
pub mod extract;
pub mod filter;
pub mod ranking;
pub mod search;
pub mod vector;
pub mod waverag;

pub use backend::{select_backend, ParallelBackend, ScalarBackend};
pub use context::MeshContext;
pub use diversity::DiversitySampler;
pub use dynamic_k::DynamicKCalculator;
pub use engine::{RetrievalPipeline, SearchOutcome, SearchRequest, StageToggles};
pub use ranking::Reranker;
pub use search::RankFusion;
pub use waverag::{WaveRagOrchestrator, WaveRagRun};
