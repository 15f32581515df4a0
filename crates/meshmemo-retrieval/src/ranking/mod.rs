//! Result reranking: local keyword heuristics and the neural provider path.

pub mod reranker;

pub use reranker::Reranker;
