mod chunk_store;
mod embedding;
mod neural_reranker;
mod tag_extractor;
mod vector_backend;

pub use chunk_store::IChunkStore;
pub use embedding::IEmbeddingProvider;
pub use neural_reranker::INeuralReranker;
pub use tag_extractor::{ITagExtractor, WhitespaceTagExtractor};
pub use vector_backend::IVectorBackend;
