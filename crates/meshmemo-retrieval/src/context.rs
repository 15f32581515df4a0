//! MeshContext: the registry every operation runs through.
//!
//! Owns the validated config, the selected vector backend, the tag matrices
//! (addressed by integer handles), the degradation tracker, and the query
//! log. Construct one per process (or per test) and pass it by reference.
//!
//! Handle lifecycle: `create_matrix` → operations → `destroy_matrix`. Any
//! operation against a handle that was never issued or has been destroyed
//! returns `MeshError::HandleNotFound`; this is the one error class that is
//! never absorbed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;
use meshmemo_core::config::{MeshConfig, WaveRagConfig};
use meshmemo_core::constants::components;
use meshmemo_core::errors::{MeshError, MeshResult};
use meshmemo_core::models::{
    Chunk, DegradationEvent, DynamicKResult, HybridSearchResult, QualityStats, RankedItem,
    TagAssociation, TagMatrixStats, TagPairUpdate, WaveRagResult,
};
use meshmemo_core::traits::{
    IChunkStore, IEmbeddingProvider, INeuralReranker, ITagExtractor, IVectorBackend,
};
use meshmemo_observability::{DegradationTracker, QueryLog, QueryLogEntry, TrackedDegradation};
use meshmemo_tags::TagCooccurrenceMatrix;
use tracing::{debug, info, warn};

use crate::backend::select_backend;
use crate::engine::{RetrievalPipeline, SearchOutcome, SearchRequest};
use crate::filter::ChunkPredicate;
use crate::search::RankFusion;
use crate::waverag::WaveRagOrchestrator;

/// Handle kind reported in `HandleNotFound`.
const MATRIX_KIND: &str = "tag_matrix";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("context mutex poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

pub struct MeshContext {
    config: MeshConfig,
    pipeline: RetrievalPipeline,
    fusion: RankFusion,
    wave_rag: WaveRagOrchestrator,
    matrices: DashMap<u64, Arc<TagCooccurrenceMatrix>>,
    next_handle: AtomicU64,
    degradations: Mutex<DegradationTracker>,
    query_log: Mutex<QueryLog>,
}

impl MeshContext {
    /// Build a context from `config`. The config is clamped first; the
    /// vector backend is chosen once here.
    pub fn new(config: MeshConfig) -> Self {
        let config = config.validated();
        let (backend, fallback) = select_backend(&config.backend);
        let mut tracker = DegradationTracker::new();
        if let Some(event) = fallback {
            tracker.record(event);
        }
        Self::assemble(config, backend, tracker)
    }

    /// Build a context around an explicit backend.
    pub fn with_backend(config: MeshConfig, backend: Arc<dyn IVectorBackend>) -> Self {
        Self::assemble(config.validated(), backend, DegradationTracker::new())
    }

    pub fn from_toml(toml_str: &str) -> MeshResult<Self> {
        Ok(Self::new(MeshConfig::from_toml(toml_str)?))
    }

    fn assemble(
        config: MeshConfig,
        backend: Arc<dyn IVectorBackend>,
        tracker: DegradationTracker,
    ) -> Self {
        info!(
            backend = backend.name(),
            accelerated = backend.is_accelerated(),
            "mesh context ready"
        );
        Self {
            pipeline: RetrievalPipeline::new(&config, backend),
            fusion: RankFusion::from_config(&config.fusion),
            wave_rag: WaveRagOrchestrator::from_config(&config),
            query_log: Mutex::new(QueryLog::with_capacity(config.observability.query_log_capacity)),
            matrices: DashMap::new(),
            next_handle: AtomicU64::new(1),
            degradations: Mutex::new(tracker),
            config,
        }
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    pub fn backend(&self) -> &dyn IVectorBackend {
        self.pipeline.backend()
    }

    pub fn pipeline(&self) -> &RetrievalPipeline {
        &self.pipeline
    }

    // --- Matrix registry ---

    fn register(&self, matrix: TagCooccurrenceMatrix) -> u64 {
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        self.matrices.insert(handle, Arc::new(matrix));
        debug!(handle, "tag matrix registered");
        handle
    }

    /// New empty matrix using the configured alpha/beta.
    pub fn create_matrix(&self) -> u64 {
        self.register(TagCooccurrenceMatrix::from_config(&self.config.tags))
    }

    /// Restore a matrix from a `to_json` snapshot and register it.
    pub fn create_matrix_from_json(&self, json: &str) -> MeshResult<u64> {
        let matrix = TagCooccurrenceMatrix::from_json(json)?;
        Ok(self.register(matrix))
    }

    /// Drop the registry's reference. Matrices still borrowed by an
    /// in-flight request live until that request finishes.
    pub fn destroy_matrix(&self, handle: u64) -> MeshResult<()> {
        self.matrices
            .remove(&handle)
            .map(|_| debug!(handle, "tag matrix destroyed"))
            .ok_or_else(|| MeshError::handle_not_found(MATRIX_KIND, handle))
    }

    pub fn matrix(&self, handle: u64) -> MeshResult<Arc<TagCooccurrenceMatrix>> {
        self.matrices
            .get(&handle)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| MeshError::handle_not_found(MATRIX_KIND, handle))
    }

    pub fn matrix_handles(&self) -> Vec<u64> {
        let mut handles: Vec<u64> = self.matrices.iter().map(|e| *e.key()).collect();
        handles.sort_unstable();
        handles
    }

    fn optional_matrix(&self, handle: Option<u64>) -> MeshResult<Option<Arc<TagCooccurrenceMatrix>>> {
        handle.map(|h| self.matrix(h)).transpose()
    }

    // --- Matrix operations ---

    pub fn update_tag_pair(&self, handle: u64, tag_a: &str, tag_b: &str, weight: f64) -> MeshResult<bool> {
        let matrix = self.matrix(handle)?;
        let span = meshmemo_observability::tag_update_span!(handle, 1usize);
        let _guard = span.enter();
        matrix.update(tag_a, tag_b, weight)
    }

    pub fn batch_update(&self, handle: u64, updates: &[TagPairUpdate]) -> MeshResult<usize> {
        let matrix = self.matrix(handle)?;
        let span = meshmemo_observability::tag_update_span!(handle, updates.len());
        let _guard = span.enter();
        matrix.batch_update(updates)
    }

    pub fn observe_tags(&self, handle: u64, tags: &[String]) -> MeshResult<usize> {
        self.matrix(handle)?.observe_tags(tags)
    }

    /// Feed every chunk's tags (per the collection schema) into the matrix.
    pub fn observe_chunks(&self, handle: u64, chunks: &[Chunk]) -> MeshResult<usize> {
        let matrix = self.matrix(handle)?;
        let documents: Vec<Vec<String>> = chunks
            .iter()
            .map(|c| crate::extract::content_tags(&c.metadata, &self.config.schema))
            .collect();
        let span = meshmemo_observability::tag_update_span!(handle, documents.len());
        let _guard = span.enter();
        matrix.observe_documents(&documents)
    }

    pub fn expand_query_tags(&self, handle: u64, tags: &[String], factor: f64) -> MeshResult<Vec<String>> {
        Ok(self.matrix(handle)?.expand_query(tags, factor))
    }

    pub fn associations(&self, handle: u64, tag: &str, top_k: usize) -> MeshResult<Vec<TagAssociation>> {
        Ok(self.matrix(handle)?.get_associations(tag, top_k))
    }

    pub fn compute_pmi(&self, handle: u64, tag_a: &str, tag_b: &str) -> MeshResult<f64> {
        Ok(self.matrix(handle)?.compute_pmi(tag_a, tag_b))
    }

    pub fn matrix_stats(&self, handle: u64) -> MeshResult<TagMatrixStats> {
        Ok(self.matrix(handle)?.stats())
    }

    pub fn export_matrix(&self, handle: u64) -> MeshResult<String> {
        self.matrix(handle)?.to_json()
    }

    // --- Stateless operations ---

    pub fn compute_dynamic_k(
        &self,
        query: &str,
        corpus_size: usize,
        quality: Option<&QualityStats>,
    ) -> DynamicKResult {
        self.pipeline.dynamic_k().calculate(query, corpus_size, quality)
    }

    pub fn fuse_results(
        &self,
        bm25: &[RankedItem],
        vector: &[RankedItem],
        tag_boosts: Option<&HashMap<String, f64>>,
        limit: usize,
    ) -> Vec<HybridSearchResult> {
        self.fusion.fuse_results(bm25, vector, tag_boosts, limit)
    }

    // --- WaveRAG ---

    /// WaveRAG over the matrix at `handle`. `None` runs without a matrix
    /// (degraded). A given handle that is unknown is an error, not a
    /// degradation.
    pub fn wave_rag_search(
        &self,
        handle: Option<u64>,
        query_tags: &[String],
        bm25: &[RankedItem],
        vector: &[RankedItem],
        overrides: Option<&WaveRagConfig>,
    ) -> MeshResult<WaveRagResult> {
        let matrix = self.optional_matrix(handle)?;
        let run = self
            .wave_rag
            .search(matrix.as_deref(), query_tags, bm25, vector, overrides);
        if !run.degradations.is_empty() {
            let mut tracker = lock(&self.degradations);
            for event in run.degradations {
                tracker.record(event);
            }
        }
        Ok(run.result)
    }

    /// WaveRAG with query tags taken from free text.
    pub fn wave_rag_search_text(
        &self,
        handle: Option<u64>,
        extractor: &dyn ITagExtractor,
        query: &str,
        bm25: &[RankedItem],
        vector: &[RankedItem],
    ) -> MeshResult<WaveRagResult> {
        let tags = extractor.extract(query);
        self.wave_rag_search(handle, &tags, bm25, vector, None)
    }

    // --- Pipeline search ---

    pub fn search(&self, chunks: &[Chunk], request: &SearchRequest) -> MeshResult<SearchOutcome> {
        self.search_filtered(chunks, request, None)
    }

    pub fn search_filtered(
        &self,
        chunks: &[Chunk],
        request: &SearchRequest,
        predicate: Option<ChunkPredicate<'_>>,
    ) -> MeshResult<SearchOutcome> {
        let matrix = self.optional_matrix(request.matrix_handle)?;
        let outcome = self
            .pipeline
            .search_filtered(chunks, request, matrix.as_deref(), predicate);
        self.log_query(request, &outcome);
        Ok(outcome)
    }

    /// Pipeline search with a neural rerank provider. Provider failures are
    /// recorded as degradations; the search itself still succeeds.
    pub async fn search_with_neural<P: INeuralReranker>(
        &self,
        chunks: &[Chunk],
        request: &SearchRequest,
        provider: &P,
    ) -> MeshResult<SearchOutcome> {
        let matrix = self.optional_matrix(request.matrix_handle)?;
        let outcome = self
            .pipeline
            .search_with_neural(chunks, request, matrix.as_deref(), provider)
            .await;
        if let Some(rerank) = outcome.rerank.as_ref().filter(|r| r.is_fallback()) {
            let reason = rerank.fallback_reason.clone().unwrap_or_default();
            self.record_degradation(DegradationEvent::now(components::RERANK, reason, "local"));
        }
        self.log_query(request, &outcome);
        Ok(outcome)
    }

    /// Search a chunk store, embedding `query_text` when the request has no
    /// embedding. An unavailable or failing embedder yields an empty result
    /// and a recorded degradation.
    pub fn search_store(
        &self,
        store: &dyn IChunkStore,
        embedder: &dyn IEmbeddingProvider,
        request: &SearchRequest,
    ) -> MeshResult<SearchOutcome> {
        let chunks = store.list()?;
        if !request.query_embedding.is_empty() {
            return self.search(&chunks, request);
        }
        let mut request = request.clone();
        match request.query_text.as_deref() {
            Some(text) if embedder.is_available() => match embedder.embed(text) {
                Ok(embedding) => request.query_embedding = embedding,
                Err(e) => self.record_degradation(DegradationEvent::now(
                    components::EMBEDDINGS,
                    e.to_string(),
                    "empty result",
                )),
            },
            Some(_) => self.record_degradation(DegradationEvent::now(
                components::EMBEDDINGS,
                format!("embedding provider {} unavailable", embedder.name()),
                "empty result",
            )),
            None => {}
        }
        self.search(&chunks, &request)
    }

    fn log_query(&self, request: &SearchRequest, outcome: &SearchOutcome) {
        let entry = QueryLogEntry::new(
            request.query_text.clone(),
            outcome.latency,
            outcome.candidate_count,
            outcome.results.len(),
            outcome.dynamic_k.as_ref().map(|d| d.k),
        );
        lock(&self.query_log).record(entry);
    }

    // --- Observability ---

    pub fn record_degradation(&self, event: DegradationEvent) {
        lock(&self.degradations).record(event);
    }

    pub fn degradations(&self) -> Vec<TrackedDegradation> {
        lock(&self.degradations).events().to_vec()
    }

    pub fn is_degraded(&self, component: &str) -> bool {
        lock(&self.degradations).is_degraded(component)
    }

    pub fn mark_recovered(&self, component: &str) {
        lock(&self.degradations).mark_recovered(component);
    }

    pub fn query_count(&self) -> usize {
        lock(&self.query_log).count()
    }

    /// Snapshot of the query log.
    pub fn query_log(&self) -> QueryLog {
        lock(&self.query_log).clone()
    }
}

impl Default for MeshContext {
    fn default() -> Self {
        Self::new(MeshConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ScalarBackend;

    fn ctx() -> MeshContext {
        MeshContext::with_backend(MeshConfig::default(), Arc::new(ScalarBackend))
    }

    #[test]
    fn handles_are_unique_and_destroyable() {
        let c = ctx();
        let a = c.create_matrix();
        let b = c.create_matrix();
        assert_ne!(a, b);
        assert_eq!(c.matrix_handles(), vec![a, b]);
        c.destroy_matrix(a).unwrap();
        assert!(c.matrix(a).unwrap_err().is_handle_not_found());
        assert!(c.destroy_matrix(a).unwrap_err().is_handle_not_found());
        assert!(c.matrix(b).is_ok());
    }

    #[test]
    fn unknown_handle_is_hard_error_everywhere() {
        let c = ctx();
        assert!(c.update_tag_pair(99, "a", "b", 1.0).unwrap_err().is_handle_not_found());
        assert!(c.expand_query_tags(99, &[], 0.5).unwrap_err().is_handle_not_found());
        assert!(c.export_matrix(99).unwrap_err().is_handle_not_found());
        assert!(c
            .wave_rag_search(Some(99), &[], &[], &[], None)
            .unwrap_err()
            .is_handle_not_found());
        let req = SearchRequest::new(vec![1.0]).with_tags(vec!["x".into()], Some(99));
        assert!(c.search(&[], &req).unwrap_err().is_handle_not_found());
    }

    #[test]
    fn matrices_are_independent() {
        let c = ctx();
        let a = c.create_matrix();
        let b = c.create_matrix();
        c.update_tag_pair(a, "red", "formal", 1.0).unwrap();
        assert!(c.matrix(a).unwrap().cooccurrence("red", "formal") > 0.0);
        assert_eq!(c.matrix(b).unwrap().cooccurrence("red", "formal"), 0.0);
    }

    #[test]
    fn export_then_import_registers_copy() {
        let c = ctx();
        let a = c.create_matrix();
        c.update_tag_pair(a, "red", "formal", 1.0).unwrap();
        let json = c.export_matrix(a).unwrap();
        let b = c.create_matrix_from_json(&json).unwrap();
        assert_ne!(a, b);
        assert_eq!(
            c.associations(a, "red", 10).unwrap(),
            c.associations(b, "red", 10).unwrap()
        );
    }

    #[test]
    fn wave_rag_without_matrix_records_degradation() {
        let c = ctx();
        let result = c
            .wave_rag_search(None, &["red".to_string()], &[RankedItem::new("a", 1.0)], &[], None)
            .unwrap();
        assert_eq!(result.results.len(), 1);
        assert!(c.is_degraded(components::TAG_MATRIX));
    }

    #[test]
    fn search_records_query_log() {
        let c = ctx();
        let mut chunk = Chunk::new("a", "text");
        chunk.embedding = Some(vec![1.0, 0.0]);
        let out = c.search(&[chunk], &SearchRequest::new(vec![1.0, 0.0])).unwrap();
        assert_eq!(out.results.len(), 1);
        assert_eq!(c.query_count(), 1);
    }
}
