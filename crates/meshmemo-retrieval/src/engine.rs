//! RetrievalPipeline: filter → semantic recall → tag boost → time decay →
//! rerank → diversity → truncate.
//!
//! Every stage after recall multiplies `final_score` or reorders results; no
//! stage resets a score. Stages can be switched off per request.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use meshmemo_core::config::{CollectionSchema, MeshConfig, RetrievalConfig};
use meshmemo_core::models::{
    Chunk, DynamicKResult, FilterSpec, QualityStats, RerankOutcome, SearchResult,
};
use meshmemo_core::traits::{INeuralReranker, IVectorBackend};
use meshmemo_decay::TimeDecayScorer;
use meshmemo_observability::tracing_setup::events;
use meshmemo_tags::{TagBoostParams, TagCooccurrenceMatrix};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::diversity::DiversitySampler;
use crate::dynamic_k::DynamicKCalculator;
use crate::extract::content_tags;
use crate::filter::{self, ChunkPredicate};
use crate::ranking::Reranker;
use crate::search::semantic_recall;

/// Per-request stage switches. `None` defers to the retrieval config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageToggles {
    pub tag_boost: Option<bool>,
    pub time_decay: Option<bool>,
    pub rerank: Option<bool>,
    pub diversity: Option<bool>,
    pub dynamic_k: Option<bool>,
}

/// One pipeline search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub query_embedding: Vec<f32>,
    /// Enables the rerank stage and dynamic K.
    pub query_text: Option<String>,
    pub filter: FilterSpec,
    /// Enables tag boost when a matrix is supplied.
    pub query_tags: Vec<String>,
    /// Registry handle of the matrix used for tag boost.
    pub matrix_handle: Option<u64>,
    /// Fixed result count. When unset, dynamic K decides.
    pub final_k: Option<usize>,
    /// Quality of recent results, fed to dynamic K.
    pub quality: Option<QualityStats>,
    pub stages: StageToggles,
    /// Reference time for decay. Defaults to the current time.
    pub now: Option<DateTime<Utc>>,
}

impl SearchRequest {
    pub fn new(query_embedding: Vec<f32>) -> Self {
        Self {
            query_embedding,
            ..Default::default()
        }
    }

    pub fn with_query(mut self, text: impl Into<String>) -> Self {
        self.query_text = Some(text.into());
        self
    }

    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>, matrix_handle: Option<u64>) -> Self {
        self.query_tags = tags;
        self.matrix_handle = matrix_handle;
        self
    }

    pub fn with_final_k(mut self, k: usize) -> Self {
        self.final_k = Some(k);
        self
    }

    fn query(&self) -> Option<&str> {
        self.query_text.as_deref().filter(|q| !q.trim().is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    /// Chunks that passed the metadata filter.
    pub candidate_count: usize,
    pub k: usize,
    pub dynamic_k: Option<DynamicKResult>,
    pub rerank: Option<RerankOutcome>,
    pub latency: Duration,
}

/// Results after the synchronous stages that precede rerank.
struct Staged {
    results: Vec<SearchResult>,
    candidate_count: usize,
    k: usize,
    dynamic_k: Option<DynamicKResult>,
    start: Instant,
}

fn sort_by_final_score(results: &mut [SearchResult]) {
    results.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(Ordering::Equal)
    });
}

pub struct RetrievalPipeline {
    retrieval: RetrievalConfig,
    diversity_top_k: Option<usize>,
    backend: Arc<dyn IVectorBackend>,
    dynamic_k: DynamicKCalculator,
    decay: TimeDecayScorer,
    reranker: Reranker,
    diversity: DiversitySampler,
    boost_params: TagBoostParams,
    schema: CollectionSchema,
}

impl RetrievalPipeline {
    pub fn new(config: &MeshConfig, backend: Arc<dyn IVectorBackend>) -> Self {
        Self {
            retrieval: config.retrieval.clone(),
            diversity_top_k: config.diversity.top_k,
            backend,
            dynamic_k: DynamicKCalculator::new(config.dynamic_k.clone()),
            decay: TimeDecayScorer::from_config(&config.time_decay, &config.schema),
            reranker: Reranker::new(config.rerank.clone()),
            diversity: DiversitySampler::from_config(&config.diversity, &config.schema),
            boost_params: TagBoostParams::from(&config.tags),
            schema: config.schema.clone(),
        }
    }

    pub fn backend(&self) -> &dyn IVectorBackend {
        self.backend.as_ref()
    }

    pub fn dynamic_k(&self) -> &DynamicKCalculator {
        &self.dynamic_k
    }

    /// Run every stage with local rerank.
    pub fn search(
        &self,
        chunks: &[Chunk],
        request: &SearchRequest,
        matrix: Option<&TagCooccurrenceMatrix>,
    ) -> SearchOutcome {
        self.search_filtered(chunks, request, matrix, None)
    }

    /// `search` with an extra caller predicate AND-ed into the filter.
    pub fn search_filtered(
        &self,
        chunks: &[Chunk],
        request: &SearchRequest,
        matrix: Option<&TagCooccurrenceMatrix>,
        predicate: Option<ChunkPredicate<'_>>,
    ) -> SearchOutcome {
        let mut staged = self.run_until_rerank(chunks, request, matrix, predicate);
        let rerank = match request.query() {
            Some(query) if self.enabled(request.stages.rerank, self.retrieval.enable_rerank) => {
                Some(self.reranker.rerank_local(query, &mut staged.results))
            }
            _ => None,
        };
        self.finish(staged, request, rerank)
    }

    /// `search` with a neural rerank provider. Provider failure or timeout
    /// falls back to local rerank and is reported in `SearchOutcome::rerank`.
    pub async fn search_with_neural<P: INeuralReranker>(
        &self,
        chunks: &[Chunk],
        request: &SearchRequest,
        matrix: Option<&TagCooccurrenceMatrix>,
        provider: &P,
    ) -> SearchOutcome {
        let mut staged = self.run_until_rerank(chunks, request, matrix, None);
        let rerank = match request.query() {
            Some(query) if self.enabled(request.stages.rerank, self.retrieval.enable_rerank) => {
                Some(self.reranker.rerank_neural(provider, query, &mut staged.results).await)
            }
            _ => None,
        };
        self.finish(staged, request, rerank)
    }

    fn enabled(&self, toggle: Option<bool>, default: bool) -> bool {
        toggle.unwrap_or(default)
    }

    fn run_until_rerank(
        &self,
        chunks: &[Chunk],
        request: &SearchRequest,
        matrix: Option<&TagCooccurrenceMatrix>,
        predicate: Option<ChunkPredicate<'_>>,
    ) -> Staged {
        let start = Instant::now();
        let span = meshmemo_observability::search_span!(chunks.len(), request.query().is_some());
        let _guard = span.enter();

        // Stage 1: metadata filter.
        let candidates = filter::apply_filter(chunks, &request.filter, predicate);
        let candidate_count = candidates.len();

        // Stage 2: semantic recall.
        let mut results = semantic_recall(
            &candidates,
            &request.query_embedding,
            self.backend.as_ref(),
            self.retrieval.semantic_threshold,
            self.retrieval.recall_top_k,
        );

        // Stage 3: tag boost.
        if let Some(matrix) = matrix {
            if !request.query_tags.is_empty()
                && self.enabled(request.stages.tag_boost, self.retrieval.enable_tag_boost)
            {
                self.apply_tag_boost(matrix, &request.query_tags, &mut results);
            }
        }

        // Stage 4: time decay.
        if self.enabled(request.stages.time_decay, self.retrieval.enable_time_decay) {
            self.decay.apply(&mut results, request.now.unwrap_or_else(Utc::now));
        }

        let (k, dynamic_k) = self.choose_k(request, chunks.len());
        debug!(candidates = candidate_count, recalled = results.len(), k, "pre-rerank stages complete");

        Staged {
            results,
            candidate_count,
            k,
            dynamic_k,
            start,
        }
    }

    fn apply_tag_boost(
        &self,
        matrix: &TagCooccurrenceMatrix,
        query_tags: &[String],
        results: &mut [SearchResult],
    ) {
        let items: Vec<(Vec<String>, f64)> = results
            .iter()
            .map(|r| (content_tags(&r.metadata, &self.schema), r.final_score))
            .collect();
        let boosts = matrix.batch_compute_tag_boost(query_tags, &items, &self.boost_params);
        let mut boosted = 0;
        for (result, boost) in results.iter_mut().zip(boosts) {
            if boost.boost_factor > 1.0 {
                result.final_score *= boost.boost_factor;
                boosted += 1;
            }
        }
        sort_by_final_score(results);
        debug!(boosted, query_tags = query_tags.len(), "tag boost applied");
    }

    fn choose_k(&self, request: &SearchRequest, corpus_size: usize) -> (usize, Option<DynamicKResult>) {
        if let Some(k) = request.final_k {
            return (k, None);
        }
        match request.query() {
            Some(query) if self.enabled(request.stages.dynamic_k, self.retrieval.enable_dynamic_k) => {
                let result = self.dynamic_k.calculate(query, corpus_size, request.quality.as_ref());
                (result.k, Some(result))
            }
            _ => (self.retrieval.final_k, None),
        }
    }

    fn finish(
        &self,
        staged: Staged,
        request: &SearchRequest,
        rerank: Option<RerankOutcome>,
    ) -> SearchOutcome {
        let Staged {
            mut results,
            candidate_count,
            k,
            dynamic_k,
            start,
        } = staged;

        // Stage 6: diversity.
        if self.enabled(request.stages.diversity, self.retrieval.enable_diversity) {
            let top_k = self.diversity_top_k.unwrap_or(k);
            results = self.diversity.select(results, top_k);
        }

        // Stage 7: truncate.
        results.truncate(k);

        let latency = start.elapsed();
        events::search_completed(results.len(), candidate_count, latency.as_millis() as u64);
        info!(results = results.len(), k, dynamic = dynamic_k.is_some(), "search complete");

        SearchOutcome {
            results,
            candidate_count,
            k,
            dynamic_k,
            rerank,
            latency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ScalarBackend;
    use serde_json::json;

    fn pipeline() -> RetrievalPipeline {
        RetrievalPipeline::new(&MeshConfig::default(), Arc::new(ScalarBackend))
    }

    fn chunk(id: &str, content: &str, embedding: Vec<f32>, meta: serde_json::Value) -> Chunk {
        let mut c = Chunk::new(id, content);
        c.embedding = Some(embedding);
        c.metadata = meta.as_object().cloned().unwrap_or_default();
        c
    }

    #[test]
    fn fixed_k_truncates() {
        let chunks: Vec<Chunk> = (0..8)
            .map(|i| chunk(&format!("c{i}"), "text", vec![1.0, i as f32 * 0.1], json!({})))
            .collect();
        let out = pipeline().search(&chunks, &SearchRequest::new(vec![1.0, 0.0]).with_final_k(3), None);
        assert_eq!(out.results.len(), 3);
        assert_eq!(out.k, 3);
        assert!(out.dynamic_k.is_none());
        assert!(out.rerank.is_none());
        assert_eq!(out.results[0].id, "c0");
    }

    #[test]
    fn filter_runs_before_recall() {
        let chunks = vec![
            chunk("keep", "a", vec![1.0, 0.0], json!({"kind": "note"})),
            chunk("drop", "b", vec![1.0, 0.0], json!({"kind": "todo"})),
        ];
        let spec = FilterSpec::all(vec![meshmemo_core::models::FilterCondition::new(
            "kind",
            meshmemo_core::models::FilterOperator::Equals,
            json!("note"),
        )]);
        let out = pipeline().search(&chunks, &SearchRequest::new(vec![1.0, 0.0]).with_filter(spec), None);
        assert_eq!(out.candidate_count, 1);
        assert_eq!(out.results.len(), 1);
        assert_eq!(out.results[0].id, "keep");
    }

    #[test]
    fn query_text_enables_dynamic_k_and_rerank() {
        let chunks: Vec<Chunk> = (0..30)
            .map(|i| chunk(&format!("c{i}"), "rust ownership", vec![1.0, i as f32 * 0.01], json!({})))
            .collect();
        let req = SearchRequest::new(vec![1.0, 0.0]).with_query("rust ownership");
        let out = pipeline().search(&chunks, &req, None);
        let dk = out.dynamic_k.expect("dynamic k ran");
        assert_eq!(out.k, dk.k);
        assert!(out.results.len() <= dk.k);
        assert_eq!(out.rerank.map(|r| r.reranked_count), Some(30));
    }

    #[test]
    fn toggles_override_config() {
        let chunks: Vec<Chunk> = (0..5)
            .map(|i| chunk(&format!("c{i}"), "rust", vec![1.0, i as f32 * 0.1], json!({})))
            .collect();
        let mut req = SearchRequest::new(vec![1.0, 0.0]).with_query("rust");
        req.stages.rerank = Some(false);
        req.stages.dynamic_k = Some(false);
        let out = pipeline().search(&chunks, &req, None);
        assert!(out.rerank.is_none());
        assert!(out.dynamic_k.is_none());
        assert_eq!(out.k, RetrievalConfig::default().final_k);
    }

    #[test]
    fn tag_boost_reorders_matching_results() {
        let matrix = TagCooccurrenceMatrix::default();
        matrix.update("red", "formal", 1.0).unwrap();
        let chunks = vec![
            chunk("plain", "x", vec![1.0, 0.0], json!({"tags": ["blue"]})),
            chunk("tagged", "y", vec![1.0, 0.05], json!({"tags": ["red"]})),
        ];
        let mut req = SearchRequest::new(vec![1.0, 0.0]).with_tags(vec!["red".into()], None);
        req.stages.time_decay = Some(false);
        let out = pipeline().search(&chunks, &req, Some(&matrix));
        assert_eq!(out.results[0].id, "tagged");
        assert!(out.results[0].final_score > out.results[0].semantic_score);
        assert_eq!(out.results[1].final_score, out.results[1].semantic_score);
    }
}
