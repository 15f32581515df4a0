//! Local keyword reranking, with an optional neural provider in front of it.
//!
//! Local mode multiplies each incoming score by a keyword-density term, a
//! first-paragraph term, and an exact-phrase term. Neural mode asks an
//! [`INeuralReranker`] for relevance scores under a deadline; any provider
//! failure or timeout falls back to local mode and is reported in the
//! returned [`RerankOutcome`], never as an error.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::time::Duration;

use meshmemo_core::config::RerankConfig;
use meshmemo_core::errors::RerankError;
use meshmemo_core::models::{NeuralScore, RerankMode, RerankOutcome, SearchResult};
use meshmemo_core::traits::INeuralReranker;
use tracing::{debug, warn, Instrument};

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

fn sort_by_final_score(results: &mut [SearchResult]) {
    results.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(Ordering::Equal)
    });
}

#[derive(Debug, Clone, Default)]
pub struct Reranker {
    config: RerankConfig,
}

impl Reranker {
    pub fn new(config: RerankConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RerankConfig {
        &self.config
    }

    /// Lowercased, de-duplicated query terms of at least `min_keyword_len` chars.
    pub fn keywords(&self, query: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for word in tokens(query) {
            if word.chars().count() >= self.config.min_keyword_len && !out.contains(&word) {
                out.push(word);
            }
        }
        out
    }

    /// Combined multiplier for one document. Always `>= 1.0`.
    pub fn boost(&self, query: &str, keywords: &[String], content: &str) -> f64 {
        let cfg = &self.config;
        if keywords.is_empty() || content.is_empty() {
            return 1.0;
        }
        let wanted: HashSet<&str> = keywords.iter().map(String::as_str).collect();

        let words: Vec<String> = tokens(content).collect();
        let hits = words.iter().filter(|w| wanted.contains(w.as_str())).count();
        let density = if words.is_empty() {
            0.0
        } else {
            hits as f64 / words.len() as f64
        };
        let mut boost = 1.0 + (density * cfg.keyword_density_weight).min(cfg.max_density_boost);

        let first_paragraph = content.split("\n\n").next().unwrap_or(content);
        if tokens(first_paragraph).any(|w| wanted.contains(w.as_str())) {
            boost *= cfg.first_paragraph_boost;
        }

        let phrase = query.trim().to_lowercase();
        if phrase.chars().count() >= cfg.min_phrase_len && content.to_lowercase().contains(&phrase) {
            boost *= cfg.exact_phrase_boost;
        }
        boost
    }

    /// Apply local boosts to every result and re-sort descending.
    pub fn rerank_local(&self, query: &str, results: &mut [SearchResult]) -> RerankOutcome {
        let keywords = self.keywords(query);
        if keywords.is_empty() || results.is_empty() {
            return RerankOutcome::local(0);
        }
        let span = meshmemo_observability::rerank_span!("local", results.len());
        let _guard = span.enter();

        for result in results.iter_mut() {
            result.final_score *= self.boost(query, &keywords, &result.content);
        }
        sort_by_final_score(results);
        debug!(keywords = keywords.len(), reranked = results.len(), "local rerank applied");
        RerankOutcome::local(results.len())
    }

    /// Rerank through `provider`, falling back to local mode on failure.
    ///
    /// Only the first `neural_max_documents` results are sent. Scores below
    /// `neural_min_score` are ignored; the rest multiply the result's score
    /// by `1 + relevance`.
    pub async fn rerank_neural<P: INeuralReranker>(
        &self,
        provider: &P,
        query: &str,
        results: &mut [SearchResult],
    ) -> RerankOutcome {
        if results.is_empty() || query.trim().is_empty() {
            return RerankOutcome::local(0);
        }
        let cap = results.len().min(self.config.neural_max_documents);
        let documents: Vec<String> = results[..cap].iter().map(|r| r.content.clone()).collect();

        match self.call_provider(provider, query, &documents).await {
            Ok(scores) => {
                let applied = self.apply_neural_scores(results, &scores);
                sort_by_final_score(results);
                debug!(provider = provider.name(), applied, "neural rerank applied");
                RerankOutcome {
                    mode: RerankMode::Neural,
                    fallback_reason: None,
                    reranked_count: applied,
                }
            }
            Err(err) => {
                warn!(provider = provider.name(), error = %err, "neural rerank failed, using local");
                let local = self.rerank_local(query, results);
                RerankOutcome {
                    mode: RerankMode::LocalFallback,
                    fallback_reason: Some(err.to_string()),
                    reranked_count: local.reranked_count,
                }
            }
        }
    }

    async fn call_provider<P: INeuralReranker>(
        &self,
        provider: &P,
        query: &str,
        documents: &[String],
    ) -> Result<Vec<NeuralScore>, RerankError> {
        let timeout_ms = self.config.neural_timeout_ms;
        let span = meshmemo_observability::rerank_span!("neural", documents.len());
        let call = provider.rerank(query, documents).instrument(span);

        let scores = match tokio::time::timeout(Duration::from_millis(timeout_ms), call).await {
            Err(_) => {
                return Err(RerankError::Timeout {
                    provider: provider.name().to_string(),
                    timeout_ms,
                })
            }
            Ok(Err(e)) => {
                return Err(RerankError::ProviderFailed {
                    provider: provider.name().to_string(),
                    reason: e.to_string(),
                })
            }
            Ok(Ok(scores)) => scores,
        };

        if let Some(bad) = scores.iter().find(|s| s.index >= documents.len()) {
            return Err(RerankError::InvalidIndex {
                provider: provider.name().to_string(),
                index: bad.index,
                documents: documents.len(),
            });
        }
        Ok(scores)
    }

    fn apply_neural_scores(&self, results: &mut [SearchResult], scores: &[NeuralScore]) -> usize {
        let mut seen: HashSet<usize> = HashSet::new();
        let mut applied = 0;
        for score in scores {
            let relevance = score.relevance_score;
            if !relevance.is_finite() || relevance < self.config.neural_min_score {
                continue;
            }
            if !seen.insert(score.index) {
                continue;
            }
            if let Some(result) = results.get_mut(score.index) {
                result.final_score *= 1.0 + relevance;
                applied += 1;
            }
        }
        applied
    }
}
