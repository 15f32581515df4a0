//! Maximal Marginal Relevance over metadata fields.
//!
//! Picks greedily by `λ·relevance − (1−λ)·max_similarity_to_selected`, seeded
//! with the most relevant result. Similarity looks only at the configured
//! diversity fields, never at content.

use meshmemo_core::config::{CollectionSchema, DiversityConfig};
use meshmemo_core::models::{resolve_path, Metadata, SearchResult};
use serde_json::Value;
use tracing::debug;

/// Similarity of two field values in `[0, 1]`.
///
/// Arrays compare by Jaccard overlap, equal scalars score 1.0, strings where
/// one contains the other score 0.5.
pub fn value_similarity(a: &Value, b: &Value) -> f64 {
    match (a, b) {
        (Value::Array(x), Value::Array(y)) => {
            let mut union: Vec<&Value> = Vec::with_capacity(x.len() + y.len());
            for v in x.iter().chain(y) {
                if !union.contains(&v) {
                    union.push(v);
                }
            }
            if union.is_empty() {
                return 0.0;
            }
            let shared = union.iter().filter(|v| x.contains(**v) && y.contains(**v)).count();
            shared as f64 / union.len() as f64
        }
        _ if a == b => 1.0,
        (Value::String(x), Value::String(y)) if x.contains(y.as_str()) || y.contains(x.as_str()) => 0.5,
        _ => 0.0,
    }
}

/// Mean [`value_similarity`] over `fields`. A field missing on either side
/// contributes 0.
pub fn metadata_similarity(a: &Metadata, b: &Metadata, fields: &[String]) -> f64 {
    if fields.is_empty() {
        return 0.0;
    }
    let total: f64 = fields
        .iter()
        .map(|f| match (resolve_path(a, f), resolve_path(b, f)) {
            (Some(x), Some(y)) => value_similarity(x, y),
            _ => 0.0,
        })
        .sum();
    total / fields.len() as f64
}

/// MMR selection with a fixed trade-off and field set.
#[derive(Debug, Clone)]
pub struct DiversitySampler {
    lambda: f64,
    fields: Vec<String>,
}

impl DiversitySampler {
    pub fn new(lambda: f64, fields: Vec<String>) -> Self {
        Self {
            lambda: lambda.clamp(0.0, 1.0),
            fields,
        }
    }

    pub fn from_config(config: &DiversityConfig, schema: &CollectionSchema) -> Self {
        Self::new(config.lambda, schema.diversity_fields.clone())
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Reorder `results` (assumed relevance-sorted) and keep `top_k`.
    /// When there are no more than `top_k` results they come back unchanged.
    pub fn select(&self, results: Vec<SearchResult>, top_k: usize) -> Vec<SearchResult> {
        if results.len() <= top_k {
            return results;
        }
        if top_k == 0 {
            return Vec::new();
        }

        let mut remaining: Vec<Option<SearchResult>> = results.into_iter().map(Some).collect();
        let mut selected: Vec<SearchResult> = Vec::with_capacity(top_k);
        if let Some(first) = remaining[0].take() {
            selected.push(first);
        }

        while selected.len() < top_k {
            let mut best: Option<(usize, f64)> = None;
            for (idx, candidate) in remaining.iter().enumerate() {
                let Some(candidate) = candidate else {
                    continue;
                };
                let max_sim = selected
                    .iter()
                    .map(|s| metadata_similarity(&candidate.metadata, &s.metadata, &self.fields))
                    .fold(0.0, f64::max);
                let mmr = self.lambda * candidate.final_score - (1.0 - self.lambda) * max_sim;
                // Strict comparison keeps the earliest index on ties.
                if best.map_or(true, |(_, b)| mmr > b) {
                    best = Some((idx, mmr));
                }
            }
            match best.and_then(|(idx, _)| remaining[idx].take()) {
                Some(next) => selected.push(next),
                None => break,
            }
        }

        debug!(selected = selected.len(), lambda = self.lambda, "mmr selection complete");
        selected
    }
}

impl Default for DiversitySampler {
    fn default() -> Self {
        Self::from_config(&DiversityConfig::default(), &CollectionSchema::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshmemo_core::models::Chunk;
    use serde_json::json;

    fn result(id: &str, score: f64, category: &str) -> SearchResult {
        let mut chunk = Chunk::new(id, id);
        chunk.metadata.insert("category".into(), json!(category));
        SearchResult::from_chunk(&chunk, 1.0, score)
    }

    #[test]
    fn value_similarity_rules() {
        assert_eq!(value_similarity(&json!(["a", "b"]), &json!(["b", "c"])), 1.0 / 3.0);
        assert_eq!(value_similarity(&json!([]), &json!([])), 0.0);
        assert_eq!(value_similarity(&json!("x"), &json!("x")), 1.0);
        assert_eq!(value_similarity(&json!(3), &json!(3)), 1.0);
        assert_eq!(value_similarity(&json!("rust"), &json!("rustacean")), 0.5);
        assert_eq!(value_similarity(&json!("go"), &json!("zig")), 0.0);
        assert_eq!(value_similarity(&json!(1), &json!("1")), 0.0);
    }

    #[test]
    fn short_input_is_unchanged() {
        let results = vec![result("a", 0.5, "x"), result("b", 0.9, "x")];
        let out = DiversitySampler::default().select(results.clone(), 5);
        assert_eq!(out, results);
    }

    #[test]
    fn seeds_with_first_and_prefers_new_categories() {
        let results = vec![
            result("a1", 0.90, "a"),
            result("a2", 0.89, "a"),
            result("a3", 0.88, "a"),
            result("b1", 0.87, "b"),
            result("c1", 0.86, "c"),
        ];
        let out = DiversitySampler::new(0.5, vec!["category".into()]).select(results, 3);
        let ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "b1", "c1"]);
    }

    #[test]
    fn lambda_one_is_relevance_order() {
        let results = vec![
            result("a1", 0.9, "a"),
            result("a2", 0.8, "a"),
            result("b1", 0.7, "b"),
        ];
        let out = DiversitySampler::new(1.0, vec!["category".into()]).select(results, 2);
        let ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2"]);
    }

    #[test]
    fn ties_keep_earliest_index() {
        let results = vec![
            result("a", 0.5, "x"),
            result("b", 0.5, "y"),
            result("c", 0.5, "z"),
        ];
        let out = DiversitySampler::new(0.5, vec!["category".into()]).select(results, 2);
        assert_eq!(out[1].id, "b");
    }
}
