//! Reciprocal Rank Fusion: score = Σ weight/(k + rank + 1)
//!
//! Merges lexical and vector rankings without normalizing their raw scores
//! against each other. A tag boost, when present, multiplies the fused score,
//! so a zero boost leaves the base ranking untouched.

use std::cmp::Ordering;
use std::collections::HashMap;

use meshmemo_core::config::FusionConfig;
use meshmemo_core::models::{HybridSearchResult, RankedItem, ResultSource};
use tracing::debug;

/// RRF contribution of a 0-based `rank` with smoothing constant `k`.
pub fn compute_rrf_score(rank: usize, k: f64) -> f64 {
    1.0 / (k + rank as f64 + 1.0)
}

/// Per-id accumulator. Insertion order is the tiebreak for equal scores.
#[derive(Debug, Default)]
struct Accumulated {
    content: String,
    bm25_rrf: f64,
    bm25_score: f64,
    bm25_rank: Option<usize>,
    vector_rrf: f64,
    vector_score: f64,
    vector_rank: Option<usize>,
}

fn slot<'a>(
    order: &mut Vec<String>,
    entries: &'a mut HashMap<String, Accumulated>,
    item: &RankedItem,
) -> &'a mut Accumulated {
    let entry = entries.entry(item.id.clone()).or_insert_with(|| {
        order.push(item.id.clone());
        Accumulated::default()
    });
    if entry.content.is_empty() {
        entry.content.clone_from(&item.content);
    }
    entry
}

fn sort_descending<T>(items: &mut [T], score: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| score(b).partial_cmp(&score(a)).unwrap_or(Ordering::Equal));
}

/// Weighted two-list RRF with optional multiplicative tag boost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankFusion {
    pub rrf_k: f64,
    pub bm25_weight: f64,
    pub vector_weight: f64,
    pub tag_boost_weight: f64,
}

impl Default for RankFusion {
    fn default() -> Self {
        Self::from_config(&FusionConfig::default())
    }
}

impl RankFusion {
    pub fn new(rrf_k: f64, bm25_weight: f64, vector_weight: f64, tag_boost_weight: f64) -> Self {
        Self {
            rrf_k,
            bm25_weight,
            vector_weight,
            tag_boost_weight,
        }
    }

    pub fn from_config(config: &FusionConfig) -> Self {
        Self::new(
            config.rrf_k,
            config.bm25_weight,
            config.vector_weight,
            config.tag_boost_weight,
        )
    }

    /// Fuse BM25 and vector rankings. Each list is taken as already ranked
    /// best-first; a duplicate id inside one list keeps its first rank.
    ///
    /// `tag_boosts` maps item id to a boost in `[0, ∞)`; the fused score is
    /// multiplied by `1 + boost * tag_boost_weight`.
    pub fn fuse_results(
        &self,
        bm25: &[RankedItem],
        vector: &[RankedItem],
        tag_boosts: Option<&HashMap<String, f64>>,
        limit: usize,
    ) -> Vec<HybridSearchResult> {
        let mut order: Vec<String> = Vec::with_capacity(bm25.len() + vector.len());
        let mut entries: HashMap<String, Accumulated> = HashMap::with_capacity(order.capacity());

        for (rank, item) in bm25.iter().enumerate() {
            let entry = slot(&mut order, &mut entries, item);
            if entry.bm25_rank.is_none() {
                entry.bm25_rank = Some(rank);
                entry.bm25_score = item.score;
                entry.bm25_rrf = compute_rrf_score(rank, self.rrf_k) * self.bm25_weight;
            }
        }
        for (rank, item) in vector.iter().enumerate() {
            let entry = slot(&mut order, &mut entries, item);
            if entry.vector_rank.is_none() {
                entry.vector_rank = Some(rank);
                entry.vector_score = item.score;
                entry.vector_rrf = compute_rrf_score(rank, self.rrf_k) * self.vector_weight;
            }
        }

        let mut results: Vec<HybridSearchResult> = order
            .into_iter()
            .filter_map(|id| {
                let acc = entries.remove(&id)?;
                let boost = tag_boosts.and_then(|m| m.get(&id)).copied().unwrap_or(0.0);
                let base = acc.bm25_rrf + acc.vector_rrf;
                let source = match (acc.bm25_rank, acc.vector_rank) {
                    (Some(_), Some(_)) => ResultSource::Both,
                    (Some(_), None) => ResultSource::Bm25,
                    _ => ResultSource::Vector,
                };
                Some(HybridSearchResult {
                    id,
                    content: acc.content,
                    final_score: base * (1.0 + boost * self.tag_boost_weight),
                    bm25_score: acc.bm25_score,
                    bm25_rank: acc.bm25_rank,
                    vector_score: acc.vector_score,
                    vector_rank: acc.vector_rank,
                    tag_boost_score: boost,
                    source,
                })
            })
            .collect();

        sort_descending(&mut results, |r| r.final_score);
        results.truncate(limit);

        debug!(
            bm25 = bm25.len(),
            vector = vector.len(),
            boosted = tag_boosts.map_or(0, HashMap::len),
            fused = results.len(),
            "rrf fusion complete"
        );
        results
    }

    /// Weighted sum of raw scores, for lists whose scores are already on a
    /// shared scale. No rank term and no tag boost.
    pub fn weighted_fusion(
        &self,
        bm25: &[RankedItem],
        vector: &[RankedItem],
        limit: usize,
    ) -> Vec<HybridSearchResult> {
        let mut order: Vec<String> = Vec::new();
        let mut entries: HashMap<String, Accumulated> = HashMap::new();

        for (rank, item) in bm25.iter().enumerate() {
            let entry = slot(&mut order, &mut entries, item);
            if entry.bm25_rank.is_none() {
                entry.bm25_rank = Some(rank);
                entry.bm25_score = item.score;
            }
        }
        for (rank, item) in vector.iter().enumerate() {
            let entry = slot(&mut order, &mut entries, item);
            if entry.vector_rank.is_none() {
                entry.vector_rank = Some(rank);
                entry.vector_score = item.score;
            }
        }

        let mut results: Vec<HybridSearchResult> = order
            .into_iter()
            .filter_map(|id| {
                let acc = entries.remove(&id)?;
                let source = match (acc.bm25_rank, acc.vector_rank) {
                    (Some(_), Some(_)) => ResultSource::Both,
                    (Some(_), None) => ResultSource::Bm25,
                    _ => ResultSource::Vector,
                };
                Some(HybridSearchResult {
                    id,
                    content: acc.content,
                    final_score: acc.bm25_score * self.bm25_weight
                        + acc.vector_score * self.vector_weight,
                    bm25_score: acc.bm25_score,
                    bm25_rank: acc.bm25_rank,
                    vector_score: acc.vector_score,
                    vector_rank: acc.vector_rank,
                    tag_boost_score: 0.0,
                    source,
                })
            })
            .collect();

        sort_descending(&mut results, |r| r.final_score);
        results.truncate(limit);
        results
    }
}

/// N-way weighted RRF. When `weights` does not have one entry per list,
/// every list gets weight `1/N`. Returned items carry the fused score.
pub fn multi_source_fusion(
    lists: &[Vec<RankedItem>],
    weights: &[f64],
    k: f64,
    limit: usize,
) -> Vec<RankedItem> {
    if lists.is_empty() {
        return Vec::new();
    }
    let equal = 1.0 / lists.len() as f64;
    let weight_of = |i: usize| {
        if weights.len() == lists.len() {
            weights[i]
        } else {
            equal
        }
    };

    let mut order: Vec<RankedItem> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (list_idx, list) in lists.iter().enumerate() {
        let weight = weight_of(list_idx);
        let mut seen: Vec<&str> = Vec::with_capacity(list.len());
        for (rank, item) in list.iter().enumerate() {
            if seen.contains(&item.id.as_str()) {
                continue;
            }
            seen.push(&item.id);
            let contribution = compute_rrf_score(rank, k) * weight;
            match index.get(&item.id) {
                Some(&i) => order[i].score += contribution,
                None => {
                    index.insert(item.id.clone(), order.len());
                    let mut fused = item.clone();
                    fused.score = contribution;
                    order.push(fused);
                }
            }
        }
    }

    sort_descending(&mut order, |r| r.score);
    order.truncate(limit);
    order
}

/// Min-max scale scores into `[0, 1]`. When every score is equal (range
/// under 1e-9) all scores become 1.0.
pub fn normalize_scores(items: &[RankedItem]) -> Vec<RankedItem> {
    let Some(min) = items.iter().map(|i| i.score).reduce(f64::min) else {
        return Vec::new();
    };
    let max = items.iter().map(|i| i.score).fold(min, f64::max);
    let range = max - min;
    items
        .iter()
        .map(|item| {
            let mut scaled = item.clone();
            scaled.score = if range < 1e-9 {
                1.0
            } else {
                (item.score - min) / range
            };
            scaled
        })
        .collect()
}
