//! Tag boost: rewards content whose tags match the query tags or their
//! co-occurring neighbors.
//!
//! The strength exponent (alpha) rises with how common the query tags are,
//! and the noise constant (beta) rises as they get rarer, so a vague query
//! boosts less aggressively than a precise one. Each match contributes
//! `strength^alpha / ln(neighbor_count + beta)`; the sum is squashed into a
//! multiplicative factor in `[1.0, 1.5)`.

use std::collections::HashSet;

use meshmemo_core::config::TagMatrixConfig;
use meshmemo_core::models::{SpikeDetail, SpikeKind, TagBoostResult};

use crate::matrix::{MatrixState, TagCooccurrenceMatrix};

/// Expansion matches count at half weight and half score.
const EXPANSION_DISCOUNT: f64 = 0.5;
/// Maximum extra boost, reached as the spike score grows without bound.
const MAX_BOOST: f64 = 0.5;
/// Scale applied to `(1 - avg)` when deriving beta.
const BETA_SPREAD: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TagBoostParams {
    pub alpha_min: f64,
    pub alpha_max: f64,
    pub beta_base: f64,
}

impl Default for TagBoostParams {
    fn default() -> Self {
        Self::from(&TagMatrixConfig::default())
    }
}

impl From<&TagMatrixConfig> for TagBoostParams {
    fn from(config: &TagMatrixConfig) -> Self {
        Self {
            alpha_min: config.boost_alpha_min,
            alpha_max: config.boost_alpha_max,
            beta_base: config.boost_beta_base,
        }
    }
}

/// `strength^alpha / ln(neighbors + beta)`, without the log when it is not positive.
fn spike(strength: f64, neighbors: f64, beta: f64, alpha: f64) -> f64 {
    let logic = strength.powf(alpha);
    let noise = (neighbors + beta).ln();
    let score = if noise > 0.0 { logic / noise } else { logic };
    if score.is_finite() {
        score
    } else {
        0.0
    }
}

fn compute(
    state: &MatrixState,
    query_tags: &[String],
    content_tags: &[String],
    original_score: f64,
    params: &TagBoostParams,
) -> TagBoostResult {
    if query_tags.is_empty() || content_tags.is_empty() {
        return TagBoostResult::neutral(original_score);
    }

    let avg = if state.total_count > 0.0 {
        query_tags
            .iter()
            .map(|t| state.frequency(t) / state.total_count)
            .sum::<f64>()
            / query_tags.len() as f64
    } else {
        0.0
    };
    let (lo, hi) = if params.alpha_min <= params.alpha_max {
        (params.alpha_min, params.alpha_max)
    } else {
        (params.alpha_max, params.alpha_min)
    };
    let alpha = (lo + (hi - lo) * avg).clamp(lo, hi);
    let beta = params.beta_base + (1.0 - avg) * BETA_SPREAD;

    let content: HashSet<String> = content_tags.iter().map(|t| t.to_lowercase()).collect();
    let neighbors_of = |tag: &str| match state.neighbor_count(tag) {
        0 => 1.0,
        n => n as f64,
    };

    let mut total = 0.0;
    let mut details = Vec::new();
    let mut matched: Vec<String> = Vec::new();

    for tag in query_tags {
        if matched.contains(tag) || !content.contains(&tag.to_lowercase()) {
            continue;
        }
        let freq = match state.frequency(tag) {
            f if f > 0.0 => f,
            _ => 1.0,
        };
        let global = neighbors_of(tag);
        let score = spike(freq, global, beta, alpha);
        total += score;
        details.push(SpikeDetail {
            tag: tag.clone(),
            kind: SpikeKind::Direct,
            weight: freq,
            global_freq: global,
            score,
        });
        matched.push(tag.clone());
    }

    let mut expansion: Vec<String> = Vec::new();
    for tag in query_tags {
        let Some(row) = state.edges.get(tag) else {
            continue;
        };
        let mut row: Vec<_> = row.iter().collect();
        row.sort_by(|a, b| a.0.cmp(b.0));
        for (other, edge) in row {
            if matched.contains(other)
                || expansion.contains(other)
                || !content.contains(&other.to_lowercase())
            {
                continue;
            }
            let weight = edge.weight * EXPANSION_DISCOUNT;
            let global = neighbors_of(other);
            let score = spike(weight, global, beta, alpha) * EXPANSION_DISCOUNT;
            total += score;
            details.push(SpikeDetail {
                tag: other.clone(),
                kind: SpikeKind::Expansion,
                weight,
                global_freq: global,
                score,
            });
            expansion.push(other.clone());
        }
    }

    let denom = total + 2.0 * beta;
    let normalized = if denom > 0.0 { total / denom } else { 0.0 };
    let boost_factor = 1.0 + normalized * MAX_BOOST;

    TagBoostResult {
        boosted_score: (original_score * boost_factor).min(1.0),
        boost_factor,
        tag_match_score: total,
        matched_tags: matched,
        expansion_tags: expansion,
        spike_details: details,
        dynamic_alpha: alpha,
        dynamic_beta: beta,
    }
}

impl TagCooccurrenceMatrix {
    /// Boost `original_score` by how well `content_tags` match `query_tags`
    /// and their co-occurring neighbors. Matching is case-insensitive.
    pub fn compute_tag_boost(
        &self,
        query_tags: &[String],
        content_tags: &[String],
        original_score: f64,
        params: &TagBoostParams,
    ) -> TagBoostResult {
        compute(&self.read(), query_tags, content_tags, original_score, params)
    }

    /// `compute_tag_boost` for many items under one read-lock acquisition.
    pub fn batch_compute_tag_boost(
        &self,
        query_tags: &[String],
        items: &[(Vec<String>, f64)],
        params: &TagBoostParams,
    ) -> Vec<TagBoostResult> {
        let state = self.read();
        items
            .iter()
            .map(|(tags, score)| compute(&state, query_tags, tags, *score, params))
            .collect()
    }
}
