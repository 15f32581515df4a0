//! Incremental tag co-occurrence matrix.
//!
//! Every unordered pair is stored twice, once per direction, and both
//! directions are always written under the same write-lock acquisition, so
//! `cooccurrence(a, b) == cooccurrence(b, a)` holds for every observer.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use meshmemo_core::config::TagMatrixConfig;
use meshmemo_core::errors::{MeshError, MeshResult, TagMatrixError};
use meshmemo_core::models::{TagAssociation, TagMatrixStats, TagPairUpdate};
use tracing::{debug, warn};

/// One direction of a co-occurrence edge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Edge {
    /// Exponentially blended weight.
    pub weight: f64,
    /// Number of updates that touched the pair.
    pub count: u64,
}

#[derive(Debug, Clone)]
pub(crate) struct MatrixState {
    pub alpha: f64,
    pub beta: f64,
    pub edges: HashMap<String, HashMap<String, Edge>>,
    pub frequencies: HashMap<String, f64>,
    pub total_count: f64,
    pub total_updates: u64,
    pub min_cooccurrence: f64,
}

impl MatrixState {
    pub(crate) fn empty(alpha: f64, beta: f64) -> Self {
        Self {
            alpha,
            beta,
            edges: HashMap::new(),
            frequencies: HashMap::new(),
            total_count: 0.0,
            total_updates: 0,
            min_cooccurrence: 0.0,
        }
    }

    fn blend(&mut self, from: &str, to: &str, weight: f64) {
        let (alpha, beta) = (self.alpha, self.beta);
        let edge = self
            .edges
            .entry(from.to_string())
            .or_default()
            .entry(to.to_string())
            .or_default();
        edge.weight = edge.weight * beta + weight * alpha;
        edge.count += 1;
    }

    /// Apply one pair update. Returns false for rejected input.
    fn apply(&mut self, tag_a: &str, tag_b: &str, weight: f64) -> bool {
        if tag_a == tag_b || !weight.is_finite() {
            return false;
        }
        self.blend(tag_a, tag_b, weight);
        self.blend(tag_b, tag_a, weight);
        *self.frequencies.entry(tag_a.to_string()).or_insert(0.0) += weight;
        *self.frequencies.entry(tag_b.to_string()).or_insert(0.0) += weight;
        self.total_count += 2.0 * weight;
        self.total_updates += 1;
        true
    }

    pub(crate) fn edge(&self, tag_a: &str, tag_b: &str) -> Option<&Edge> {
        self.edges.get(tag_a).and_then(|m| m.get(tag_b))
    }

    pub(crate) fn frequency(&self, tag: &str) -> f64 {
        self.frequencies.get(tag).copied().unwrap_or(0.0)
    }

    pub(crate) fn pmi(&self, tag_a: &str, tag_b: &str) -> f64 {
        let cooc = self.edge(tag_a, tag_b).map_or(0.0, |e| e.weight);
        pmi_from_counts(cooc, self.frequency(tag_a), self.frequency(tag_b), self.total_count)
    }

    pub(crate) fn neighbor_count(&self, tag: &str) -> usize {
        self.edges.get(tag).map_or(0, HashMap::len)
    }
}

/// `ln((cooc/total) / ((fa/total)(fb/total)))`, or 0 when any input is
/// non-positive so the result is never NaN or infinite.
pub fn pmi_from_counts(cooc: f64, freq_a: f64, freq_b: f64, total: f64) -> f64 {
    if cooc <= 0.0 || freq_a <= 0.0 || freq_b <= 0.0 || total <= 0.0 {
        return 0.0;
    }
    let p_ab = cooc / total;
    let p_a = freq_a / total;
    let p_b = freq_b / total;
    let pmi = (p_ab / (p_a * p_b)).ln();
    if pmi.is_finite() {
        pmi
    } else {
        0.0
    }
}

fn by_score_then_tag(a: &(String, f64), b: &(String, f64)) -> Ordering {
    b.1.partial_cmp(&a.1)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.0.cmp(&b.0))
}

/// Thread-safe tag co-occurrence matrix.
///
/// Writers (`update`, `batch_update`, `observe_*`, `clear`) are mutually
/// exclusive. Readers share the lock and see a consistent state.
#[derive(Debug)]
pub struct TagCooccurrenceMatrix {
    state: RwLock<MatrixState>,
}

impl Default for TagCooccurrenceMatrix {
    fn default() -> Self {
        Self::from_config(&TagMatrixConfig::default())
    }
}

impl TagCooccurrenceMatrix {
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self {
            state: RwLock::new(MatrixState::empty(alpha, beta)),
        }
    }

    pub fn from_config(config: &TagMatrixConfig) -> Self {
        let mut state = MatrixState::empty(config.alpha, config.beta);
        state.min_cooccurrence = config.min_cooccurrence;
        Self::from_state(state)
    }

    pub(crate) fn from_state(state: MatrixState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Read access. A poisoned lock still holds a consistent state because
    /// every mutation completes before its guard drops, so recover it.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, MatrixState> {
        self.state.read().unwrap_or_else(|poisoned| {
            warn!("tag matrix lock poisoned, reading recovered state");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> MeshResult<RwLockWriteGuard<'_, MatrixState>> {
        self.state.write().map_err(|e| {
            MeshError::from(TagMatrixError::LockPoisoned {
                details: e.to_string(),
            })
        })
    }

    /// Blend one observation into the pair `(tag_a, tag_b)`.
    ///
    /// Returns `Ok(false)` when the update was rejected: self-pairs and
    /// non-finite weights never touch the matrix.
    pub fn update(&self, tag_a: &str, tag_b: &str, weight: f64) -> MeshResult<bool> {
        let mut state = self.write()?;
        let applied = state.apply(tag_a, tag_b, weight);
        if !applied {
            debug!(tag_a, tag_b, weight, "tag pair update rejected");
        }
        Ok(applied)
    }

    /// Apply many updates under a single write-lock acquisition.
    /// Returns how many were applied.
    pub fn batch_update(&self, updates: &[TagPairUpdate]) -> MeshResult<usize> {
        let mut state = self.write()?;
        let applied = updates
            .iter()
            .filter(|u| state.apply(&u.tag_a, &u.tag_b, u.weight))
            .count();
        debug!(requested = updates.len(), applied, "tag matrix batch update");
        Ok(applied)
    }

    /// Update every unordered pair of distinct tags seen together in one chunk.
    pub fn observe_tags(&self, tags: &[String]) -> MeshResult<usize> {
        let mut seen = HashSet::new();
        let unique: Vec<&String> = tags.iter().filter(|t| seen.insert(t.as_str())).collect();

        let mut state = self.write()?;
        let mut applied = 0;
        for (i, a) in unique.iter().enumerate() {
            for b in &unique[i + 1..] {
                if state.apply(a, b, 1.0) {
                    applied += 1;
                }
            }
        }
        Ok(applied)
    }

    /// `observe_tags` for each document's tag set.
    pub fn observe_documents<T: AsRef<[String]>>(&self, documents: &[T]) -> MeshResult<usize> {
        let mut applied = 0;
        for tags in documents {
            applied += self.observe_tags(tags.as_ref())?;
        }
        Ok(applied)
    }

    /// Pointwise mutual information. 0 when either tag is unseen or the pair
    /// never co-occurred.
    pub fn compute_pmi(&self, tag_a: &str, tag_b: &str) -> f64 {
        self.read().pmi(tag_a, tag_b)
    }

    /// Tags co-occurring with `tag`, by descending PMI, at most `top_k`.
    pub fn get_associations(&self, tag: &str, top_k: usize) -> Vec<TagAssociation> {
        let state = self.read();
        let Some(neighbors) = state.edges.get(tag) else {
            return Vec::new();
        };

        let mut associations: Vec<TagAssociation> = neighbors
            .iter()
            .filter(|(_, edge)| edge.weight >= state.min_cooccurrence)
            .map(|(other, edge)| TagAssociation {
                tag: other.clone(),
                pmi: state.pmi(tag, other),
                cooccurrence: edge.weight,
                count: edge.count,
            })
            .collect();

        associations.sort_by(|a, b| {
            b.pmi
                .partial_cmp(&a.pmi)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.tag.cmp(&b.tag))
        });
        associations.truncate(top_k);
        associations
    }

    /// One-hop expansion returning tags with their expansion weights,
    /// descending. Input tags carry weight 1.0.
    pub fn expand_query_weighted(&self, tags: &[String], expansion_factor: f64) -> Vec<(String, f64)> {
        let state = self.read();
        let mut weights: HashMap<&str, f64> = HashMap::new();
        let mut expanded: Vec<(String, f64)> = Vec::new();

        for tag in tags {
            if weights.insert(tag.as_str(), 1.0).is_none() {
                expanded.push((tag.clone(), 1.0));
            }
        }

        for tag in tags {
            let Some(neighbors) = state.edges.get(tag) else {
                continue;
            };
            let mut sorted: Vec<(&String, &Edge)> = neighbors.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));

            for (other, edge) in sorted {
                if weights.contains_key(other.as_str()) {
                    continue;
                }
                let denom = (state.frequency(tag) * state.frequency(other)).sqrt();
                let ratio = if denom > 0.0 { edge.weight / denom } else { 0.0 };
                let weight = ratio.exp() * expansion_factor;
                weights.insert(other.as_str(), weight);
                expanded.push((other.clone(), weight));
            }
        }

        // Stable: equal weights keep input tags first, then neighbors alphabetically.
        expanded.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        expanded
    }

    /// One-hop expansion: the input tags plus every neighbor, ordered by
    /// expansion weight. Weights are not returned.
    pub fn expand_query(&self, tags: &[String], expansion_factor: f64) -> Vec<String> {
        self.expand_query_weighted(tags, expansion_factor)
            .into_iter()
            .map(|(tag, _)| tag)
            .collect()
    }

    /// Blended weight of the pair, 0 when absent.
    pub fn cooccurrence(&self, tag_a: &str, tag_b: &str) -> f64 {
        self.read().edge(tag_a, tag_b).map_or(0.0, |e| e.weight)
    }

    /// Number of updates that touched the pair.
    pub fn edge_count(&self, tag_a: &str, tag_b: &str) -> u64 {
        self.read().edge(tag_a, tag_b).map_or(0, |e| e.count)
    }

    pub fn frequency(&self, tag: &str) -> f64 {
        self.read().frequency(tag)
    }

    /// Neighbors of `tag` with their blended weights, heaviest first.
    pub fn neighbors(&self, tag: &str) -> Vec<(String, f64)> {
        let state = self.read();
        let mut out: Vec<(String, f64)> = state
            .edges
            .get(tag)
            .map(|m| m.iter().map(|(t, e)| (t.clone(), e.weight)).collect())
            .unwrap_or_default();
        out.sort_by(by_score_then_tag);
        out
    }

    /// All tags with a nonzero frequency, sorted.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.read().frequencies.keys().cloned().collect();
        tags.sort();
        tags
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        self.read().frequencies.contains_key(tag)
    }

    /// Hide edges lighter than `threshold` from `get_associations`.
    pub fn set_min_cooccurrence(&self, threshold: f64) -> MeshResult<()> {
        self.write()?.min_cooccurrence = if threshold.is_finite() { threshold.max(0.0) } else { 0.0 };
        Ok(())
    }

    /// Drop all edges, frequencies and counters. Alpha and beta are kept.
    pub fn clear(&self) -> MeshResult<()> {
        let mut state = self.write()?;
        let (alpha, beta, min) = (state.alpha, state.beta, state.min_cooccurrence);
        *state = MatrixState::empty(alpha, beta);
        state.min_cooccurrence = min;
        Ok(())
    }

    pub fn stats(&self) -> TagMatrixStats {
        let state = self.read();
        let directed: usize = state.edges.values().map(HashMap::len).sum();
        TagMatrixStats {
            tag_count: state.frequencies.len(),
            pair_count: directed / 2,
            total_updates: state.total_updates,
            total_count: state.total_count,
            alpha: state.alpha,
            beta: state.beta,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.read().frequencies.is_empty()
    }
}
