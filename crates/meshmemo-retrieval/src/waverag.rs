//! WaveRAG: Lens → Expansion → Focus over externally supplied rankings.
//!
//! - **Lens** expands the query tags one hop through the co-occurrence matrix.
//! - **Expansion** diffuses breadth-first for `expansion_depth` hops, keeping
//!   neighbors whose edge weight clears `expansion_threshold`.
//! - **Focus** fuses the BM25 and vector lists with RRF, boosting items whose
//!   metadata tags match the expanded set, then keeps the top of the fused list.
//!
//! The phases always run in order. Without a matrix, Lens and Expansion pass
//! the query tags through unchanged and Focus fuses without boosts; the
//! request still produces a result.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use meshmemo_core::config::{CollectionSchema, MeshConfig, WaveRagConfig};
use meshmemo_core::constants::components;
use meshmemo_core::models::{
    DegradationEvent, ExpansionPhase, FocusPhase, LensPhase, RankedItem, WaveRagItem,
    WaveRagResult,
};
use meshmemo_observability::tracing_setup::events;
use meshmemo_tags::{TagBoostParams, TagCooccurrenceMatrix};
use tracing::debug;
use uuid::Uuid;

use crate::extract::content_tags;
use crate::search::RankFusion;

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1_000.0
}

/// Trimmed, non-empty, first-occurrence-order tags.
fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// A WaveRAG run's result plus the fallbacks it took.
#[derive(Debug, Clone)]
pub struct WaveRagRun {
    pub result: WaveRagResult,
    pub degradations: Vec<DegradationEvent>,
}

#[derive(Debug, Clone)]
pub struct WaveRagOrchestrator {
    config: WaveRagConfig,
    rrf_k: f64,
    boost_params: TagBoostParams,
    schema: CollectionSchema,
}

impl WaveRagOrchestrator {
    pub fn new(
        config: WaveRagConfig,
        rrf_k: f64,
        boost_params: TagBoostParams,
        schema: CollectionSchema,
    ) -> Self {
        Self {
            config,
            rrf_k,
            boost_params,
            schema,
        }
    }

    pub fn from_config(config: &MeshConfig) -> Self {
        Self::new(
            config.wave_rag.clone(),
            config.fusion.rrf_k,
            TagBoostParams::from(&config.tags),
            config.schema.clone(),
        )
    }

    pub fn config(&self) -> &WaveRagConfig {
        &self.config
    }

    fn lens(
        &self,
        cfg: &WaveRagConfig,
        matrix: Option<&TagCooccurrenceMatrix>,
        query_tags: &[String],
    ) -> LensPhase {
        let start = Instant::now();
        let (tags, degraded) = match matrix {
            Some(m) => (m.expand_query(query_tags, cfg.lens_expansion_factor), false),
            None => (query_tags.to_vec(), true),
        };
        let tags: Vec<String> = tags.into_iter().take(cfg.lens_max_tags).collect();
        debug!(tags = tags.len(), degraded, "lens phase complete");
        LensPhase {
            tags,
            duration_ms: elapsed_ms(start),
            degraded,
        }
    }

    fn expansion(
        &self,
        cfg: &WaveRagConfig,
        matrix: Option<&TagCooccurrenceMatrix>,
        seeds: &[String],
    ) -> ExpansionPhase {
        let start = Instant::now();
        let mut all: Vec<String> = seeds.iter().take(cfg.expansion_max_tags).cloned().collect();

        let Some(matrix) = matrix else {
            return ExpansionPhase {
                tags: all,
                depth_reached: 0,
                duration_ms: elapsed_ms(start),
                degraded: true,
            };
        };

        let mut visited: HashSet<String> = seeds.iter().cloned().collect();
        let mut frontier: Vec<(String, f64)> = all.iter().map(|t| (t.clone(), 1.0)).collect();
        let mut depth_reached = 0;

        'hops: for depth in 1..=cfg.expansion_depth {
            let mut next: Vec<(String, f64)> = Vec::new();
            for (tag, path_weight) in &frontier {
                for (neighbor, edge_weight) in matrix.neighbors(tag).into_iter().take(cfg.expansion_fanout) {
                    if edge_weight < cfg.expansion_threshold || visited.contains(&neighbor) {
                        continue;
                    }
                    if all.len() >= cfg.expansion_max_tags {
                        break 'hops;
                    }
                    visited.insert(neighbor.clone());
                    all.push(neighbor.clone());
                    next.push((neighbor, path_weight * cfg.expansion_decay));
                    depth_reached = depth;
                }
            }
            if next.is_empty() {
                break;
            }
            // Heavier paths expand first on the next hop.
            next.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            frontier = next;
        }

        debug!(tags = all.len(), depth_reached, "expansion phase complete");
        ExpansionPhase {
            tags: all,
            depth_reached,
            duration_ms: elapsed_ms(start),
            degraded: false,
        }
    }

    fn focus(
        &self,
        cfg: &WaveRagConfig,
        matrix: Option<&TagCooccurrenceMatrix>,
        boost_tags: &[String],
        bm25: &[RankedItem],
        vector: &[RankedItem],
        trace_id: &str,
    ) -> (FocusPhase, Vec<WaveRagItem>) {
        let start = Instant::now();
        let mut boosts: HashMap<String, f64> = HashMap::new();
        let mut matched: HashMap<String, Vec<String>> = HashMap::new();

        if let Some(matrix) = matrix.filter(|_| !boost_tags.is_empty()) {
            for item in bm25.iter().chain(vector) {
                if boosts.contains_key(&item.id) || matched.contains_key(&item.id) {
                    continue;
                }
                let Some(metadata) = &item.metadata else {
                    continue;
                };
                let tags = content_tags(metadata, &self.schema);
                if tags.is_empty() {
                    continue;
                }
                let r = matrix.compute_tag_boost(boost_tags, &tags, item.score, &self.boost_params);
                let mut hit = r.matched_tags;
                hit.extend(r.expansion_tags);
                if r.boost_factor > 1.0 {
                    boosts.insert(item.id.clone(), r.boost_factor - 1.0);
                }
                matched.insert(item.id.clone(), hit);
            }
        }

        let fusion = RankFusion::new(self.rrf_k, cfg.bm25_weight, cfg.vector_weight, cfg.tag_memo_weight);
        let fused = fusion.fuse_results(bm25, vector, Some(&boosts), usize::MAX);

        // Scores are RRF-scale, so the cut is relative to the best fused score.
        let cutoff = fused.first().map_or(0.0, |top| top.final_score * cfg.focus_score_threshold);
        let items: Vec<WaveRagItem> = fused
            .into_iter()
            .filter(|r| r.final_score >= cutoff)
            .take(cfg.focus_top_k)
            .map(|r| WaveRagItem {
                matched_tags: matched.remove(&r.id).unwrap_or_default(),
                original_score: r.bm25_score.max(r.vector_score),
                id: r.id,
                content: r.content,
                final_score: r.final_score,
                bm25_score: r.bm25_score,
                vector_score: r.vector_score,
                tag_boost_score: r.tag_boost_score,
                source: r.source,
                trace_id: trace_id.to_string(),
            })
            .collect();

        let phase = FocusPhase {
            result_count: items.len(),
            tag_boost_applied: !boosts.is_empty(),
            duration_ms: elapsed_ms(start),
        };
        debug!(results = items.len(), boosted = boosts.len(), "focus phase complete");
        (phase, items)
    }

    /// Run all three phases. `overrides` replaces this orchestrator's
    /// WaveRAG config for this call only.
    pub fn search(
        &self,
        matrix: Option<&TagCooccurrenceMatrix>,
        query_tags: &[String],
        bm25: &[RankedItem],
        vector: &[RankedItem],
        overrides: Option<&WaveRagConfig>,
    ) -> WaveRagRun {
        let start = Instant::now();
        let overridden = overrides.map(|o| o.clone().clamped());
        let cfg = overridden.as_ref().unwrap_or(&self.config);

        let trace_id = Uuid::new_v4().to_string();
        let query_tags = normalize_tags(query_tags);
        let span = meshmemo_observability::wave_rag_span!(trace_id, query_tags.len());
        let _guard = span.enter();

        let mut degradations = Vec::new();
        if matrix.is_none() {
            let event = DegradationEvent::now(
                components::TAG_MATRIX,
                "tag matrix unavailable",
                "unexpanded tags, unboosted fusion",
            );
            degradations.push(event);
        }

        let lens_phase = self.lens(cfg, matrix, &query_tags);
        let expansion_phase = self.expansion(cfg, matrix, &lens_phase.tags);
        let (focus_phase, results) =
            self.focus(cfg, matrix, &expansion_phase.tags, bm25, vector, &trace_id);

        let expansion_tags: Vec<String> = expansion_phase
            .tags
            .iter()
            .filter(|t| !query_tags.contains(t))
            .cloned()
            .collect();

        let total_duration_ms = elapsed_ms(start);
        events::wave_rag_completed(&trace_id, results.len(), expansion_tags.len(), total_duration_ms);

        WaveRagRun {
            result: WaveRagResult {
                results,
                lens_phase,
                expansion_phase,
                focus_phase,
                query_tags,
                expansion_tags,
                total_duration_ms,
                trace_id,
            },
            degradations,
        }
    }
}

impl Default for WaveRagOrchestrator {
    fn default() -> Self {
        Self::from_config(&MeshConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshmemo_core::models::ResultSource;
    use serde_json::json;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn item(id: &str, score: f64, item_tags: &[&str]) -> RankedItem {
        let mut r = RankedItem::new(id, score).with_content(format!("content {id}"));
        let meta = json!({ "tags": item_tags });
        r.metadata = meta.as_object().cloned();
        r
    }

    fn matrix() -> TagCooccurrenceMatrix {
        let m = TagCooccurrenceMatrix::default();
        for _ in 0..3 {
            m.update("red", "formal", 1.0).unwrap();
        }
        m.update("formal", "suit", 1.0).unwrap();
        m.update("suit", "tie", 1.0).unwrap();
        m
    }

    #[test]
    fn expansion_reaches_multi_hop_neighbors() {
        let o = WaveRagOrchestrator::default();
        let m = matrix();
        let phase = o.expansion(o.config(), Some(&m), &tags(&["red"]));
        assert_eq!(phase.tags[0], "red");
        assert!(phase.tags.contains(&"formal".to_string()));
        assert!(phase.tags.contains(&"suit".to_string()));
        assert_eq!(phase.depth_reached, 2);
        assert!(!phase.tags.contains(&"tie".to_string()));
    }

    #[test]
    fn expansion_respects_threshold_and_cap() {
        let m = matrix();
        let strict = WaveRagConfig {
            expansion_threshold: 5.0,
            ..Default::default()
        };
        let o = WaveRagOrchestrator::default();
        let phase = o.expansion(&strict, Some(&m), &tags(&["red"]));
        assert_eq!(phase.tags, tags(&["red"]));
        assert_eq!(phase.depth_reached, 0);

        let capped = WaveRagConfig {
            expansion_max_tags: 2,
            expansion_depth: 5,
            ..Default::default()
        };
        let phase = o.expansion(&capped, Some(&m), &tags(&["red"]));
        assert_eq!(phase.tags.len(), 2);
    }

    #[test]
    fn tagged_item_is_boosted() {
        let o = WaveRagOrchestrator::default();
        let m = matrix();
        let bm25 = vec![item("plain", 2.0, &["blue"]), item("match", 1.9, &["formal"])];
        let run = o.search(Some(&m), &tags(&["red"]), &bm25, &[], None);
        let r = &run.result;
        assert!(run.degradations.is_empty());
        assert!(r.focus_phase.tag_boost_applied);
        let matched = r.results.iter().find(|i| i.id == "match").unwrap();
        assert!(matched.tag_boost_score > 0.0);
        assert_eq!(matched.matched_tags, tags(&["formal"]));
        assert_eq!(r.results[0].id, "match");
        assert!(r.results.iter().all(|i| i.trace_id == r.trace_id));
        assert!(r.expansion_tags.contains(&"formal".to_string()));
    }

    #[test]
    fn missing_matrix_degrades_but_still_fuses() {
        let o = WaveRagOrchestrator::default();
        let bm25 = vec![item("a", 5.0, &["red"]), item("b", 3.0, &[])];
        let vector = vec![item("b", 0.9, &[]), item("c", 0.8, &[])];
        let run = o.search(None, &tags(&["red", " red ", ""]), &bm25, &vector, None);
        let r = &run.result;
        assert_eq!(run.degradations.len(), 1);
        assert!(r.lens_phase.degraded && r.expansion_phase.degraded);
        assert!(!r.focus_phase.tag_boost_applied);
        assert_eq!(r.query_tags, tags(&["red"]));
        assert_eq!(r.results[0].id, "b");
        assert_eq!(r.results[0].source, ResultSource::Both);
        assert_eq!(r.results[0].original_score, 3.0);
    }

    #[test]
    fn relative_threshold_and_top_k() {
        let o = WaveRagOrchestrator::default();
        let bm25: Vec<RankedItem> = (0..30).map(|i| item(&format!("d{i}"), 1.0, &[])).collect();
        let overrides = WaveRagConfig {
            focus_top_k: 4,
            ..Default::default()
        };
        let run = o.search(None, &[], &bm25, &[], Some(&overrides));
        assert_eq!(run.result.results.len(), 4);

        let strict = WaveRagConfig {
            focus_score_threshold: 1.0,
            ..Default::default()
        };
        let run = o.search(None, &[], &bm25, &[], Some(&strict));
        assert_eq!(run.result.results.len(), 1);
        assert_eq!(run.result.focus_phase.result_count, 1);
    }
}
