use meshmemo_core::config::DynamicKConfig;
use meshmemo_core::models::{Chunk, QualityStats, QueryAnalysis, RankedItem, SearchResult};
use meshmemo_retrieval::search::{compute_rrf_score, normalize_scores};
use meshmemo_retrieval::vector::cosine_similarity;
use meshmemo_retrieval::{DiversitySampler, DynamicKCalculator, RankFusion};
use proptest::prelude::*;
use serde_json::json;

fn arb_vector() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-100.0f32..100.0, 1..32)
}

fn arb_quality() -> impl Strategy<Value = Option<QualityStats>> {
    prop::option::of((0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0).prop_map(|(a, v, r)| QualityStats {
        avg_relevance: a,
        score_variance: v,
        high_quality_ratio: r,
    }))
}

fn results(scores: &[(f64, u8)]) -> Vec<SearchResult> {
    let mut out: Vec<SearchResult> = scores
        .iter()
        .enumerate()
        .map(|(i, (score, cat))| {
            let mut chunk = Chunk::new(format!("r{i}"), "x");
            chunk.metadata.insert("category".into(), json!(format!("c{cat}")));
            SearchResult::from_chunk(&chunk, 1.0, *score)
        })
        .collect();
    out.sort_by(|a, b| b.final_score.partial_cmp(&a.final_score).unwrap());
    out
}

proptest! {
    #[test]
    fn cosine_of_self_is_one(v in arb_vector()) {
        prop_assume!(v.iter().any(|x| x.abs() > 1e-3));
        prop_assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_against_zero_is_zero(v in arb_vector()) {
        let zero = vec![0.0; v.len()];
        prop_assert_eq!(cosine_similarity(&zero, &v), 0.0);
    }

    #[test]
    fn cosine_is_bounded(a in arb_vector(), b in arb_vector()) {
        let s = cosine_similarity(&a, &b);
        prop_assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&s));
    }

    #[test]
    fn dynamic_k_within_bounds(
        complexity in 0.0f64..1.0,
        intents in 1usize..6,
        entities in any::<bool>(),
        question in any::<bool>(),
        corpus in 0usize..10_000_000,
        quality in arb_quality(),
        min_k in 1usize..10,
        span in 0usize..30,
    ) {
        let calc = DynamicKCalculator::new(DynamicKConfig {
            min_k,
            max_k: min_k + span,
            base_k: min_k,
            ..Default::default()
        });
        let analysis = QueryAnalysis {
            complexity,
            intent_count: intents,
            has_multiple_entities: entities,
            is_question: question,
            keyword_count: 0,
        };
        let r = calc.calculate_with_details(&analysis, corpus, quality.as_ref());
        prop_assert!(r.k >= min_k && r.k <= min_k + span);
        prop_assert!((0.0..=1.0).contains(&r.confidence));
        prop_assert_eq!(r.reasons.len(), r.adjustments.len());
    }

    #[test]
    fn dynamic_k_from_free_text_within_bounds(query in ".{0,200}", corpus in 0usize..1_000_000) {
        let calc = DynamicKCalculator::default();
        let r = calc.calculate(&query, corpus, None);
        prop_assert!(r.k >= 3 && r.k <= 20);
    }

    #[test]
    fn vector_only_fusion_follows_vector_order(
        n in 1usize..20,
        vector_weight in 0.01f64..1.0,
    ) {
        let vector: Vec<RankedItem> = (0..n).map(|i| RankedItem::new(format!("v{i}"), 1.0 - i as f64 * 0.01)).collect();
        let fusion = RankFusion::new(60.0, 0.5, vector_weight, 0.2);
        let fused = fusion.fuse_results(&[], &vector, None, n);
        prop_assert_eq!(fused.len(), n);
        for (rank, r) in fused.iter().enumerate() {
            prop_assert_eq!(&r.id, &format!("v{rank}"));
            let expected = compute_rrf_score(rank, 60.0) * vector_weight;
            prop_assert!((r.final_score - expected).abs() < 1e-15);
        }
    }

    #[test]
    fn mmr_length_and_seed(
        scores in prop::collection::vec((0.0f64..1.0, 0u8..4), 0..30),
        top_k in 0usize..15,
        lambda in 0.0f64..1.0,
    ) {
        let input = results(&scores);
        let best = input.first().map(|r| r.id.clone());
        let out = DiversitySampler::new(lambda, vec!["category".into()]).select(input.clone(), top_k);
        prop_assert_eq!(out.len(), top_k.min(input.len()));
        if !out.is_empty() {
            prop_assert_eq!(Some(out[0].id.clone()), best);
        }
    }

    #[test]
    fn normalized_scores_are_unit_interval(raw in prop::collection::vec(-50.0f64..50.0, 1..30)) {
        let items: Vec<RankedItem> = raw.iter().enumerate().map(|(i, s)| RankedItem::new(format!("i{i}"), *s)).collect();
        for item in normalize_scores(&items) {
            prop_assert!((0.0..=1.0).contains(&item.score));
        }
    }
}
