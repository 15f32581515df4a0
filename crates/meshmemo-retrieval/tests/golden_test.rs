//! Golden dataset tests for meshmemo-retrieval.
//!
//! Each fixture under `test-fixtures/golden/{fusion,retrieval}` pins the
//! expected output of one component for a hand-computed input.

use meshmemo_core::models::{Chunk, ResultSource, SearchResult};
use meshmemo_retrieval::{DiversitySampler, DynamicKCalculator, RankFusion};
use serde::Deserialize;
use test_fixtures::{list_fixtures, load_fixture, ranked};

// ---------------------------------------------------------------------------
// Fusion
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct Scored {
    id: String,
    score: f64,
}

#[derive(Deserialize)]
struct ExpectedFused {
    id: String,
    final_score: f64,
    source: ResultSource,
}

#[derive(Deserialize)]
struct FusionFixture {
    rrf_k: f64,
    bm25_weight: f64,
    vector_weight: f64,
    bm25: Vec<Scored>,
    vector: Vec<Scored>,
    expected: Vec<ExpectedFused>,
}

fn to_ranked(items: &[Scored]) -> Vec<meshmemo_core::RankedItem> {
    let pairs: Vec<(&str, f64)> = items.iter().map(|s| (s.id.as_str(), s.score)).collect();
    ranked(&pairs)
}

#[test]
fn golden_fusion_files() {
    let files = list_fixtures("golden/fusion");
    assert!(!files.is_empty());
    for file in files {
        let name = file.file_name().unwrap().to_string_lossy().to_string();
        let fixture: FusionFixture = load_fixture(&format!("golden/fusion/{name}"));
        let fusion = RankFusion::new(fixture.rrf_k, fixture.bm25_weight, fixture.vector_weight, 0.2);
        let fused = fusion.fuse_results(
            &to_ranked(&fixture.bm25),
            &to_ranked(&fixture.vector),
            None,
            20,
        );

        assert_eq!(fused.len(), fixture.expected.len(), "{name}: result count");
        for (got, want) in fused.iter().zip(&fixture.expected) {
            assert_eq!(got.id, want.id, "{name}: order");
            assert!(
                (got.final_score - want.final_score).abs() < 1e-12,
                "{name}/{}: expected {}, got {}",
                want.id,
                want.final_score,
                got.final_score
            );
            assert_eq!(got.source, want.source, "{name}/{}: source", want.id);
        }
    }
}

// ---------------------------------------------------------------------------
// Dynamic K
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct KCase {
    query: String,
    corpus_size: usize,
    k_min: usize,
    k_max: usize,
}

#[derive(Deserialize)]
struct KFixture {
    cases: Vec<KCase>,
}

#[test]
fn golden_dynamic_k_queries() {
    let fixture: KFixture = load_fixture("golden/retrieval/dynamic_k_queries.json");
    let calc = DynamicKCalculator::default();
    for case in &fixture.cases {
        let r = calc.calculate(&case.query, case.corpus_size, None);
        assert!(
            (case.k_min..=case.k_max).contains(&r.k),
            "{:?} over {}: k = {}, expected [{}, {}]",
            case.query,
            case.corpus_size,
            r.k,
            case.k_min,
            case.k_max
        );
        assert!((0.0..=1.0).contains(&r.confidence));
    }
}

// ---------------------------------------------------------------------------
// MMR
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct Candidate {
    id: String,
    score: f64,
    category: String,
}

#[derive(Deserialize)]
struct MmrFixture {
    lambda: f64,
    top_k: usize,
    candidates: Vec<Candidate>,
    expected_first: String,
    expected_categories_in_first_three: Vec<String>,
}

fn category(r: &SearchResult) -> &str {
    r.metadata["category"].as_str().unwrap_or_default()
}

/// Number of selected pairs sharing a category.
fn overlap(results: &[SearchResult]) -> usize {
    let mut n = 0;
    for i in 0..results.len() {
        for j in i + 1..results.len() {
            if category(&results[i]) == category(&results[j]) {
                n += 1;
            }
        }
    }
    n
}

#[test]
fn golden_mmr_categories() {
    let fixture: MmrFixture = load_fixture("golden/retrieval/mmr_categories.json");
    let results: Vec<SearchResult> = fixture
        .candidates
        .iter()
        .map(|c| {
            let mut chunk = Chunk::new(&c.id, &c.id);
            chunk
                .metadata
                .insert("category".into(), serde_json::Value::from(c.category.clone()));
            SearchResult::from_chunk(&chunk, 1.0, c.score)
        })
        .collect();

    let sampler = DiversitySampler::new(fixture.lambda, vec!["category".into()]);
    let selected = sampler.select(results.clone(), fixture.top_k);

    assert_eq!(selected.len(), fixture.top_k);
    assert_eq!(selected[0].id, fixture.expected_first);
    let first_three: Vec<&str> = selected[..3].iter().map(category).collect();
    assert_eq!(first_three, fixture.expected_categories_in_first_three);
    assert!(overlap(&selected) < overlap(&results[..fixture.top_k]));
}
