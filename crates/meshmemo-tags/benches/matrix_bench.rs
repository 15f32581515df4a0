use criterion::{black_box, criterion_group, criterion_main, Criterion};

use meshmemo_tags::{TagBoostParams, TagCooccurrenceMatrix};

/// 500 tags, each document carrying 5 of them.
fn build_matrix() -> TagCooccurrenceMatrix {
    let m = TagCooccurrenceMatrix::default();
    let docs: Vec<Vec<String>> = (0..2_000)
        .map(|d| (0..5).map(|i| format!("tag{}", (d * 7 + i * 13) % 500)).collect())
        .collect();
    m.observe_documents(&docs).unwrap();
    m
}

fn bench_update(c: &mut Criterion) {
    let m = TagCooccurrenceMatrix::default();
    let mut i = 0usize;
    c.bench_function("matrix_update", |b| {
        b.iter(|| {
            i += 1;
            m.update(&format!("t{}", i % 300), &format!("t{}", (i * 7 + 1) % 300), 1.0)
                .unwrap()
        })
    });
}

fn bench_associations(c: &mut Criterion) {
    let m = build_matrix();
    c.bench_function("matrix_get_associations", |b| {
        b.iter(|| m.get_associations(black_box("tag42"), 10))
    });
}

fn bench_expand(c: &mut Criterion) {
    let m = build_matrix();
    let query = vec!["tag1".to_string(), "tag2".to_string(), "tag3".to_string()];
    c.bench_function("matrix_expand_query", |b| {
        b.iter(|| m.expand_query(black_box(&query), 0.5))
    });
}

fn bench_tag_boost(c: &mut Criterion) {
    let m = build_matrix();
    let query = vec!["tag1".to_string(), "tag2".to_string()];
    let content: Vec<String> = (0..8).map(|i| format!("tag{i}")).collect();
    let params = TagBoostParams::default();
    c.bench_function("matrix_tag_boost", |b| {
        b.iter(|| m.compute_tag_boost(black_box(&query), black_box(&content), 0.6, &params))
    });
}

criterion_group!(benches, bench_update, bench_associations, bench_expand, bench_tag_boost);
criterion_main!(benches);
