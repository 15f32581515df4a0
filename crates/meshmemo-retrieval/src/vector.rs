//! Vector math over `f32` embeddings, accumulated in `f64`.
//!
//! Degenerate inputs (length mismatch, zero norm) yield 0 similarity rather
//! than NaN.

use std::cmp::Ordering;

/// Cosine similarity. 0 when either norm is 0 or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return 0.0;
    }
    dot / denom
}

pub fn batch_cosine_similarity(query: &[f32], vectors: &[&[f32]]) -> Vec<f64> {
    vectors.iter().map(|v| cosine_similarity(query, v)).collect()
}

/// Indices and scores of the `k` most similar vectors, descending.
/// Equal scores keep index order.
pub fn top_k_similar(query: &[f32], vectors: &[&[f32]], k: usize) -> Vec<(usize, f64)> {
    let mut scored: Vec<(usize, f64)> = batch_cosine_similarity(query, vectors)
        .into_iter()
        .enumerate()
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(k);
    scored
}

/// Dot product; 0 on length mismatch.
pub fn dot_product(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum()
}

/// Euclidean distance; `f64::INFINITY` on length mismatch.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return f64::INFINITY;
    }
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = f64::from(*x) - f64::from(*y);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Unit-length copy of `v`. A zero vector is returned unchanged.
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let norm = v.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    if norm == 0.0 {
        return v.to_vec();
    }
    v.iter().map(|x| (f64::from(*x) / norm) as f32).collect()
}
