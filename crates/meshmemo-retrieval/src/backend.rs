//! Vector backends behind [`IVectorBackend`].
//!
//! Both backends compute exactly [`vector::cosine_similarity`] per element;
//! they differ only in how the batch is scheduled.

use std::sync::Arc;

use meshmemo_core::config::BackendConfig;
use meshmemo_core::constants::components;
use meshmemo_core::models::DegradationEvent;
use meshmemo_core::traits::IVectorBackend;
use rayon::prelude::*;
use tracing::info;

use crate::vector;

/// Sequential reference backend. Always available.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarBackend;

impl IVectorBackend for ScalarBackend {
    fn batch_cosine_similarity(&self, query: &[f32], vectors: &[&[f32]]) -> Vec<f64> {
        vector::batch_cosine_similarity(query, vectors)
    }

    fn name(&self) -> &str {
        "scalar"
    }
}

/// Rayon-parallel backend. Batches smaller than `min_batch` run sequentially.
#[derive(Debug, Clone, Copy)]
pub struct ParallelBackend {
    min_batch: usize,
}

impl ParallelBackend {
    pub fn new(min_batch: usize) -> Self {
        Self {
            min_batch: min_batch.max(1),
        }
    }
}

impl IVectorBackend for ParallelBackend {
    fn batch_cosine_similarity(&self, query: &[f32], vectors: &[&[f32]]) -> Vec<f64> {
        if vectors.len() < self.min_batch {
            return vector::batch_cosine_similarity(query, vectors);
        }
        vectors
            .par_iter()
            .map(|v| vector::cosine_similarity(query, v))
            .collect()
    }

    fn name(&self) -> &str {
        "parallel"
    }

    fn is_accelerated(&self) -> bool {
        true
    }
}

/// Pick the backend for this process. The parallel backend is used when
/// preferred and more than one worker thread exists; otherwise the scalar
/// backend is returned along with the degradation that caused it.
pub fn select_backend(config: &BackendConfig) -> (Arc<dyn IVectorBackend>, Option<DegradationEvent>) {
    if !config.prefer_accelerated {
        return (Arc::new(ScalarBackend), None);
    }
    let threads = rayon::current_num_threads();
    if threads > 1 {
        info!(threads, min_batch = config.parallel_min_batch, "parallel vector backend selected");
        return (Arc::new(ParallelBackend::new(config.parallel_min_batch)), None);
    }
    let event = DegradationEvent::now(
        components::VECTOR_BACKEND,
        format!("accelerated backend unavailable ({threads} worker thread)"),
        "scalar",
    );
    (Arc::new(ScalarBackend), Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectors() -> Vec<Vec<f32>> {
        (0..40)
            .map(|i| vec![i as f32, (40 - i) as f32, (i % 7) as f32])
            .collect()
    }

    #[test]
    fn backends_agree() {
        let data = vectors();
        let refs: Vec<&[f32]> = data.iter().map(Vec::as_slice).collect();
        let q = [1.0, 2.0, 3.0];
        let scalar = ScalarBackend.batch_cosine_similarity(&q, &refs);
        let parallel = ParallelBackend::new(1).batch_cosine_similarity(&q, &refs);
        assert_eq!(scalar, parallel);
    }

    #[test]
    fn disabled_acceleration_is_not_a_degradation() {
        let config = BackendConfig {
            prefer_accelerated: false,
            ..Default::default()
        };
        let (backend, event) = select_backend(&config);
        assert_eq!(backend.name(), "scalar");
        assert!(!backend.is_accelerated());
        assert!(event.is_none());
    }

    #[test]
    fn preferred_backend_is_parallel_or_reports_fallback() {
        let (backend, event) = select_backend(&BackendConfig::default());
        if backend.is_accelerated() {
            assert!(event.is_none());
        } else {
            assert_eq!(event.map(|e| e.component), Some(components::VECTOR_BACKEND.to_string()));
        }
    }
}
