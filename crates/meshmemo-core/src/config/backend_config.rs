use serde::{Deserialize, Serialize};

use super::defaults;

/// Vector backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Use the parallel backend when the machine has more than one worker thread.
    pub prefer_accelerated: bool,
    /// Batches smaller than this are scored sequentially even on the parallel backend.
    pub parallel_min_batch: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            prefer_accelerated: true,
            parallel_min_batch: defaults::DEFAULT_PARALLEL_MIN_BATCH,
        }
    }
}
