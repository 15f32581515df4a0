use serde::{Deserialize, Serialize};

use super::defaults;
use super::validation::{clamp_f64, clamp_usize};

/// MMR diversity configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiversityConfig {
    /// Relevance weight. 1.0 is pure relevance, 0.0 is pure diversity.
    pub lambda: f64,
    /// Selection size. `None` means the pipeline's final K.
    pub top_k: Option<usize>,
}

impl Default for DiversityConfig {
    fn default() -> Self {
        Self {
            lambda: defaults::DEFAULT_MMR_LAMBDA,
            top_k: None,
        }
    }
}

impl DiversityConfig {
    pub fn clamped(mut self) -> Self {
        self.lambda = clamp_f64(
            "diversity.lambda",
            self.lambda,
            0.0,
            1.0,
            defaults::DEFAULT_MMR_LAMBDA,
        );
        self.top_k = self
            .top_k
            .map(|k| clamp_usize("diversity.top_k", k, 1, 10_000));
        self
    }
}
