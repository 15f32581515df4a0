use serde::{Deserialize, Serialize};

use super::defaults;
use super::validation::{clamp_f64, clamp_usize};

/// Tag co-occurrence matrix configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TagMatrixConfig {
    /// Weight of the newest observation in the exponential blend.
    pub alpha: f64,
    /// Weight retained from the previous edge value.
    pub beta: f64,
    /// Multiplier applied to one-hop neighbours during query expansion.
    pub expansion_factor: f64,
    pub associations_top_k: usize,
    /// Edges whose blended weight is below this are hidden from associations.
    pub min_cooccurrence: f64,
    pub boost_alpha_min: f64,
    pub boost_alpha_max: f64,
    pub boost_beta_base: f64,
}

impl Default for TagMatrixConfig {
    fn default() -> Self {
        Self {
            alpha: defaults::DEFAULT_TAG_ALPHA,
            beta: defaults::DEFAULT_TAG_BETA,
            expansion_factor: defaults::DEFAULT_EXPANSION_FACTOR,
            associations_top_k: defaults::DEFAULT_ASSOCIATIONS_TOP_K,
            min_cooccurrence: 0.0,
            boost_alpha_min: defaults::DEFAULT_BOOST_ALPHA_MIN,
            boost_alpha_max: defaults::DEFAULT_BOOST_ALPHA_MAX,
            boost_beta_base: defaults::DEFAULT_BOOST_BETA_BASE,
        }
    }
}

impl TagMatrixConfig {
    pub fn clamped(mut self) -> Self {
        self.alpha = clamp_f64("tags.alpha", self.alpha, 0.0, 1.0, defaults::DEFAULT_TAG_ALPHA);
        self.beta = clamp_f64("tags.beta", self.beta, 0.0, 1.0, defaults::DEFAULT_TAG_BETA);
        self.expansion_factor = clamp_f64(
            "tags.expansion_factor",
            self.expansion_factor,
            0.0,
            10.0,
            defaults::DEFAULT_EXPANSION_FACTOR,
        );
        self.associations_top_k =
            clamp_usize("tags.associations_top_k", self.associations_top_k, 1, 1_000);
        self.min_cooccurrence =
            clamp_f64("tags.min_cooccurrence", self.min_cooccurrence, 0.0, f64::MAX, 0.0);
        self.boost_alpha_min = clamp_f64(
            "tags.boost_alpha_min",
            self.boost_alpha_min,
            0.0,
            10.0,
            defaults::DEFAULT_BOOST_ALPHA_MIN,
        );
        self.boost_alpha_max = clamp_f64(
            "tags.boost_alpha_max",
            self.boost_alpha_max,
            self.boost_alpha_min,
            10.0,
            defaults::DEFAULT_BOOST_ALPHA_MAX,
        );
        self.boost_beta_base = clamp_f64(
            "tags.boost_beta_base",
            self.boost_beta_base,
            0.0,
            100.0,
            defaults::DEFAULT_BOOST_BETA_BASE,
        );
        self
    }
}
