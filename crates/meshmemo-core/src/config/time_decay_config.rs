use serde::{Deserialize, Serialize};

use super::defaults;
use super::validation::clamp_f64;

/// Recency decay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeDecayConfig {
    pub half_life_days: f64,
}

impl Default for TimeDecayConfig {
    fn default() -> Self {
        Self {
            half_life_days: defaults::DEFAULT_HALF_LIFE_DAYS,
        }
    }
}

impl TimeDecayConfig {
    pub fn clamped(mut self) -> Self {
        self.half_life_days = clamp_f64(
            "time_decay.half_life_days",
            self.half_life_days,
            f64::MIN_POSITIVE,
            f64::MAX,
            defaults::DEFAULT_HALF_LIFE_DAYS,
        );
        self
    }
}
