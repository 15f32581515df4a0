use chrono::{DateTime, Utc};
use meshmemo_core::config::{CollectionSchema, TimeDecayConfig};
use meshmemo_core::constants::SECONDS_PER_DAY;
use meshmemo_core::models::SearchResult;
use tracing::debug;

use crate::formula::{self, DecayBreakdown};
use crate::timestamp::resolve_timestamp;

/// Applies half-life recency decay to pipeline results.
#[derive(Debug, Clone)]
pub struct TimeDecayScorer {
    half_life_days: f64,
    time_field: String,
}

impl TimeDecayScorer {
    pub fn new(half_life_days: f64, time_field: impl Into<String>) -> Self {
        Self {
            half_life_days,
            time_field: time_field.into(),
        }
    }

    pub fn from_config(config: &TimeDecayConfig, schema: &CollectionSchema) -> Self {
        Self::new(config.half_life_days, schema.time_field.clone())
    }

    pub fn half_life_days(&self) -> f64 {
        self.half_life_days
    }

    /// Age in days at `now`. Missing or unparseable timestamps are age 0.
    pub fn age_days(&self, result: &SearchResult, now: DateTime<Utc>) -> f64 {
        match resolve_timestamp(&result.metadata, &self.time_field, result.created_at) {
            Some(ts) => ((now - ts).num_seconds().max(0) as f64) / SECONDS_PER_DAY,
            None => 0.0,
        }
    }

    pub fn breakdown(&self, result: &SearchResult, now: DateTime<Utc>) -> DecayBreakdown {
        formula::compute_breakdown(result.final_score, self.age_days(result, now), self.half_life_days)
    }

    /// Multiply every `final_score` by its decay multiplier, then re-sort
    /// descending. Equal scores keep their prior order.
    pub fn apply(&self, results: &mut [SearchResult], now: DateTime<Utc>) {
        for result in results.iter_mut() {
            let age = self.age_days(result, now);
            result.final_score *= formula::decay_multiplier(age, self.half_life_days);
        }
        results.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        debug!(count = results.len(), half_life_days = self.half_life_days, "time decay applied");
    }
}

impl Default for TimeDecayScorer {
    fn default() -> Self {
        Self::from_config(&TimeDecayConfig::default(), &CollectionSchema::default())
    }
}
