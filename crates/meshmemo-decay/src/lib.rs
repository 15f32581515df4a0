//! # meshmemo-decay
//!
//! Recency weighting for retrieval results. A result's score is multiplied by
//! `0.5 + 0.5 * 2^(-age / half_life)`, so recency can at most halve a score.

pub mod formula;
pub mod scorer;
pub mod timestamp;

pub use formula::{decay_factor, decay_multiplier, DecayBreakdown};
pub use scorer::TimeDecayScorer;
pub use timestamp::{parse_timestamp, resolve_timestamp};
