use std::f64::consts::LN_2;

/// Lowest multiplier recency can apply.
pub const DECAY_FLOOR: f64 = 0.5;

/// Half-life decay: `e^(-age / half_life * ln 2)`.
///
/// Range: (0.0, 1.0]. Negative ages (future timestamps) count as zero.
pub fn decay_factor(age_days: f64, half_life_days: f64) -> f64 {
    if !age_days.is_finite() || half_life_days <= 0.0 || !half_life_days.is_finite() {
        return 1.0;
    }
    (-(age_days.max(0.0)) / half_life_days * LN_2).exp()
}

/// Score multiplier: `0.5 + 0.5 * decay`. Range: [0.5, 1.0].
pub fn decay_multiplier(age_days: f64, half_life_days: f64) -> f64 {
    DECAY_FLOOR + (1.0 - DECAY_FLOOR) * decay_factor(age_days, half_life_days)
}

/// Per-result decay details for debugging.
#[derive(Debug, Clone, PartialEq)]
pub struct DecayBreakdown {
    pub age_days: f64,
    pub decay: f64,
    pub multiplier: f64,
    pub original_score: f64,
    pub final_score: f64,
}

pub fn compute_breakdown(score: f64, age_days: f64, half_life_days: f64) -> DecayBreakdown {
    let decay = decay_factor(age_days, half_life_days);
    let multiplier = DECAY_FLOOR + (1.0 - DECAY_FLOOR) * decay;
    DecayBreakdown {
        age_days: age_days.max(0.0),
        decay,
        multiplier,
        original_score: score,
        final_score: score * multiplier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_age_is_no_decay() {
        assert_eq!(decay_factor(0.0, 30.0), 1.0);
        assert_eq!(decay_multiplier(0.0, 30.0), 1.0);
    }

    #[test]
    fn one_half_life_halves_decay() {
        assert!((decay_factor(30.0, 30.0) - 0.5).abs() < 1e-12);
        assert!((decay_multiplier(30.0, 30.0) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn very_old_approaches_floor() {
        let m = decay_multiplier(10_000.0, 30.0);
        assert!(m >= DECAY_FLOOR);
        assert!(m - DECAY_FLOOR < 1e-6);
    }

    #[test]
    fn future_timestamps_do_not_boost() {
        assert_eq!(decay_multiplier(-5.0, 30.0), 1.0);
    }

    #[test]
    fn breakdown_matches_multiplier() {
        let b = compute_breakdown(0.8, 15.0, 30.0);
        assert!((b.final_score - 0.8 * decay_multiplier(15.0, 30.0)).abs() < 1e-12);
    }
}
