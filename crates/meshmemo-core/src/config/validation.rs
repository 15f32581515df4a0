//! Clamp helpers for out-of-range config values.
//!
//! Invalid numeric config never fails a request: the value is pulled to the
//! nearest valid bound and a warning is emitted.

use tracing::warn;

/// Clamp `value` into `[min, max]`, warning when it had to move.
/// Non-finite values collapse to `fallback`.
pub fn clamp_f64(field: &str, value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if !value.is_finite() {
        warn!(field, value, fallback, "non-finite config value replaced");
        return fallback;
    }
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!(field, value, clamped, "config value out of range, clamped");
    }
    clamped
}

/// Clamp a `usize` into `[min, max]`, warning when it had to move.
pub fn clamp_usize(field: &str, value: usize, min: usize, max: usize) -> usize {
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!(field, value, clamped, "config value out of range, clamped");
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_values_pass_through() {
        assert_eq!(clamp_f64("x", 0.5, 0.0, 1.0, 0.1), 0.5);
        assert_eq!(clamp_usize("k", 7, 1, 10), 7);
    }

    #[test]
    fn out_of_range_values_clamp_to_bound() {
        assert_eq!(clamp_f64("x", 1.7, 0.0, 1.0, 0.1), 1.0);
        assert_eq!(clamp_f64("x", -3.0, 0.0, 1.0, 0.1), 0.0);
        assert_eq!(clamp_usize("k", 0, 1, 10), 1);
    }

    #[test]
    fn nan_uses_fallback() {
        assert_eq!(clamp_f64("x", f64::NAN, 0.0, 1.0, 0.25), 0.25);
    }
}
