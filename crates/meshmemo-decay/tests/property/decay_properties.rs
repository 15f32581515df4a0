use meshmemo_decay::formula::DECAY_FLOOR;
use meshmemo_decay::{decay_factor, decay_multiplier};
use proptest::prelude::*;

proptest! {
    #[test]
    fn multiplier_strictly_decreasing_in_age(
        age in 0.0f64..100.0,
        delta in 0.01f64..100.0,
        half_life in 10.0f64..365.0,
    ) {
        let younger = decay_multiplier(age, half_life);
        let older = decay_multiplier(age + delta, half_life);
        prop_assert!(older < younger, "age {} -> {}, {} !< {}", age, age + delta, older, younger);
    }

    #[test]
    fn multiplier_never_below_floor(age in 0.0f64..1e6, half_life in 0.1f64..1000.0) {
        let m = decay_multiplier(age, half_life);
        prop_assert!(m >= DECAY_FLOOR);
        prop_assert!(m <= 1.0);
    }

    #[test]
    fn decay_factor_strictly_decreasing_in_age(
        age in 0.0f64..365.0,
        delta in 0.01f64..365.0,
        half_life in 1.0f64..365.0,
    ) {
        prop_assert!(decay_factor(age + delta, half_life) < decay_factor(age, half_life));
    }

    #[test]
    fn decay_factor_in_unit_interval(age in 0.0f64..1e4, half_life in 0.1f64..1000.0) {
        let d = decay_factor(age, half_life);
        prop_assert!((0.0..=1.0).contains(&d));
    }
}
