use proptest::prelude::*;
use strata_runtime::{Adjustment, ConcurrencyGovernor, LIMIT_FLOOR};

proptest! {
    #[test]
    fn limit_moves_one_step_within_bounds(
        ceiling in 1usize..12,
        durations in prop::collection::vec(0u32..200, 0..400),
    ) {
        let mut g = ConcurrencyGovernor::new(ceiling, 23, 70, 30);
        let floor = LIMIT_FLOOR.min(ceiling);
        prop_assert_eq!(g.bounds(), (floor, ceiling));
        for d in durations {
            let before = g.limit();
            match g.record(d) {
                Some(Adjustment::Decreased { from, to }) => {
                    prop_assert_eq!((from, to), (before, before - 1));
                    prop_assert_eq!(g.sample_count(), 0);
                }
                Some(Adjustment::Increased { from, to }) => {
                    prop_assert_eq!((from, to), (before, before + 1));
                    prop_assert_eq!(g.sample_count(), 0);
                }
                None => prop_assert_eq!(g.limit(), before),
            }
            prop_assert!(g.limit() >= floor && g.limit() <= ceiling);
            prop_assert!(g.sample_count() <= 23);
        }
    }
}
