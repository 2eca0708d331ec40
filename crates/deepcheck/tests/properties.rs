//! Property tests for the assertion catalog

use chrono::{Duration, TimeZone, Utc};
use deepcheck::{
    contains, equal, is_absent, is_equal, not_contains, not_equal, within_duration, Inspect,
    Recorder,
};
use proptest::prelude::*;

fn failed_equal<E: Inspect, A: Inspect>(expected: E, actual: A) -> bool {
    let mut t = Recorder::new();
    equal(&mut t, expected, actual, &[]);
    t.failed
}

fn failed_not_equal<E: Inspect, A: Inspect>(expected: E, actual: A) -> bool {
    let mut t = Recorder::new();
    not_equal(&mut t, expected, actual, &[]);
    t.failed
}

proptest! {
    #[test]
    fn equality_is_reflexive(
        numbers in proptest::collection::vec(any::<i64>(), 0..8),
        words in proptest::collection::vec(".*", 0..4),
        flag in any::<bool>(),
    ) {
        let value = (numbers, words, flag);
        prop_assert!(is_equal(&value.inspect_value(), &value.inspect_value()));
        prop_assert!(!failed_equal(&value, &value));
    }

    #[test]
    fn equal_and_not_equal_are_complementary(
        a in proptest::collection::vec(0u8..4, 0..4),
        b in proptest::collection::vec(0u8..4, 0..4),
    ) {
        prop_assert_ne!(failed_equal(&a, &b), failed_not_equal(&a, &b));
        prop_assert_eq!(failed_equal(&a, &b), a != b);
    }

    #[test]
    fn integers_compare_across_widths(n in any::<i32>()) {
        prop_assert!(!failed_equal(n, i64::from(n)));
        prop_assert_eq!(failed_equal(n, n as u32), n < 0);
    }

    #[test]
    fn absence_holds_only_for_unset_values(
        items in proptest::option::of(proptest::collection::vec(any::<u16>(), 0..4)),
    ) {
        prop_assert_eq!(is_absent(&items.inspect_value()), items.is_none());
    }

    #[test]
    fn timing_tolerance_is_symmetric(
        offset_ms in -10_000i64..10_000,
        tolerance_ms in 0i64..10_000,
    ) {
        let goal = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let tolerance = Duration::milliseconds(tolerance_ms);
        let offset = Duration::milliseconds(offset_ms);

        let mut later = Recorder::new();
        within_duration(&mut later, tolerance, goal, goal + offset, &[]);
        let mut earlier = Recorder::new();
        within_duration(&mut earlier, tolerance, goal, goal - offset, &[]);

        prop_assert_eq!(later.failed, earlier.failed);
        prop_assert_eq!(later.failed, offset_ms.abs() > tolerance_ms);
    }

    #[test]
    fn containment_is_literal(
        prefix in "[a-z.*]{0,6}",
        needle in "[a-z.*]{0,6}",
        suffix in "[a-z.*]{0,6}",
    ) {
        let haystack = format!("{prefix}{needle}{suffix}");

        let mut t = Recorder::new();
        contains(&mut t, &needle, &haystack, &[]);
        prop_assert!(t.passed());

        let mut t = Recorder::new();
        not_contains(&mut t, &needle, &haystack, &[]);
        prop_assert!(t.failed);
    }
}
