//! Property tests for the streak calculator and the toggle operation.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use habitflow_core::{current_streak, Habit, HabitColor, HabitIcon};
use proptest::prelude::*;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, 27).unwrap()
}

fn to_dates(offsets: &BTreeSet<i64>) -> BTreeSet<NaiveDate> {
    offsets.iter().map(|n| today() - Duration::days(*n)).collect()
}

/// Count the run by stepping backward one day at a time from the newest
/// completion, which must be today or yesterday.
fn expected_streak(offsets: &BTreeSet<i64>) -> u32 {
    let Some(&newest) = offsets.iter().next() else {
        return 0;
    };
    if newest > 1 {
        return 0;
    }
    let mut count = 0;
    while offsets.contains(&(newest + i64::from(count))) {
        count += 1;
    }
    count
}

fn habit() -> Habit {
    Habit::new("prop", "Floss", HabitIcon::Target, HabitColor::default()).unwrap()
}

proptest! {
    #[test]
    fn prop_matches_backward_walk(offsets in prop::collection::btree_set(0i64..40, 0..25)) {
        let dates = to_dates(&offsets);
        prop_assert_eq!(current_streak(&dates, today()), expected_streak(&offsets));
    }

    #[test]
    fn prop_is_idempotent_and_order_free(offsets in prop::collection::btree_set(0i64..40, 0..25)) {
        let dates = to_dates(&offsets);
        let first = current_streak(&dates, today());
        let second = current_streak(&dates, today());
        let reversed: Vec<NaiveDate> = dates.iter().rev().copied().collect();
        prop_assert_eq!(first, second);
        prop_assert_eq!(first, current_streak(&reversed, today()));
        prop_assert!(first as usize <= dates.len());
    }

    #[test]
    fn prop_toggle_twice_restores_record(
        offsets in prop::collection::btree_set(0i64..20, 0..15),
        target in 0i64..20,
    ) {
        let mut h = habit();
        for n in &offsets {
            h.toggle(today() - Duration::days(*n), today());
        }
        let before = h.completed_dates.clone();
        let longest_before = h.longest_streak;

        let date = today() - Duration::days(target);
        let first = h.toggle(date, today());
        let second = h.toggle(date, today());

        prop_assert_ne!(first, second);
        prop_assert_eq!(&h.completed_dates, &before);
        prop_assert!(h.longest_streak >= longest_before);
        prop_assert_eq!(h.current_streak, current_streak(&before, today()));
    }

    #[test]
    fn prop_longest_is_max_observed(toggles in prop::collection::vec(0i64..15, 0..40)) {
        let mut h = habit();
        let mut max_seen = 0;
        for n in toggles {
            h.toggle(today() - Duration::days(n), today());
            max_seen = max_seen.max(h.current_streak);
            prop_assert_eq!(h.longest_streak, max_seen);
        }
    }
}

#[test]
fn future_dated_entry_passes_the_grace_check() {
    let tomorrow = today() + Duration::days(1);
    let dates = [tomorrow, today()];
    assert_eq!(current_streak(&dates, today()), 2);
}
