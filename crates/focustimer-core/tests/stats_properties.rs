//! Property tests for statistics invariants.

use std::rc::Rc;

use chrono::NaiveDate;
use focustimer_core::{ManualClock, MemoryStore, StatsEngine};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Step {
    Complete,
    Skip,
    BreakStreak,
    NextDay(u64),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => Just(Step::Complete),
        2 => Just(Step::Skip),
        1 => Just(Step::BreakStreak),
        1 => (1u64..10).prop_map(Step::NextDay),
    ]
}

fn engine() -> (StatsEngine, Rc<ManualClock>) {
    let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let clock = Rc::new(ManualClock::on(day, 10 * 3600 * 1000));
    let engine = StatsEngine::load(Rc::new(MemoryStore::new()), clock.clone());
    (engine, clock)
}

proptest! {
    #[test]
    fn streak_and_history_invariants_hold(steps in prop::collection::vec(step_strategy(), 1..80)) {
        let (mut engine, clock) = engine();
        let mut unlocked_so_far = std::collections::BTreeSet::new();
        let mut expected_total = 0u32;

        for step in steps {
            match step {
                Step::Complete => { engine.add_pomodoro(25, false); expected_total += 1; }
                Step::Skip => { engine.add_pomodoro(25, true); expected_total += 1; }
                Step::BreakStreak => { engine.break_streak(); }
                Step::NextDay(days) => {
                    let before = engine.stats().clone();
                    clock.advance_days(days);
                    engine.check_new_day();
                    let after = engine.stats();
                    prop_assert_eq!(&after.weekly_data[..5], &before.weekly_data[1..6]);
                    prop_assert_eq!(after.weekly_data[5], before.today_pomodoros);
                    prop_assert_eq!(after.today_pomodoros, 0);
                }
            }
            let s = engine.stats();
            prop_assert!(s.longest_streak >= s.current_streak);
            prop_assert_eq!(s.weekly_data[6], s.today_pomodoros);
            prop_assert_eq!(s.total_pomodoros, expected_total);
            prop_assert_eq!(s.total_focus_time, u64::from(expected_total) * 25);
            prop_assert!(s.achievements.is_superset(&unlocked_so_far));
            unlocked_so_far = s.achievements.clone();
        }
    }

    #[test]
    fn skipping_never_changes_the_streak(completed in 0u32..30, skipped in 1u32..10) {
        let (mut engine, _) = engine();
        for _ in 0..completed {
            engine.add_pomodoro(25, false);
        }
        let streak = engine.stats().current_streak;
        for _ in 0..skipped {
            engine.add_pomodoro(25, true);
        }
        prop_assert_eq!(engine.stats().current_streak, streak);
        prop_assert_eq!(engine.stats().skipped_sessions, skipped);
    }
}

#[test]
fn ten_natural_completions_fire_five_milestone_once() {
    use focustimer_core::Event;

    let (mut engine, _) = engine();
    let mut at_five = 0;
    for _ in 0..10 {
        at_five += engine
            .add_pomodoro(25, false)
            .iter()
            .filter(|e| matches!(e, Event::StreakMilestone { streak: 5, .. }))
            .count();
    }
    assert_eq!(at_five, 1);
    assert_eq!(engine.stats().current_streak, 10);
}
