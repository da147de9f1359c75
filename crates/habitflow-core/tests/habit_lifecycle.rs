//! Integration tests for habits, goals and the dashboard over a file-backed
//! database.

use chrono::{Duration, NaiveDate};
use habitflow_core::{
    CoreError, Database, DashboardLimits, DashboardSummary, Goal, GoalCategory, GoalPatch,
    GoalStatus, Habit, HabitColor, HabitIcon, ToggleOutcome,
};

const OWNER: &str = "jordan@example.com";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 11, 4).unwrap()
}

fn day(offset: i64) -> NaiveDate {
    today() - Duration::days(offset)
}

#[test]
fn test_streak_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("habitflow.db");

    let habit_id = {
        let mut db = Database::open_at(&path).unwrap();
        let habit = Habit::new(OWNER, "Drink water", HabitIcon::Zap, HabitColor::default()).unwrap();
        db.create_habit(&habit).unwrap();
        for offset in [3, 2, 1] {
            db.toggle_habit(OWNER, &habit.id, day(offset), today()).unwrap();
        }
        habit.id
    };

    let mut db = Database::open_at(&path).unwrap();
    let loaded = db.get_habit(OWNER, &habit_id).unwrap().unwrap();
    assert_eq!(loaded.current_streak, 3);
    assert_eq!(loaded.longest_streak, 3);

    // Completing today extends the run carried over from yesterday.
    let (habit, outcome) = db.toggle_habit(OWNER, &habit_id, today(), today()).unwrap();
    assert_eq!(outcome, ToggleOutcome::Added);
    assert_eq!(habit.current_streak, 4);
    assert_eq!(habit.longest_streak, 4);
}

#[test]
fn test_untoggle_keeps_longest_streak() {
    let mut db = Database::open_memory().unwrap();
    let habit = Habit::new(OWNER, "Push-ups", HabitIcon::Flame, HabitColor::default()).unwrap();
    db.create_habit(&habit).unwrap();

    for offset in [2, 1, 0] {
        db.toggle_habit(OWNER, &habit.id, day(offset), today()).unwrap();
    }
    let (after_undo, _) = db.toggle_habit(OWNER, &habit.id, day(1), today()).unwrap();
    assert_eq!(after_undo.current_streak, 1);
    assert_eq!(after_undo.longest_streak, 3);

    let (restored, _) = db.toggle_habit(OWNER, &habit.id, day(1), today()).unwrap();
    assert_eq!(restored.current_streak, 3);
    assert_eq!(restored.completed_dates.len(), 3);
}

#[test]
fn test_foreign_owner_toggle_is_not_found() {
    let mut db = Database::open_memory().unwrap();
    let habit = Habit::new(OWNER, "Read", HabitIcon::Book, HabitColor::default()).unwrap();
    db.create_habit(&habit).unwrap();

    let result = db.toggle_habit("intruder", &habit.id, today(), today());
    assert!(matches!(result, Err(CoreError::NotFound { .. })));

    let untouched = db.get_habit(OWNER, &habit.id).unwrap().unwrap();
    assert!(untouched.completed_dates.is_empty());
}

#[test]
fn test_dashboard_from_stored_records() {
    let mut db = Database::open_memory().unwrap();

    let walk = Habit::new(OWNER, "Walk", HabitIcon::Heart, HabitColor::default()).unwrap();
    let read = Habit::new(OWNER, "Read", HabitIcon::Book, HabitColor::default()).unwrap();
    db.create_habit(&walk).unwrap();
    db.create_habit(&read).unwrap();
    for offset in [1, 0] {
        db.toggle_habit(OWNER, &walk.id, day(offset), today()).unwrap();
    }

    let save = Goal::new(OWNER, "Save", None, GoalCategory::Finance, None).unwrap();
    let learn = Goal::new(OWNER, "Learn", None, GoalCategory::Career, None).unwrap();
    db.create_goal(&save).unwrap();
    db.create_goal(&learn).unwrap();
    db.update_goal(
        OWNER,
        &save.id,
        GoalPatch {
            progress: Some(60),
            ..Default::default()
        },
    )
    .unwrap();
    db.update_goal(
        OWNER,
        &learn.id,
        GoalPatch {
            progress: Some(100),
            status: Some(GoalStatus::Completed),
            ..Default::default()
        },
    )
    .unwrap();

    let habits = db.list_habits(OWNER).unwrap();
    let goals = db.list_goals(OWNER).unwrap();
    let summary = DashboardSummary::compute(&habits, &goals, today(), DashboardLimits::default());

    assert_eq!(summary.total_habits, 2);
    assert_eq!(summary.habits_done_today, 1);
    assert_eq!(summary.habit_completion_rate, 50);
    assert_eq!(summary.total_current_streak, 2);
    assert_eq!(summary.best_streak, 2);
    assert_eq!(summary.pending_habits.len(), 1);
    assert_eq!(summary.pending_habits[0].name, "Read");
    assert_eq!(summary.active_goals, 1);
    assert_eq!(summary.completed_goals, 1);
    assert_eq!(summary.average_goal_progress, 80);
    assert_eq!(summary.focus_goals.len(), 1);
    assert_eq!(summary.focus_goals[0].title, "Save");
}

#[test]
fn test_concurrent_toggles_from_separate_handles_keep_every_date() {
    const WRITERS: i64 = 4;
    const TOGGLES_EACH: i64 = 25;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("habitflow.db");

    let habit_id = {
        let db = Database::open_at(&path).unwrap();
        let habit = Habit::new(OWNER, "Floss", HabitIcon::Heart, HabitColor::default()).unwrap();
        db.create_habit(&habit).unwrap();
        habit.id
    };

    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let path = path.clone();
            let habit_id = habit_id.clone();
            std::thread::spawn(move || {
                let mut db = Database::open_at(&path).unwrap();
                let mut failures = 0;
                for i in 0..TOGGLES_EACH {
                    let date = day(writer * TOGGLES_EACH + i);
                    if db.toggle_habit(OWNER, &habit_id, date, today()).is_err() {
                        failures += 1;
                    }
                }
                failures
            })
        })
        .collect();

    let failures: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(failures, 0);

    let db = Database::open_at(&path).unwrap();
    let habit = db.get_habit(OWNER, &habit_id).unwrap().unwrap();
    let expected = (WRITERS * TOGGLES_EACH) as usize;
    assert_eq!(habit.completed_dates.len(), expected);
    for offset in 0..WRITERS * TOGGLES_EACH {
        assert!(habit.is_done_on(day(offset)));
    }
    assert_eq!(habit.current_streak as usize, expected);
    assert_eq!(habit.longest_streak as usize, expected);
}
