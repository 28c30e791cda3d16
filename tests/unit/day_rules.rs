use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use life_tracker_mcp::progress::load_day_totals;
use life_tracker_mcp::*;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()
}

fn dates(days_back: &[i64]) -> HashSet<NaiveDate> {
    days_back.iter().map(|n| today() - Duration::days(*n)).collect()
}

#[test]
fn test_streak_counts_back_from_today() {
    assert_eq!(compute_streak(&dates(&[0, 1, 2]), today()), 3);
}

#[test]
fn test_streak_survives_until_today_ends() {
    assert_eq!(compute_streak(&dates(&[1, 2, 3, 4]), today()), 4);
}

#[test]
fn test_streak_breaks_after_a_missed_day() {
    assert_eq!(compute_streak(&dates(&[2, 3, 4]), today()), 0);
    assert_eq!(compute_streak(&dates(&[0, 2, 3]), today()), 1);
}

#[test]
fn test_empty_day_strict_and_lenient() {
    let totals = DayTotals::empty(today());
    assert!(!totals.is_fully_complete());
    assert_eq!(totals.display_progress_percent(), 100);
}

#[test]
fn test_orphan_completion_is_ignored() {
    let storage = SqliteStorage::in_memory().unwrap();
    tokio_test::block_on(async {
        let habit = Habit::new("Journal".to_string(), None).unwrap();
        storage.create_habit(&habit).await.unwrap();
        storage
            .insert_completion(&HabitCompletion::new(habit.id.clone(), today(), today()).unwrap())
            .await
            .unwrap();

        // pausing the only habit empties the day
        let mut paused = habit.clone();
        paused.is_active = false;
        storage.update_habit(&paused).await.unwrap();

        let totals = load_day_totals(&storage, today()).await.unwrap();
        assert_eq!(totals.habits_total, 0);
        assert_eq!(totals.habits_done, 0);
        assert!(!totals.is_fully_complete());
    });
}
