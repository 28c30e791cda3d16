/// Per-habit streak lookups backed by storage

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{compute_streaks, Habit, HabitId, HabitStreak};
use crate::storage::{OrganizerStorage, StorageError};

/// A habit together with its streak and today's state
#[derive(Debug, Clone, Serialize)]
pub struct HabitOverview {
    pub habit: Habit,
    pub current_streak: u32,
    pub done_today: bool,
}

/// Streak statistics for one habit
///
/// Fails with `HabitNotFound` when the habit does not exist.
pub async fn habit_streak<S>(
    storage: &S,
    habit_id: &HabitId,
    today: NaiveDate,
) -> Result<HabitStreak, StorageError>
where
    S: OrganizerStorage + ?Sized,
{
    storage.get_habit(habit_id).await?;
    let completions = storage
        .completions_for_habits(std::slice::from_ref(habit_id))
        .await?;
    Ok(HabitStreak::calculate(habit_id.clone(), &completions, today))
}

/// Every habit (or only active ones) with its current streak
///
/// Streaks are computed from a single completions query for the whole batch.
pub async fn habit_overview<S>(
    storage: &S,
    today: NaiveDate,
    active_only: bool,
) -> Result<Vec<HabitOverview>, StorageError>
where
    S: OrganizerStorage + ?Sized,
{
    let habits = storage.list_habits(active_only).await?;
    if habits.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<HabitId> = habits.iter().map(|habit| habit.id.clone()).collect();
    let completions = storage.completions_for_habits(&ids).await?;
    let streaks = compute_streaks(&ids, &completions, today);

    Ok(habits
        .into_iter()
        .map(|habit| {
            let done_today = completions
                .iter()
                .any(|c| c.habit_id == habit.id && c.completed_date == today);
            let current_streak = streaks.get(&habit.id).copied().unwrap_or(0);
            HabitOverview {
                habit,
                current_streak,
                done_today,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HabitCompletion;
    use crate::storage::SqliteStorage;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 30).unwrap()
    }

    #[tokio::test]
    async fn test_overview_streaks() {
        let storage = SqliteStorage::in_memory().unwrap();
        let run = Habit::new("Run".to_string(), None).unwrap();
        let stretch = Habit::new("Stretch".to_string(), None).unwrap();
        storage.create_habit(&run).await.unwrap();
        storage.create_habit(&stretch).await.unwrap();

        for back in 1..=3 {
            let date = today() - Duration::days(back);
            storage
                .insert_completion(&HabitCompletion::new(run.id.clone(), date, today()).unwrap())
                .await
                .unwrap();
        }
        storage
            .insert_completion(&HabitCompletion::new(stretch.id.clone(), today(), today()).unwrap())
            .await
            .unwrap();

        let overview = habit_overview(&storage, today(), true).await.unwrap();
        let run_row = overview.iter().find(|o| o.habit.id == run.id).unwrap();
        let stretch_row = overview.iter().find(|o| o.habit.id == stretch.id).unwrap();

        // grace: not yet done today, streak still shows
        assert_eq!(run_row.current_streak, 3);
        assert!(!run_row.done_today);
        assert_eq!(stretch_row.current_streak, 1);
        assert!(stretch_row.done_today);
    }

    #[tokio::test]
    async fn test_unknown_habit_streak() {
        let storage = SqliteStorage::in_memory().unwrap();
        let result = habit_streak(&storage, &HabitId::new(), today()).await;
        assert!(matches!(result, Err(StorageError::HabitNotFound { .. })));
    }
}
