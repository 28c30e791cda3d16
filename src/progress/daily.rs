/// Daily completion evaluation
///
/// A day is judged from three sources: tasks due that day, homework due that
/// day, and every currently active habit. There are two deliberately
/// different readings of the same totals:
///
/// - [`DayTotals::is_fully_complete`] is strict and drives streaks: a day with
///   nothing on it is not an achievement.
/// - [`DayTotals::display_progress_percent`] is lenient and drives the
///   progress ring: an empty day shows 100 %.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::HabitId;
use crate::storage::{OrganizerStorage, StorageError};

/// Item counts for one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayTotals {
    pub date: NaiveDate,
    pub tasks_total: u32,
    pub tasks_done: u32,
    pub homework_total: u32,
    pub homework_done: u32,
    /// Active habits, regardless of when they were created
    pub habits_total: u32,
    /// Active habits with a completion on `date`
    pub habits_done: u32,
}

impl DayTotals {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            tasks_total: 0,
            tasks_done: 0,
            homework_total: 0,
            homework_done: 0,
            habits_total: 0,
            habits_done: 0,
        }
    }

    pub fn total_items(&self) -> u32 {
        self.tasks_total + self.homework_total + self.habits_total
    }

    pub fn completed_items(&self) -> u32 {
        self.tasks_done + self.homework_done + self.habits_done
    }

    pub fn remaining_items(&self) -> u32 {
        self.total_items().saturating_sub(self.completed_items())
    }

    /// Strict rule used for streaks; an empty day is never complete
    pub fn is_fully_complete(&self) -> bool {
        self.total_items() > 0
            && self.tasks_done >= self.tasks_total
            && self.homework_done >= self.homework_total
            && self.habits_done >= self.habits_total
    }

    /// Lenient percentage for display; an empty day shows 100
    pub fn display_progress_percent(&self) -> u8 {
        let total = self.total_items();
        if total == 0 {
            return 100;
        }
        let percent = (100.0 * self.completed_items() as f64 / total as f64).round();
        percent.min(100.0) as u8
    }
}

/// Fetch and count everything that belongs to `date`
///
/// The four reads are issued concurrently. Completions of habits that are
/// inactive or no longer exist are ignored.
pub async fn load_day_totals<S>(storage: &S, date: NaiveDate) -> Result<DayTotals, StorageError>
where
    S: OrganizerStorage + ?Sized,
{
    let (tasks, homework, habits, completions) = futures::try_join!(
        storage.tasks_due_on(date),
        storage.homework_due_on(date),
        storage.list_habits(true),
        storage.completions_on(date),
    )?;

    let active: HashSet<&HabitId> = habits.iter().map(|habit| &habit.id).collect();
    let habits_done = completions
        .iter()
        .filter(|completion| completion.completed_date == date)
        .map(|completion| &completion.habit_id)
        .filter(|habit_id| active.contains(habit_id))
        .collect::<HashSet<_>>()
        .len() as u32;

    Ok(DayTotals {
        date,
        tasks_total: tasks.len() as u32,
        tasks_done: tasks.iter().filter(|task| task.completed).count() as u32,
        homework_total: homework.len() as u32,
        homework_done: homework.iter().filter(|hw| hw.completed).count() as u32,
        habits_total: active.len() as u32,
        habits_done,
    })
}

/// Whether every item of `date` is done (strict rule, false for empty days)
pub async fn is_day_fully_complete<S>(storage: &S, date: NaiveDate) -> Result<bool, StorageError>
where
    S: OrganizerStorage + ?Sized,
{
    Ok(load_day_totals(storage, date).await?.is_fully_complete())
}
