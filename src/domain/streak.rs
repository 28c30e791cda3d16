/// Habit streak calculation
///
/// A habit's current streak is the run of consecutive days, ending today or
/// yesterday, on which it was completed. A habit done yesterday but not yet
/// today still shows its streak: it only breaks once a whole day passes
/// without a completion.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use chrono::{Duration, NaiveDate};
use crate::domain::{HabitCompletion, HabitId};

/// Length of the current streak for one habit
///
/// `dates` holds every day the habit was completed.
pub fn compute_streak(dates: &HashSet<NaiveDate>, today: NaiveDate) -> u32 {
    let yesterday = today - Duration::days(1);

    let mut checking_date = if dates.contains(&today) {
        today
    } else if dates.contains(&yesterday) {
        yesterday
    } else {
        return 0;
    };

    let mut streak = 0;
    while dates.contains(&checking_date) {
        streak += 1;
        checking_date = checking_date - Duration::days(1);
    }
    streak
}

/// Current streaks for a batch of habits against a shared completions list
///
/// Every requested habit appears in the result, with 0 when it has no
/// qualifying completions. Completions of other habits are ignored.
pub fn compute_streaks(
    habit_ids: &[HabitId],
    completions: &[HabitCompletion],
    today: NaiveDate,
) -> HashMap<HabitId, u32> {
    let dates_by_habit = group_dates(completions);

    habit_ids
        .iter()
        .map(|id| {
            let streak = dates_by_habit
                .get(id)
                .map(|dates| compute_streak(dates, today))
                .unwrap_or(0);
            (id.clone(), streak)
        })
        .collect()
}

/// Longest run of consecutive days anywhere in the history
pub fn longest_streak(dates: &HashSet<NaiveDate>) -> u32 {
    let mut sorted: Vec<NaiveDate> = dates.iter().copied().collect();
    sorted.sort_unstable();

    let mut longest = 0;
    let mut current = 0;
    let mut last_date: Option<NaiveDate> = None;

    for date in sorted {
        current = match last_date {
            Some(last) if date - last == Duration::days(1) => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        last_date = Some(date);
    }

    longest
}

fn group_dates(completions: &[HabitCompletion]) -> HashMap<HabitId, HashSet<NaiveDate>> {
    let mut grouped: HashMap<HabitId, HashSet<NaiveDate>> = HashMap::new();
    for completion in completions {
        grouped
            .entry(completion.habit_id.clone())
            .or_default()
            .insert(completion.completed_date);
    }
    grouped
}

/// Streak statistics for a single habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitStreak {
    pub habit_id: HabitId,
    pub current_streak: u32,
    /// Best streak ever achieved, never below `current_streak`
    pub longest_streak: u32,
    pub last_completed: Option<NaiveDate>,
    pub total_completions: u32,
}

impl HabitStreak {
    /// Empty statistics for a habit that was never completed
    pub fn new(habit_id: HabitId) -> Self {
        Self {
            habit_id,
            current_streak: 0,
            longest_streak: 0,
            last_completed: None,
            total_completions: 0,
        }
    }

    /// Calculate statistics from a habit's completions
    ///
    /// Completions belonging to other habits are skipped.
    pub fn calculate(habit_id: HabitId, completions: &[HabitCompletion], today: NaiveDate) -> Self {
        let dates: HashSet<NaiveDate> = completions
            .iter()
            .filter(|c| c.habit_id == habit_id)
            .map(|c| c.completed_date)
            .collect();

        if dates.is_empty() {
            return Self::new(habit_id);
        }

        let current_streak = compute_streak(&dates, today);

        Self {
            habit_id,
            current_streak,
            longest_streak: longest_streak(&dates).max(current_streak),
            last_completed: dates.iter().max().copied(),
            total_completions: dates.len() as u32,
        }
    }

    /// A short encouragement matching the current streak length
    pub fn motivational_message(&self) -> String {
        match self.current_streak {
            0 => "Ready to start your streak! Every journey begins with a single step.".to_string(),
            1 => "Great start! One day down, keep the momentum going.".to_string(),
            2..=6 => format!("Nice work! {} days in a row.", self.current_streak),
            7..=29 => format!("Excellent! {} days strong. You're in the groove now!", self.current_streak),
            _ => format!("Incredible! {} days of consistency.", self.current_streak),
        }
    }
}
