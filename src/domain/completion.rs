/// HabitCompletion entity for tracking which days a habit was done
///
/// One row exists per habit per day it was marked done. Toggling a habit on
/// creates the row, toggling it off deletes it again.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use crate::domain::{CompletionId, HabitId, DomainError};

/// Furthest back a completion may be recorded
const MAX_BACKFILL_DAYS: i64 = 365;

/// A record of completing a habit on a specific calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitCompletion {
    pub id: CompletionId,
    /// Which habit this completion is for
    pub habit_id: HabitId,
    /// Which local calendar day was completed
    pub completed_date: NaiveDate,
    /// When the row was written
    pub logged_at: DateTime<Utc>,
}

impl HabitCompletion {
    /// Create a new completion for `completed_date`, validated against `today`
    pub fn new(
        habit_id: HabitId,
        completed_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<Self, DomainError> {
        Self::validate_completed_date(completed_date, today)?;

        Ok(Self {
            id: CompletionId::new(),
            habit_id,
            completed_date,
            logged_at: Utc::now(),
        })
    }

    /// Create a completion from existing data (used when loading from database)
    pub fn from_existing(
        id: CompletionId,
        habit_id: HabitId,
        completed_date: NaiveDate,
        logged_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            habit_id,
            completed_date,
            logged_at,
        }
    }

    fn validate_completed_date(date: NaiveDate, today: NaiveDate) -> Result<(), DomainError> {
        if date > today {
            return Err(DomainError::InvalidDate(
                "Cannot complete habits for future dates".to_string()
            ));
        }

        if date < today - Duration::days(MAX_BACKFILL_DAYS) {
            return Err(DomainError::InvalidDate(
                "Cannot complete habits more than 1 year in the past".to_string()
            ));
        }

        Ok(())
    }
}
