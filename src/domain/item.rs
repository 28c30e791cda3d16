/// Tasks and homework: the dated to-do items that count toward a day
///
/// A task carries an optional due timestamp, homework an optional due date.
/// Both are matched to a day by calendar date only, so a task due at 23:30
/// belongs to that day regardless of the time component.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use crate::domain::{DomainError, HomeworkId, TaskId};

/// A general to-do item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub completed: bool,
    /// Local due timestamp; tasks without one never count toward a day
    pub due_at: Option<NaiveDateTime>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(title: String, due_at: Option<NaiveDateTime>) -> Result<Self, DomainError> {
        validate_title(&title)?;

        Ok(Self {
            id: TaskId::new(),
            title: title.trim().to_string(),
            completed: false,
            due_at,
            created_at: Utc::now(),
        })
    }

    pub fn from_existing(
        id: TaskId,
        title: String,
        completed: bool,
        due_at: Option<NaiveDateTime>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            completed,
            due_at,
            created_at,
        }
    }

    /// Whether this task is due on the given calendar day
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        self.due_at.map(|due| due.date() == date).unwrap_or(false)
    }
}

/// A homework assignment for a school subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Homework {
    pub id: HomeworkId,
    pub title: String,
    pub subject: Option<String>,
    pub completed: bool,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Homework {
    pub fn new(
        title: String,
        subject: Option<String>,
        due_date: Option<NaiveDate>,
    ) -> Result<Self, DomainError> {
        validate_title(&title)?;
        if let Some(ref subject) = subject {
            if subject.trim().is_empty() || subject.chars().count() > 60 {
                return Err(DomainError::Validation {
                    message: "Subject must be 1-60 characters".to_string(),
                });
            }
        }

        Ok(Self {
            id: HomeworkId::new(),
            title: title.trim().to_string(),
            subject: subject.map(|s| s.trim().to_string()),
            completed: false,
            due_date,
            created_at: Utc::now(),
        })
    }

    pub fn from_existing(
        id: HomeworkId,
        title: String,
        subject: Option<String>,
        completed: bool,
        due_date: Option<NaiveDate>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            subject,
            completed,
            due_date,
            created_at,
        }
    }

    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        self.due_date == Some(date)
    }
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidName("Title cannot be empty".to_string()));
    }
    if trimmed.chars().count() > 200 {
        return Err(DomainError::InvalidName(
            "Title cannot be longer than 200 characters".to_string()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_due_by_calendar_day() {
        let due = NaiveDate::from_ymd_opt(2026, 5, 4)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap();
        let task = Task::new("Pay rent".to_string(), Some(due)).unwrap();

        assert!(task.is_due_on(NaiveDate::from_ymd_opt(2026, 5, 4).unwrap()));
        assert!(!task.is_due_on(NaiveDate::from_ymd_opt(2026, 5, 5).unwrap()));
    }

    #[test]
    fn test_undated_task_is_never_due() {
        let task = Task::new("Someday".to_string(), None).unwrap();
        assert!(!task.is_due_on(NaiveDate::from_ymd_opt(2026, 5, 4).unwrap()));
    }

    #[test]
    fn test_homework_validation() {
        assert!(Homework::new("".to_string(), None, None).is_err());
        assert!(Homework::new("Essay".to_string(), Some(" ".to_string()), None).is_err());

        let hw = Homework::new("Essay".to_string(), Some("History".to_string()), None).unwrap();
        assert!(!hw.completed);
    }
}
