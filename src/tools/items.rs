/// Tools for tasks and homework
///
/// Implements task_create, task_complete, homework_create and
/// homework_complete. Completing an item grants XP, reopening it takes the
/// same amount back.

use chrono::{NaiveDate, NaiveDateTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::XpRewards;
use crate::domain::{Homework, HomeworkId, ItemKind, Task, TaskId, XpChange};
use crate::progress::award_xp;
use crate::storage::OrganizerStorage;
use crate::tools::{parse_date, parse_due_at, parse_id, ToolError};

/// Parameters for creating a task
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateTaskParams {
    /// What needs doing
    pub title: String,
    /// Due time (YYYY-MM-DDTHH:MM, or YYYY-MM-DD for end of day); tasks without one never count toward a day
    pub due_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateTaskResponse {
    pub task_id: String,
    pub due_at: Option<NaiveDateTime>,
    pub message: String,
}

pub async fn create_task<S: OrganizerStorage + ?Sized>(
    storage: &S,
    params: CreateTaskParams,
) -> Result<CreateTaskResponse, ToolError> {
    let due_at = params
        .due_at
        .as_deref()
        .map(|raw| parse_due_at("due_at", raw))
        .transpose()?;

    let task = Task::new(params.title, due_at)?;
    storage.create_task(&task).await?;

    let when = match task.due_at {
        Some(due) => format!(" due {}", due.format("%Y-%m-%d %H:%M")),
        None => String::new(),
    };
    Ok(CreateTaskResponse {
        task_id: task.id.to_string(),
        due_at: task.due_at,
        message: format!("📝 Added task '{}'{}\nTask ID: {}", task.title, when, task.id),
    })
}

/// Parameters for creating a homework assignment
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateHomeworkParams {
    /// Assignment title
    pub title: String,
    /// School subject (optional)
    pub subject: Option<String>,
    /// Due date (YYYY-MM-DD, optional)
    pub due_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateHomeworkResponse {
    pub homework_id: String,
    pub due_date: Option<NaiveDate>,
    pub message: String,
}

pub async fn create_homework<S: OrganizerStorage + ?Sized>(
    storage: &S,
    params: CreateHomeworkParams,
) -> Result<CreateHomeworkResponse, ToolError> {
    let due_date = params
        .due_date
        .as_deref()
        .map(|raw| parse_date("due_date", raw))
        .transpose()?;

    let homework = Homework::new(params.title, params.subject, due_date)?;
    storage.create_homework(&homework).await?;

    let subject = homework
        .subject
        .as_ref()
        .map(|s| format!(" ({})", s))
        .unwrap_or_default();
    Ok(CreateHomeworkResponse {
        homework_id: homework.id.to_string(),
        due_date: homework.due_date,
        message: format!(
            "📚 Added homework '{}'{}\nHomework ID: {}",
            homework.title, subject, homework.id
        ),
    })
}

/// Parameters for completing (or reopening) a task
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CompleteTaskParams {
    /// ID of the task
    pub task_id: String,
    /// false reopens the task (default: true)
    pub completed: Option<bool>,
}

/// Parameters for completing (or reopening) homework
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CompleteHomeworkParams {
    /// ID of the homework
    pub homework_id: String,
    /// false reopens the assignment (default: true)
    pub completed: Option<bool>,
}

/// Response from completing either kind of item
#[derive(Debug, Serialize)]
pub struct CompleteItemResponse {
    pub kind: ItemKind,
    pub completed: bool,
    /// `None` when the item was already in the requested state
    pub xp: Option<XpChange>,
    pub message: String,
}

pub async fn complete_task<S: OrganizerStorage + ?Sized>(
    storage: &S,
    rewards: XpRewards,
    params: CompleteTaskParams,
) -> Result<CompleteItemResponse, ToolError> {
    let task_id = parse_id("task_id", &params.task_id, TaskId::from_string)?;
    let target = params.completed.unwrap_or(true);

    let task = storage.get_task(&task_id).await?;
    if task.completed == target {
        return Ok(unchanged(ItemKind::Task, &task.title, target));
    }

    storage.set_task_completed(&task_id, target).await?;
    let xp = award_xp(storage, signed(rewards.task, target)).await?;
    Ok(changed(ItemKind::Task, &task.title, target, xp))
}

pub async fn complete_homework<S: OrganizerStorage + ?Sized>(
    storage: &S,
    rewards: XpRewards,
    params: CompleteHomeworkParams,
) -> Result<CompleteItemResponse, ToolError> {
    let homework_id = parse_id("homework_id", &params.homework_id, HomeworkId::from_string)?;
    let target = params.completed.unwrap_or(true);

    let homework = storage.get_homework(&homework_id).await?;
    if homework.completed == target {
        return Ok(unchanged(ItemKind::Homework, &homework.title, target));
    }

    storage.set_homework_completed(&homework_id, target).await?;
    let xp = award_xp(storage, signed(rewards.homework, target)).await?;
    Ok(changed(ItemKind::Homework, &homework.title, target, xp))
}

fn signed(reward: u32, completed: bool) -> i64 {
    if completed {
        i64::from(reward)
    } else {
        -i64::from(reward)
    }
}

fn unchanged(kind: ItemKind, title: &str, completed: bool) -> CompleteItemResponse {
    let state = if completed { "already done" } else { "already open" };
    CompleteItemResponse {
        kind,
        completed,
        xp: None,
        message: format!("{} '{}' is {}", kind, title, state),
    }
}

fn changed(kind: ItemKind, title: &str, completed: bool, xp: XpChange) -> CompleteItemResponse {
    let mut message = if completed {
        format!("✅ {} '{}' done! +{} XP", kind, title, xp.new_xp - xp.old_xp)
    } else {
        format!("↩️ {} '{}' reopened ({} XP)", kind, title, xp.new_xp - xp.old_xp)
    };
    if xp.leveled_up() {
        message.push_str(&format!("\n⭐ Level up! You reached level {}", xp.new_level));
    }
    CompleteItemResponse {
        kind,
        completed,
        xp: Some(xp),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;

    #[tokio::test]
    async fn test_complete_task_awards_once() {
        let storage = SqliteStorage::in_memory().unwrap();
        let created = create_task(
            &storage,
            CreateTaskParams {
                title: "Pay rent".to_string(),
                due_at: Some("2026-10-01".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(created.due_at.unwrap().date(), NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());

        let params = || CompleteTaskParams {
            task_id: created.task_id.clone(),
            completed: None,
        };
        let first = complete_task(&storage, XpRewards::default(), params()).await.unwrap();
        assert_eq!(first.xp.unwrap().new_xp, 10);

        let second = complete_task(&storage, XpRewards::default(), params()).await.unwrap();
        assert!(second.xp.is_none());
        assert_eq!(storage.get_profile().await.unwrap().xp, 10);
    }

    #[tokio::test]
    async fn test_reopen_homework_revokes_xp() {
        let storage = SqliteStorage::in_memory().unwrap();
        let created = create_homework(
            &storage,
            CreateHomeworkParams {
                title: "Essay draft".to_string(),
                subject: Some("English".to_string()),
                due_date: Some("2026-10-05".to_string()),
            },
        )
        .await
        .unwrap();

        let rewards = XpRewards::default();
        complete_homework(
            &storage,
            rewards,
            CompleteHomeworkParams {
                homework_id: created.homework_id.clone(),
                completed: Some(true),
            },
        )
        .await
        .unwrap();
        let reopened = complete_homework(
            &storage,
            rewards,
            CompleteHomeworkParams {
                homework_id: created.homework_id,
                completed: Some(false),
            },
        )
        .await
        .unwrap();

        assert!(!reopened.completed);
        assert_eq!(reopened.xp.unwrap().new_xp, 0);
    }

    #[tokio::test]
    async fn test_bad_due_date_rejected() {
        let storage = SqliteStorage::in_memory().unwrap();
        let result = create_homework(
            &storage,
            CreateHomeworkParams {
                title: "Worksheet".to_string(),
                subject: None,
                due_date: Some("05/10/2026".to_string()),
            },
        )
        .await;
        assert!(matches!(result, Err(ToolError::InvalidParam { field: "due_date", .. })));
    }
}
