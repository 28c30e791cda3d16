/// SQLite implementation of the organizer storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving organizer data. It handles all SQL queries, row
/// conversion, and publishing change events after each committed write.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::domain::{
    CompletionId, Habit, HabitCompletion, HabitId, Homework, HomeworkId, Profile, ProfilePatch,
    Task, TaskId, UserId,
};
use crate::storage::{
    migrations, ChangeCallback, ChangeEvent, ChangeFeed, ChangeFilter, ChangeKind, Collection,
    OrganizerStorage, StorageError, SubscriptionId,
};

const HABIT_COLUMNS: &str = "id, name, description, created_at, is_active";
const COMPLETION_COLUMNS: &str = "id, habit_id, completed_date, logged_at";
const TASK_COLUMNS: &str = "id, title, completed, due_at, created_at";
const HOMEWORK_COLUMNS: &str = "id, title, subject, completed, due_date, created_at";

/// SQLite-based storage implementation
///
/// The connection sits behind a mutex so the storage can be shared between
/// async tasks; every operation holds the lock only for its own statements.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
    changes: ChangeFeed,
}

impl SqliteStorage {
    /// Open (or create) the database at `db_path` and run migrations
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::from_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(storage)
    }

    /// A private in-memory database, used by tests and dry runs
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open in-memory database: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            changes: ChangeFeed::new(),
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StorageError::Connection("Database lock poisoned".to_string()))?;
        f(&conn)
    }

    fn publish(&self, collection: Collection, kind: ChangeKind, date: Option<NaiveDate>) {
        self.changes.publish(ChangeEvent::new(collection, kind, date));
    }

    /// Run raw SQL against the connection; lets tests simulate backend faults
    #[cfg(test)]
    pub(crate) fn execute_batch(&self, sql: &str) -> Result<(), StorageError> {
        self.with_conn(|conn| Ok(conn.execute_batch(sql)?))
    }
}

fn invalid_column(idx: usize, what: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(idx, what.to_string(), rusqlite::types::Type::Text)
}

fn id_column<T>(row: &Row<'_>, idx: usize, parse: fn(&str) -> Result<T, uuid::Error>) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).map_err(|_| invalid_column(idx, "Invalid UUID"))
}

fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
    Ok(Habit::from_existing(
        id_column(row, 0, HabitId::from_string)?,
        row.get(1)?, // name
        row.get(2)?, // description
        row.get(3)?, // created_at
        row.get(4)?, // is_active
    ))
}

fn completion_from_row(row: &Row<'_>) -> rusqlite::Result<HabitCompletion> {
    Ok(HabitCompletion::from_existing(
        id_column(row, 0, CompletionId::from_string)?,
        id_column(row, 1, HabitId::from_string)?,
        row.get(2)?, // completed_date
        row.get(3)?, // logged_at
    ))
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task::from_existing(
        id_column(row, 0, TaskId::from_string)?,
        row.get(1)?, // title
        row.get(2)?, // completed
        row.get(3)?, // due_at
        row.get(4)?, // created_at
    ))
}

fn homework_from_row(row: &Row<'_>) -> rusqlite::Result<Homework> {
    Ok(Homework::from_existing(
        id_column(row, 0, HomeworkId::from_string)?,
        row.get(1)?, // title
        row.get(2)?, // subject
        row.get(3)?, // completed
        row.get(4)?, // due_date
        row.get(5)?, // created_at
    ))
}

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        user_id: id_column(row, 0, UserId::from_string)?,
        xp: row.get(1)?,
        level: row.get(2)?,
        streak_days: row.get(3)?,
        last_active_date: row.get(4)?,
    })
}

fn collect_rows<T>(rows: impl Iterator<Item = rusqlite::Result<T>>) -> Result<Vec<T>, StorageError> {
    let mut items = Vec::new();
    for item in rows {
        items.push(item?);
    }
    Ok(items)
}

fn load_or_create_profile(conn: &Connection) -> Result<Profile, StorageError> {
    let existing = conn
        .query_row(
            "SELECT user_id, xp, level, streak_days, last_active_date FROM profile WHERE id = 1",
            [],
            profile_from_row,
        )
        .optional()?;

    if let Some(profile) = existing {
        return Ok(profile);
    }

    let profile = Profile::new(UserId::new());
    conn.execute(
        "INSERT INTO profile (id, user_id, xp, level, streak_days, last_active_date)
         VALUES (1, ?1, ?2, ?3, ?4, ?5)",
        params![
            profile.user_id.to_string(),
            profile.xp,
            profile.level,
            profile.streak_days,
            profile.last_active_date
        ],
    )?;
    tracing::info!("Created profile for user {}", profile.user_id);
    Ok(profile)
}

fn task_due_date(conn: &Connection, task_id: &TaskId) -> Result<Option<NaiveDate>, StorageError> {
    let sql = format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS);
    conn.query_row(&sql, params![task_id.to_string()], task_from_row)
        .optional()?
        .map(|task| task.due_at.map(|due| due.date()))
        .ok_or_else(|| StorageError::TaskNotFound { task_id: task_id.to_string() })
}

fn homework_due_date(conn: &Connection, homework_id: &HomeworkId) -> Result<Option<NaiveDate>, StorageError> {
    let sql = format!("SELECT {} FROM homework WHERE id = ?1", HOMEWORK_COLUMNS);
    conn.query_row(&sql, params![homework_id.to_string()], homework_from_row)
        .optional()?
        .map(|homework| homework.due_date)
        .ok_or_else(|| StorageError::HomeworkNotFound { homework_id: homework_id.to_string() })
}

#[async_trait]
impl OrganizerStorage for SqliteStorage {
    async fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO habits (id, name, description, created_at, is_active)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    habit.id.to_string(),
                    habit.name,
                    habit.description,
                    habit.created_at,
                    habit.is_active
                ],
            )?;
            Ok(())
        })?;

        tracing::debug!("Created habit: {} ({})", habit.name, habit.id);
        self.publish(Collection::Habits, ChangeKind::Insert, None);
        Ok(())
    }

    async fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS);
            conn.query_row(&sql, params![habit_id.to_string()], habit_from_row)
                .optional()?
                .ok_or_else(|| StorageError::HabitNotFound { habit_id: habit_id.to_string() })
        })
    }

    async fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let rows_affected = self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE habits SET name = ?2, description = ?3, is_active = ?4 WHERE id = ?1",
                params![habit.id.to_string(), habit.name, habit.description, habit.is_active],
            )?)
        })?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit.id.to_string(),
            });
        }

        tracing::debug!("Updated habit: {} ({})", habit.name, habit.id);
        self.publish(Collection::Habits, ChangeKind::Update, None);
        Ok(())
    }

    async fn list_habits(&self, active_only: bool) -> Result<Vec<Habit>, StorageError> {
        self.with_conn(|conn| {
            let mut sql = format!("SELECT {} FROM habits", HABIT_COLUMNS);
            if active_only {
                sql.push_str(" WHERE is_active = 1");
            }
            sql.push_str(" ORDER BY created_at ASC");

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], habit_from_row)?;
            collect_rows(rows)
        })
    }

    async fn insert_completion(&self, completion: &HabitCompletion) -> Result<(), StorageError> {
        let result = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO habit_completions (id, habit_id, completed_date, logged_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    completion.id.to_string(),
                    completion.habit_id.to_string(),
                    completion.completed_date,
                    completion.logged_at
                ],
            )?;
            Ok(())
        });

        match result {
            Ok(()) => {}
            Err(StorageError::Query(rusqlite::Error::SqliteFailure(err, _)))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                return Err(StorageError::DuplicateEntry {
                    habit_id: completion.habit_id.to_string(),
                    date: completion.completed_date.to_string(),
                });
            }
            Err(StorageError::Query(rusqlite::Error::SqliteFailure(err, _)))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                return Err(StorageError::HabitNotFound {
                    habit_id: completion.habit_id.to_string(),
                });
            }
            Err(e) => return Err(e),
        }

        tracing::debug!(
            "Recorded completion of habit {} on {}",
            completion.habit_id,
            completion.completed_date
        );
        self.publish(Collection::HabitCompletions, ChangeKind::Insert, Some(completion.completed_date));
        Ok(())
    }

    async fn delete_completion(&self, habit_id: &HabitId, date: NaiveDate) -> Result<bool, StorageError> {
        let rows_affected = self.with_conn(|conn| {
            Ok(conn.execute(
                "DELETE FROM habit_completions WHERE habit_id = ?1 AND completed_date = ?2",
                params![habit_id.to_string(), date],
            )?)
        })?;

        if rows_affected == 0 {
            return Ok(false);
        }

        tracing::debug!("Removed completion of habit {} on {}", habit_id, date);
        self.publish(Collection::HabitCompletions, ChangeKind::Delete, Some(date));
        Ok(true)
    }

    async fn completions_on(&self, date: NaiveDate) -> Result<Vec<HabitCompletion>, StorageError> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM habit_completions WHERE completed_date = ?1",
                COMPLETION_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![date], completion_from_row)?;
            collect_rows(rows)
        })
    }

    async fn completions_for_habits(&self, habit_ids: &[HabitId]) -> Result<Vec<HabitCompletion>, StorageError> {
        if habit_ids.is_empty() {
            return Ok(Vec::new());
        }

        self.with_conn(|conn| {
            let placeholders = vec!["?"; habit_ids.len()].join(", ");
            let sql = format!(
                "SELECT {} FROM habit_completions WHERE habit_id IN ({}) ORDER BY completed_date DESC",
                COMPLETION_COLUMNS, placeholders
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(
                params_from_iter(habit_ids.iter().map(|id| id.to_string())),
                completion_from_row,
            )?;
            collect_rows(rows)
        })
    }

    async fn create_task(&self, task: &Task) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (id, title, completed, due_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![task.id.to_string(), task.title, task.completed, task.due_at, task.created_at],
            )?;
            Ok(())
        })?;

        tracing::debug!("Created task: {} ({})", task.title, task.id);
        self.publish(Collection::Tasks, ChangeKind::Insert, task.due_at.map(|due| due.date()));
        Ok(())
    }

    async fn get_task(&self, task_id: &TaskId) -> Result<Task, StorageError> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS);
            conn.query_row(&sql, params![task_id.to_string()], task_from_row)
                .optional()?
                .ok_or_else(|| StorageError::TaskNotFound { task_id: task_id.to_string() })
        })
    }

    async fn set_task_completed(&self, task_id: &TaskId, completed: bool) -> Result<(), StorageError> {
        let due_date = self.with_conn(|conn| {
            let due_date = task_due_date(conn, task_id)?;
            conn.execute(
                "UPDATE tasks SET completed = ?2 WHERE id = ?1",
                params![task_id.to_string(), completed],
            )?;
            Ok(due_date)
        })?;

        tracing::debug!("Set task {} completed = {}", task_id, completed);
        self.publish(Collection::Tasks, ChangeKind::Update, due_date);
        Ok(())
    }

    async fn delete_task(&self, task_id: &TaskId) -> Result<(), StorageError> {
        let due_date = self.with_conn(|conn| {
            let due_date = task_due_date(conn, task_id)?;
            conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id.to_string()])?;
            Ok(due_date)
        })?;

        tracing::debug!("Deleted task {}", task_id);
        self.publish(Collection::Tasks, ChangeKind::Delete, due_date);
        Ok(())
    }

    async fn tasks_due_on(&self, date: NaiveDate) -> Result<Vec<Task>, StorageError> {
        let (Some(day_start), Some(next_day_start)) = (
            date.and_hms_opt(0, 0, 0),
            (date + Duration::days(1)).and_hms_opt(0, 0, 0),
        ) else {
            return Ok(Vec::new());
        };

        let tasks = self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM tasks WHERE due_at >= ?1 AND due_at < ?2 ORDER BY due_at ASC",
                TASK_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![day_start, next_day_start], task_from_row)?;
            collect_rows(rows)
        })?;

        // the range query is textual; keep only exact calendar-day matches
        Ok(tasks.into_iter().filter(|task| task.is_due_on(date)).collect())
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, StorageError> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM tasks ORDER BY due_at IS NULL, due_at ASC, created_at ASC",
                TASK_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], task_from_row)?;
            collect_rows(rows)
        })
    }

    async fn create_homework(&self, homework: &Homework) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO homework (id, title, subject, completed, due_date, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    homework.id.to_string(),
                    homework.title,
                    homework.subject,
                    homework.completed,
                    homework.due_date,
                    homework.created_at
                ],
            )?;
            Ok(())
        })?;

        tracing::debug!("Created homework: {} ({})", homework.title, homework.id);
        self.publish(Collection::Homework, ChangeKind::Insert, homework.due_date);
        Ok(())
    }

    async fn get_homework(&self, homework_id: &HomeworkId) -> Result<Homework, StorageError> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM homework WHERE id = ?1", HOMEWORK_COLUMNS);
            conn.query_row(&sql, params![homework_id.to_string()], homework_from_row)
                .optional()?
                .ok_or_else(|| StorageError::HomeworkNotFound { homework_id: homework_id.to_string() })
        })
    }

    async fn set_homework_completed(&self, homework_id: &HomeworkId, completed: bool) -> Result<(), StorageError> {
        let due_date = self.with_conn(|conn| {
            let due_date = homework_due_date(conn, homework_id)?;
            conn.execute(
                "UPDATE homework SET completed = ?2 WHERE id = ?1",
                params![homework_id.to_string(), completed],
            )?;
            Ok(due_date)
        })?;

        tracing::debug!("Set homework {} completed = {}", homework_id, completed);
        self.publish(Collection::Homework, ChangeKind::Update, due_date);
        Ok(())
    }

    async fn delete_homework(&self, homework_id: &HomeworkId) -> Result<(), StorageError> {
        let due_date = self.with_conn(|conn| {
            let due_date = homework_due_date(conn, homework_id)?;
            conn.execute("DELETE FROM homework WHERE id = ?1", params![homework_id.to_string()])?;
            Ok(due_date)
        })?;

        tracing::debug!("Deleted homework {}", homework_id);
        self.publish(Collection::Homework, ChangeKind::Delete, due_date);
        Ok(())
    }

    async fn homework_due_on(&self, date: NaiveDate) -> Result<Vec<Homework>, StorageError> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM homework WHERE due_date = ?1 ORDER BY created_at ASC",
                HOMEWORK_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![date], homework_from_row)?;
            collect_rows(rows)
        })
    }

    async fn list_homework(&self) -> Result<Vec<Homework>, StorageError> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM homework ORDER BY due_date IS NULL, due_date ASC, created_at ASC",
                HOMEWORK_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], homework_from_row)?;
            collect_rows(rows)
        })
    }

    async fn get_profile(&self) -> Result<Profile, StorageError> {
        self.with_conn(load_or_create_profile)
    }

    async fn update_profile(&self, patch: &ProfilePatch) -> Result<Profile, StorageError> {
        let profile = self.with_conn(|conn| {
            let mut profile = load_or_create_profile(conn)?;
            if patch.is_empty() {
                return Ok(profile);
            }

            profile.apply(patch);
            conn.execute(
                "UPDATE profile SET xp = ?1, level = ?2, streak_days = ?3, last_active_date = ?4
                 WHERE id = 1",
                params![profile.xp, profile.level, profile.streak_days, profile.last_active_date],
            )?;
            Ok(profile)
        })?;

        if !patch.is_empty() {
            tracing::debug!(
                "Updated profile: xp={} level={} streak_days={} last_active={:?}",
                profile.xp,
                profile.level,
                profile.streak_days,
                profile.last_active_date
            );
            self.publish(Collection::Profile, ChangeKind::Update, None);
        }
        Ok(profile)
    }

    fn subscribe(&self, filter: ChangeFilter, callback: ChangeCallback) -> SubscriptionId {
        self.changes.subscribe(filter, callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.changes.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, d).unwrap()
    }

    #[tokio::test]
    async fn test_habit_round_trip() {
        let storage = SqliteStorage::in_memory().unwrap();
        let mut habit = Habit::new("Meditate".to_string(), Some("10 minutes".to_string())).unwrap();
        storage.create_habit(&habit).await.unwrap();

        let loaded = storage.get_habit(&habit.id).await.unwrap();
        assert_eq!(loaded.name, "Meditate");
        assert_eq!(loaded.description.as_deref(), Some("10 minutes"));

        habit.is_active = false;
        storage.update_habit(&habit).await.unwrap();
        assert!(storage.list_habits(true).await.unwrap().is_empty());
        assert_eq!(storage.list_habits(false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_habit_is_not_found() {
        let storage = SqliteStorage::in_memory().unwrap();
        let result = storage.get_habit(&HabitId::new()).await;
        assert!(matches!(result, Err(StorageError::HabitNotFound { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_completion_rejected() {
        let storage = SqliteStorage::in_memory().unwrap();
        let habit = Habit::new("Walk".to_string(), None).unwrap();
        storage.create_habit(&habit).await.unwrap();

        let first = HabitCompletion::new(habit.id.clone(), day(5), day(5)).unwrap();
        storage.insert_completion(&first).await.unwrap();

        let second = HabitCompletion::new(habit.id.clone(), day(5), day(5)).unwrap();
        let result = storage.insert_completion(&second).await;
        assert!(matches!(result, Err(StorageError::DuplicateEntry { .. })));

        assert!(storage.delete_completion(&habit.id, day(5)).await.unwrap());
        assert!(!storage.delete_completion(&habit.id, day(5)).await.unwrap());
    }

    #[tokio::test]
    async fn test_completion_for_unknown_habit() {
        let storage = SqliteStorage::in_memory().unwrap();
        let orphan = HabitCompletion::new(HabitId::new(), day(5), day(5)).unwrap();
        let result = storage.insert_completion(&orphan).await;
        assert!(matches!(result, Err(StorageError::HabitNotFound { .. })));
    }

    #[tokio::test]
    async fn test_tasks_due_by_calendar_day() {
        let storage = SqliteStorage::in_memory().unwrap();
        let late = Task::new("Late".to_string(), day(5).and_hms_opt(23, 59, 0)).unwrap();
        let early = Task::new("Early".to_string(), day(6).and_hms_opt(0, 0, 0)).unwrap();
        let undated = Task::new("Whenever".to_string(), None).unwrap();
        for task in [&late, &early, &undated] {
            storage.create_task(task).await.unwrap();
        }

        let due = storage.tasks_due_on(day(5)).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, late.id);

        storage.set_task_completed(&late.id, true).await.unwrap();
        assert!(storage.get_task(&late.id).await.unwrap().completed);
        assert_eq!(storage.list_tasks().await.unwrap().len(), 3);

        storage.delete_task(&early.id).await.unwrap();
        assert!(storage.tasks_due_on(day(6)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_homework_due_on() {
        let storage = SqliteStorage::in_memory().unwrap();
        let hw = Homework::new("Worksheet".to_string(), Some("Math".to_string()), Some(day(9))).unwrap();
        storage.create_homework(&hw).await.unwrap();

        assert_eq!(storage.homework_due_on(day(9)).await.unwrap().len(), 1);
        assert!(storage.homework_due_on(day(10)).await.unwrap().is_empty());

        storage.set_homework_completed(&hw.id, true).await.unwrap();
        assert!(storage.get_homework(&hw.id).await.unwrap().completed);

        let missing = storage.set_homework_completed(&HomeworkId::new(), true).await;
        assert!(matches!(missing, Err(StorageError::HomeworkNotFound { .. })));
    }

    #[tokio::test]
    async fn test_profile_singleton_and_patch() {
        let storage = SqliteStorage::in_memory().unwrap();
        let first = storage.get_profile().await.unwrap();
        let again = storage.get_profile().await.unwrap();
        assert_eq!(first.user_id, again.user_id);

        let updated = storage
            .update_profile(&ProfilePatch {
                streak_days: Some(4),
                last_active_date: Some(Some(day(3))),
                ..ProfilePatch::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.streak_days, 4);
        assert_eq!(updated.xp, 0);

        let reloaded = storage.get_profile().await.unwrap();
        assert_eq!(reloaded.last_active_date, Some(day(3)));
    }

    #[tokio::test]
    async fn test_writes_publish_changes() {
        let storage = SqliteStorage::in_memory().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        storage.subscribe(
            ChangeFilter::day_items(day(5)),
            Arc::new(move |_: &ChangeEvent| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let habit = Habit::new("Stretch".to_string(), None).unwrap();
        storage.create_habit(&habit).await.unwrap(); // undated, matches
        let completion = HabitCompletion::new(habit.id.clone(), day(5), day(5)).unwrap();
        storage.insert_completion(&completion).await.unwrap(); // same day
        let other_day = Homework::new("Read".to_string(), None, Some(day(8))).unwrap();
        storage.create_homework(&other_day).await.unwrap(); // different day
        storage.get_profile().await.unwrap(); // read only

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
