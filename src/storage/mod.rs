/// Storage layer for persisting organizer data
///
/// This module defines the persistence interface the streak core talks to,
/// the SQLite implementation of it, the realtime change feed, and the
/// device-local idempotency flag store.

pub mod sqlite;
pub mod migrations;
pub mod changes;
pub mod flags;

// Re-export the main storage types
pub use sqlite::*;
pub use changes::{ChangeCallback, ChangeEvent, ChangeFeed, ChangeFilter, ChangeKind, Collection, SubscriptionId};
pub use flags::{streak_flag_key, FileFlagStore, FlagStore, FlagStoreError, MemoryFlagStore};

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use crate::domain::{
    Habit, HabitCompletion, HabitId, Homework, HomeworkId, Profile, ProfilePatch, Task, TaskId,
};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Task not found: {task_id}")]
    TaskNotFound { task_id: String },

    #[error("Homework not found: {homework_id}")]
    HomeworkNotFound { homework_id: String },

    #[error("Duplicate entry: habit {habit_id} already completed on {date}")]
    DuplicateEntry { habit_id: String, date: String },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Persistence interface consumed by the streak core
///
/// Every read and write is asynchronous so callers suspend at each backend
/// round trip. Implementations must publish a [`ChangeEvent`] to matching
/// subscribers after every successful insert, update or delete.
#[async_trait]
pub trait OrganizerStorage: Send + Sync {
    // Habits

    async fn create_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    async fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError>;

    async fn update_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    async fn list_habits(&self, active_only: bool) -> Result<Vec<Habit>, StorageError>;

    // Habit completions

    /// Fails with `DuplicateEntry` if the habit is already completed that day
    async fn insert_completion(&self, completion: &HabitCompletion) -> Result<(), StorageError>;

    /// Returns whether a row was removed
    async fn delete_completion(&self, habit_id: &HabitId, date: NaiveDate) -> Result<bool, StorageError>;

    async fn completions_on(&self, date: NaiveDate) -> Result<Vec<HabitCompletion>, StorageError>;

    async fn completions_for_habits(&self, habit_ids: &[HabitId]) -> Result<Vec<HabitCompletion>, StorageError>;

    // Tasks

    async fn create_task(&self, task: &Task) -> Result<(), StorageError>;

    async fn get_task(&self, task_id: &TaskId) -> Result<Task, StorageError>;

    async fn set_task_completed(&self, task_id: &TaskId, completed: bool) -> Result<(), StorageError>;

    async fn delete_task(&self, task_id: &TaskId) -> Result<(), StorageError>;

    /// Tasks whose due timestamp falls on `date`
    async fn tasks_due_on(&self, date: NaiveDate) -> Result<Vec<Task>, StorageError>;

    async fn list_tasks(&self) -> Result<Vec<Task>, StorageError>;

    // Homework

    async fn create_homework(&self, homework: &Homework) -> Result<(), StorageError>;

    async fn get_homework(&self, homework_id: &HomeworkId) -> Result<Homework, StorageError>;

    async fn set_homework_completed(&self, homework_id: &HomeworkId, completed: bool) -> Result<(), StorageError>;

    async fn delete_homework(&self, homework_id: &HomeworkId) -> Result<(), StorageError>;

    async fn homework_due_on(&self, date: NaiveDate) -> Result<Vec<Homework>, StorageError>;

    async fn list_homework(&self) -> Result<Vec<Homework>, StorageError>;

    // Profile

    /// The singleton profile, created with defaults on first access
    async fn get_profile(&self) -> Result<Profile, StorageError>;

    /// Whole-field update; returns the profile as stored afterwards
    async fn update_profile(&self, patch: &ProfilePatch) -> Result<Profile, StorageError>;

    // Realtime

    /// Register `callback` for changes matching `filter`
    fn subscribe(&self, filter: ChangeFilter, callback: ChangeCallback) -> SubscriptionId;

    /// Returns false if the subscription was already gone
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
