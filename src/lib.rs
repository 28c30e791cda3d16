/// Public library interface for the Life Tracker MCP server
///
/// This module exports the server, the streak and level calculators, and the
/// storage types so they can be used by other applications or tests.

use chrono::{Local, NaiveDate};
use thiserror::Error;

pub mod config;
pub mod domain;
pub mod mcp;
pub mod progress;
pub mod storage;
pub mod tools;

// Re-export public modules and types
pub use config::{Args, Config, XpRewards};
pub use domain::*;
pub use progress::{DayTotals, StreakAction, StreakOutcome};
pub use storage::{
    FileFlagStore, FlagStore, FlagStoreError, MemoryFlagStore, OrganizerStorage, SqliteStorage,
    StorageError,
};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] storage::StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("Local flag store error: {0}")]
    FlagStore(#[from] storage::FlagStoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The device's current calendar day
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Main life tracker server that implements the MCP protocol
///
/// Owns the SQLite storage, the device-local flag store and the XP reward
/// table, and exposes the streak core as plain async methods.
pub struct LifeTrackerServer {
    storage: SqliteStorage,
    flags: Box<dyn FlagStore>,
    rewards: XpRewards,
}

impl LifeTrackerServer {
    /// Create a server from resolved configuration
    ///
    /// This will initialize the SQLite database with the required schema
    /// if it doesn't already exist, and load the local flag file.
    pub async fn new(config: Config) -> Result<Self, ServerError> {
        tracing::info!("Initializing Life Tracker server with database: {:?}", config.database);

        let storage = SqliteStorage::new(config.database)?;
        let flags = FileFlagStore::open(config.flags_file)?;

        Ok(Self::with_parts(storage, Box::new(flags), config.rewards))
    }

    /// Assemble a server from already constructed parts
    pub fn with_parts(storage: SqliteStorage, flags: Box<dyn FlagStore>, rewards: XpRewards) -> Self {
        Self {
            storage,
            flags,
            rewards,
        }
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method will block until the server is shut down or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server...");

        let habits = self.storage.list_habits(true).await?;
        tracing::info!("Server started successfully, found {} active habits", habits.len());

        let mut mcp_server = mcp::McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn flags(&self) -> &dyn FlagStore {
        self.flags.as_ref()
    }

    pub fn rewards(&self) -> XpRewards {
        self.rewards
    }

    /// Current streak of one habit as of today
    pub async fn habit_streak(&self, habit_id: &HabitId) -> Result<u32, ServerError> {
        let streak = progress::habit_streak(&self.storage, habit_id, local_today()).await?;
        Ok(streak.current_streak)
    }

    /// Level and in-level progress for an XP total
    pub fn level_info(xp: i64) -> XpProgress {
        xp_progress(xp)
    }

    /// Run one streak evaluation pass for `today`
    pub async fn evaluate_streak(&self, today: NaiveDate) -> Result<StreakOutcome, ServerError> {
        let outcome =
            progress::evaluate_and_maybe_award_streak(&self.storage, self.flags.as_ref(), today).await?;
        Ok(outcome)
    }

    /// Grant (or with a negative delta, revoke) XP
    pub async fn award_xp(&self, delta: i64) -> Result<XpChange, ServerError> {
        Ok(progress::award_xp(&self.storage, delta).await?)
    }
}
