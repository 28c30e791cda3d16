/// Domain module containing core business logic and data types
///
/// This module defines the entities (habits, completions, tasks, homework,
/// profile) and the pure calculators for habit streaks and the XP curve.

pub mod types;
pub mod habit;
pub mod completion;
pub mod item;
pub mod profile;
pub mod level;
pub mod streak;

// Re-export public types for easy access
pub use types::*;
pub use habit::*;
pub use completion::*;
pub use item::*;
pub use profile::*;
pub use level::{level_for_xp, xp_progress, xp_threshold_for_level, XpProgress};
pub use streak::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid id: {0}")]
    InvalidId(String),
}
