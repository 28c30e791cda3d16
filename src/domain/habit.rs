/// Habit entity and related functionality
///
/// A habit is something the user ticks off once per day. Only active habits
/// take part in streak and daily-completion math; pausing a habit removes it
/// from every day's totals, including past days.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{HabitId, DomainError};

/// A daily habit the user wants to keep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display name (e.g., "Drink water", "Read 20 pages")
    pub name: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
    /// Whether this habit currently counts toward daily completion
    pub is_active: bool,
}

impl Habit {
    /// Create a new, active habit with validation
    pub fn new(name: String, description: Option<String>) -> Result<Self, DomainError> {
        Self::validate_name(&name)?;
        Self::validate_description(&description)?;

        Ok(Self {
            id: HabitId::new(),
            name: name.trim().to_string(),
            description,
            created_at: Utc::now(),
            is_active: true,
        })
    }

    /// Create a habit from existing data (used when loading from database)
    pub fn from_existing(
        id: HabitId,
        name: String,
        description: Option<String>,
        created_at: DateTime<Utc>,
        is_active: bool,
    ) -> Self {
        Self {
            id,
            name,
            description,
            created_at,
            is_active,
        }
    }

    /// Update the habit's properties with validation
    ///
    /// Nothing is applied unless every provided value is valid.
    pub fn update(
        &mut self,
        name: Option<String>,
        description: Option<Option<String>>,
        is_active: Option<bool>,
    ) -> Result<(), DomainError> {
        if let Some(ref new_name) = name {
            Self::validate_name(new_name)?;
        }
        if let Some(ref new_desc) = description {
            Self::validate_description(new_desc)?;
        }

        if let Some(new_name) = name {
            self.name = new_name.trim().to_string();
        }
        if let Some(new_description) = description {
            self.description = new_description;
        }
        if let Some(new_is_active) = is_active {
            self.is_active = new_is_active;
        }

        Ok(())
    }

    fn validate_name(name: &str) -> Result<(), DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidName(
                "Habit name cannot be empty".to_string()
            ));
        }

        if trimmed.chars().count() > 100 {
            return Err(DomainError::InvalidName(
                "Habit name cannot be longer than 100 characters".to_string()
            ));
        }

        Ok(())
    }

    fn validate_description(description: &Option<String>) -> Result<(), DomainError> {
        if let Some(desc) = description {
            if desc.chars().count() > 500 {
                return Err(DomainError::Validation {
                    message: "Description cannot be longer than 500 characters".to_string()
                });
            }
        }
        Ok(())
    }
}
