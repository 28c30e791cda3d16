/// MCP tools for the organizer
///
/// This module contains all the MCP tools that external clients (like Claude)
/// can call. Each tool takes a params struct deserialized from the call's
/// arguments and returns a response struct with a human-readable message.

pub mod habits;
pub mod items;
pub mod profile;
pub mod streak;

// Re-export tool functions for easy access
pub use habits::*;
pub use items::*;
pub use profile::*;
pub use streak::*;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::domain::DomainError;
use crate::storage::StorageError;

/// Errors a tool call can end with
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Invalid {field}: {message}")]
    InvalidParam { field: &'static str, message: String },
}

impl ToolError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ToolError::InvalidParam {
            field,
            message: message.into(),
        }
    }

    /// Whether the failure is in the backend rather than the caller's input
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ToolError::Storage(
                StorageError::Connection(_)
                    | StorageError::Query(_)
                    | StorageError::Serialization(_)
                    | StorageError::Migration(_)
            )
        )
    }
}

/// Parse a required id argument
fn parse_id<T>(
    field: &'static str,
    raw: &str,
    parse: fn(&str) -> Result<T, uuid::Error>,
) -> Result<T, ToolError> {
    if raw.trim().is_empty() {
        return Err(ToolError::invalid(field, "cannot be empty"));
    }
    parse(raw).map_err(|_| ToolError::invalid(field, format!("'{}' is not a valid id", raw)))
}

/// Parse an optional `YYYY-MM-DD` argument, falling back to `today`
fn parse_date_or(field: &'static str, raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate, ToolError> {
    match raw {
        Some(s) => parse_date(field, s),
        None => Ok(today),
    }
}

fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, ToolError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ToolError::invalid(field, format!("'{}' is not a YYYY-MM-DD date", raw)))
}

/// Parse a due timestamp: `YYYY-MM-DDTHH:MM`, `YYYY-MM-DD HH:MM`, or a bare
/// date meaning the end of that day
fn parse_due_at(field: &'static str, raw: &str) -> Result<NaiveDateTime, ToolError> {
    let raw = raw.trim();
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed);
        }
    }
    parse_date(field, raw)?
        .and_hms_opt(23, 59, 0)
        .ok_or_else(|| ToolError::invalid(field, "out of range"))
}

fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
