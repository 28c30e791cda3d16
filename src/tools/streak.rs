/// Tool for running the daily streak check on demand
///
/// Implements streak_check.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::progress::{StreakOrchestrator, StreakOutcome};
use crate::storage::{FlagStore, OrganizerStorage};
use crate::tools::{plural, ToolError};

/// streak_check takes no arguments
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct StreakCheckParams {}

#[derive(Debug, Serialize)]
pub struct StreakCheckResponse {
    pub outcome: StreakOutcome,
    pub streak_days: u32,
    pub message: String,
}

pub async fn check_streak(
    storage: &dyn OrganizerStorage,
    flags: &dyn FlagStore,
    _params: StreakCheckParams,
    today: NaiveDate,
) -> Result<StreakCheckResponse, ToolError> {
    let outcome = StreakOrchestrator::new(storage, flags).evaluate(today).await?;
    let profile = storage.get_profile().await?;

    let status = format!(
        "🔥 Current streak: {} day{}",
        profile.streak_days,
        plural(profile.streak_days)
    );
    let message = match outcome.message() {
        Some(note) => format!("{}\n{}", note, status),
        None => status,
    };

    Ok(StreakCheckResponse {
        outcome,
        streak_days: profile.streak_days,
        message,
    })
}
