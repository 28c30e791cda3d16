/// Tools for the day's progress and the user's level
///
/// Implements day_progress and profile_status.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{xp_progress, XpProgress};
use crate::progress::{load_day_totals, DayTotals};
use crate::storage::OrganizerStorage;
use crate::tools::{parse_date_or, plural, ToolError};

/// Parameters for checking a day's progress
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct DayProgressParams {
    /// Day to check (YYYY-MM-DD, defaults to today)
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DayProgressResponse {
    pub totals: DayTotals,
    pub percent: u8,
    pub fully_complete: bool,
    pub message: String,
}

pub async fn day_progress<S: OrganizerStorage + ?Sized>(
    storage: &S,
    params: DayProgressParams,
    today: NaiveDate,
) -> Result<DayProgressResponse, ToolError> {
    let date = parse_date_or("date", params.date.as_deref(), today)?;
    let totals = load_day_totals(storage, date).await?;
    let percent = totals.display_progress_percent();
    let fully_complete = totals.is_fully_complete();

    let headline = if totals.total_items() == 0 {
        format!("📅 Nothing scheduled for {}", date)
    } else if fully_complete {
        format!("🎉 {} is fully complete!", date)
    } else {
        let remaining = totals.remaining_items();
        format!("📅 {}: {}% done, {} item{} left", date, percent, remaining, plural(remaining))
    };

    let message = format!(
        "{}\n- Tasks: {}/{}\n- Homework: {}/{}\n- Habits: {}/{}",
        headline,
        totals.tasks_done,
        totals.tasks_total,
        totals.homework_done,
        totals.homework_total,
        totals.habits_done,
        totals.habits_total
    );

    Ok(DayProgressResponse {
        totals,
        percent,
        fully_complete,
        message,
    })
}

/// profile_status takes no arguments
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ProfileStatusParams {}

#[derive(Debug, Serialize)]
pub struct ProfileStatusResponse {
    pub xp: i64,
    pub progress: XpProgress,
    pub streak_days: u32,
    pub last_active_date: Option<NaiveDate>,
    pub message: String,
}

pub async fn profile_status<S: OrganizerStorage + ?Sized>(
    storage: &S,
    _params: ProfileStatusParams,
) -> Result<ProfileStatusResponse, ToolError> {
    let profile = storage.get_profile().await?;
    let progress = xp_progress(profile.xp);

    let message = format!(
        "⭐ Level {} ({} XP total)\n📈 {}/{} XP into this level ({:.0}%)\n🔥 Streak: {} day{}",
        progress.level,
        profile.xp,
        progress.current_in_level,
        progress.needed_for_level,
        progress.percentage,
        profile.streak_days,
        plural(profile.streak_days)
    );

    Ok(ProfileStatusResponse {
        xp: profile.xp,
        progress,
        streak_days: profile.streak_days,
        last_active_date: profile.last_active_date,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Task;
    use crate::progress::award_xp;
    use crate::storage::SqliteStorage;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 4).unwrap()
    }

    #[tokio::test]
    async fn test_day_progress_counts() {
        let storage = SqliteStorage::in_memory().unwrap();
        let empty = day_progress(&storage, DayProgressParams::default(), today()).await.unwrap();
        assert_eq!(empty.percent, 100);
        assert!(!empty.fully_complete);

        let task = Task::new("Dentist".to_string(), today().and_hms_opt(15, 0, 0)).unwrap();
        storage.create_task(&task).await.unwrap();
        let pending = day_progress(&storage, DayProgressParams::default(), today()).await.unwrap();
        assert_eq!(pending.percent, 0);
        assert!(pending.message.contains("1 item left"));
    }

    #[tokio::test]
    async fn test_profile_status_level() {
        let storage = SqliteStorage::in_memory().unwrap();
        award_xp(&storage, 175).await.unwrap();

        let status = profile_status(&storage, ProfileStatusParams::default()).await.unwrap();
        assert_eq!(status.progress.level, 2);
        assert_eq!(status.progress.current_in_level, 75);
        assert!(status.message.contains("Level 2"));
    }
}
