/// Tools for managing habits and their daily completions
///
/// Implements habit_create, habit_update, habit_toggle and habit_list.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::XpRewards;
use crate::domain::{Habit, HabitCompletion, HabitId, XpChange};
use crate::progress::{award_xp, habit_overview, habit_streak};
use crate::storage::OrganizerStorage;
use crate::tools::{parse_date_or, parse_id, plural, ToolError};

/// Parameters for creating a habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateHabitParams {
    /// Name of the habit
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub habit_id: String,
    pub message: String,
}

pub async fn create_habit<S: OrganizerStorage + ?Sized>(
    storage: &S,
    params: CreateHabitParams,
) -> Result<CreateHabitResponse, ToolError> {
    let habit = Habit::new(params.name, params.description)?;
    storage.create_habit(&habit).await?;

    Ok(CreateHabitResponse {
        habit_id: habit.id.to_string(),
        message: format!(
            "✅ Created habit '{}'. It counts toward every day from now on.\nHabit ID: {}",
            habit.name, habit.id
        ),
    })
}

/// Parameters for updating a habit; omitted fields stay unchanged
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateHabitParams {
    /// ID of the habit to update
    pub habit_id: String,
    /// New name
    pub name: Option<String>,
    /// New description (empty string clears it)
    pub description: Option<String>,
    /// Pause (false) or resume (true) the habit
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct UpdateHabitResponse {
    pub habit: Habit,
    pub message: String,
}

pub async fn update_habit<S: OrganizerStorage + ?Sized>(
    storage: &S,
    params: UpdateHabitParams,
) -> Result<UpdateHabitResponse, ToolError> {
    let habit_id = parse_id("habit_id", &params.habit_id, HabitId::from_string)?;
    let mut habit = storage.get_habit(&habit_id).await?;

    if params.name.is_none() && params.description.is_none() && params.is_active.is_none() {
        return Err(ToolError::InvalidParam {
            field: "habit_id",
            message: "nothing to update".to_string(),
        });
    }

    let description = params
        .description
        .map(|d| if d.trim().is_empty() { None } else { Some(d) });
    habit.update(params.name, description, params.is_active)?;
    storage.update_habit(&habit).await?;

    let state = if habit.is_active { "active" } else { "paused" };
    Ok(UpdateHabitResponse {
        message: format!("Updated habit '{}' ({})", habit.name, state),
        habit,
    })
}

/// Parameters for marking a habit done (or undone) for a day
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ToggleHabitParams {
    /// ID of the habit
    pub habit_id: String,
    /// Day to toggle (YYYY-MM-DD, defaults to today)
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ToggleHabitResponse {
    pub completed: bool,
    pub date: NaiveDate,
    pub current_streak: u32,
    pub xp: XpChange,
    pub message: String,
}

/// Flip a habit's completion for a day, granting or revoking habit XP
pub async fn toggle_habit<S: OrganizerStorage + ?Sized>(
    storage: &S,
    rewards: XpRewards,
    params: ToggleHabitParams,
    today: NaiveDate,
) -> Result<ToggleHabitResponse, ToolError> {
    let habit_id = parse_id("habit_id", &params.habit_id, HabitId::from_string)?;
    let date = parse_date_or("date", params.date.as_deref(), today)?;

    let habit = storage.get_habit(&habit_id).await?;
    if !habit.is_active {
        return Err(ToolError::InvalidParam {
            field: "habit_id",
            message: format!("habit '{}' is paused", habit.name),
        });
    }

    let removed = storage.delete_completion(&habit_id, date).await?;
    let (completed, delta) = if removed {
        (false, -i64::from(rewards.habit))
    } else {
        let completion = HabitCompletion::new(habit_id.clone(), date, today)?;
        storage.insert_completion(&completion).await?;
        (true, i64::from(rewards.habit))
    };

    let xp = award_xp(storage, delta).await?;
    let streak = habit_streak(storage, &habit_id, today).await?;

    let mut message = if completed {
        format!(
            "✅ '{}' done for {}. Streak: {} day{}",
            habit.name,
            date,
            streak.current_streak,
            plural(streak.current_streak)
        )
    } else {
        format!("↩️ '{}' unmarked for {}", habit.name, date)
    };
    if xp.leveled_up() {
        message.push_str(&format!("\n⭐ Level up! You reached level {}", xp.new_level));
    }

    Ok(ToggleHabitResponse {
        completed,
        date,
        current_streak: streak.current_streak,
        xp,
        message,
    })
}

/// Parameters for listing habits
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListHabitsParams {
    /// Show only active habits (default: true)
    pub active_only: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct HabitListEntry {
    pub habit_id: String,
    pub name: String,
    pub is_active: bool,
    pub current_streak: u32,
    pub done_today: bool,
}

#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitListEntry>,
    pub message: String,
}

pub async fn list_habits<S: OrganizerStorage + ?Sized>(
    storage: &S,
    params: ListHabitsParams,
    today: NaiveDate,
) -> Result<ListHabitsResponse, ToolError> {
    let overview = habit_overview(storage, today, params.active_only.unwrap_or(true)).await?;

    let habits: Vec<HabitListEntry> = overview
        .into_iter()
        .map(|row| HabitListEntry {
            habit_id: row.habit.id.to_string(),
            name: row.habit.name,
            is_active: row.habit.is_active,
            current_streak: row.current_streak,
            done_today: row.done_today,
        })
        .collect();

    let message = if habits.is_empty() {
        "No habits found. Create your first habit to get started!".to_string()
    } else {
        let lines = habits
            .iter()
            .map(|h| {
                format!(
                    "{} **{}** | 🔥 {} day{}{}\n   ID: {}",
                    if h.done_today { "✅" } else { "⬜" },
                    h.name,
                    h.current_streak,
                    plural(h.current_streak),
                    if h.is_active { "" } else { " ⏸️ (paused)" },
                    h.habit_id
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!("📋 **Habits** ({})\n\n{}", habits.len(), lines)
    };

    Ok(ListHabitsResponse { habits, message })
}
