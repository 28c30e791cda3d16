/// Global daily streak orchestration
///
/// One evaluation pass runs two independent checks, in order:
///
/// 1. **Reset**: if the last fully completed day is neither today nor
///    yesterday, a positive streak is written back to zero.
/// 2. **Award**: if today's local award flag is not set and today is fully
///    complete, the streak either continues from yesterday or restarts at 1.
///    The flag is set only after the profile write succeeded, so a failed
///    write leaves the award retryable.
///
/// Both checks read the same profile snapshot, taken at the start of the pass.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{Profile, ProfilePatch};
use crate::progress::daily::{is_day_fully_complete, load_day_totals};
use crate::storage::{streak_flag_key, FlagStore, OrganizerStorage, StorageError};

/// What a pass decided to do with the global streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakAction {
    NoAction,
    ResetToZero,
    /// Yesterday was the last active day and is fully complete
    AwardContinue,
    /// Anything else: the streak starts over at 1
    AwardRestart,
}

/// Result of one evaluation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreakOutcome {
    /// The last action taken; an award wins over a reset in the same pass
    pub action: StreakAction,
    pub reset_applied: bool,
    /// Streak value after this pass, when it was written
    pub new_streak: Option<u32>,
    /// Set when the new streak is worth celebrating (greater than 1)
    pub celebration: Option<u32>,
}

impl StreakOutcome {
    fn no_action() -> Self {
        Self {
            action: StreakAction::NoAction,
            reset_applied: false,
            new_streak: None,
            celebration: None,
        }
    }

    pub fn awarded(&self) -> bool {
        matches!(self.action, StreakAction::AwardContinue | StreakAction::AwardRestart)
    }

    pub fn message(&self) -> Option<String> {
        if let Some(days) = self.celebration {
            return Some(format!("🔥 {} day streak! Every item done again today.", days));
        }
        match self.action {
            StreakAction::AwardRestart => Some("🌱 Day 1! Everything is done for today.".to_string()),
            StreakAction::ResetToZero => Some("Streak reset. Finish everything today to start a new one.".to_string()),
            _ => None,
        }
    }
}

/// Whether the snapshot calls for a reset on `today`
pub fn needs_reset(profile: &Profile, today: NaiveDate) -> bool {
    let yesterday = today - Duration::days(1);
    match profile.last_active_date {
        Some(last) => last != today && last != yesterday && profile.streak_days > 0,
        None => false,
    }
}

/// Runs evaluation passes against a storage backend and a local flag store
pub struct StreakOrchestrator<'a> {
    storage: &'a dyn OrganizerStorage,
    flags: &'a dyn FlagStore,
}

impl<'a> StreakOrchestrator<'a> {
    pub fn new(storage: &'a dyn OrganizerStorage, flags: &'a dyn FlagStore) -> Self {
        Self { storage, flags }
    }

    /// Evaluate the streak for `today`, persisting any reset or award
    ///
    /// Safe to call any number of times per day: after a successful award
    /// further calls are no-ops until the date changes.
    pub async fn evaluate(&self, today: NaiveDate) -> Result<StreakOutcome, StorageError> {
        let yesterday = today - Duration::days(1);
        let profile = self.storage.get_profile().await?;
        let mut outcome = StreakOutcome::no_action();

        if needs_reset(&profile, today) {
            let patch = ProfilePatch {
                streak_days: Some(0),
                ..Default::default()
            };
            self.storage.update_profile(&patch).await?;
            info!(
                "Streak of {} days reset, last active {:?}",
                profile.streak_days, profile.last_active_date
            );
            outcome.action = StreakAction::ResetToZero;
            outcome.reset_applied = true;
            outcome.new_streak = Some(0);
        }

        let flag_key = streak_flag_key(&profile.user_id, today);
        if self.flags.get_flag(&flag_key) {
            debug!("Streak already awarded for {}", today);
            return Ok(outcome);
        }

        if profile.last_active_date == Some(today) {
            // awarded elsewhere, e.g. from another device sharing this database
            debug!("Profile already active on {}, syncing local flag", today);
            self.mark_awarded(&flag_key);
            return Ok(outcome);
        }

        let totals = load_day_totals(self.storage, today).await?;
        if !totals.is_fully_complete() {
            debug!(
                "Day {} not complete: {}/{} items",
                today,
                totals.completed_items(),
                totals.total_items()
            );
            return Ok(outcome);
        }

        let continues = profile.last_active_date == Some(yesterday)
            && is_day_fully_complete(self.storage, yesterday).await?;

        let (action, new_streak) = if continues {
            (StreakAction::AwardContinue, profile.streak_days.saturating_add(1))
        } else {
            (StreakAction::AwardRestart, 1)
        };

        let patch = ProfilePatch {
            streak_days: Some(new_streak),
            last_active_date: Some(Some(today)),
            ..Default::default()
        };
        self.storage.update_profile(&patch).await?;
        self.mark_awarded(&flag_key);

        info!("Streak awarded for {}: {:?} -> {} days", today, action, new_streak);

        outcome.action = action;
        outcome.new_streak = Some(new_streak);
        if new_streak > 1 {
            outcome.celebration = Some(new_streak);
        }
        Ok(outcome)
    }

    fn mark_awarded(&self, key: &str) {
        // the profile's last_active_date still blocks a second award today
        if let Err(e) = self.flags.set_flag(key) {
            warn!("Failed to persist local flag {}: {}", key, e);
        }
    }
}

/// Convenience wrapper around [`StreakOrchestrator::evaluate`]
pub async fn evaluate_and_maybe_award_streak(
    storage: &dyn OrganizerStorage,
    flags: &dyn FlagStore,
    today: NaiveDate,
) -> Result<StreakOutcome, StorageError> {
    StreakOrchestrator::new(storage, flags).evaluate(today).await
}
