/// The user's profile: XP, level and the daily-completion streak
///
/// There is exactly one profile per database. `level` mirrors `xp` and is
/// recomputed whenever XP changes; `streak_days` and `last_active_date` are
/// only written by the streak orchestrator.

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use crate::domain::{level, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    /// Total XP, never negative
    pub xp: i64,
    /// Always `level_for_xp(xp)`
    pub level: u32,
    /// Consecutive fully-completed days
    pub streak_days: u32,
    /// Last day a streak award was recorded
    pub last_active_date: Option<NaiveDate>,
}

impl Profile {
    /// A fresh profile at level 1 with no streak
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            xp: 0,
            level: 1,
            streak_days: 0,
            last_active_date: None,
        }
    }

    /// Apply a patch in memory; used by storage backends after a write
    pub fn apply(&mut self, patch: &ProfilePatch) {
        if let Some(xp) = patch.xp {
            self.xp = xp;
        }
        if let Some(level) = patch.level {
            self.level = level;
        }
        if let Some(streak_days) = patch.streak_days {
            self.streak_days = streak_days;
        }
        if let Some(last_active_date) = patch.last_active_date {
            self.last_active_date = last_active_date;
        }
    }

    /// Compute the XP/level patch for gaining (or losing) `delta` XP
    ///
    /// XP floors at 0 and the level is derived from the new total.
    pub fn xp_change(&self, delta: i64) -> XpChange {
        let new_xp = self.xp.saturating_add(delta).max(0);
        XpChange {
            old_xp: self.xp,
            new_xp,
            old_level: self.level,
            new_level: level::level_for_xp(new_xp),
        }
    }
}

/// Whole-field update of profile columns; `None` leaves a column untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub xp: Option<i64>,
    pub level: Option<u32>,
    pub streak_days: Option<u32>,
    /// `Some(None)` clears the date
    pub last_active_date: Option<Option<NaiveDate>>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.xp.is_none()
            && self.level.is_none()
            && self.streak_days.is_none()
            && self.last_active_date.is_none()
    }
}

/// Result of an XP gain or loss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct XpChange {
    pub old_xp: i64,
    pub new_xp: i64,
    pub old_level: u32,
    pub new_level: u32,
}

impl XpChange {
    pub fn leveled_up(&self) -> bool {
        self.new_level > self.old_level
    }

    /// The patch that persists this change, keeping level in sync with xp
    pub fn patch(&self) -> ProfilePatch {
        ProfilePatch {
            xp: Some(self.new_xp),
            level: Some(self.new_level),
            ..ProfilePatch::default()
        }
    }
}
