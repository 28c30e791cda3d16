/// XP and level progression
///
/// Each level costs more XP than the previous one: the cost of leaving level
/// `L` is `floor(BASE_XP * XP_RATIO^(L-1))`, so level 1 costs 100, level 2
/// costs 150, level 3 costs 225, and so on. A level is never stored on its
/// own; it is always recomputed from the XP total.

use serde::{Deserialize, Serialize};

/// XP needed to go from level 1 to level 2
pub const BASE_XP: u64 = 100;
/// Growth factor of the per-level cost
pub const XP_RATIO: f64 = 1.5;

/// Where an XP total sits on the level curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XpProgress {
    pub level: u32,
    /// XP earned since reaching `level`
    pub current_in_level: u64,
    /// XP between `level` and `level + 1`
    pub needed_for_level: u64,
    /// 0.0..=100.0
    pub percentage: f64,
}

/// XP cost of advancing from `level` to `level + 1`
pub fn cost_for_level(level: u32) -> u64 {
    let level = level.max(1);
    let cost = BASE_XP as f64 * XP_RATIO.powi(level as i32 - 1);
    // `as` saturates for values beyond u64::MAX
    cost.floor() as u64
}

/// Cumulative XP needed to reach `level`; `xp_threshold_for_level(1) == 0`
pub fn xp_threshold_for_level(level: u32) -> u64 {
    (1..level.max(1)).fold(0u64, |total, l| total.saturating_add(cost_for_level(l)))
}

/// The highest level whose threshold does not exceed `xp`
///
/// Negative XP is treated as 0.
pub fn level_for_xp(xp: i64) -> u32 {
    let xp = clamp_xp(xp);
    let mut level = 1u32;
    let mut next_threshold = cost_for_level(1);

    while next_threshold <= xp && next_threshold != u64::MAX {
        level += 1;
        next_threshold = next_threshold.saturating_add(cost_for_level(level));
    }

    level
}

/// Progress of `xp` within its current level
pub fn xp_progress(xp: i64) -> XpProgress {
    let xp_total = clamp_xp(xp);
    let level = level_for_xp(xp);
    let floor = xp_threshold_for_level(level);
    let ceiling = xp_threshold_for_level(level + 1);

    let current_in_level = xp_total - floor;
    let needed_for_level = ceiling.saturating_sub(floor).max(1);
    let percentage = (100.0 * current_in_level as f64 / needed_for_level as f64).min(100.0);

    XpProgress {
        level,
        current_in_level,
        needed_for_level,
        percentage,
    }
}

fn clamp_xp(xp: i64) -> u64 {
    xp.max(0) as u64
}
