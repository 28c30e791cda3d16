/// Progress tracking on top of storage
///
/// Daily completion totals, the global streak orchestrator, per-habit streak
/// lookups and XP rewards. Everything here talks to storage only through
/// `OrganizerStorage` and to the device through `FlagStore`.

pub mod daily;
pub mod habits;
pub mod orchestrator;
pub mod rewards;

pub use daily::{is_day_fully_complete, load_day_totals, DayTotals};
pub use habits::{habit_overview, habit_streak, HabitOverview};
pub use orchestrator::{evaluate_and_maybe_award_streak, StreakAction, StreakOrchestrator, StreakOutcome};
pub use rewards::award_xp;
