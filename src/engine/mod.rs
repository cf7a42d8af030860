//! Pure computation engine for streak state.
//!
//! Nothing in here performs I/O or reads the wall clock directly; every
//! function takes the calendar date it should reason about.

pub mod milestone;
pub mod streak;
pub mod window;

pub use milestone::{Milestone, MONTH_THRESHOLD, WEEK_THRESHOLD};
pub use window::{DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS};

use crate::domain::StreakSnapshot;
use serde::Serialize;

/// Stateless streak computations.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreakEngine;

/// What recording a day's activity did to the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Transition {
    /// No prior snapshot; the streak begins at one.
    Started,
    /// Activity on the day after the last active day.
    Extended,
    /// A gap (or a date before the last active day) restarted the streak.
    Reset,
    /// Activity was already recorded for this day.
    Unchanged,
}

/// Result of [`StreakEngine::record_activity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakUpdate {
    pub snapshot: StreakSnapshot,
    pub transition: Transition,
}

impl StreakUpdate {
    /// Whether the snapshot differs from the input and must be persisted.
    pub fn is_changed(&self) -> bool {
        self.transition != Transition::Unchanged
    }
}
