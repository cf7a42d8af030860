use super::StreakEngine;
use crate::domain::{DayCell, StreakSnapshot};
use chrono::{Duration, NaiveDate};

/// Window length shown by the presentation layer when none is requested.
pub const DEFAULT_WINDOW_DAYS: usize = 7;

/// Largest window accepted from configuration or callers.
pub const MAX_WINDOW_DAYS: usize = 366;

impl StreakEngine {
    /// Build the rolling window of `window_size` days ending at `today`, oldest first.
    ///
    /// A day is active when it is recorded in the snapshot's history, or when
    /// it lies within the trailing `current_streak` days counted back from
    /// `today`. History is authoritative; the streak only fills days the
    /// history has not recorded.
    pub fn derive_window(
        snapshot: Option<&StreakSnapshot>,
        today: NaiveDate,
        window_size: usize,
    ) -> Vec<DayCell> {
        (0..window_size)
            .rev()
            .map(|distance| {
                let date = today - Duration::days(distance as i64);
                DayCell {
                    date,
                    is_active: snapshot.is_some_and(|s| is_active(s, date, distance)),
                    is_today: distance == 0,
                    label: date.format("%a").to_string(),
                }
            })
            .collect()
    }
}

fn is_active(snapshot: &StreakSnapshot, date: NaiveDate, distance: usize) -> bool {
    if snapshot.was_recorded_on(date) {
        return true;
    }
    distance < snapshot.current_streak as usize
}
