use crate::domain::{DayCell, StreakSnapshot};
use crate::engine::Milestone;
use chrono::NaiveDate;
use serde::Serialize;

/// Headline numbers shown next to the day window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakSummary {
    pub current_streak: u32,
    pub longest_streak: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<Milestone>,
}

impl StreakSummary {
    /// Summary of a snapshot; a user without one shows zero streaks.
    pub fn from_snapshot(snapshot: Option<&StreakSnapshot>) -> Self {
        match snapshot {
            Some(s) => Self {
                current_streak: s.current_streak,
                longest_streak: s.longest_streak,
                last_active_date: Some(s.last_active_date),
                milestone: Milestone::for_streak(s.current_streak),
            },
            None => Self {
                current_streak: 0,
                longest_streak: 0,
                last_active_date: None,
                milestone: None,
            },
        }
    }
}

/// Everything the presentation layer needs to draw the streak strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakView {
    pub summary: StreakSummary,
    pub days: Vec<DayCell>,
}
