use chrono::NaiveDate;
use serde::Serialize;

/// One calendar day of the rolling display window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub date: NaiveDate,
    pub is_active: bool,
    pub is_today: bool,
    /// Short weekday name, e.g. "Mon".
    pub label: String,
}

/// Visual state of a cell. The current day wins over the active flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CellState {
    Active,
    Inactive,
    CurrentDay,
}

impl DayCell {
    pub fn state(&self) -> CellState {
        if self.is_today {
            CellState::CurrentDay
        } else if self.is_active {
            CellState::Active
        } else {
            CellState::Inactive
        }
    }
}
