//! Domain types for the streak service.
//!
//! This module provides:
//! - `UserId` and the `YYYY-MM-DD` day-key helpers
//! - `StreakSnapshot` (validated state) and `StreakRecord` (persisted shape)
//! - `DayCell`, the ephemeral unit of the rolling display window

pub mod day_cell;
pub mod primitives;
pub mod snapshot;

pub use day_cell::{CellState, DayCell};
pub use primitives::{day_key, parse_day_key, UserId, UserIdParseError, DAY_KEY_FORMAT};
pub use snapshot::{CorruptSnapshot, StreakRecord, StreakSnapshot};
