//! Streak snapshot: the validated in-memory state and its persisted record shape.

use super::primitives::{day_key, parse_day_key};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Complete streak state for one user.
///
/// Values of this type always satisfy `longest_streak >= current_streak`;
/// records read from storage go through [`StreakSnapshot::from_record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakSnapshot {
    /// Consecutive days of recorded activity ending at `last_active_date`.
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Most recent day with recorded activity.
    pub last_active_date: NaiveDate,
    /// Every day with recorded activity. Only ever grows.
    pub history: BTreeSet<NaiveDate>,
}

impl StreakSnapshot {
    /// Snapshot for a user's very first recorded day.
    pub fn first_day(today: NaiveDate) -> Self {
        Self {
            current_streak: 1,
            longest_streak: 1,
            last_active_date: today,
            history: BTreeSet::from([today]),
        }
    }

    pub fn was_recorded_on(&self, date: NaiveDate) -> bool {
        self.history.contains(&date)
    }

    pub fn to_record(&self) -> StreakRecord {
        StreakRecord::from(self)
    }
}

/// Persisted document shape of a snapshot.
///
/// Counters stay signed and dates stay strings so that a damaged document can
/// still be decoded and then rejected with a precise [`CorruptSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakRecord {
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_active_date: String,
    #[serde(default)]
    pub history: BTreeMap<String, bool>,
}

/// A stored record that violates a snapshot invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorruptSnapshot {
    #[error("{field} is negative: {value}")]
    NegativeCounter { field: &'static str, value: i64 },
    #[error("{field} is out of range: {value}")]
    CounterOutOfRange { field: &'static str, value: i64 },
    #[error("longestStreak ({longest}) is below currentStreak ({current})")]
    LongestBelowCurrent { current: u32, longest: u32 },
    #[error("lastActiveDate is not a date: {0}")]
    InvalidLastActiveDate(String),
    #[error("history key is not a date: {0}")]
    InvalidHistoryKey(String),
    #[error("history entry {0} is not marked active")]
    InactiveHistoryEntry(String),
}

fn counter(field: &'static str, value: i64) -> Result<u32, CorruptSnapshot> {
    if value < 0 {
        return Err(CorruptSnapshot::NegativeCounter { field, value });
    }
    u32::try_from(value).map_err(|_| CorruptSnapshot::CounterOutOfRange { field, value })
}

/// Accepts `YYYY-MM-DD`, or a full RFC 3339 timestamp as written by older
/// clients. Those recorded the activity instant, so the day is the one the
/// instant falls on at the user's local `offset`.
fn parse_last_active_date(raw: &str, offset: FixedOffset) -> Result<NaiveDate, CorruptSnapshot> {
    parse_day_key(raw)
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|ts| ts.with_timezone(&offset).date_naive())
        })
        .ok_or_else(|| CorruptSnapshot::InvalidLastActiveDate(raw.to_string()))
}

impl StreakSnapshot {
    /// Validate a stored record. `offset` is the user's current UTC offset,
    /// used only to place legacy timestamp dates on a local calendar day.
    pub fn from_record(record: StreakRecord, offset: FixedOffset) -> Result<Self, CorruptSnapshot> {
        let current_streak = counter("currentStreak", record.current_streak)?;
        let longest_streak = counter("longestStreak", record.longest_streak)?;
        if longest_streak < current_streak {
            return Err(CorruptSnapshot::LongestBelowCurrent {
                current: current_streak,
                longest: longest_streak,
            });
        }

        let last_active_date = parse_last_active_date(&record.last_active_date, offset)?;

        let mut history = BTreeSet::new();
        for (key, active) in record.history {
            let date = match parse_day_key(&key) {
                Some(date) => date,
                None => return Err(CorruptSnapshot::InvalidHistoryKey(key)),
            };
            if !active {
                return Err(CorruptSnapshot::InactiveHistoryEntry(key));
            }
            history.insert(date);
        }

        Ok(Self {
            current_streak,
            longest_streak,
            last_active_date,
            history,
        })
    }
}

impl From<&StreakSnapshot> for StreakRecord {
    fn from(snapshot: &StreakSnapshot) -> Self {
        Self {
            current_streak: i64::from(snapshot.current_streak),
            longest_streak: i64::from(snapshot.longest_streak),
            last_active_date: day_key(snapshot.last_active_date),
            history: snapshot
                .history
                .iter()
                .map(|date| (day_key(*date), true))
                .collect(),
        }
    }
}
