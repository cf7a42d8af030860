//! Domain primitives: UserId and calendar day keys.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Format of every persisted calendar-day key (`YYYY-MM-DD`).
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Identity of the user whose streak is being read or written.
///
/// Always trimmed and non-empty; a blank identity is treated as "signed out".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Get the user id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserIdParseError {
    #[error("user id is empty")]
    Empty,
    #[error("user id contains a path separator: {0}")]
    InvalidCharacter(String),
}

impl FromStr for UserId {
    type Err = UserIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(UserIdParseError::Empty);
        }
        // The id is used as a document key and as a URL path segment.
        if trimmed.contains('/') {
            return Err(UserIdParseError::InvalidCharacter(trimmed.to_string()));
        }
        Ok(UserId(trimmed.to_string()))
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Render a calendar date as a persisted day key.
pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

/// Parse a persisted day key back into a calendar date.
///
/// Only the zero-padded form written by [`day_key`] is accepted.
pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DAY_KEY_FORMAT)
        .ok()
        .filter(|date| day_key(*date) == key)
}
