//! Activity clock: resolves "now" to the user's local calendar date.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("UTC offset of {0} minutes is not a valid timezone offset")]
    InvalidOffset(i32),
    #[error("local date is unavailable: {0}")]
    Unavailable(String),
}

/// Source of the current instant and its local calendar date.
pub trait ActivityClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current offset of the clock's local timezone from UTC.
    fn offset(&self) -> Result<FixedOffset, ClockError>;

    /// Calendar date of `now()` in the clock's local timezone.
    fn today(&self) -> Result<NaiveDate, ClockError> {
        Ok(self.now().with_timezone(&self.offset()?).date_naive())
    }
}

/// Wall clock of the host, optionally pinned to a fixed UTC offset.
#[derive(Debug, Clone, Default)]
pub struct SystemClock {
    offset_minutes: Option<i32>,
}

impl SystemClock {
    /// Use the host's local timezone.
    pub fn local() -> Self {
        Self {
            offset_minutes: None,
        }
    }

    /// Use a fixed offset east of UTC, in minutes (e.g. -300 for UTC-5).
    pub fn with_offset_minutes(offset_minutes: i32) -> Self {
        Self {
            offset_minutes: Some(offset_minutes),
        }
    }
}

impl ActivityClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn offset(&self) -> Result<FixedOffset, ClockError> {
        match self.offset_minutes {
            None => Ok(*Local::now().offset()),
            Some(minutes) => offset_from_minutes(minutes),
        }
    }
}

fn offset_from_minutes(minutes: i32) -> Result<FixedOffset, ClockError> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or(ClockError::InvalidOffset(minutes))
}

/// Manually driven clock for tests and simulations. Local time is UTC unless
/// an offset is given.
#[derive(Debug)]
pub struct FixedClock {
    today: Mutex<Option<NaiveDate>>,
    offset_minutes: i32,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(Some(today)),
            offset_minutes: 0,
        }
    }

    /// A clock whose local date cannot be resolved.
    pub fn unavailable() -> Self {
        Self {
            today: Mutex::new(None),
            offset_minutes: 0,
        }
    }

    /// Local timezone `offset_minutes` east of UTC (e.g. -300 for UTC-5).
    pub fn with_offset_minutes(mut self, offset_minutes: i32) -> Self {
        self.offset_minutes = offset_minutes;
        self
    }

    pub fn set(&self, today: NaiveDate) {
        *self.lock() = Some(today);
    }

    pub fn advance_days(&self, days: i64) {
        let mut guard = self.lock();
        *guard = guard.map(|d| d + chrono::Duration::days(days));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<NaiveDate>> {
        // A poisoned guard still holds a valid date.
        self.today.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ActivityClock for FixedClock {
    /// Local noon of the current day, as UTC.
    fn now(&self) -> DateTime<Utc> {
        match *self.lock() {
            Some(d) => {
                let noon = d.and_time(chrono::NaiveTime::MIN) + chrono::Duration::hours(12);
                noon.and_utc() - chrono::Duration::minutes(i64::from(self.offset_minutes))
            }
            None => DateTime::<Utc>::default(),
        }
    }

    fn offset(&self) -> Result<FixedOffset, ClockError> {
        if self.lock().is_none() {
            return Err(ClockError::Unavailable("clock has no date set".to_string()));
        }
        offset_from_minutes(self.offset_minutes)
    }

    fn today(&self) -> Result<NaiveDate, ClockError> {
        self.offset()?;
        self.lock()
            .ok_or_else(|| ClockError::Unavailable("clock has no date set".to_string()))
    }
}
