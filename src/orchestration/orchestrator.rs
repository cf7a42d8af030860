use super::view::{StreakSummary, StreakView};
use crate::clock::ActivityClock;
use crate::config::Config;
use crate::domain::{StreakSnapshot, UserId};
use crate::engine::{StreakEngine, Transition, MAX_WINDOW_DAYS};
use crate::store::{StoreError, StreakStore};
use chrono::{FixedOffset, NaiveDate};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// One app-activity event reported by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityEvent {
    /// How long the user was active, when the client measured it.
    pub active_for: Option<Duration>,
}

impl ActivityEvent {
    /// App came to the foreground; always qualifies.
    pub fn foreground() -> Self {
        Self { active_for: None }
    }

    pub fn session(active_for: Duration) -> Self {
        Self {
            active_for: Some(active_for),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded {
        transition: Transition,
        summary: StreakSummary,
    },
    /// The session was too short to count; the store was not touched.
    BelowThreshold,
    /// The local date could not be resolved; the store was not touched.
    Skipped,
}

#[derive(Debug, Error)]
pub enum StreakError {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("window of {requested} days is outside 1..={max}")]
    InvalidWindow { requested: usize, max: usize },
}

impl From<StoreError> for StreakError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotAuthenticated => StreakError::NotAuthenticated,
            StoreError::StorageUnavailable(msg) => StreakError::StorageUnavailable(msg),
            corrupt @ StoreError::Corrupt { .. } => {
                StreakError::StorageUnavailable(corrupt.to_string())
            }
        }
    }
}

/// Drives the read, compute, write cycle around a [`StreakStore`].
///
/// The cycle is not transactional. Two sessions of the same user racing it
/// can lose one update (last write wins); activity is recorded a few times a
/// day at most, so no locking is attempted.
#[derive(Clone)]
pub struct StreakOrchestrator {
    store: Arc<dyn StreakStore>,
    clock: Arc<dyn ActivityClock>,
    min_activity: Duration,
    window_days: usize,
}

impl StreakOrchestrator {
    pub fn new(store: Arc<dyn StreakStore>, clock: Arc<dyn ActivityClock>, config: &Config) -> Self {
        Self {
            store,
            clock,
            min_activity: Duration::from_secs(config.min_activity_secs),
            window_days: config.window_days,
        }
    }

    /// Record a qualifying activity for `identity` on the clock's current day.
    ///
    /// Safe to call repeatedly: after the first recorded event of a day the
    /// stored snapshot is left untouched. Store failures are returned to the
    /// caller, who may retry on the next event.
    pub async fn record_activity(
        &self,
        identity: Option<&UserId>,
        event: ActivityEvent,
    ) -> Result<RecordOutcome, StreakError> {
        let user = identity.ok_or(StreakError::NotAuthenticated)?;

        if let Some(active_for) = event.active_for {
            if active_for < self.min_activity {
                debug!(
                    user = %user,
                    active_secs = active_for.as_secs(),
                    "Session below activity threshold, not recording"
                );
                return Ok(RecordOutcome::BelowThreshold);
            }
        }

        let Some((today, offset)) = self.local_day() else {
            return Ok(RecordOutcome::Skipped);
        };
        let previous = self.load(user, offset).await?;
        let update = StreakEngine::record_activity(previous.as_ref(), today);

        if update.is_changed() {
            self.store
                .put_snapshot(user, &update.snapshot.to_record())
                .await?;
            info!(
                user = %user,
                transition = ?update.transition,
                current_streak = update.snapshot.current_streak,
                longest_streak = update.snapshot.longest_streak,
                "Recorded streak activity"
            );
        } else {
            debug!(user = %user, %today, "Activity already recorded today");
        }

        Ok(RecordOutcome::Recorded {
            transition: update.transition,
            summary: StreakSummary::from_snapshot(Some(&update.snapshot)),
        })
    }

    /// Stored streak numbers without recording anything.
    ///
    /// Without a local date there is nothing to show and an empty summary is
    /// returned.
    pub async fn summary(&self, identity: Option<&UserId>) -> Result<StreakSummary, StreakError> {
        let user = identity.ok_or(StreakError::NotAuthenticated)?;
        let Some((_, offset)) = self.local_day() else {
            return Ok(StreakSummary::from_snapshot(None));
        };
        let snapshot = self.load(user, offset).await?;
        Ok(StreakSummary::from_snapshot(snapshot.as_ref()))
    }

    /// Summary plus a rolling window of `window_days` (or the configured default).
    ///
    /// Without a local date the window cannot be placed; the view is empty.
    pub async fn view(
        &self,
        identity: Option<&UserId>,
        window_days: Option<usize>,
    ) -> Result<StreakView, StreakError> {
        let user = identity.ok_or(StreakError::NotAuthenticated)?;
        let window_days = window_days.unwrap_or(self.window_days);
        if window_days == 0 || window_days > MAX_WINDOW_DAYS {
            return Err(StreakError::InvalidWindow {
                requested: window_days,
                max: MAX_WINDOW_DAYS,
            });
        }

        let Some((today, offset)) = self.local_day() else {
            return Ok(StreakView {
                summary: StreakSummary::from_snapshot(None),
                days: Vec::new(),
            });
        };
        let snapshot = self.load(user, offset).await?;
        Ok(StreakView {
            summary: StreakSummary::from_snapshot(snapshot.as_ref()),
            days: StreakEngine::derive_window(snapshot.as_ref(), today, window_days),
        })
    }

    /// The signed-in identity changed; rebuild the view for the new one.
    ///
    /// Returns `None` when nobody is signed in.
    pub async fn on_identity_changed(
        &self,
        identity: Option<&UserId>,
    ) -> Result<Option<StreakView>, StreakError> {
        match identity {
            Some(user) => {
                info!(user = %user, "Identity changed, reloading streak");
                self.view(Some(user), None).await.map(Some)
            }
            None => {
                info!("Signed out, dropping streak view");
                Ok(None)
            }
        }
    }

    /// Local date and UTC offset, or `None` (logged) when the clock fails.
    fn local_day(&self) -> Option<(NaiveDate, FixedOffset)> {
        match self.clock.today().and_then(|today| Ok((today, self.clock.offset()?))) {
            Ok(local) => Some(local),
            Err(e) => {
                warn!(error = %e, "Cannot resolve local date, skipping streak operation");
                None
            }
        }
    }

    /// Read and validate the stored snapshot. Unreadable or invariant-breaking
    /// documents are discarded so the streak restarts from scratch.
    async fn load(
        &self,
        user: &UserId,
        offset: FixedOffset,
    ) -> Result<Option<StreakSnapshot>, StreakError> {
        let record = match self.store.get_snapshot(user).await {
            Ok(record) => record,
            Err(StoreError::Corrupt { reason, .. }) => {
                warn!(user = %user, reason = %reason, "Discarding unreadable streak document");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match record
            .map(|r| StreakSnapshot::from_record(r, offset))
            .transpose()
        {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                warn!(user = %user, error = %e, "Discarding corrupt streak snapshot");
                Ok(None)
            }
        }
    }
}
