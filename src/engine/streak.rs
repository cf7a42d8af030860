use super::{StreakEngine, StreakUpdate, Transition};
use crate::clock::{ActivityClock, ClockError};
use crate::domain::StreakSnapshot;
use chrono::NaiveDate;

impl StreakEngine {
    /// Apply one day's activity to a snapshot.
    ///
    /// Repeating the call for the same `today` returns the input unchanged.
    /// A `today` earlier than the last active day (clock skew) is treated as
    /// a gap and restarts the streak.
    pub fn record_activity(previous: Option<&StreakSnapshot>, today: NaiveDate) -> StreakUpdate {
        let previous = match previous {
            Some(p) => p,
            None => {
                return StreakUpdate {
                    snapshot: StreakSnapshot::first_day(today),
                    transition: Transition::Started,
                }
            }
        };

        let days_since_last = (today - previous.last_active_date).num_days();
        let (current_streak, transition) = match days_since_last {
            0 => {
                return StreakUpdate {
                    snapshot: previous.clone(),
                    transition: Transition::Unchanged,
                }
            }
            1 => (
                previous.current_streak.saturating_add(1),
                Transition::Extended,
            ),
            _ => (1, Transition::Reset),
        };

        let mut history = previous.history.clone();
        history.insert(today);

        StreakUpdate {
            snapshot: StreakSnapshot {
                current_streak,
                longest_streak: previous.longest_streak.max(current_streak),
                last_active_date: today,
                history,
            },
            transition,
        }
    }

    /// Apply activity for the clock's current local date.
    pub fn record_activity_at(
        previous: Option<&StreakSnapshot>,
        clock: &dyn ActivityClock,
    ) -> Result<StreakUpdate, ClockError> {
        let today = clock.today()?;
        Ok(Self::record_activity(previous, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::domain::parse_day_key;
    use std::collections::BTreeSet;

    fn date(s: &str) -> NaiveDate {
        parse_day_key(s).unwrap()
    }

    fn snapshot(current: u32, longest: u32, last: &str) -> StreakSnapshot {
        StreakSnapshot {
            current_streak: current,
            longest_streak: longest,
            last_active_date: date(last),
            history: BTreeSet::from([date(last)]),
        }
    }

    #[test]
    fn test_new_user_starts_streak() {
        let update = StreakEngine::record_activity(None, date("2024-01-01"));
        assert_eq!(update.transition, Transition::Started);
        assert!(update.is_changed());

        let s = update.snapshot;
        assert_eq!(s.current_streak, 1);
        assert_eq!(s.longest_streak, 1);
        assert_eq!(s.last_active_date, date("2024-01-01"));
        assert_eq!(s.history, BTreeSet::from([date("2024-01-01")]));
    }

    #[test]
    fn test_same_day_is_noop() {
        let first = StreakEngine::record_activity(None, date("2024-01-01")).snapshot;
        let second = StreakEngine::record_activity(Some(&first), date("2024-01-01"));
        assert_eq!(second.transition, Transition::Unchanged);
        assert!(!second.is_changed());
        assert_eq!(second.snapshot, first);

        let third = StreakEngine::record_activity(Some(&second.snapshot), date("2024-01-01"));
        assert_eq!(third.snapshot, second.snapshot);
    }

    #[test]
    fn test_consecutive_day_increments() {
        let prev = snapshot(3, 3, "2024-03-10");
        let update = StreakEngine::record_activity(Some(&prev), date("2024-03-11"));
        assert_eq!(update.transition, Transition::Extended);
        assert_eq!(update.snapshot.current_streak, 4);
        assert_eq!(update.snapshot.longest_streak, 4);
        assert_eq!(update.snapshot.last_active_date, date("2024-03-11"));
        assert!(update.snapshot.was_recorded_on(date("2024-03-10")));
        assert!(update.snapshot.was_recorded_on(date("2024-03-11")));
    }

    #[test]
    fn test_gap_resets_streak() {
        let prev = snapshot(5, 5, "2024-03-10");
        let update = StreakEngine::record_activity(Some(&prev), date("2024-03-13"));
        assert_eq!(update.transition, Transition::Reset);
        assert_eq!(update.snapshot.current_streak, 1);
        assert_eq!(update.snapshot.longest_streak, 5);
        assert_eq!(update.snapshot.last_active_date, date("2024-03-13"));
    }

    #[test]
    fn test_backwards_date_resets_streak() {
        let prev = snapshot(4, 6, "2024-03-10");
        let update = StreakEngine::record_activity(Some(&prev), date("2024-03-08"));
        assert_eq!(update.transition, Transition::Reset);
        assert_eq!(update.snapshot.current_streak, 1);
        assert_eq!(update.snapshot.longest_streak, 6);
        assert_eq!(update.snapshot.last_active_date, date("2024-03-08"));
        // History keeps the later day; it never shrinks.
        assert!(update.snapshot.was_recorded_on(date("2024-03-10")));
    }

    #[test]
    fn test_longest_unaffected_while_below() {
        let prev = snapshot(2, 5, "2024-01-05");
        let update = StreakEngine::record_activity(Some(&prev), date("2024-01-06"));
        assert_eq!(update.snapshot.current_streak, 3);
        assert_eq!(update.snapshot.longest_streak, 5);
        assert_eq!(update.snapshot.last_active_date, date("2024-01-06"));
    }

    #[test]
    fn test_month_and_year_boundaries_are_consecutive() {
        let prev = snapshot(1, 1, "2023-12-31");
        let update = StreakEngine::record_activity(Some(&prev), date("2024-01-01"));
        assert_eq!(update.transition, Transition::Extended);

        let prev = snapshot(1, 1, "2024-02-28");
        let update = StreakEngine::record_activity(Some(&prev), date("2024-02-29"));
        assert_eq!(update.transition, Transition::Extended);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let prev = snapshot(3, 3, "2024-03-10");
        let before = prev.clone();
        let _ = StreakEngine::record_activity(Some(&prev), date("2024-03-11"));
        assert_eq!(prev, before);
    }

    #[test]
    fn test_counter_saturates() {
        let prev = snapshot(u32::MAX, u32::MAX, "2024-03-10");
        let update = StreakEngine::record_activity(Some(&prev), date("2024-03-11"));
        assert_eq!(update.snapshot.current_streak, u32::MAX);
        assert_eq!(update.snapshot.longest_streak, u32::MAX);
    }

    #[test]
    fn test_longest_never_below_current_over_a_sequence() {
        let days = [
            "2024-01-01", "2024-01-02", "2024-01-02", "2024-01-03", "2024-01-07",
            "2024-01-08", "2023-12-30", "2023-12-31", "2024-01-01", "2024-01-02",
            "2024-01-03", "2024-01-04", "2024-01-05",
        ];
        let mut current: Option<StreakSnapshot> = None;
        for day in days {
            let update = StreakEngine::record_activity(current.as_ref(), date(day));
            assert!(update.snapshot.longest_streak >= update.snapshot.current_streak);
            assert_eq!(update.snapshot.last_active_date, date(day));
            current = Some(update.snapshot);
        }
        let last = current.unwrap();
        assert_eq!(last.current_streak, 7);
        assert_eq!(last.longest_streak, 7);
    }

    #[test]
    fn test_record_activity_at_uses_clock() {
        let clock = FixedClock::new(date("2024-01-01"));
        let update = StreakEngine::record_activity_at(None, &clock).unwrap();
        assert_eq!(update.snapshot.last_active_date, date("2024-01-01"));

        clock.advance_days(1);
        let update = StreakEngine::record_activity_at(Some(&update.snapshot), &clock).unwrap();
        assert_eq!(update.snapshot.current_streak, 2);
    }

    #[test]
    fn test_record_activity_at_propagates_clock_error() {
        let clock = FixedClock::unavailable();
        let result = StreakEngine::record_activity_at(None, &clock);
        assert!(matches!(result, Err(ClockError::Unavailable(_))));
    }
}
