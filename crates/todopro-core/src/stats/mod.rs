//! Focus statistics derived from the session store.
//!
//! Everything here is a pure function of the session list (and the timer
//! state, for progress); callers recompute whenever they need fresh numbers.

mod format;

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::session::FocusSession;
use crate::timer::{Durations, TimerState};

pub use format::{format_clock, format_duration};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusStats {
    /// Completed sessions started on the current local calendar day.
    pub today_completed: u64,
    pub total_completed: u64,
    /// Sum of `elapsed_seconds` over completed sessions.
    pub total_focus_time_secs: u64,
}

impl FocusStats {
    /// Stats relative to the local wall clock.
    pub fn compute(sessions: &[FocusSession]) -> Self {
        Self::compute_at(sessions, &Local::now())
    }

    /// Stats with "today" taken as the calendar day of `now` in its own zone.
    pub fn compute_at<Tz: TimeZone>(sessions: &[FocusSession], now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();

        sessions
            .iter()
            .filter(|s| s.completed)
            .fold(Self::default(), |mut acc, s| {
                acc.total_completed += 1;
                acc.total_focus_time_secs += s.elapsed_seconds;
                if s.started_at.with_timezone(&tz).date_naive() == today {
                    acc.today_completed += 1;
                }
                acc
            })
    }
}

/// 0.0 .. 100.0 progress through the current interval.
pub fn progress_pct(state: &TimerState, durations: Durations) -> f64 {
    let total = durations.for_mode(state.mode);
    if total == 0 {
        return 0.0;
    }
    let elapsed = total.saturating_sub(state.time_remaining_secs);
    (elapsed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::Mode;
    use chrono::{Duration, FixedOffset, Utc};

    fn completed(started_at: DateTime<Utc>, elapsed: u64) -> FocusSession {
        FocusSession {
            id: uuid::Uuid::new_v4().to_string(),
            started_at,
            elapsed_seconds: elapsed,
            completed: true,
        }
    }

    #[test]
    fn empty_sessions_give_zero_stats() {
        assert_eq!(FocusStats::compute(&[]), FocusStats::default());
    }

    #[test]
    fn incomplete_sessions_are_ignored() {
        let mut open = completed(Utc::now(), 0);
        open.completed = false;
        let stats = FocusStats::compute(&[open, completed(Utc::now(), 1500)]);
        assert_eq!(stats.total_completed, 1);
        assert_eq!(stats.total_focus_time_secs, 1500);
    }

    #[test]
    fn today_uses_the_zone_of_now() {
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        // 2026-03-10 23:30 in +09:00
        let now = tz.with_ymd_and_hms(2026, 3, 10, 23, 30, 0).unwrap();
        // 2026-03-10 00:10 local, which is still 2026-03-09 in UTC
        let early_today = tz
            .with_ymd_and_hms(2026, 3, 10, 0, 10, 0)
            .unwrap()
            .with_timezone(&Utc);
        let yesterday = early_today - Duration::minutes(20);

        let sessions = [completed(early_today, 600), completed(yesterday, 900)];
        let stats = FocusStats::compute_at(&sessions, &now);
        assert_eq!(stats.today_completed, 1);
        assert_eq!(stats.total_completed, 2);
        assert_eq!(stats.total_focus_time_secs, 1500);
    }

    #[test]
    fn progress_tracks_current_mode() {
        let durations = Durations {
            focus_secs: 1500,
            break_secs: 300,
        };
        let mut state = TimerState::new(durations);
        assert_eq!(progress_pct(&state, durations), 0.0);

        state.time_remaining_secs = 750;
        assert_eq!(progress_pct(&state, durations), 50.0);

        state.mode = Mode::Break;
        state.time_remaining_secs = 75;
        assert_eq!(progress_pct(&state, durations), 75.0);
    }

    #[test]
    fn progress_with_zero_duration_is_zero() {
        let durations = Durations {
            focus_secs: 0,
            break_secs: 0,
        };
        let state = TimerState::new(durations);
        assert_eq!(progress_pct(&state, durations), 0.0);
    }
}
