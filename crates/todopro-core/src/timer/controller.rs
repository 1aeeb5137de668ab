//! The focus timer controller.
//!
//! Owns the [`TimerState`], the settings, the session store and the notifier.
//! Each command runs the pure [`transition`] function, swaps in the new state
//! and then carries out the requested effects. Effects are best effort: a
//! failed store write or notification is logged and the new state stands.
//!
//! ## Usage
//!
//! ```ignore
//! let store = SessionStore::open(Database::open()?);
//! let mut timer = FocusController::new(Settings::default(), store, NullNotifier);
//! timer.start();
//! // Once per second while running:
//! timer.tick(); // Returns Some(Event) when an interval finishes
//! ```

use chrono::{DateTime, TimeZone, Utc};

use super::state::{Durations, Mode, TimerState};
use super::transition::{transition, Effect, SessionSeed, TimerEvent};
use crate::error::ValidationError;
use crate::events::Event;
use crate::notify::Notifier;
use crate::session::{FocusSession, SessionSlot, SessionStore};
use crate::stats::{self, FocusStats};
use crate::storage::Settings;

pub struct FocusController<S, N> {
    state: TimerState,
    settings: Settings,
    store: SessionStore<S>,
    notifier: N,
}

impl<S: SessionSlot, N: Notifier> FocusController<S, N> {
    /// Idle in focus mode with a full focus countdown.
    pub fn new(settings: Settings, store: SessionStore<S>, notifier: N) -> Self {
        let state = TimerState::new(settings.durations());
        Self {
            state,
            settings,
            store,
            notifier,
        }
    }

    /// Resume from a previously saved state.
    ///
    /// The state is reconciled with the settings and the store: the countdown
    /// is clamped to the configured duration (an idle timer is reloaded), a
    /// current session missing from the store is forgotten, and incomplete
    /// sessions other than the current one are deleted.
    pub fn restore(
        mut state: TimerState,
        settings: Settings,
        mut store: SessionStore<S>,
        notifier: N,
    ) -> Self {
        let total = settings.durations().for_mode(state.mode);
        if state.is_active {
            state.time_remaining_secs = state.time_remaining_secs.clamp(1, total.max(1));
        } else {
            // An idle timer always shows a full interval.
            state.is_paused = false;
            state.time_remaining_secs = total;
        }

        if let Some(id) = state.current_session_id.as_deref() {
            let usable = state.mode == Mode::Focus
                && state.is_active
                && store.get(id).is_some_and(|s| !s.completed);
            if !usable {
                tracing::warn!(id, "dropping stale current session reference");
                state.current_session_id = None;
            }
        }

        let orphans: Vec<String> = store
            .list_all()
            .iter()
            .filter(|s| !s.completed && state.current_session_id.as_deref() != Some(s.id.as_str()))
            .map(|s| s.id.clone())
            .collect();
        for id in orphans {
            tracing::warn!(id = %id, "discarding orphaned focus session");
            if let Err(e) = store.delete(&id) {
                tracing::warn!(error = %e, "failed to persist session cleanup");
            }
        }

        Self {
            state,
            settings,
            store,
            notifier,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn durations(&self) -> Durations {
        self.settings.durations()
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    pub fn sessions(&self) -> &[FocusSession] {
        self.store.list_all()
    }

    pub fn stats(&self) -> FocusStats {
        FocusStats::compute(self.sessions())
    }

    pub fn stats_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> FocusStats {
        FocusStats::compute_at(self.sessions(), now)
    }

    /// 0.0 .. 100.0 progress within the current interval.
    pub fn progress_pct(&self) -> f64 {
        stats::progress_pct(&self.state, self.durations())
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.state.mode,
            phase: self.state.phase(),
            remaining_secs: self.state.time_remaining_secs,
            total_secs: self.durations().for_mode(self.state.mode),
            progress_pct: self.progress_pct(),
            current_session_id: self.state.current_session_id.clone(),
            at: Utc::now(),
        }
    }

    /// Replace the settings.
    ///
    /// An idle timer reloads its countdown from the new durations right
    /// away; an active one keeps counting, clamped to the new length.
    pub fn set_settings(&mut self, settings: Settings) -> Result<(), ValidationError> {
        settings.validate()?;
        let total = settings.durations().for_mode(self.state.mode);
        self.state.time_remaining_secs = if self.state.is_active {
            self.state.time_remaining_secs.min(total)
        } else {
            total
        };
        self.settings = settings;
        Ok(())
    }

    pub fn into_parts(self) -> (TimerState, SessionStore<S>, N) {
        (self.state, self.store, self.notifier)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.start_at(Utc::now())
    }

    /// [`start`](Self::start) with an explicit clock reading, used when
    /// replaying ticks that fell due in the past. A session opened here is
    /// stamped `started_at = now`.
    pub fn start_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let seed = SessionSeed {
            id: uuid::Uuid::new_v4().to_string(),
            started_at: now,
        };
        let (changed, effects) = self.dispatch(TimerEvent::Start(seed));
        if !changed {
            return None;
        }
        let session_id = effects.iter().find_map(|e| match e {
            Effect::CreateSession(s) => Some(s.id.clone()),
            _ => None,
        });
        Some(Event::TimerStarted {
            mode: self.state.mode,
            remaining_secs: self.state.time_remaining_secs,
            session_id,
            at: now,
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        let (changed, _) = self.dispatch(TimerEvent::Pause);
        changed.then(|| Event::TimerPaused {
            remaining_secs: self.state.time_remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        let (changed, _) = self.dispatch(TimerEvent::Resume);
        changed.then(|| Event::TimerResumed {
            remaining_secs: self.state.time_remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn reset(&mut self) -> Option<Event> {
        let (_, effects) = self.dispatch(TimerEvent::Reset);
        let discarded_session_id = effects.into_iter().find_map(|e| match e {
            Effect::DeleteSession(id) => Some(id),
            _ => None,
        });
        Some(Event::TimerReset {
            discarded_session_id,
            at: Utc::now(),
        })
    }

    pub fn skip_to_break(&mut self) -> Option<Event> {
        let (_, effects) = self.dispatch(TimerEvent::SkipToBreak);
        let completed = effects.into_iter().find_map(|e| match e {
            Effect::UpdateSession { id, patch } => Some((id, patch.elapsed_seconds)),
            _ => None,
        });
        let (completed_session_id, elapsed_secs) = match completed {
            Some((id, elapsed)) => (Some(id), elapsed),
            None => (None, None),
        };
        Some(Event::SkippedToBreak {
            completed_session_id,
            elapsed_secs,
            at: Utc::now(),
        })
    }

    pub fn skip_to_focus(&mut self) -> Option<Event> {
        self.dispatch(TimerEvent::SkipToFocus);
        Some(Event::SkippedToFocus { at: Utc::now() })
    }

    /// Advance the countdown by one second.
    ///
    /// Returns `Some(Event::IntervalCompleted)` when the interval finishes.
    pub fn tick(&mut self) -> Option<Event> {
        let finished = self.state.mode;
        let (_, effects) = self.dispatch(TimerEvent::Tick);
        let mut notified = false;
        let mut completed_session_id = None;
        for effect in effects {
            match effect {
                Effect::Notify { .. } => notified = true,
                Effect::UpdateSession { id, .. } => completed_session_id = Some(id),
                _ => {}
            }
        }
        notified.then(|| Event::IntervalCompleted {
            finished,
            next: self.state.mode,
            completed_session_id,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Run one transition, returning whether the state changed and the
    /// effects that were applied.
    fn dispatch(&mut self, event: TimerEvent) -> (bool, Vec<Effect>) {
        let durations = self.durations();
        let next = transition(&self.state, durations, event);
        let changed = next.state != self.state;
        if changed {
            tracing::debug!(from = ?self.state, to = ?next.state, "timer transition");
        }
        self.state = next.state;
        for effect in &next.effects {
            self.apply(effect);
        }
        (changed, next.effects)
    }

    fn apply(&mut self, effect: &Effect) {
        match effect {
            Effect::CreateSession(session) => {
                if let Err(e) = self.store.create(session.clone()) {
                    tracing::warn!(error = %e, id = %session.id, "failed to persist new session");
                }
            }
            Effect::UpdateSession { id, patch } => match self.store.update(id, *patch) {
                Ok(true) => {}
                Ok(false) => tracing::warn!(id = %id, "completed session not found in store"),
                Err(e) => tracing::warn!(error = %e, id = %id, "failed to persist session update"),
            },
            Effect::DeleteSession(id) => {
                if let Err(e) = self.store.delete(id) {
                    tracing::warn!(error = %e, id = %id, "failed to persist session removal");
                }
            }
            Effect::Notify { finished } => {
                if let Err(e) = self.notifier.interval_finished(*finished) {
                    tracing::warn!(error = %e, "interval notification failed");
                }
            }
        }
    }
}
