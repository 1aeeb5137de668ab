//! Loading and saving the timer between CLI invocations.
//!
//! Each invocation restores the controller from the database, applies the
//! ticks that fell due while no process was running, handles its command,
//! and saves the state back together with a tick anchor: the wall-clock
//! instant of the last tick boundary while the timer runs.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use todopro_core::{
    AutoStartPolicy, Config, Database, Event, FocusController, Notifier, NullNotifier,
    SessionStore, TerminalNotifier, TimerState,
};

pub type Controller = FocusController<Database, Box<dyn Notifier>>;

const TIMER_KEY: &str = "timer_state";
/// Longer gaps than this are not replayed tick by tick.
const MAX_CATCH_UP_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct SavedTimer {
    state: TimerState,
    #[serde(default)]
    tick_anchor: Option<DateTime<Utc>>,
}

pub struct TimerContext {
    pub controller: Controller,
    pub policy: AutoStartPolicy,
    tick_anchor: Option<DateTime<Utc>>,
}

fn notifier_for(config: &Config) -> Box<dyn Notifier> {
    if config.notifications.enabled {
        Box::new(TerminalNotifier::new(config.notifications.bell))
    } else {
        Box::new(NullNotifier)
    }
}

fn load_saved(db: &Database) -> Option<SavedTimer> {
    let json = match db.kv_get(TIMER_KEY) {
        Ok(json) => json?,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read saved timer");
            return None;
        }
    };
    match serde_json::from_str(&json) {
        Ok(saved) => Some(saved),
        Err(e) => {
            tracing::warn!(error = %e, "saved timer is corrupt, starting idle");
            None
        }
    }
}

impl TimerContext {
    /// Restore the timer from the default database and config.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::load(Config::load(), Database::open()?))
    }

    /// Restore the timer saved in `db`.
    ///
    /// A missing or unreadable snapshot restores an idle timer, which still
    /// reconciles the store: incomplete sessions left behind are discarded.
    pub fn load(config: Config, db: Database) -> Self {
        let saved = load_saved(&db);
        let store = SessionStore::open(db);
        let notifier = notifier_for(&config);
        let policy = AutoStartPolicy::from_settings(&config.focus);

        let (state, tick_anchor) = match saved {
            Some(saved) => (saved.state, saved.tick_anchor),
            None => (TimerState::new(config.focus.durations()), None),
        };
        let controller = FocusController::restore(state, config.focus, store, notifier);
        let tick_anchor = if controller.state().is_ticking() {
            tick_anchor.or_else(|| Some(Utc::now()))
        } else {
            None
        };

        Self {
            controller,
            policy,
            tick_anchor,
        }
    }

    /// Apply one tick per whole second elapsed since the anchor.
    ///
    /// Each replayed tick carries its own wall-clock time. Only the most
    /// recent [`MAX_CATCH_UP_SECS`] of a longer gap are replayed.
    pub fn catch_up(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let Some(anchor) = self.tick_anchor else {
            return Vec::new();
        };
        let elapsed = (now - anchor).num_seconds().max(0);
        let (from, due) = if elapsed > MAX_CATCH_UP_SECS {
            (now - Duration::seconds(MAX_CATCH_UP_SECS), MAX_CATCH_UP_SECS)
        } else {
            (anchor, elapsed)
        };

        let mut events = Vec::new();
        let mut applied = 0;
        while applied < due && self.controller.state().is_ticking() {
            applied += 1;
            let at = from + Duration::seconds(applied);
            events.extend(self.policy.tick_at(&mut self.controller, at));
        }
        tracing::debug!(applied, elapsed, "caught up timer");

        self.tick_anchor = self
            .controller
            .state()
            .is_ticking()
            .then(|| from + Duration::seconds(due));
        events
    }

    /// Re-anchor after a control command, the way a live host re-arms its
    /// interval.
    pub fn rearm(&mut self) {
        self.tick_anchor = self.controller.state().is_ticking().then(Utc::now);
    }

    /// Persist the timer state. Sessions are already persisted by the store.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let saved = SavedTimer {
            state: self.controller.state().clone(),
            tick_anchor: self.tick_anchor,
        };
        let json = serde_json::to_string(&saved)?;
        self.controller.store().slot().kv_set(TIMER_KEY, &json)?;
        Ok(())
    }

    /// Hand the controller to a live driver.
    pub fn into_parts(self) -> (Controller, AutoStartPolicy) {
        (self.controller, self.policy)
    }

    /// Take the controller back from a live driver.
    pub fn from_parts(controller: Controller, policy: AutoStartPolicy) -> Self {
        let mut ctx = Self {
            controller,
            policy,
            tick_anchor: None,
        };
        ctx.rearm();
        ctx
    }
}
