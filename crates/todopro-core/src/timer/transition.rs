//! Pure state-transition function for the focus timer.
//!
//! Every command and the one-second tick go through [`transition`], which
//! maps the current state plus an event onto the next state and the side
//! effects the owner has to carry out. Nothing here touches storage, clocks
//! or the notifier.
//!
//! ```text
//!   Idle(focus) --start--> Running(focus) --pause--> Paused(focus)
//!        ^                   |      ^                     |
//!        |                   |      +-------resume--------+
//!      reset            tick at 1s / skip_to_break
//!        |                   v
//!   (any state)         Running(break) --tick at 1s--> Running(focus, no session)
//! ```

use chrono::{DateTime, Utc};

use super::state::{Durations, Mode, TimerState};
use crate::session::{FocusSession, SessionPatch};

/// Identity of the session `Start` opens, when it opens one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSeed {
    pub id: String,
    pub started_at: DateTime<Utc>,
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    Tick,
    Start(SessionSeed),
    Pause,
    Resume,
    Reset,
    SkipToBreak,
    SkipToFocus,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CreateSession(FocusSession),
    UpdateSession { id: String, patch: SessionPatch },
    DeleteSession(String),
    /// The interval in `finished` ran out.
    Notify { finished: Mode },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: TimerState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged(state: &TimerState) -> Self {
        Self {
            state: state.clone(),
            effects: Vec::new(),
        }
    }
}

pub fn transition(state: &TimerState, durations: Durations, event: TimerEvent) -> Transition {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match event {
        TimerEvent::Tick => {
            if !state.is_ticking() {
                return Transition::unchanged(state);
            }
            if state.time_remaining_secs > 1 {
                next.time_remaining_secs -= 1;
            } else {
                effects.push(Effect::Notify {
                    finished: state.mode,
                });
                if state.mode == Mode::Focus {
                    // Ran to the end: credit the full nominal duration.
                    if let Some(id) = next.current_session_id.take() {
                        effects.push(Effect::UpdateSession {
                            id,
                            patch: SessionPatch::complete(durations.focus_secs),
                        });
                    }
                }
                next.mode = state.mode.toggled();
                next.time_remaining_secs = durations.for_mode(next.mode);
            }
        }
        TimerEvent::Start(seed) => {
            if state.mode == Mode::Focus && state.current_session_id.is_none() {
                let session = FocusSession::open(seed.id, seed.started_at);
                next.current_session_id = Some(session.id.clone());
                effects.push(Effect::CreateSession(session));
            }
            next.is_active = true;
            next.is_paused = false;
        }
        TimerEvent::Pause => {
            if !state.is_active {
                return Transition::unchanged(state);
            }
            next.is_paused = true;
        }
        TimerEvent::Resume => {
            next.is_paused = false;
        }
        TimerEvent::Reset => {
            next.is_active = false;
            next.is_paused = false;
            next.mode = Mode::Focus;
            next.time_remaining_secs = durations.focus_secs;
            if let Some(id) = next.current_session_id.take() {
                effects.push(Effect::DeleteSession(id));
            }
        }
        TimerEvent::SkipToBreak => {
            if state.mode == Mode::Focus {
                // Stopped early: credit only what actually elapsed.
                if let Some(id) = next.current_session_id.take() {
                    let elapsed = durations
                        .focus_secs
                        .saturating_sub(state.time_remaining_secs);
                    effects.push(Effect::UpdateSession {
                        id,
                        patch: SessionPatch::complete(elapsed),
                    });
                }
            }
            next.mode = Mode::Break;
            next.time_remaining_secs = durations.break_secs;
        }
        TimerEvent::SkipToFocus => {
            next.mode = Mode::Focus;
            next.time_remaining_secs = durations.focus_secs;
        }
    }

    Transition {
        state: next,
        effects,
    }
}
