use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Mode, Phase};

/// Every state change the controller makes produces an Event.
/// Hosts print them, render them, or ignore them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: Mode,
        remaining_secs: u64,
        /// Set when this start opened a new focus session.
        session_id: Option<String>,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        /// The in-flight session that was discarded, if any.
        discarded_session_id: Option<String>,
        at: DateTime<Utc>,
    },
    SkippedToBreak {
        /// The session completed by the skip, if any.
        completed_session_id: Option<String>,
        elapsed_secs: Option<u64>,
        at: DateTime<Utc>,
    },
    SkippedToFocus {
        at: DateTime<Utc>,
    },
    IntervalCompleted {
        finished: Mode,
        next: Mode,
        completed_session_id: Option<String>,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: Mode,
        phase: Phase,
        remaining_secs: u64,
        total_secs: u64,
        progress_pct: f64,
        current_session_id: Option<String>,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The interval that ran out, for `IntervalCompleted`.
    pub fn finished_mode(&self) -> Option<Mode> {
        match self {
            Event::IntervalCompleted { finished, .. } => Some(*finished),
            _ => None,
        }
    }
}
