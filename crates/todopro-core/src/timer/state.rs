use serde::{Deserialize, Serialize};

/// Which half of the pomodoro cycle the countdown belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Focus,
    Break,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Focus => Mode::Break,
            Mode::Break => Mode::Focus,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Focus => f.pad("focus"),
            Mode::Break => f.pad("break"),
        }
    }
}

/// Run state derived from the `is_active` / `is_paused` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Paused,
}

/// Configured interval lengths, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durations {
    pub focus_secs: u64,
    pub break_secs: u64,
}

impl Durations {
    pub fn for_mode(&self, mode: Mode) -> u64 {
        match mode {
            Mode::Focus => self.focus_secs,
            Mode::Break => self.break_secs,
        }
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            focus_secs: 25 * 60,
            break_secs: 5 * 60,
        }
    }
}

/// The countdown state owned by a [`FocusController`](super::FocusController).
///
/// `is_paused` only carries meaning while `is_active`; an idle timer is never
/// paused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub mode: Mode,
    pub is_active: bool,
    pub is_paused: bool,
    pub time_remaining_secs: u64,
    /// The in-flight focus session, if one was opened by `start`.
    #[serde(default)]
    pub current_session_id: Option<String>,
}

impl TimerState {
    /// Idle in focus mode with a full focus countdown.
    pub fn new(durations: Durations) -> Self {
        Self {
            mode: Mode::Focus,
            is_active: false,
            is_paused: false,
            time_remaining_secs: durations.focus_secs,
            current_session_id: None,
        }
    }

    pub fn phase(&self) -> Phase {
        match (self.is_active, self.is_paused) {
            (false, _) => Phase::Idle,
            (true, true) => Phase::Paused,
            (true, false) => Phase::Running,
        }
    }

    /// Whether the one-second tick should be scheduled.
    pub fn is_ticking(&self) -> bool {
        self.is_active && !self.is_paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_idle_focus() {
        let state = TimerState::new(Durations::default());
        assert_eq!(state.mode, Mode::Focus);
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.time_remaining_secs, 1500);
        assert!(!state.is_ticking());
    }

    #[test]
    fn phase_ignores_pause_flag_when_inactive() {
        let mut state = TimerState::new(Durations::default());
        state.is_paused = true;
        assert_eq!(state.phase(), Phase::Idle);
        state.is_active = true;
        assert_eq!(state.phase(), Phase::Paused);
        state.is_paused = false;
        assert_eq!(state.phase(), Phase::Running);
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Break).unwrap(), "\"break\"");
        assert_eq!(Mode::Focus.toggled(), Mode::Break);
    }
}
