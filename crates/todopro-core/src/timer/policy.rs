//! Auto-start policy layered on top of the controller.
//!
//! The controller itself keeps running into the next interval when one
//! finishes. Hosts that honor the `auto_start_*` settings run each tick
//! through [`AutoStartPolicy::tick`], which issues the follow-up command
//! through the controller's public API.

use chrono::{DateTime, Utc};

use super::controller::FocusController;
use super::state::Mode;
use crate::events::Event;
use crate::notify::Notifier;
use crate::session::SessionSlot;
use crate::storage::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoStartPolicy {
    pub auto_start_breaks: bool,
    pub auto_start_pomodoros: bool,
}

impl AutoStartPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            auto_start_breaks: settings.auto_start_breaks,
            auto_start_pomodoros: settings.auto_start_pomodoros,
        }
    }

    /// Tick once and apply the policy if an interval finished.
    ///
    /// Returns the completion event followed by the follow-up command's
    /// event, or nothing for an ordinary tick.
    pub fn tick<S: SessionSlot, N: Notifier>(
        &self,
        controller: &mut FocusController<S, N>,
    ) -> Vec<Event> {
        self.tick_at(controller, Utc::now())
    }

    /// [`tick`](Self::tick) for the tick boundary at `now`. Replayed ticks
    /// pass their own boundary so auto-started sessions carry the time they
    /// would have started at.
    pub fn tick_at<S: SessionSlot, N: Notifier>(
        &self,
        controller: &mut FocusController<S, N>,
        now: DateTime<Utc>,
    ) -> Vec<Event> {
        let Some(completed) = controller.tick() else {
            return Vec::new();
        };
        let entered = controller.state().mode;
        let follow_up = self.after_completion(controller, entered, now);
        std::iter::once(completed).chain(follow_up).collect()
    }

    /// Apply the policy to a controller that just switched into `entered`.
    pub fn after_completion<S: SessionSlot, N: Notifier>(
        &self,
        controller: &mut FocusController<S, N>,
        entered: Mode,
        now: DateTime<Utc>,
    ) -> Option<Event> {
        match entered {
            Mode::Break if !self.auto_start_breaks => controller.pause(),
            Mode::Break => None,
            Mode::Focus if self.auto_start_pomodoros => controller.start_at(now),
            // Breaks never own a session, so this discards nothing.
            Mode::Focus => controller.reset(),
        }
    }
}

impl Default for AutoStartPolicy {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NullNotifier;
    use crate::session::{MemorySlot, SessionStore};
    use crate::timer::Phase;

    fn controller() -> FocusController<MemorySlot, NullNotifier> {
        FocusController::new(
            Settings::default(),
            SessionStore::open(MemorySlot::new()),
            NullNotifier,
        )
    }

    fn run(policy: AutoStartPolicy, c: &mut FocusController<MemorySlot, NullNotifier>, n: usize) {
        for _ in 0..n {
            policy.tick(c);
        }
    }

    #[test]
    fn defaults_continue_into_break_then_stop_before_focus() {
        let policy = AutoStartPolicy::default();
        let mut c = controller();
        c.start();

        run(policy, &mut c, 1500);
        assert_eq!(c.state().mode, Mode::Break);
        assert_eq!(c.state().phase(), Phase::Running);

        run(policy, &mut c, 300);
        assert_eq!(c.state().mode, Mode::Focus);
        assert_eq!(c.state().phase(), Phase::Idle);
        assert_eq!(c.state().time_remaining_secs, 1500);
        assert_eq!(c.sessions().len(), 1);
    }

    #[test]
    fn breaks_wait_when_not_auto_started() {
        let policy = AutoStartPolicy {
            auto_start_breaks: false,
            auto_start_pomodoros: false,
        };
        let mut c = controller();
        c.start();
        run(policy, &mut c, 1500);
        assert_eq!(c.state().mode, Mode::Break);
        assert_eq!(c.state().phase(), Phase::Paused);
        assert_eq!(c.state().time_remaining_secs, 300);
    }

    #[test]
    fn auto_started_pomodoro_opens_a_new_session() {
        let policy = AutoStartPolicy {
            auto_start_breaks: true,
            auto_start_pomodoros: true,
        };
        let mut c = controller();
        c.start();
        run(policy, &mut c, 1500 + 300);

        assert_eq!(c.state().mode, Mode::Focus);
        assert_eq!(c.state().phase(), Phase::Running);
        assert!(c.state().current_session_id.is_some());
        assert_eq!(c.sessions().len(), 2);
        assert_eq!(c.stats().total_completed, 1);
    }

    #[test]
    fn replayed_auto_start_uses_tick_time() {
        let policy = AutoStartPolicy {
            auto_start_breaks: true,
            auto_start_pomodoros: true,
        };
        let mut c = controller();
        c.start();
        let base = Utc::now() - chrono::Duration::days(2);
        for i in 1..=1800 {
            policy.tick_at(&mut c, base + chrono::Duration::seconds(i));
        }

        assert_eq!(c.sessions().len(), 2);
        assert_eq!(c.sessions()[1].started_at, base + chrono::Duration::seconds(1800));
    }

    #[test]
    fn tick_returns_completion_then_follow_up() {
        let policy = AutoStartPolicy {
            auto_start_breaks: false,
            auto_start_pomodoros: false,
        };
        let mut c = controller();
        c.start();
        run(policy, &mut c, 1499);
        let events = policy.tick(&mut c);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::IntervalCompleted { .. }));
        assert!(matches!(events[1], Event::TimerPaused { .. }));
    }
}
