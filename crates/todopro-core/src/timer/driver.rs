//! Async tick driver.
//!
//! Owns a [`FocusController`] on a single task and feeds it one tick per
//! second of wall-clock time, but only while the timer is running: the
//! interval is created on entering Running, re-created after every command
//! that changes the state, and dropped on leaving Running. Commands arrive over an mpsc channel;
//! every state change is published on a watch channel and every event on an
//! unbounded mpsc channel.
//!
//! Nothing here needs `Send`: run the driver future on a current-thread
//! runtime alongside whatever feeds it commands.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use super::controller::FocusController;
use super::policy::AutoStartPolicy;
use super::state::TimerState;
use crate::events::Event;
use crate::notify::Notifier;
use crate::session::SessionSlot;

const TICK: Duration = Duration::from_secs(1);
const COMMAND_BUFFER: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Resume,
    Reset,
    SkipToBreak,
    SkipToFocus,
    /// Stop the driver and hand the controller back.
    Shutdown,
}

/// The host's end of a running [`TimerDriver`].
pub struct DriverHandle {
    pub commands: mpsc::Sender<Command>,
    pub state: watch::Receiver<TimerState>,
    pub events: mpsc::UnboundedReceiver<Event>,
}

impl DriverHandle {
    /// Queue a command. Returns `false` once the driver has stopped.
    pub async fn send(&self, command: Command) -> bool {
        self.commands.send(command).await.is_ok()
    }
}

pub struct TimerDriver<S, N> {
    controller: FocusController<S, N>,
    policy: AutoStartPolicy,
    commands: mpsc::Receiver<Command>,
    state_tx: watch::Sender<TimerState>,
    events_tx: mpsc::UnboundedSender<Event>,
}

enum Step {
    Tick,
    Command(Option<Command>),
}

impl<S: SessionSlot, N: Notifier> TimerDriver<S, N> {
    pub fn new(controller: FocusController<S, N>, policy: AutoStartPolicy) -> (Self, DriverHandle) {
        let (commands_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (state_tx, state) = watch::channel(controller.state().clone());
        let (events_tx, events) = mpsc::unbounded_channel();
        let driver = Self {
            controller,
            policy,
            commands,
            state_tx,
            events_tx,
        };
        let handle = DriverHandle {
            commands: commands_tx,
            state,
            events,
        };
        (driver, handle)
    }

    /// Drive the controller until shutdown or until every command sender is
    /// gone, then return it.
    pub async fn run(mut self) -> FocusController<S, N> {
        let mut ticker = self.arm();

        loop {
            let step = tokio::select! {
                _ = next_tick(&mut ticker) => Step::Tick,
                command = self.commands.recv() => Step::Command(command),
            };

            match step {
                Step::Tick => {
                    let events = self.policy.tick(&mut self.controller);
                    self.publish(events);
                    if !self.controller.state().is_ticking() {
                        tracing::debug!("timer stopped, suspending tick");
                        ticker = None;
                    }
                }
                Step::Command(None) | Step::Command(Some(Command::Shutdown)) => break,
                Step::Command(Some(command)) => {
                    let before = self.controller.state().clone();
                    let event = self.handle(command);
                    self.publish(event);
                    // A no-op command keeps the running interval's phase.
                    if *self.controller.state() != before {
                        ticker = self.arm();
                    }
                }
            }
        }

        tracing::debug!("timer driver shut down");
        self.controller
    }

    fn handle(&mut self, command: Command) -> Option<Event> {
        tracing::debug!(?command, "timer command");
        match command {
            Command::Start => self.controller.start(),
            Command::Pause => self.controller.pause(),
            Command::Resume => self.controller.resume(),
            Command::Reset => self.controller.reset(),
            Command::SkipToBreak => self.controller.skip_to_break(),
            Command::SkipToFocus => self.controller.skip_to_focus(),
            Command::Shutdown => None,
        }
    }

    /// A fresh one-second interval if the timer is running, else none.
    fn arm(&self) -> Option<Interval> {
        if !self.controller.state().is_ticking() {
            return None;
        }
        let mut interval = time::interval_at(Instant::now() + TICK, TICK);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Some(interval)
    }

    fn publish(&self, events: impl IntoIterator<Item = Event>) {
        self.state_tx.send_replace(self.controller.state().clone());
        for event in events {
            // The host may have stopped listening; the timer carries on.
            let _ = self.events_tx.send(event);
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
