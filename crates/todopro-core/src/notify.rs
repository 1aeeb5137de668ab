//! "Interval finished" notification seam.
//!
//! The controller calls the notifier when a countdown runs out. A notifier
//! that fails is logged and otherwise ignored; it never affects timer state.

use std::io::Write;

use thiserror::Error;

use crate::timer::Mode;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("notification output failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("notifier unavailable: {0}")]
    Unavailable(String),
}

pub trait Notifier {
    fn interval_finished(&self, finished: Mode) -> Result<(), NotifyError>;
}

/// Drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn interval_finished(&self, _finished: Mode) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Writes a line to stderr, optionally preceded by the terminal bell.
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    bell: bool,
}

impl TerminalNotifier {
    pub fn new(bell: bool) -> Self {
        Self { bell }
    }
}

impl Notifier for TerminalNotifier {
    fn interval_finished(&self, finished: Mode) -> Result<(), NotifyError> {
        let mut err = std::io::stderr().lock();
        if self.bell {
            err.write_all(b"\x07")?;
        }
        let message = match finished {
            Mode::Focus => "Focus interval finished, time for a break.",
            Mode::Break => "Break finished, back to focus.",
        };
        writeln!(err, "{message}")?;
        err.flush()?;
        Ok(())
    }
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn interval_finished(&self, finished: Mode) -> Result<(), NotifyError> {
        (**self).interval_finished(finished)
    }
}
