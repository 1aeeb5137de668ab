mod controller;
mod driver;
mod policy;
mod state;
mod transition;

pub use controller::FocusController;
pub use driver::{Command, DriverHandle, TimerDriver};
pub use policy::AutoStartPolicy;
pub use state::{Durations, Mode, Phase, TimerState};
pub use transition::{transition, Effect, SessionSeed, TimerEvent, Transition};
