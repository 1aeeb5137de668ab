//! # todopro Core Library
//!
//! The focus timer engine behind todopro: a pomodoro-style countdown that
//! alternates focus and break intervals, records completed focus sessions,
//! and derives productivity statistics from them.
//!
//! ## Architecture
//!
//! - **Timer**: a pure transition function plus a controller that owns the
//!   state and applies side effects. The caller drives `tick()` once per
//!   second, directly or through the async [`TimerDriver`]
//! - **Sessions**: an ordered session list mirrored into one storage slot
//! - **Stats**: today/total completed counts, focused time, progress
//! - **Storage**: SQLite key-value slots and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`FocusController`]: Core timer state machine
//! - [`SessionStore`]: Session persistence
//! - [`FocusStats`]: Aggregated statistics
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod notify;
pub mod session;
pub mod stats;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use notify::{Notifier, NotifyError, NullNotifier, TerminalNotifier};
pub use session::{FocusSession, MemorySlot, SessionPatch, SessionSlot, SessionStore};
pub use stats::{format_clock, format_duration, progress_pct, FocusStats};
pub use storage::{Config, Database, Settings};
pub use timer::{
    AutoStartPolicy, Command, FocusController, Mode, Phase, TimerDriver, TimerState,
};
