//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Focus and break lengths, long-break options and auto-start flags
//! - Notification preferences
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result, ValidationError};
use crate::timer::Durations;

/// User-tunable timer settings. Durations are in minutes.
///
/// Only `focus_time` and `break_time` drive the controller; the long-break
/// options and auto-start flags are carried for the host to act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_focus_time")]
    pub focus_time: u32,
    #[serde(default = "default_break_time")]
    pub break_time: u32,
    #[serde(default = "default_long_break_time")]
    pub long_break_time: u32,
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
    #[serde(default = "default_true")]
    pub auto_start_breaks: bool,
    #[serde(default)]
    pub auto_start_pomodoros: bool,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Ring the terminal bell along with the message.
    #[serde(default = "default_true")]
    pub bell: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub focus: Settings,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

const FOCUS_TIME_RANGE: RangeInclusive<u32> = 5..=60;
const BREAK_TIME_RANGE: RangeInclusive<u32> = 1..=15;
const LONG_BREAK_TIME_RANGE: RangeInclusive<u32> = 5..=30;
const LONG_BREAK_INTERVAL_RANGE: RangeInclusive<u32> = 1..=10;
/// Focus and long-break lengths move in 5-minute steps.
const MINUTE_STEP: u32 = 5;

// Default functions
fn default_focus_time() -> u32 {
    25
}
fn default_break_time() -> u32 {
    5
}
fn default_long_break_time() -> u32 {
    15
}
fn default_long_break_interval() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_time: default_focus_time(),
            break_time: default_break_time(),
            long_break_time: default_long_break_time(),
            long_break_interval: default_long_break_interval(),
            auto_start_breaks: true,
            auto_start_pomodoros: false,
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bell: true,
        }
    }
}

impl Settings {
    /// Interval lengths in seconds, as consumed by the controller.
    pub fn durations(&self) -> Durations {
        Durations {
            focus_secs: u64::from(self.focus_time) * 60,
            break_secs: u64::from(self.break_time) * 60,
        }
    }

    pub fn long_break_secs(&self) -> u64 {
        u64::from(self.long_break_time) * 60
    }

    /// Check every field against the ranges the settings dialog allows.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("focus_time", self.focus_time, FOCUS_TIME_RANGE)?;
        check_range("break_time", self.break_time, BREAK_TIME_RANGE)?;
        check_range("long_break_time", self.long_break_time, LONG_BREAK_TIME_RANGE)?;
        check_range(
            "long_break_interval",
            self.long_break_interval,
            LONG_BREAK_INTERVAL_RANGE,
        )?;
        check_step("focus_time", self.focus_time, MINUTE_STEP)?;
        check_step("long_break_time", self.long_break_time, MINUTE_STEP)?;
        Ok(())
    }
}

fn check_step(field: &str, value: u32, step: u32) -> Result<(), ValidationError> {
    if value % step == 0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.into(),
            message: format!("{value} is not a multiple of {step} minutes"),
        })
    }
}

fn check_range(
    field: &str,
    value: u32,
    range: RangeInclusive<u32>,
) -> Result<(), ValidationError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.into(),
            message: format!(
                "{value} is outside {}..={}",
                range.start(),
                range.end()
            ),
        })
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(format!("cannot parse '{value}' as bool: {e}")))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|e| invalid(format!("cannot parse '{value}' as number: {e}")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot replace a whole section".into()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location, `<data_dir>/config.toml`.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, returning default on error.
    /// This never fails; problems are logged.
    pub fn load() -> Self {
        match Self::path() {
            Ok(path) => Self::load_from(&path).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to load config, using defaults");
                Self::default()
            }),
            Err(e) => {
                tracing::warn!(error = %e, "no data directory, using default config");
                Self::default()
            }
        }
    }

    /// Load from `path`, writing the defaults there if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed or fails
    /// validation, or if the default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.focus.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        tracing::debug!(path = %path.display(), "saved config");
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting settings are out of range. `self` is untouched on
    /// error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.focus.validate()?;
        *self = updated;
        Ok(())
    }
}
