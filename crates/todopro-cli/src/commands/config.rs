use clap::Subcommand;
use todopro_core::Config;

use crate::context::TimerContext;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "focus.focus_time", "notifications.bell")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

/// Push new focus settings into the saved timer so an idle countdown
/// shows the new length right away.
fn apply_to_timer(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = TimerContext::open()?;
    ctx.controller.set_settings(config.focus.clone())?;
    ctx.policy = todopro_core::AutoStartPolicy::from_settings(&config.focus);
    ctx.save()?;
    Ok(())
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load();
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load();
            config.set(&key, &value)?;
            config.save()?;
            apply_to_timer(&config)?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = Config::load();
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            apply_to_timer(&config)?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
