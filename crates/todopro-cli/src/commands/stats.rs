use chrono::Utc;
use serde::Serialize;
use todopro_core::{format_clock, format_duration, FocusStats};

use crate::context::TimerContext;

#[derive(Serialize)]
struct StatsReport {
    #[serde(flatten)]
    stats: FocusStats,
    progress_pct: f64,
}

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = TimerContext::open()?;
    // Let a countdown that finished while nothing was running count.
    ctx.catch_up(Utc::now());

    let controller = &ctx.controller;
    let report = StatsReport {
        stats: controller.stats(),
        progress_pct: controller.progress_pct(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let state = controller.state();
        println!("Today:      {} sessions", report.stats.today_completed);
        println!("Total:      {} sessions", report.stats.total_completed);
        println!(
            "Focus time: {}",
            format_duration(report.stats.total_focus_time_secs)
        );
        println!(
            "Current:    {} {} ({:.0}%)",
            state.mode,
            format_clock(state.time_remaining_secs),
            report.progress_pct
        );
    }

    ctx.save()?;
    Ok(())
}
