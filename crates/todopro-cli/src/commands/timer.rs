use std::io::Write;

use chrono::Utc;
use clap::Subcommand;
use tokio::io::{AsyncBufReadExt, BufReader};
use todopro_core::timer::Durations;
use todopro_core::{format_clock, progress_pct, Command, Event, Phase, TimerDriver, TimerState};

use crate::context::TimerContext;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the countdown, opening a focus session when in focus mode
    Start,
    /// Pause the countdown
    Pause,
    /// Resume a paused countdown
    Resume,
    /// Stop, return to an idle focus interval, and discard the open session
    Reset,
    /// Finish the focus interval early and switch to a break
    SkipBreak,
    /// Switch to a fresh focus interval without opening a session
    SkipFocus,
    /// Print current timer state as JSON
    Status,
    /// Advance the countdown by whole seconds
    Tick {
        #[arg(long, short = 'n', default_value = "1")]
        count: u32,
    },
    /// Run the countdown in the foreground, reading commands from stdin
    Run {
        /// Start the timer immediately
        #[arg(long)]
        start: bool,
    },
}

fn print_json(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = TimerContext::open()?;
    for event in ctx.catch_up(Utc::now()) {
        print_json(&event)?;
    }

    let controller = &mut ctx.controller;
    let event = match action {
        TimerAction::Start => controller.start(),
        TimerAction::Pause => controller.pause(),
        TimerAction::Resume => controller.resume(),
        TimerAction::Reset => controller.reset(),
        TimerAction::SkipBreak => controller.skip_to_break(),
        TimerAction::SkipFocus => controller.skip_to_focus(),
        TimerAction::Status => {
            print_json(&controller.snapshot())?;
            ctx.save()?;
            return Ok(());
        }
        TimerAction::Tick { count } => {
            for _ in 0..count {
                for event in ctx.policy.tick(&mut ctx.controller) {
                    print_json(&event)?;
                }
            }
            print_json(&ctx.controller.snapshot())?;
            ctx.save()?;
            return Ok(());
        }
        TimerAction::Run { start } => return run_foreground(ctx, start),
    };

    match event {
        Some(event) => print_json(&event)?,
        None => print_json(&ctx.controller.snapshot())?,
    }
    ctx.rearm();
    ctx.save()?;
    Ok(())
}

enum Input {
    State(bool),
    Event(Event),
    Line(std::io::Result<Option<String>>),
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim() {
        "s" | "start" => Some(Command::Start),
        "p" | "pause" => Some(Command::Pause),
        "r" | "resume" => Some(Command::Resume),
        "b" | "break" => Some(Command::SkipToBreak),
        "f" | "focus" => Some(Command::SkipToFocus),
        "x" | "reset" => Some(Command::Reset),
        "q" | "quit" => Some(Command::Shutdown),
        _ => None,
    }
}

/// One-line notice for a finished interval; other events stay quiet.
fn completion_line(event: &Event) -> Option<String> {
    match event {
        Event::IntervalCompleted { finished, next, .. } => {
            Some(format!("{finished} interval complete, {next} next"))
        }
        _ => None,
    }
}

fn render(state: &TimerState, durations: Durations) {
    let phase = match state.phase() {
        Phase::Idle => "idle",
        Phase::Running => "running",
        Phase::Paused => "paused",
    };
    print!(
        "\r{:<5} {} {:<7} {:>3.0}%   ",
        state.mode,
        format_clock(state.time_remaining_secs),
        phase,
        progress_pct(state, durations)
    );
    let _ = std::io::stdout().flush();
}

fn run_foreground(ctx: TimerContext, start: bool) -> Result<(), Box<dyn std::error::Error>> {
    let durations = ctx.controller.durations();
    let (controller, policy) = ctx.into_parts();
    let (driver, mut handle) = TimerDriver::new(controller, policy);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let controller = runtime.block_on(async move {
        let host = async move {
            eprintln!("commands: s start, p pause, r resume, b break, f focus, x reset, q quit");
            if start {
                handle.send(Command::Start).await;
            }
            let initial = handle.state.borrow().clone();
            render(&initial, durations);

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                let input = tokio::select! {
                    changed = handle.state.changed() => Input::State(changed.is_ok()),
                    Some(event) = handle.events.recv() => Input::Event(event),
                    line = lines.next_line() => Input::Line(line),
                };

                match input {
                    Input::State(false) => break,
                    Input::State(true) => {
                        let state = handle.state.borrow_and_update().clone();
                        render(&state, durations);
                    }
                    Input::Event(event) => {
                        tracing::debug!(?event, "timer event");
                        if let Some(line) = completion_line(&event) {
                            eprintln!("\n{line}");
                        }
                    }
                    Input::Line(Ok(Some(line))) => match parse_command(&line) {
                        Some(command) => {
                            if !handle.send(command).await || command == Command::Shutdown {
                                break;
                            }
                        }
                        None => eprintln!("unknown command: {}", line.trim()),
                    },
                    // stdin closed or unreadable
                    Input::Line(_) => {
                        handle.send(Command::Shutdown).await;
                        break;
                    }
                }
            }
            println!();
        };

        let (controller, ()) = tokio::join!(driver.run(), host);
        controller
    });
    // Don't wait on a pending stdin read.
    runtime.shutdown_background();

    let ctx = TimerContext::from_parts(controller, policy);
    ctx.save()?;
    Ok(())
}
