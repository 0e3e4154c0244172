use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use focustimer_core::{AppConfig, Event, FocusApp, TimerState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use super::open_app_with;
use crate::notifier::TerminalNotifier;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the timer in the foreground (keys: s start/resume, p pause,
    /// r reset, k skip, q quit; each followed by Enter)
    Run {
        /// Stop after this many completed sessions
        #[arg(long)]
        sessions: Option<u32>,
    },
    /// Print the initial session as JSON
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Start,
    Pause,
    Reset,
    Skip,
    Quit,
}

impl Key {
    fn parse(line: &str) -> Option<Self> {
        match line.trim().chars().next()?.to_ascii_lowercase() {
            's' => Some(Key::Start),
            'p' => Some(Key::Pause),
            'r' => Some(Key::Reset),
            'k' => Some(Key::Skip),
            'q' => Some(Key::Quit),
            _ => None,
        }
    }
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_or_default();
    let mut app = open_app_with(&config, TerminalNotifier::new())?;

    match action {
        TimerAction::Run { sessions } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()?;
            runtime.block_on(run_loop(&mut app, sessions, config.cli.pump_interval_ms))?;
        }
        TimerAction::Info => {
            println!("{}", serde_json::to_string_pretty(&app.timer().info())?);
        }
    }
    Ok(())
}

async fn run_loop(
    app: &mut FocusApp<TerminalNotifier>,
    sessions: Option<u32>,
    pump_interval_ms: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ticker = tokio::time::interval(Duration::from_millis(pump_interval_ms.max(10)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut completed = 0u32;
    let mut last_status = String::new();

    eprintln!("keys: s start/resume, p pause, r reset, k skip, q quit");
    print_status(app, &mut last_status)?;

    loop {
        let events = tokio::select! {
            _ = ticker.tick() => app.pump(),
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => match Key::parse(&line) {
                    Some(Key::Quit) => break,
                    Some(key) => apply_key(app, key),
                    None => {
                        eprintln!("unknown key: {}", line.trim());
                        Vec::new()
                    }
                },
                None => {
                    stdin_open = false;
                    Vec::new()
                }
            },
        };

        app.notifier().pulse(app.timer().time_left_secs());
        completed += events
            .iter()
            .filter(|e| matches!(e, Event::SessionCompleted { .. }))
            .count() as u32;
        print_status(app, &mut last_status)?;

        if sessions.is_some_and(|limit| completed >= limit) {
            break;
        }
        if !stdin_open && is_quiescent(app) {
            break;
        }
    }

    println!();
    tracing::debug!(completed, "timer loop finished");
    Ok(())
}

fn apply_key(app: &mut FocusApp<TerminalNotifier>, key: Key) -> Vec<Event> {
    match key {
        Key::Start => app.start(),
        Key::Pause => app.pause(),
        Key::Reset => app.reset(),
        Key::Skip => app.skip(),
        Key::Quit => Vec::new(),
    }
}

/// Nothing is running and nothing is scheduled.
fn is_quiescent(app: &FocusApp<TerminalNotifier>) -> bool {
    app.timer().state() != TimerState::Running && app.timer().next_deadline_ms().is_none()
}

fn print_status(
    app: &FocusApp<TerminalNotifier>,
    last: &mut String,
) -> Result<(), Box<dyn std::error::Error>> {
    let info = app.timer().info();
    let status = format!(
        "{} {} [{:?}] #{}",
        info.label, info.clock, info.state, info.completed_focus_count
    );
    if status != *last {
        let mut out = std::io::stdout();
        write!(out, "\r{status}    ")?;
        out.flush()?;
        *last = status;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_parse_case_insensitively() {
        assert_eq!(Key::parse("s"), Some(Key::Start));
        assert_eq!(Key::parse("  P\n"), Some(Key::Pause));
        assert_eq!(Key::parse("reset"), Some(Key::Reset));
        assert_eq!(Key::parse("k"), Some(Key::Skip));
        assert_eq!(Key::parse("Q"), Some(Key::Quit));
        assert_eq!(Key::parse("x"), None);
        assert_eq!(Key::parse(""), None);
    }
}
