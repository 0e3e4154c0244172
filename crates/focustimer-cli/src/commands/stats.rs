use std::path::PathBuf;

use clap::Subcommand;
use focustimer_core::stats::format_minutes;
use serde::Serialize;

use super::open_app;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Totals, streaks and the weekly history
    Show,
    /// Achievement catalog with unlock state
    Achievements,
    /// Export statistics as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Import statistics from an exported JSON file
    Import {
        /// Path to the exported file
        file: PathBuf,
    },
    /// Reset the current streak
    BreakStreak,
}

#[derive(Serialize)]
struct Summary<'a> {
    #[serde(flatten)]
    stats: &'a focustimer_core::Stats,
    focus_time: String,
    average_session_minutes: u64,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open_app()?;

    match action {
        StatsAction::Show => {
            let stats = app.stats();
            let summary = Summary {
                stats,
                focus_time: format_minutes(stats.total_focus_time),
                average_session_minutes: stats.average_session_minutes(),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        StatsAction::Achievements => {
            let status = app.stats_engine().achievement_status();
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        StatsAction::Export { output } => {
            let json = app.export_stats()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    eprintln!("exported to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        StatsAction::Import { file } => {
            let text = std::fs::read_to_string(&file)?;
            app.import_stats(&text)?;
            println!("{}", app.export_stats()?);
        }
        StatsAction::BreakStreak => {
            app.break_streak();
            println!("{}", app.export_stats()?);
        }
    }
    Ok(())
}
