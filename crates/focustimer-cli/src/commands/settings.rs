use clap::Subcommand;

use super::open_app;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Get a setting (e.g. "focus_time", "theme")
    Get {
        /// Setting name
        key: String,
    },
    /// Change a setting
    Set {
        /// Setting name
        key: String,
        /// New value
        value: String,
    },
    /// List all settings as JSON
    List,
    /// Restore the default settings
    Reset,
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open_app()?;

    match action {
        SettingsAction::Get { key } => match app.settings().get(&key) {
            Some(value) => println!("{value}"),
            None => {
                eprintln!("unknown key: {key}");
                std::process::exit(1);
            }
        },
        SettingsAction::Set { key, value } => {
            app.set_setting(&key, &value)?;
            println!("{}", serde_json::to_string_pretty(app.settings())?);
        }
        SettingsAction::List => {
            println!("{}", serde_json::to_string_pretty(app.settings())?);
        }
        SettingsAction::Reset => {
            app.reset_settings()?;
            println!("{}", serde_json::to_string_pretty(app.settings())?);
        }
    }
    Ok(())
}
