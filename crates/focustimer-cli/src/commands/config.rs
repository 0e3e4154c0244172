//! `focustimer config`: ambient options stored in `config.toml`.
//!
//! Timer preferences are user settings and live under `focustimer settings`.

use clap::Subcommand;
use focustimer_core::AppConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one option by dot-path key (e.g. "logging.filter")
    Get { key: String },
    /// Change one option and write it to config.toml
    Set { key: String, value: String },
    /// Print every option as JSON
    List,
    /// Print the location of config.toml
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Path => println!("{}", AppConfig::path()?.display()),
        ConfigAction::Get { key } => println!("{}", AppConfig::load()?.get(&key)?),
        ConfigAction::Set { key, value } => {
            let mut config = AppConfig::load()?;
            config.set(&key, &value)?;
            tracing::info!(%key, "config option updated");
            println!("{}", config.get(&key)?);
        }
        ConfigAction::List => {
            println!("{}", serde_json::to_string_pretty(&AppConfig::load()?)?);
        }
    }
    Ok(())
}
