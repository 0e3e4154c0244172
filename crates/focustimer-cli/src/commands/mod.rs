pub mod config;
pub mod settings;
pub mod stats;
pub mod task;
pub mod timer;

use std::rc::Rc;

use focustimer_core::{AppConfig, FocusApp, Notifier, SqliteStore, SystemClock};

use crate::notifier::TerminalNotifier;

/// Open the application against the configured database.
pub fn open_app_with<N: Notifier>(
    config: &AppConfig,
    notifier: N,
) -> Result<FocusApp<N>, Box<dyn std::error::Error>> {
    let path = config.database_path()?;
    let store = SqliteStore::open_at(&path)?;
    tracing::debug!(path = %path.display(), "database opened");
    Ok(FocusApp::new(Rc::new(store), Rc::new(SystemClock), notifier))
}

pub fn open_app() -> Result<FocusApp<TerminalNotifier>, Box<dyn std::error::Error>> {
    let config = AppConfig::load_or_default();
    open_app_with(&config, TerminalNotifier::new())
}
