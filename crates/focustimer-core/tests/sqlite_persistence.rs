//! Persistence across restarts with the SQLite store.

use std::rc::Rc;

use focustimer_core::notify::RecordingNotifier;
use focustimer_core::storage::{KvStore, SETTINGS_KEY};
use focustimer_core::{FocusApp, ManualClock, SqliteStore, Theme};
use tempfile::TempDir;

fn open(dir: &TempDir, clock: Rc<ManualClock>) -> FocusApp<RecordingNotifier> {
    let store = SqliteStore::open_at(&dir.path().join("focustimer.db")).unwrap();
    FocusApp::new(Rc::new(store), clock, RecordingNotifier::new())
}

#[test]
fn state_survives_restart() {
    let dir = TempDir::new().unwrap();
    let clock = Rc::new(ManualClock::new(1_700_000_000_000));

    {
        let mut app = open(&dir, clock.clone());
        app.set_setting("theme", "ocean").unwrap();
        app.set_setting("volume", "80").unwrap();
        app.add_task("ship release").unwrap();
        app.skip();
    }

    let app = open(&dir, clock);
    assert_eq!(app.settings().theme, Theme::Ocean);
    assert_eq!(app.settings().volume, 80);
    assert_eq!(app.stats().total_pomodoros, 1);
    assert_eq!(app.stats().skipped_sessions, 1);
    assert!(app.stats().achievements.contains("first_pomodoro"));
    assert_eq!(app.tasks().all().len(), 1);
    assert_eq!(app.tasks().all()[0].text, "ship release");
}

#[test]
fn partially_corrupt_settings_fall_back_per_field() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("focustimer.db");
    {
        let store = SqliteStore::open_at(&path).unwrap();
        store
            .set(
                SETTINGS_KEY,
                r#"{"focus_time": 40, "volume": "loud", "theme": "neon", "short_break": 0}"#,
            )
            .unwrap();
    }

    let app = open(&dir, Rc::new(ManualClock::new(0)));
    let settings = app.settings();
    assert_eq!(settings.focus_time, 40);
    assert_eq!(settings.volume, 50);
    assert_eq!(settings.theme, Theme::Classic);
    assert_eq!(settings.short_break, 1);
}
