//! Application facade.
//!
//! [`FocusApp`] owns every component and is the single entry point the front
//! ends use. Each operation returns the events it produced after routing
//! them through [`notify::dispatch`].

use std::rc::Rc;

use crate::clock::Clock;
use crate::error::{ImportError, Result, ValidationError};
use crate::events::Event;
use crate::notify::{self, Notifier, Severity};
use crate::settings::{Settings, SettingsStore};
use crate::stats::{Stats, StatsEngine};
use crate::storage::KvStore;
use crate::tasks::TaskList;
use crate::timer::SessionTimer;

pub struct FocusApp<N: Notifier> {
    clock: Rc<dyn Clock>,
    notifier: N,
    settings: SettingsStore,
    stats: StatsEngine,
    timer: SessionTimer,
    tasks: TaskList,
}

impl<N: Notifier> FocusApp<N> {
    /// Load every persisted record from `store` and configure the notifier.
    pub fn new(store: Rc<dyn KvStore>, clock: Rc<dyn Clock>, notifier: N) -> Self {
        let settings = SettingsStore::load(store.clone());
        let stats = StatsEngine::load(store.clone(), clock.clone());
        let tasks = TaskList::load(store, clock.clone());
        let timer = SessionTimer::new(settings.settings(), clock.clone());
        let app = Self {
            clock,
            notifier,
            settings,
            stats,
            timer,
            tasks,
        };
        app.configure_notifier();
        tracing::debug!("application initialised");
        app
    }

    pub fn settings(&self) -> &Settings {
        self.settings.settings()
    }

    pub fn stats(&self) -> &Stats {
        self.stats.stats()
    }

    pub fn stats_engine(&self) -> &StatsEngine {
        &self.stats
    }

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    // ── Timer ────────────────────────────────────────────────────────

    pub fn start(&mut self) -> Vec<Event> {
        let events = self.timer.start();
        self.emit(events)
    }

    pub fn pause(&mut self) -> Vec<Event> {
        let events = self.timer.pause();
        self.emit(events)
    }

    pub fn reset(&mut self) -> Vec<Event> {
        let events = self.timer.reset(self.settings.settings());
        self.emit(events)
    }

    pub fn skip(&mut self) -> Vec<Event> {
        let events = self.timer.skip(self.settings.settings(), &mut self.stats);
        self.emit(events)
    }

    /// Drive scheduled work up to the clock's current instant.
    pub fn pump(&mut self) -> Vec<Event> {
        let events = self.timer.pump(self.settings.settings(), &mut self.stats);
        self.emit(events)
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn set_setting(&mut self, key: &str, value: &str) -> Result<Vec<Event>> {
        self.settings.set(key, value)?;
        Ok(self.reapply_settings())
    }

    pub fn save_settings(&mut self, settings: Settings) -> Result<Vec<Event>> {
        self.settings.save(settings)?;
        Ok(self.reapply_settings())
    }

    pub fn reset_settings(&mut self) -> Result<Vec<Event>> {
        self.settings.reset_to_defaults()?;
        Ok(self.reapply_settings())
    }

    fn reapply_settings(&mut self) -> Vec<Event> {
        let mut events = self.timer.apply_settings(self.settings.settings());
        self.configure_notifier();
        events.push(Event::SettingsSaved {
            at: self.clock.now(),
        });
        self.emit(events)
    }

    fn configure_notifier(&self) {
        let settings = self.settings.settings();
        self.notifier.set_volume(settings.volume);
        self.notifier.set_ticking_enabled(settings.ticking_sound);
        self.notifier
            .apply_theme(&settings.theme.class_token(), settings.theme.color());
    }

    // ── Statistics ───────────────────────────────────────────────────

    pub fn break_streak(&mut self) -> Vec<Event> {
        let events = self.stats.break_streak();
        self.emit(events)
    }

    pub fn export_stats(&self) -> Result<String> {
        self.stats.export_json()
    }

    /// Import a previously exported record. Failures are reported to the
    /// notifier and leave the current stats untouched.
    pub fn import_stats(&mut self, text: &str) -> std::result::Result<Vec<Event>, ImportError> {
        match self.stats.import_json(text) {
            Ok(unlocked) => {
                let mut events = vec![Event::StatsImported {
                    at: self.clock.now(),
                }];
                events.extend(self.timer.stagger(unlocked));
                Ok(self.emit(events))
            }
            Err(e) => {
                tracing::warn!(error = %e, "statistics import rejected");
                self.emit(vec![Event::StatsImportFailed {
                    reason: e.to_string(),
                    at: self.clock.now(),
                }]);
                Err(e)
            }
        }
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn add_task(&mut self, text: &str) -> std::result::Result<Vec<Event>, ValidationError> {
        let result = self.tasks.add(text);
        self.emit_task_result(result)
    }

    pub fn toggle_task(&mut self, id: u64) -> std::result::Result<Vec<Event>, ValidationError> {
        let result = self.tasks.toggle(id);
        self.emit_task_result(result)
    }

    pub fn delete_task(&mut self, id: u64) -> std::result::Result<Vec<Event>, ValidationError> {
        let result = self.tasks.delete(id);
        self.emit_task_result(result)
    }

    pub fn clear_completed_tasks(&mut self) -> Vec<Event> {
        let events = self.tasks.clear_completed().into_iter().collect();
        self.emit(events)
    }

    fn emit_task_result(
        &self,
        result: std::result::Result<Event, ValidationError>,
    ) -> std::result::Result<Vec<Event>, ValidationError> {
        match result {
            Ok(event) => Ok(self.emit(vec![event])),
            Err(e) => {
                if matches!(e, ValidationError::TaskNotFound(_)) {
                    self.notifier.notify(&e.to_string(), Severity::Error);
                }
                Err(e)
            }
        }
    }

    fn emit(&self, events: Vec<Event>) -> Vec<Event> {
        let settings = self.settings.settings();
        for event in &events {
            notify::dispatch(event, settings, &self.notifier);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::notify::{NotifierCall, RecordingNotifier};
    use crate::storage::MemoryStore;
    use crate::timer::TimerState;

    fn app() -> (FocusApp<RecordingNotifier>, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new(1_700_000_000_000));
        let app = FocusApp::new(
            Rc::new(MemoryStore::new()),
            clock.clone(),
            RecordingNotifier::new(),
        );
        (app, clock)
    }

    #[test]
    fn startup_configures_notifier() {
        let (app, _) = app();
        let calls = app.notifier().calls();
        assert!(calls.contains(&NotifierCall::SetVolume(50)));
        assert!(calls.contains(&NotifierCall::ApplyTheme {
            class_token: "theme-classic".into(),
            color: "#ff6b6b".into(),
        }));
    }

    #[test]
    fn control_events_reach_notifier() {
        let (mut app, _) = app();
        app.start();
        app.pause();
        assert_eq!(
            app.notifier().messages(),
            vec!["🚀 Focus Time started! Stay focused!", "⏸️ Timer paused."]
        );
    }

    #[test]
    fn setting_change_reloads_idle_timer_and_reapplies() {
        let (mut app, _) = app();
        app.notifier().clear();
        let events = app.set_setting("focus_time", "50").unwrap();
        assert!(matches!(events.last(), Some(Event::SettingsSaved { .. })));
        assert_eq!(app.timer().total_secs(), 50 * 60);

        app.set_setting("theme", "forest").unwrap();
        assert!(app.notifier().calls().contains(&NotifierCall::ApplyTheme {
            class_token: "theme-forest".into(),
            color: "#27ae60".into(),
        }));
        assert!(app
            .notifier()
            .messages()
            .contains(&"Settings saved successfully!".to_string()));
    }

    #[test]
    fn bad_setting_is_rejected_without_changes() {
        let (mut app, _) = app();
        assert!(app.set_setting("nope", "1").is_err());
        assert!(app.set_setting("focus_time", "soon").is_err());
        assert_eq!(app.settings(), &Settings::default());
    }

    #[test]
    fn paused_timer_keeps_progress_on_settings_change() {
        let (mut app, clock) = app();
        app.start();
        clock.advance_secs(10);
        app.pump();
        app.pause();
        app.set_setting("focus_time", "5").unwrap();
        assert_eq!(app.timer().state(), TimerState::Paused);
        assert_eq!(app.timer().time_left_secs(), 25 * 60 - 10);
    }

    #[test]
    fn failed_import_is_reported() {
        let (mut app, _) = app();
        let before = app.stats().clone();
        assert!(app.import_stats("not json").is_err());
        assert!(app
            .notifier()
            .messages()
            .contains(&"Failed to import stats. Invalid file format.".to_string()));
        assert_eq!(app.stats(), &before);
    }

    #[test]
    fn successful_import_is_reported() {
        let (mut app, _) = app();
        let events = app.import_stats(r#"{"total_pomodoros": 3}"#).unwrap();
        assert!(matches!(events.first(), Some(Event::StatsImported { .. })));
        assert_eq!(app.stats().total_pomodoros, 3);
    }

    #[test]
    fn missing_task_is_reported_as_notice() {
        let (mut app, _) = app();
        assert_eq!(
            app.toggle_task(99),
            Err(ValidationError::TaskNotFound(99))
        );
        assert!(app.notifier().calls().contains(&NotifierCall::Notify(
            "Task 99 not found".into(),
            Severity::Error
        )));
    }

    #[test]
    fn task_roundtrip_through_facade() {
        let (mut app, _) = app();
        let added = app.add_task("write tests").unwrap();
        let Some(Event::TaskAdded { id, .. }) = added.first() else {
            panic!("expected TaskAdded");
        };
        app.toggle_task(*id).unwrap();
        assert_eq!(app.clear_completed_tasks().len(), 1);
        assert!(app.tasks().all().is_empty());
    }
}
