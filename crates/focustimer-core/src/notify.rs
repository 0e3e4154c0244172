//! Presentation seam.
//!
//! The core never renders, plays audio or raises OS notifications itself.
//! [`dispatch`] maps each [`Event`] onto calls of a [`Notifier`] supplied by
//! the front end (the CLI prints to the terminal; tests record the calls).

use std::cell::RefCell;

use serde::Serialize;

use crate::events::Event;
use crate::settings::Settings;
use crate::timer::SessionType;

/// Title used for OS-level notifications.
pub const SYSTEM_NOTIFICATION_TITLE: &str = "Focus Timer";

/// Tag shared by every completion notification so repeats replace each other.
pub const SYSTEM_NOTIFICATION_TAG: &str = "pomodoro-notification";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Output side of the application.
///
/// Only [`Notifier::notify`] is required; the audio and display hooks
/// default to doing nothing.
pub trait Notifier {
    fn notify(&self, message: &str, severity: Severity);

    fn play_focus_complete_sound(&self) {}
    fn play_break_complete_sound(&self) {}
    fn play_tick_sound(&self) {}
    fn start_ticking_loop(&self) {}
    fn stop_ticking_loop(&self) {}
    fn system_notification(&self, _title: &str, _body: &str, _tag: &str) {}
    fn set_volume(&self, _volume: u8) {}
    fn set_ticking_enabled(&self, _enabled: bool) {}
    fn apply_theme(&self, _class_token: &str, _color: &str) {}
}

/// User-facing notice text for an event, if it has one.
pub fn message_for(event: &Event) -> Option<(String, Severity)> {
    let notice: (String, Severity) = match event {
        Event::SessionStarted { session_type, .. } => (
            format!("🚀 {} started! Stay focused!", session_type.display_name()),
            Severity::Info,
        ),
        Event::TimerResumed { .. } => ("▶️ Timer resumed!".into(), Severity::Info),
        Event::TimerPaused { .. } => ("⏸️ Timer paused.".into(), Severity::Info),
        Event::TimerReset { .. } => ("🔄 Timer reset!".into(), Severity::Info),
        Event::TimeRemaining { remaining_secs, .. } => match *remaining_secs {
            60 => (
                "⏰ 1 minute remaining! Stay focused!".into(),
                Severity::Warning,
            ),
            secs => (
                format!("⏰ {} minutes remaining!", secs / 60),
                Severity::Info,
            ),
        },
        Event::SessionCompleted {
            session_type,
            skipped,
            ..
        } => completion_message(*session_type, *skipped),
        Event::SessionAdvanced { .. } => return None,
        Event::AutoStartCountdown { seconds_left, .. } => (
            format!("🔄 Auto-starting in {seconds_left}... Press any button to cancel."),
            Severity::Info,
        ),
        Event::AutoStartCancelled { .. } => ("Auto-start cancelled.".into(), Severity::Info),
        Event::SkippedNoStreak { .. } => (
            "⚠️ Session skipped! No streak bonus this time.".into(),
            Severity::Warning,
        ),
        Event::NewStreakRecord { streak, .. } => (
            format!("🏆 New record! {streak} Pomodoros streak!"),
            Severity::Success,
        ),
        Event::StreakMilestone { streak, .. } => (milestone_message(*streak), Severity::Success),
        Event::AchievementUnlocked { name, .. } => (
            format!("🏆 Achievement Unlocked: {name}!"),
            Severity::Success,
        ),
        Event::StreakBroken { .. } => ("Streak reset.".into(), Severity::Info),
        Event::SettingsSaved { .. } => ("Settings saved successfully!".into(), Severity::Success),
        Event::StatsImported { .. } => ("Stats imported successfully!".into(), Severity::Success),
        Event::StatsImportFailed { .. } => (
            "Failed to import stats. Invalid file format.".into(),
            Severity::Error,
        ),
        Event::TaskAdded { .. } => ("✅ Task added successfully!".into(), Severity::Success),
        Event::TaskCompleted { .. } => ("🎉 Task completed!".into(), Severity::Success),
        Event::TaskReopened { .. } => return None,
        Event::TaskDeleted { .. } => ("🗑️ Task deleted".into(), Severity::Info),
        Event::CompletedTasksCleared { .. } => {
            ("🧹 Completed tasks cleared!".into(), Severity::Success)
        }
    };
    Some(notice)
}

fn completion_message(session_type: SessionType, skipped: bool) -> (String, Severity) {
    match (session_type, skipped) {
        (SessionType::Focus, true) => ("⚠️ Focus session skipped!".into(), Severity::Warning),
        (_, true) => ("⚠️ Break skipped!".into(), Severity::Warning),
        (SessionType::Focus, false) => (
            "🎉 Pomodoro completed! Time for a break.".into(),
            Severity::Success,
        ),
        (_, false) => (
            "✨ Break time is over! Ready to focus?".into(),
            Severity::Info,
        ),
    }
}

fn milestone_message(streak: u32) -> String {
    match streak {
        5 => "🔥 You're on fire! 5 in a row!".into(),
        10 => "⚡ Unstoppable! 10 Pomodoros streak!".into(),
        n => format!("🎯 Amazing! {n} Pomodoros milestone!"),
    }
}

/// Route one event to the notifier.
pub fn dispatch(event: &Event, settings: &Settings, notifier: &dyn Notifier) {
    match event {
        Event::SessionStarted { .. } | Event::TimerResumed { .. } => {
            if settings.ticking_sound {
                notifier.start_ticking_loop();
            }
        }
        Event::TimerPaused { .. } | Event::TimerReset { .. } => notifier.stop_ticking_loop(),
        Event::SessionCompleted {
            session_type,
            skipped,
            ..
        } => {
            notifier.stop_ticking_loop();
            if *session_type == SessionType::Focus {
                notifier.play_focus_complete_sound();
            } else {
                notifier.play_break_complete_sound();
            }
            if settings.notifications {
                let (body, _) = completion_message(*session_type, *skipped);
                notifier.system_notification(
                    SYSTEM_NOTIFICATION_TITLE,
                    &body,
                    SYSTEM_NOTIFICATION_TAG,
                );
            }
        }
        Event::AchievementUnlocked { .. } => notifier.play_focus_complete_sound(),
        _ => {}
    }

    if let Some((message, severity)) = message_for(event) {
        notifier.notify(&message, severity);
    }
}

/// A notifier call captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierCall {
    Notify(String, Severity),
    FocusCompleteSound,
    BreakCompleteSound,
    TickSound,
    StartTicking,
    StopTicking,
    SystemNotification {
        title: String,
        body: String,
        tag: String,
    },
    SetVolume(u8),
    SetTickingEnabled(bool),
    ApplyTheme {
        class_token: String,
        color: String,
    },
}

/// Notifier that records every call, for tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    calls: RefCell<Vec<NotifierCall>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<NotifierCall> {
        self.calls.borrow().clone()
    }

    /// Messages passed to [`Notifier::notify`], in order.
    pub fn messages(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                NotifierCall::Notify(m, _) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    /// System notifications currently visible, one per tag.
    pub fn visible_system_notifications(&self) -> Vec<(String, String)> {
        let mut by_tag: Vec<(String, String)> = Vec::new();
        for call in self.calls.borrow().iter() {
            if let NotifierCall::SystemNotification { body, tag, .. } = call {
                by_tag.retain(|(t, _)| t != tag);
                by_tag.push((tag.clone(), body.clone()));
            }
        }
        by_tag
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: NotifierCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.record(NotifierCall::Notify(message.to_string(), severity));
    }
    fn play_focus_complete_sound(&self) {
        self.record(NotifierCall::FocusCompleteSound);
    }
    fn play_break_complete_sound(&self) {
        self.record(NotifierCall::BreakCompleteSound);
    }
    fn play_tick_sound(&self) {
        self.record(NotifierCall::TickSound);
    }
    fn start_ticking_loop(&self) {
        self.record(NotifierCall::StartTicking);
    }
    fn stop_ticking_loop(&self) {
        self.record(NotifierCall::StopTicking);
    }
    fn system_notification(&self, title: &str, body: &str, tag: &str) {
        self.record(NotifierCall::SystemNotification {
            title: title.to_string(),
            body: body.to_string(),
            tag: tag.to_string(),
        });
    }
    fn set_volume(&self, volume: u8) {
        self.record(NotifierCall::SetVolume(volume));
    }
    fn set_ticking_enabled(&self, enabled: bool) {
        self.record(NotifierCall::SetTickingEnabled(enabled));
    }
    fn apply_theme(&self, class_token: &str, color: &str) {
        self.record(NotifierCall::ApplyTheme {
            class_token: class_token.to_string(),
            color: color.to_string(),
        });
    }
}
