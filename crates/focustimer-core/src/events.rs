use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::SessionType;

/// Every state change in the system produces an Event.
///
/// The core never talks to a display or speaker directly: callers route
/// events through [`crate::notify::dispatch`] to a [`crate::Notifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        session_type: SessionType,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        session_type: SessionType,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        session_type: SessionType,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// One-time notice at a fixed remaining-time threshold of a focus session.
    TimeRemaining {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        session_type: SessionType,
        skipped: bool,
        completed_focus_count: u32,
        at: DateTime<Utc>,
    },
    SessionAdvanced {
        session_type: SessionType,
        session_count: u32,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    AutoStartCountdown {
        seconds_left: u8,
        at: DateTime<Utc>,
    },
    AutoStartCancelled {
        at: DateTime<Utc>,
    },
    /// A skipped focus session was counted without touching the streak.
    SkippedNoStreak {
        at: DateTime<Utc>,
    },
    NewStreakRecord {
        streak: u32,
        at: DateTime<Utc>,
    },
    StreakMilestone {
        streak: u32,
        at: DateTime<Utc>,
    },
    AchievementUnlocked {
        id: String,
        name: String,
        at: DateTime<Utc>,
    },
    StreakBroken {
        at: DateTime<Utc>,
    },
    SettingsSaved {
        at: DateTime<Utc>,
    },
    StatsImported {
        at: DateTime<Utc>,
    },
    StatsImportFailed {
        reason: String,
        at: DateTime<Utc>,
    },
    TaskAdded {
        id: u64,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        id: u64,
        at: DateTime<Utc>,
    },
    TaskReopened {
        id: u64,
        at: DateTime<Utc>,
    },
    TaskDeleted {
        id: u64,
        at: DateTime<Utc>,
    },
    CompletedTasksCleared {
        count: usize,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::SessionStarted { at, .. }
            | Event::TimerResumed { at, .. }
            | Event::TimerPaused { at, .. }
            | Event::TimerReset { at, .. }
            | Event::TimeRemaining { at, .. }
            | Event::SessionCompleted { at, .. }
            | Event::SessionAdvanced { at, .. }
            | Event::AutoStartCountdown { at, .. }
            | Event::AutoStartCancelled { at }
            | Event::SkippedNoStreak { at }
            | Event::NewStreakRecord { at, .. }
            | Event::StreakMilestone { at, .. }
            | Event::AchievementUnlocked { at, .. }
            | Event::StreakBroken { at }
            | Event::SettingsSaved { at }
            | Event::StatsImported { at }
            | Event::StatsImportFailed { at, .. }
            | Event::TaskAdded { at, .. }
            | Event::TaskCompleted { at, .. }
            | Event::TaskReopened { at, .. }
            | Event::TaskDeleted { at, .. }
            | Event::CompletedTasksCleared { at, .. } => *at,
        }
    }
}
