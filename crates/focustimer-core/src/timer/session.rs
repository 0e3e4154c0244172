use serde::{Deserialize, Serialize};

use super::scheduler::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Focus,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    pub fn display_name(&self) -> &'static str {
        match self {
            SessionType::Focus => "Focus Time",
            SessionType::ShortBreak => "Short Break",
            SessionType::LongBreak => "Long Break",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, SessionType::Focus)
    }
}

/// Running and paused are mutually exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    #[default]
    Idle,
    Running,
    Paused,
}

/// The current interval and everything needed to cancel its pending work.
#[derive(Debug, Clone)]
pub struct Session {
    pub session_type: SessionType,
    pub time_left_secs: u64,
    pub total_secs: u64,
    pub state: TimerState,
    pub skipped: bool,
    /// Focus sessions finished since startup, driving long-break placement.
    pub session_count: u32,
    pub completed_focus_count: u32,
    pub(crate) tick_task: Option<TaskId>,
    pub(crate) auto_start_task: Option<TaskId>,
    pub(crate) auto_start_remaining: u8,
    /// Instant (epoch ms) the current run would have started at had it never
    /// been paused. Tick deadlines are anchored on it.
    pub(crate) reference_ms: Option<u64>,
}

impl Session {
    pub(crate) fn new(session_type: SessionType, total_secs: u64) -> Self {
        Self {
            session_type,
            time_left_secs: total_secs,
            total_secs,
            state: TimerState::Idle,
            skipped: false,
            session_count: 0,
            completed_focus_count: 0,
            tick_task: None,
            auto_start_task: None,
            auto_start_remaining: 0,
            reference_ms: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.state == TimerState::Paused
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.total_secs.saturating_sub(self.time_left_secs)
    }

    /// Tick anchor of the current run, while running.
    pub fn reference_ms(&self) -> Option<u64> {
        self.reference_ms
    }

    /// 0.0 .. 1.0 progress within the session.
    pub fn progress(&self) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        self.elapsed_secs() as f64 / self.total_secs as f64
    }
}

/// Read-only snapshot for display collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_type: SessionType,
    pub label: String,
    pub state: TimerState,
    pub time_left_secs: u64,
    pub total_secs: u64,
    pub clock: String,
    pub session_count: u32,
    pub completed_focus_count: u32,
    pub skipped: bool,
    pub progress_pct: f64,
    pub auto_start_pending: bool,
}

/// `MM:SS`, minutes uncapped.
pub fn format_clock(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
