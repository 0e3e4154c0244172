//! # Focustimer Core Library
//!
//! Core logic for the Focustimer Pomodoro timer: the session state machine,
//! statistics with streaks and achievements, user settings, a task list and
//! their persistence. Front ends (the `focustimer` CLI) are thin layers over
//! [`FocusApp`].
//!
//! ## Architecture
//!
//! - **Session Timer**: a state machine driven by a deterministic
//!   [`timer::Scheduler`]; the caller invokes `pump()` to run due ticks
//! - **Statistics**: streaks, a seven-day history and a fixed achievement
//!   catalog, persisted as one record
//! - **Storage**: a key-value [`KvStore`] (SQLite or in-memory) and a
//!   TOML [`AppConfig`]
//! - **Notifier**: presentation seam; the core emits [`Event`]s and
//!   [`notify::dispatch`] turns them into notifier calls
//!
//! ## Key Components
//!
//! - [`SessionTimer`]: focus/break state machine
//! - [`StatsEngine`]: statistics and achievements
//! - [`SettingsStore`]: validated, persisted user settings
//! - [`TaskList`]: persisted to-do list
//! - [`FocusApp`]: facade wiring everything together

pub mod app;
pub mod clock;
pub mod error;
pub mod events;
pub mod notify;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod tasks;
pub mod timer;

pub use app::FocusApp;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, ImportError, StorageError, ValidationError};
pub use events::Event;
pub use notify::{Notifier, RecordingNotifier, Severity};
pub use settings::{Settings, SettingsStore, Theme};
pub use stats::{Achievement, AchievementStatus, Stats, StatsEngine};
pub use storage::{AppConfig, KvStore, MemoryStore, SqliteStore};
pub use tasks::{Task, TaskList};
pub use timer::{SessionInfo, SessionTimer, SessionType, TimerState};
