//! Session timer implementation.
//!
//! The timer is a state machine over a single [`Session`]. It does not use
//! internal threads: periodic and deferred work (the one-second tick, the
//! auto-start countdown, staggered notices) lives in a [`Scheduler`] and the
//! caller is responsible for calling [`SessionTimer::pump`] regularly.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused | Completing) -> Idle (next session)
//! Paused -> Running
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = SessionTimer::new(&settings, clock);
//! timer.start();
//! // In a loop:
//! let events = timer.pump(&settings, &mut stats);
//! ```

use std::rc::Rc;

use super::scheduler::{Scheduler, TaskKind};
use super::session::{format_clock, Session, SessionInfo, SessionType, TimerState};
use crate::clock::Clock;
use crate::events::Event;
use crate::settings::Settings;
use crate::stats::{StatsEngine, ACHIEVEMENT_STAGGER_MS};

const TICK_MS: u64 = 1_000;

/// Seconds counted down before an automatic start.
pub const AUTO_START_COUNTDOWN: u8 = 3;

/// Remaining-time thresholds (seconds) that trigger a notice during focus.
pub const REMAINING_NOTICES: [u64; 2] = [300, 60];

/// Countdown state machine for focus and break sessions.
pub struct SessionTimer {
    clock: Rc<dyn Clock>,
    scheduler: Scheduler,
    session: Session,
}

impl SessionTimer {
    /// Create an idle timer on a full-length focus session.
    pub fn new(settings: &Settings, clock: Rc<dyn Clock>) -> Self {
        let session_type = SessionType::Focus;
        Self {
            clock,
            scheduler: Scheduler::new(),
            session: Session::new(session_type, settings.seconds_for(session_type)),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> TimerState {
        self.session.state
    }

    pub fn session_type(&self) -> SessionType {
        self.session.session_type
    }

    pub fn time_left_secs(&self) -> u64 {
        self.session.time_left_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.session.total_secs
    }

    /// 0.0 .. 1.0 progress within the current session.
    pub fn progress(&self) -> f64 {
        self.session.progress()
    }

    /// Remaining time split into (minutes, seconds).
    pub fn time_remaining(&self) -> (u64, u64) {
        (
            self.session.time_left_secs / 60,
            self.session.time_left_secs % 60,
        )
    }

    pub fn has_pending_auto_start(&self) -> bool {
        self.session.auto_start_task.is_some()
    }

    /// Pending periodic tick tasks. Never more than one.
    pub fn active_tick_tasks(&self) -> usize {
        self.scheduler
            .count_where(|kind| matches!(kind, TaskKind::Tick))
    }

    /// Earliest instant (epoch ms) at which [`Self::pump`] has work to do.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.scheduler.next_due()
    }

    pub fn info(&self) -> SessionInfo {
        let s = &self.session;
        SessionInfo {
            session_type: s.session_type,
            label: s.session_type.display_name().to_string(),
            state: s.state,
            time_left_secs: s.time_left_secs,
            total_secs: s.total_secs,
            clock: format_clock(s.time_left_secs),
            session_count: s.session_count,
            completed_focus_count: s.completed_focus_count,
            skipped: s.skipped,
            progress_pct: s.progress() * 100.0,
            auto_start_pending: s.auto_start_task.is_some(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a new session, or resume a paused one.
    pub fn start(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        self.cancel_auto_start(&mut events);
        self.start_inner(&mut events);
        events
    }

    pub fn pause(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        self.cancel_auto_start(&mut events);
        match self.session.state {
            TimerState::Running => {
                self.cancel_tick();
                self.session.state = TimerState::Paused;
                self.session.reference_ms = None;
                tracing::debug!(remaining = self.session.time_left_secs, "timer paused");
                events.push(Event::TimerPaused {
                    remaining_secs: self.session.time_left_secs,
                    at: self.clock.now(),
                });
            }
            TimerState::Paused | TimerState::Idle => {
                tracing::debug!(state = ?self.session.state, "pause ignored");
            }
        }
        events
    }

    /// Stop and reload the current session type at full length.
    pub fn reset(&mut self, settings: &Settings) -> Vec<Event> {
        let mut events = Vec::new();
        self.cancel_auto_start(&mut events);
        self.cancel_tick();
        self.session.state = TimerState::Idle;
        self.session.reference_ms = None;
        self.load_durations(settings);
        tracing::debug!(session_type = ?self.session.session_type, "timer reset");
        events.push(Event::TimerReset {
            session_type: self.session.session_type,
            duration_secs: self.session.total_secs,
            at: self.clock.now(),
        });
        events
    }

    /// Finish the current session immediately, marked as skipped.
    pub fn skip(&mut self, settings: &Settings, stats: &mut StatsEngine) -> Vec<Event> {
        let mut events = Vec::new();
        self.cancel_auto_start(&mut events);
        self.session.skipped = true;
        self.complete(settings, stats, &mut events);
        events
    }

    /// Reflect changed settings while idle. Running and paused sessions keep
    /// their current durations until they end.
    pub fn apply_settings(&mut self, settings: &Settings) -> Vec<Event> {
        let mut events = Vec::new();
        if self.session.state == TimerState::Idle {
            self.cancel_auto_start(&mut events);
            self.load_durations(settings);
        }
        events
    }

    /// Hold an event back and deliver it from [`Self::pump`] after `delay_ms`.
    pub fn defer(&mut self, event: Event, delay_ms: u64) {
        let due = self.clock.now_ms() + delay_ms;
        self.scheduler
            .schedule_once(TaskKind::Deliver(Box::new(event)), due);
    }

    /// Pass events through, holding back all but the first
    /// `AchievementUnlocked` so unlock notices arrive one at a time.
    pub fn stagger(&mut self, recorded: Vec<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        self.stagger_achievements(recorded, &mut events);
        events
    }

    /// Run every scheduled task that is due, in deadline order.
    pub fn pump(&mut self, settings: &Settings, stats: &mut StatsEngine) -> Vec<Event> {
        let now = self.clock.now_ms();
        let mut events = Vec::new();
        while let Some((id, kind)) = self.scheduler.pop_due(now) {
            match kind {
                TaskKind::Tick => {
                    if self.session.tick_task == Some(id) {
                        self.tick(settings, stats, &mut events);
                    }
                }
                TaskKind::AutoStart => {
                    if self.session.auto_start_task == Some(id) {
                        self.auto_start_step(&mut events);
                    }
                }
                TaskKind::Deliver(event) => events.push(*event),
            }
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn start_inner(&mut self, events: &mut Vec<Event>) {
        match self.session.state {
            TimerState::Running => {
                tracing::debug!("start ignored, already running");
            }
            TimerState::Paused => {
                self.begin_ticking();
                self.session.state = TimerState::Running;
                tracing::debug!(remaining = self.session.time_left_secs, "timer resumed");
                events.push(Event::TimerResumed {
                    session_type: self.session.session_type,
                    remaining_secs: self.session.time_left_secs,
                    at: self.clock.now(),
                });
            }
            TimerState::Idle => {
                self.session.skipped = false;
                self.begin_ticking();
                self.session.state = TimerState::Running;
                tracing::debug!(session_type = ?self.session.session_type, "session started");
                events.push(Event::SessionStarted {
                    session_type: self.session.session_type,
                    duration_secs: self.session.total_secs,
                    at: self.clock.now(),
                });
            }
        }
    }

    /// Schedule the periodic tick, anchored on the instant this session would
    /// have started had it never been paused.
    fn begin_ticking(&mut self) {
        self.cancel_tick();
        let elapsed_ms = self.session.elapsed_secs() * TICK_MS;
        let reference = self.clock.now_ms().saturating_sub(elapsed_ms);
        self.session.reference_ms = Some(reference);
        let first_due = reference + elapsed_ms + TICK_MS;
        self.session.tick_task = Some(
            self.scheduler
                .schedule_every(TaskKind::Tick, first_due, TICK_MS),
        );
    }

    fn cancel_tick(&mut self) {
        if let Some(id) = self.session.tick_task.take() {
            self.scheduler.cancel(id);
        }
    }

    fn cancel_auto_start(&mut self, events: &mut Vec<Event>) {
        if let Some(id) = self.session.auto_start_task.take() {
            self.scheduler.cancel(id);
            self.session.auto_start_remaining = 0;
            tracing::debug!("auto-start cancelled");
            events.push(Event::AutoStartCancelled {
                at: self.clock.now(),
            });
        }
    }

    fn tick(&mut self, settings: &Settings, stats: &mut StatsEngine, events: &mut Vec<Event>) {
        if self.session.state != TimerState::Running {
            return;
        }
        if self.session.time_left_secs > 0 {
            self.session.time_left_secs -= 1;
            let left = self.session.time_left_secs;
            if self.session.session_type == SessionType::Focus && REMAINING_NOTICES.contains(&left)
            {
                events.push(Event::TimeRemaining {
                    remaining_secs: left,
                    at: self.clock.now(),
                });
            }
        }
        if self.session.time_left_secs == 0 {
            self.session.skipped = false;
            self.complete(settings, stats, events);
        }
    }

    fn complete(&mut self, settings: &Settings, stats: &mut StatsEngine, events: &mut Vec<Event>) {
        self.cancel_tick();
        self.session.state = TimerState::Idle;
        self.session.reference_ms = None;

        let finished = self.session.session_type;
        let skipped = self.session.skipped;
        if finished == SessionType::Focus {
            self.session.completed_focus_count += 1;
        }
        tracing::info!(session_type = ?finished, skipped, "session completed");
        events.push(Event::SessionCompleted {
            session_type: finished,
            skipped,
            completed_focus_count: self.session.completed_focus_count,
            at: self.clock.now(),
        });

        if finished == SessionType::Focus {
            let recorded = stats.add_pomodoro(settings.focus_time, skipped);
            self.stagger_achievements(recorded, events);
        }

        self.advance(settings, events);
    }

    /// First unlock is reported immediately, the rest one every
    /// [`ACHIEVEMENT_STAGGER_MS`].
    fn stagger_achievements(&mut self, recorded: Vec<Event>, events: &mut Vec<Event>) {
        let mut unlocked = 0u64;
        for event in recorded {
            if matches!(event, Event::AchievementUnlocked { .. }) {
                if unlocked == 0 {
                    events.push(event);
                } else {
                    self.defer(event, unlocked * ACHIEVEMENT_STAGGER_MS);
                }
                unlocked += 1;
            } else {
                events.push(event);
            }
        }
    }

    fn advance(&mut self, settings: &Settings, events: &mut Vec<Event>) {
        let next = match self.session.session_type {
            SessionType::Focus => {
                self.session.session_count += 1;
                let every = settings.sessions_until_long_break.max(1);
                if self.session.session_count % every == 0 {
                    SessionType::LongBreak
                } else {
                    SessionType::ShortBreak
                }
            }
            SessionType::ShortBreak | SessionType::LongBreak => SessionType::Focus,
        };
        self.session.session_type = next;
        self.load_durations(settings);
        events.push(Event::SessionAdvanced {
            session_type: next,
            session_count: self.session.session_count,
            duration_secs: self.session.total_secs,
            at: self.clock.now(),
        });

        if settings.auto_start_for(next) {
            self.schedule_auto_start();
        }
    }

    fn schedule_auto_start(&mut self) {
        if let Some(id) = self.session.auto_start_task.take() {
            self.scheduler.cancel(id);
        }
        self.session.auto_start_remaining = AUTO_START_COUNTDOWN;
        let first_due = self.clock.now_ms() + TICK_MS;
        self.session.auto_start_task = Some(self.scheduler.schedule_every(
            TaskKind::AutoStart,
            first_due,
            TICK_MS,
        ));
        tracing::debug!(session_type = ?self.session.session_type, "auto-start scheduled");
    }

    fn auto_start_step(&mut self, events: &mut Vec<Event>) {
        if self.session.auto_start_remaining > 0 {
            events.push(Event::AutoStartCountdown {
                seconds_left: self.session.auto_start_remaining,
                at: self.clock.now(),
            });
            self.session.auto_start_remaining -= 1;
            return;
        }
        if let Some(id) = self.session.auto_start_task.take() {
            self.scheduler.cancel(id);
        }
        self.start_inner(events);
    }

    fn load_durations(&mut self, settings: &Settings) {
        let total = settings.seconds_for(self.session.session_type);
        self.session.total_secs = total;
        self.session.time_left_secs = total;
        self.session.skipped = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;

    struct Rig {
        clock: Rc<ManualClock>,
        settings: Settings,
        stats: StatsEngine,
        timer: SessionTimer,
    }

    impl Rig {
        fn new(settings: Settings) -> Self {
            let clock = Rc::new(ManualClock::new(1_700_000_000_000));
            let stats = StatsEngine::load(Rc::new(MemoryStore::new()), clock.clone());
            let timer = SessionTimer::new(&settings, clock.clone());
            Self {
                clock,
                settings,
                stats,
                timer,
            }
        }

        fn advance(&mut self, secs: u64) -> Vec<Event> {
            let mut events = Vec::new();
            for _ in 0..secs {
                self.clock.advance_secs(1);
                events.extend(self.timer.pump(&self.settings, &mut self.stats));
            }
            events
        }
    }

    fn short_settings() -> Settings {
        Settings {
            focus_time: 1,
            short_break: 1,
            long_break: 2,
            ..Settings::default()
        }
    }

    #[test]
    fn start_pause_resume() {
        let mut rig = Rig::new(Settings::default());
        assert_eq!(rig.timer.state(), TimerState::Idle);

        assert!(matches!(
            rig.timer.start().as_slice(),
            [Event::SessionStarted { .. }]
        ));
        assert_eq!(rig.timer.state(), TimerState::Running);

        rig.advance(10);
        assert_eq!(rig.timer.time_left_secs(), 25 * 60 - 10);

        assert!(matches!(
            rig.timer.pause().as_slice(),
            [Event::TimerPaused { remaining_secs, .. }] if *remaining_secs == 25 * 60 - 10
        ));
        rig.advance(30);
        assert_eq!(rig.timer.time_left_secs(), 25 * 60 - 10);

        assert!(matches!(
            rig.timer.start().as_slice(),
            [Event::TimerResumed { .. }]
        ));
        rig.advance(5);
        assert_eq!(rig.timer.time_left_secs(), 25 * 60 - 15);
    }

    #[test]
    fn resume_reanchors_on_remaining_time() {
        let mut rig = Rig::new(Settings::default());
        let t0 = rig.clock.now_ms();
        rig.timer.start();
        assert_eq!(rig.timer.session().reference_ms(), Some(t0));

        rig.advance(10);
        rig.timer.pause();
        assert_eq!(rig.timer.session().reference_ms(), None);
        rig.clock.advance_ms(2_500);

        rig.timer.start();
        let resumed_at = rig.clock.now_ms();
        assert_eq!(rig.timer.session().reference_ms(), Some(resumed_at - 10_000));
        assert_eq!(rig.timer.next_deadline_ms(), Some(resumed_at + 1_000));
    }

    #[test]
    fn redundant_controls_are_noops() {
        let mut rig = Rig::new(Settings::default());
        assert!(rig.timer.pause().is_empty());
        assert_eq!(rig.timer.state(), TimerState::Idle);

        rig.timer.start();
        assert!(rig.timer.start().is_empty());
        assert_eq!(rig.timer.active_tick_tasks(), 1);

        rig.timer.pause();
        assert!(rig.timer.pause().is_empty());
        assert_eq!(rig.timer.state(), TimerState::Paused);
        assert_eq!(rig.timer.active_tick_tasks(), 0);
    }

    #[test]
    fn late_pump_catches_up_without_skipping_notices() {
        let mut rig = Rig::new(Settings {
            focus_time: 6,
            ..Settings::default()
        });
        rig.timer.start();
        rig.clock.advance_secs(61);
        let events = rig.timer.pump(&rig.settings, &mut rig.stats);
        assert_eq!(rig.timer.time_left_secs(), 6 * 60 - 61);
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::TimeRemaining { remaining_secs: 300, .. })));
    }

    #[test]
    fn remaining_notices_fire_once_each() {
        let mut rig = Rig::new(Settings {
            focus_time: 6,
            ..Settings::default()
        });
        rig.timer.start();
        let events = rig.advance(6 * 60);
        let notices: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                Event::TimeRemaining { remaining_secs, .. } => Some(*remaining_secs),
                _ => None,
            })
            .collect();
        assert_eq!(notices, vec![300, 60]);
    }

    #[test]
    fn natural_completion_advances_to_short_break() {
        let mut rig = Rig::new(short_settings());
        rig.timer.start();
        let events = rig.advance(60);
        assert!(events.iter().any(|e| matches!(
            e,
            Event::SessionCompleted {
                session_type: SessionType::Focus,
                skipped: false,
                ..
            }
        )));
        assert_eq!(rig.timer.session_type(), SessionType::ShortBreak);
        assert_eq!(rig.timer.state(), TimerState::Idle);
        assert_eq!(rig.timer.time_left_secs(), 60);
        assert_eq!(rig.stats.stats().total_pomodoros, 1);
        assert_eq!(rig.timer.active_tick_tasks(), 0);
    }

    #[test]
    fn skip_reports_skipped_focus_to_stats() {
        let mut rig = Rig::new(short_settings());
        rig.timer.start();
        rig.advance(10);
        let events = rig.timer.skip(&rig.settings, &mut rig.stats);
        assert!(events.iter().any(|e| matches!(
            e,
            Event::SessionCompleted {
                session_type: SessionType::Focus,
                skipped: true,
                ..
            }
        )));
        assert_eq!(rig.stats.stats().skipped_sessions, 1);
        assert_eq!(rig.stats.stats().current_streak, 0);
        assert_eq!(rig.timer.session_type(), SessionType::ShortBreak);
        assert!(!rig.timer.session().skipped);
        assert_eq!(rig.timer.active_tick_tasks(), 0);
    }

    #[test]
    fn skipping_a_break_does_not_touch_stats() {
        let mut rig = Rig::new(short_settings());
        rig.timer.skip(&rig.settings, &mut rig.stats);
        let before = rig.stats.stats().clone();
        rig.timer.skip(&rig.settings, &mut rig.stats);
        assert_eq!(rig.stats.stats(), &before);
        assert_eq!(rig.timer.session_type(), SessionType::Focus);
    }

    #[test]
    fn reset_reloads_current_type() {
        let mut rig = Rig::new(short_settings());
        rig.timer.start();
        rig.advance(20);
        let events = rig.timer.reset(&rig.settings);
        assert!(matches!(
            events.as_slice(),
            [Event::TimerReset {
                session_type: SessionType::Focus,
                duration_secs: 60,
                ..
            }]
        ));
        assert_eq!(rig.timer.time_left_secs(), 60);
        assert_eq!(rig.timer.active_tick_tasks(), 0);
        rig.advance(5);
        assert_eq!(rig.timer.time_left_secs(), 60);
    }

    #[test]
    fn progress_and_remaining() {
        let mut rig = Rig::new(short_settings());
        assert_eq!(rig.timer.progress(), 0.0);
        rig.timer.start();
        rig.advance(15);
        assert!((rig.timer.progress() - 0.25).abs() < 1e-9);
        assert_eq!(rig.timer.time_remaining(), (0, 45));
        assert_eq!(rig.timer.info().clock, "00:45");
    }

    #[test]
    fn auto_start_counts_down_then_starts() {
        let mut rig = Rig::new(Settings {
            auto_start_breaks: true,
            ..short_settings()
        });
        rig.timer.start();
        rig.advance(60);
        assert!(rig.timer.has_pending_auto_start());

        let events = rig.advance(4);
        let countdown: Vec<u8> = events
            .iter()
            .filter_map(|e| match e {
                Event::AutoStartCountdown { seconds_left, .. } => Some(*seconds_left),
                _ => None,
            })
            .collect();
        assert_eq!(countdown, vec![3, 2, 1]);
        assert!(events.iter().any(|e| matches!(
            e,
            Event::SessionStarted {
                session_type: SessionType::ShortBreak,
                ..
            }
        )));
        assert_eq!(rig.timer.state(), TimerState::Running);
        assert!(!rig.timer.has_pending_auto_start());
        assert_eq!(rig.timer.active_tick_tasks(), 1);
    }

    #[test]
    fn apply_settings_only_touches_idle_timer() {
        let mut rig = Rig::new(Settings::default());
        rig.settings.focus_time = 50;
        rig.timer.apply_settings(&rig.settings);
        assert_eq!(rig.timer.total_secs(), 50 * 60);

        rig.timer.start();
        rig.settings.focus_time = 10;
        rig.timer.apply_settings(&rig.settings);
        assert_eq!(rig.timer.total_secs(), 50 * 60);
    }

    #[test]
    fn staggered_achievements_arrive_two_seconds_apart() {
        let mut rig = Rig::new(short_settings());
        rig.stats
            .import_json(r#"{"total_pomodoros": 24, "current_streak": 4, "longest_streak": 4}"#)
            .unwrap();
        rig.timer.start();

        // The 25th pomodoro at a streak of 5 unlocks two achievements at once.
        let count = |events: &[Event]| {
            events
                .iter()
                .filter(|e| matches!(e, Event::AchievementUnlocked { .. }))
                .count()
        };
        assert_eq!(count(&rig.advance(60)), 1);
        assert_eq!(count(&rig.advance(1)), 0);
        assert_eq!(count(&rig.advance(1)), 1);
    }
}
