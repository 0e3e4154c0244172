//! Completion statistics, streaks and achievements.
//!
//! [`StatsEngine`] owns the persisted [`Stats`] record. It rolls the daily
//! counter over at calendar-day boundaries, keeps a seven-day history whose
//! last slot is always today, and unlocks achievements monotonically.

mod achievements;

pub use achievements::{find as find_achievement, Achievement, AchievementStatus, CATALOG};

use std::collections::BTreeSet;
use std::rc::Rc;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::{ImportError, Result};
use crate::events::Event;
use crate::storage::{self, merge_fields, KvStore, STATS_KEY};

/// Days kept in [`Stats::weekly_data`].
pub const WEEK_DAYS: usize = 7;

/// Delay between consecutive achievement notices when several unlock at once.
pub const ACHIEVEMENT_STAGGER_MS: u64 = 2_000;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub total_pomodoros: u32,
    /// Minutes.
    pub total_focus_time: u64,
    pub today_pomodoros: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Completed pomodoros per day, oldest first; the last slot is today.
    pub weekly_data: [u32; WEEK_DAYS],
    pub skipped_sessions: u32,
    pub achievements: BTreeSet<String>,
    pub last_session_date: Option<NaiveDate>,
}

impl Stats {
    /// Archive the finished day into the weekly history and reset the daily
    /// counter when `today` differs from the last recorded day.
    ///
    /// The history shifts by exactly one slot per rollover, however many
    /// days have passed. Returns whether anything changed; a second call on
    /// the same day is a no-op.
    pub fn roll_over_to(&mut self, today: NaiveDate) -> bool {
        if self.last_session_date == Some(today) {
            return false;
        }

        if let Some(last) = self.last_session_date {
            self.weekly_data[WEEK_DAYS - 1] = self.today_pomodoros;
            self.weekly_data.rotate_left(1);
            tracing::debug!(%last, %today, "rolled statistics over to a new day");
        }

        self.today_pomodoros = 0;
        self.weekly_data[WEEK_DAYS - 1] = 0;
        self.last_session_date = Some(today);
        true
    }

    /// Restore invariants on data that came from outside (disk or import).
    fn normalize(&mut self) {
        if self.longest_streak < self.current_streak {
            self.longest_streak = self.current_streak;
        }
        self.weekly_data[WEEK_DAYS - 1] = self.today_pomodoros;
    }

    /// Rounded average focus minutes per pomodoro; 25 before the first one.
    pub fn average_session_minutes(&self) -> u64 {
        if self.total_pomodoros == 0 {
            return 25;
        }
        let total = u64::from(self.total_pomodoros);
        self.total_focus_time.saturating_add(total / 2) / total
    }
}

/// `"Xm"` below an hour, `"Hh Mm"` above.
pub fn format_minutes(minutes: u64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours == 0 {
        format!("{mins}m")
    } else {
        format!("{hours}h {mins}m")
    }
}

/// Weekday index with Monday = 0, for charting the weekly history.
pub fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

/// Owner of the persisted [`Stats`] record.
pub struct StatsEngine {
    store: Rc<dyn KvStore>,
    clock: Rc<dyn Clock>,
    stats: Stats,
}

impl StatsEngine {
    /// Load stats (merged over defaults) and roll over to the current day.
    pub fn load(store: Rc<dyn KvStore>, clock: Rc<dyn Clock>) -> Self {
        let mut stats: Stats = storage::load_merged(store.as_ref(), STATS_KEY);
        stats.normalize();
        let mut engine = Self {
            store,
            clock,
            stats,
        };
        engine.check_new_day();
        engine
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Roll over to the clock's current day if needed, persisting the change.
    pub fn check_new_day(&mut self) -> bool {
        let changed = self.stats.roll_over_to(self.clock.today());
        if changed {
            self.persist();
        }
        changed
    }

    /// Record one finished focus session.
    ///
    /// Skipped sessions count towards the totals but leave the streak alone.
    pub fn add_pomodoro(&mut self, focus_minutes: u32, was_skipped: bool) -> Vec<Event> {
        self.check_new_day();
        let at = self.clock.now();
        let mut events = Vec::new();

        let s = &mut self.stats;
        s.total_pomodoros = s.total_pomodoros.saturating_add(1);
        s.total_focus_time = s.total_focus_time.saturating_add(u64::from(focus_minutes));
        s.today_pomodoros = s.today_pomodoros.saturating_add(1);

        if was_skipped {
            s.skipped_sessions = s.skipped_sessions.saturating_add(1);
            events.push(Event::SkippedNoStreak { at });
        } else {
            s.current_streak = s.current_streak.saturating_add(1);
            if s.current_streak > s.longest_streak {
                s.longest_streak = s.current_streak;
                if s.longest_streak > 1 {
                    events.push(Event::NewStreakRecord {
                        streak: s.longest_streak,
                        at,
                    });
                }
            }
            if is_streak_milestone(s.current_streak) {
                events.push(Event::StreakMilestone {
                    streak: s.current_streak,
                    at,
                });
            }
        }

        s.weekly_data[WEEK_DAYS - 1] = s.today_pomodoros;
        tracing::info!(
            total = s.total_pomodoros,
            today = s.today_pomodoros,
            streak = s.current_streak,
            skipped = was_skipped,
            "pomodoro recorded"
        );
        self.persist();
        events.extend(self.check_achievements());
        events
    }

    /// Reset the current streak. Not called by session completion: skipping
    /// is streak-neutral.
    pub fn break_streak(&mut self) -> Vec<Event> {
        self.stats.current_streak = 0;
        self.persist();
        vec![Event::StreakBroken {
            at: self.clock.now(),
        }]
    }

    /// Record newly satisfied achievements. Already unlocked ones are never
    /// re-evaluated or removed.
    pub fn check_achievements(&mut self) -> Vec<Event> {
        let unlocked = achievements::newly_satisfied(&self.stats);
        if unlocked.is_empty() {
            return Vec::new();
        }
        let at = self.clock.now();
        let events: Vec<Event> = unlocked
            .into_iter()
            .map(|a| {
                self.stats.achievements.insert(a.id.to_string());
                tracing::info!(id = a.id, "achievement unlocked");
                Event::AchievementUnlocked {
                    id: a.id.to_string(),
                    name: a.name.to_string(),
                    at,
                }
            })
            .collect();
        self.persist();
        events
    }

    /// Every catalog entry with its unlocked flag.
    pub fn achievement_status(&self) -> Vec<AchievementStatus> {
        CATALOG
            .iter()
            .map(|a| AchievementStatus {
                achievement: *a,
                unlocked: self.stats.achievements.contains(a.id),
            })
            .collect()
    }

    /// Pretty JSON of the whole record.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.stats)?)
    }

    /// Merge an exported record over the current stats.
    ///
    /// All or nothing: on any error the current stats are untouched.
    /// Unlocked achievements are kept even if the file lacks them.
    pub fn import_json(&mut self, text: &str) -> Result<Vec<Event>, ImportError> {
        let incoming: serde_json::Value = serde_json::from_str(text)?;
        let outcome = merge_fields(&self.stats, &incoming)?;
        if let Some((field, message)) = outcome.rejected.into_iter().next() {
            return Err(ImportError::InvalidField { field, message });
        }

        let mut next = outcome.value;
        next.achievements.extend(self.stats.achievements.iter().cloned());
        next.normalize();
        self.stats = next;
        self.check_new_day();
        self.persist();
        tracing::info!(total = self.stats.total_pomodoros, "statistics imported");
        Ok(self.check_achievements())
    }

    fn persist(&self) {
        if let Err(e) = storage::save_record(self.store.as_ref(), STATS_KEY, &self.stats) {
            tracing::warn!(error = %e, "failed to persist statistics");
        }
    }
}

fn is_streak_milestone(streak: u32) -> bool {
    streak == 5 || streak == 10 || (streak > 0 && streak % 25 == 0)
}
