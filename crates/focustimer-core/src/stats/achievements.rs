//! Static achievement catalog.

use serde::Serialize;

use super::Stats;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    #[serde(skip)]
    predicate: fn(&Stats) -> bool,
}

impl Achievement {
    pub fn is_satisfied(&self, stats: &Stats) -> bool {
        (self.predicate)(stats)
    }
}

/// Catalog entry together with whether the user has unlocked it.
#[derive(Debug, Clone, Serialize)]
pub struct AchievementStatus {
    #[serde(flatten)]
    pub achievement: Achievement,
    pub unlocked: bool,
}

fn first_pomodoro(s: &Stats) -> bool {
    s.total_pomodoros >= 1
}
fn streak5(s: &Stats) -> bool {
    s.current_streak >= 5
}
fn total25(s: &Stats) -> bool {
    s.total_pomodoros >= 25
}
fn total100(s: &Stats) -> bool {
    s.total_pomodoros >= 100
}
fn daily10(s: &Stats) -> bool {
    s.today_pomodoros >= 10
}
fn focus_marathon(s: &Stats) -> bool {
    s.total_focus_time >= 25 * 60
}
fn week_warrior(s: &Stats) -> bool {
    s.weekly_data.iter().all(|&day| day >= 3)
}
fn dedication(s: &Stats) -> bool {
    s.total_pomodoros >= 500
}
fn perfectionist(s: &Stats) -> bool {
    s.current_streak >= 20
}

pub static CATALOG: [Achievement; 9] = [
    Achievement {
        id: "first_pomodoro",
        name: "Getting Started",
        description: "Complete your first Pomodoro",
        icon: "🍅",
        predicate: first_pomodoro,
    },
    Achievement {
        id: "streak5",
        name: "On Fire",
        description: "Complete 5 Pomodoros in a row",
        icon: "🔥",
        predicate: streak5,
    },
    Achievement {
        id: "total25",
        name: "Quarter Century",
        description: "Complete 25 Pomodoros total",
        icon: "🏆",
        predicate: total25,
    },
    Achievement {
        id: "total100",
        name: "Centurion",
        description: "Complete 100 Pomodoros total",
        icon: "💯",
        predicate: total100,
    },
    Achievement {
        id: "daily10",
        name: "Power User",
        description: "Complete 10 Pomodoros in one day",
        icon: "⚡",
        predicate: daily10,
    },
    Achievement {
        id: "focus_marathon",
        name: "Focus Marathon",
        description: "Accumulate 25 hours of focus time",
        icon: "🏃",
        predicate: focus_marathon,
    },
    Achievement {
        id: "week_warrior",
        name: "Week Warrior",
        description: "Complete at least 3 Pomodoros every day for a week",
        icon: "⚔️",
        predicate: week_warrior,
    },
    Achievement {
        id: "dedication",
        name: "Dedication",
        description: "Complete 500 Pomodoros total",
        icon: "🎯",
        predicate: dedication,
    },
    Achievement {
        id: "perfectionist",
        name: "Perfectionist",
        description: "Complete 20 Pomodoros without skipping any",
        icon: "💎",
        predicate: perfectionist,
    },
];

pub fn find(id: &str) -> Option<&'static Achievement> {
    CATALOG.iter().find(|a| a.id == id)
}

/// Catalog entries satisfied by `stats` but not yet recorded as unlocked.
pub fn newly_satisfied(stats: &Stats) -> Vec<&'static Achievement> {
    CATALOG
        .iter()
        .filter(|a| !stats.achievements.contains(a.id) && a.is_satisfied(stats))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<_> = CATALOG.iter().map(|a| a.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), CATALOG.len());
    }

    #[test]
    fn fresh_stats_unlock_nothing() {
        assert!(newly_satisfied(&Stats::default()).is_empty());
    }

    #[test]
    fn recorded_achievements_are_not_reported_again() {
        let mut stats = Stats {
            total_pomodoros: 30,
            ..Stats::default()
        };
        let ids: Vec<_> = newly_satisfied(&stats).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["first_pomodoro", "total25"]);

        stats.achievements.insert("first_pomodoro".into());
        let ids: Vec<_> = newly_satisfied(&stats).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["total25"]);
    }

    #[test]
    fn week_warrior_needs_every_day() {
        let mut stats = Stats {
            weekly_data: [3, 3, 3, 3, 3, 3, 2],
            ..Stats::default()
        };
        assert!(!find("week_warrior").unwrap().is_satisfied(&stats));
        stats.weekly_data[6] = 3;
        assert!(find("week_warrior").unwrap().is_satisfied(&stats));
    }
}
