//! User-tunable timer settings.
//!
//! Settings are persisted as one JSON record and merged over the defaults on
//! load, so missing or partially broken records never prevent startup.
//! Every write goes through [`SettingsStore`], which clamps values into
//! range before persisting.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::storage::{self, KvStore, SETTINGS_KEY};
use crate::timer::SessionType;

/// Colour themes. Each maps to a CSS-style class token and a metadata colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Classic,
    Dark,
    Forest,
    Ocean,
    Sunset,
    Minimal,
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Theme::Classic,
        Theme::Dark,
        Theme::Forest,
        Theme::Ocean,
        Theme::Sunset,
        Theme::Minimal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Classic => "classic",
            Theme::Dark => "dark",
            Theme::Forest => "forest",
            Theme::Ocean => "ocean",
            Theme::Sunset => "sunset",
            Theme::Minimal => "minimal",
        }
    }

    pub fn class_token(&self) -> String {
        format!("theme-{}", self.as_str())
    }

    pub fn color(&self) -> &'static str {
        match self {
            Theme::Classic => "#ff6b6b",
            Theme::Dark => "#2d2d2d",
            Theme::Forest => "#27ae60",
            Theme::Ocean => "#3498db",
            Theme::Sunset => "#e74c3c",
            Theme::Minimal => "#2c3e50",
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown theme '{s}'"))
    }
}

/// Persisted user settings. Durations are in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub focus_time: u32,
    pub short_break: u32,
    pub long_break: u32,
    pub sessions_until_long_break: u32,
    pub auto_start_breaks: bool,
    pub auto_start_pomodoros: bool,
    pub ticking_sound: bool,
    pub volume: u8,
    pub theme: Theme,
    /// Desktop (OS-level) notifications.
    pub notifications: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_time: 25,
            short_break: 5,
            long_break: 15,
            sessions_until_long_break: 4,
            auto_start_breaks: false,
            auto_start_pomodoros: false,
            ticking_sound: false,
            volume: 50,
            theme: Theme::Classic,
            notifications: true,
        }
    }
}

pub const MAX_VOLUME: u8 = 100;

impl Settings {
    /// Duration in minutes configured for a session type.
    pub fn minutes_for(&self, session_type: SessionType) -> u32 {
        match session_type {
            SessionType::Focus => self.focus_time,
            SessionType::ShortBreak => self.short_break,
            SessionType::LongBreak => self.long_break,
        }
    }

    /// Duration in seconds configured for a session type. Never zero.
    pub fn seconds_for(&self, session_type: SessionType) -> u64 {
        u64::from(self.minutes_for(session_type).max(1)) * 60
    }

    pub fn auto_start_for(&self, session_type: SessionType) -> bool {
        match session_type {
            SessionType::Focus => self.auto_start_pomodoros,
            SessionType::ShortBreak | SessionType::LongBreak => self.auto_start_breaks,
        }
    }

    /// Clamp out-of-range values. Returns the names of the fields changed.
    pub fn clamp(&mut self) -> Vec<&'static str> {
        let mut changed = Vec::new();
        for (name, value) in [
            ("focus_time", &mut self.focus_time),
            ("short_break", &mut self.short_break),
            ("long_break", &mut self.long_break),
            ("sessions_until_long_break", &mut self.sessions_until_long_break),
        ] {
            if *value == 0 {
                *value = 1;
                changed.push(name);
            }
        }
        if self.volume > MAX_VOLUME {
            self.volume = MAX_VOLUME;
            changed.push("volume");
        }
        changed
    }

    fn clamped(mut self) -> Self {
        for field in self.clamp() {
            tracing::warn!(field, "setting out of range, clamped");
        }
        self
    }

    /// Read one setting as a string.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match json.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Update one setting from its string form, without persisting.
    ///
    /// The new value is parsed according to the current value's type.
    pub fn apply(&mut self, key: &str, value: &str) -> std::result::Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        let obj = json
            .as_object_mut()
            .ok_or_else(|| ConfigError::ParseFailed("settings are not an object".into()))?;
        let existing = obj
            .get(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value.trim().parse::<bool>().map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => serde_json::Value::Number(
                value
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| invalid(e.to_string()))?
                    .into(),
            ),
            _ => {
                if key == "theme" {
                    value.parse::<Theme>().map_err(invalid)?;
                }
                serde_json::Value::String(value.trim().to_ascii_lowercase())
            }
        };
        obj.insert(key.to_string(), new_value);
        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }
}

/// Owner of the persisted [`Settings`] record.
pub struct SettingsStore {
    store: Rc<dyn KvStore>,
    settings: Settings,
}

impl SettingsStore {
    /// Load settings, merged over the defaults and clamped.
    pub fn load(store: Rc<dyn KvStore>) -> Self {
        let settings: Settings = storage::load_merged(store.as_ref(), SETTINGS_KEY);
        Self {
            store,
            settings: settings.clamped(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.settings.get(key)
    }

    /// Change one setting by name and persist.
    pub fn set(&mut self, key: &str, value: &str) -> Result<&Settings> {
        let mut next = self.settings.clone();
        next.apply(key, value)?;
        self.replace(next)
    }

    /// Replace all settings and persist.
    pub fn save(&mut self, settings: Settings) -> Result<&Settings> {
        self.replace(settings)
    }

    /// Restore the default template and persist.
    pub fn reset_to_defaults(&mut self) -> Result<&Settings> {
        self.replace(Settings::default())
    }

    fn replace(&mut self, settings: Settings) -> Result<&Settings> {
        self.settings = settings.clamped();
        storage::save_record(self.store.as_ref(), SETTINGS_KEY, &self.settings)?;
        tracing::debug!(settings = ?self.settings, "settings saved");
        Ok(&self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn store_with(raw: &str) -> Rc<dyn KvStore> {
        Rc::new(MemoryStore::with_record(SETTINGS_KEY, raw))
    }

    #[test]
    fn missing_volume_falls_back_to_default() {
        let store = store_with(r#"{"focus_time": 50, "theme": "ocean"}"#);
        let loaded = SettingsStore::load(store);
        assert_eq!(loaded.settings().volume, 50);
        assert_eq!(loaded.settings().focus_time, 50);
        assert_eq!(loaded.settings().theme, Theme::Ocean);
    }

    #[test]
    fn malformed_record_loads_defaults() {
        let loaded = SettingsStore::load(store_with("not json at all"));
        assert_eq!(loaded.settings(), &Settings::default());
    }

    #[test]
    fn zero_durations_are_clamped_on_load() {
        let loaded = SettingsStore::load(store_with(
            r#"{"focus_time": 0, "sessions_until_long_break": 0, "volume": 250}"#,
        ));
        assert_eq!(loaded.settings().focus_time, 1);
        assert_eq!(loaded.settings().sessions_until_long_break, 1);
        // 250 fits in a u8 and is clamped to the maximum.
        assert_eq!(loaded.settings().volume, 100);
    }

    #[test]
    fn negative_duration_keeps_default() {
        let loaded = SettingsStore::load(store_with(r#"{"short_break": -3}"#));
        assert_eq!(loaded.settings().short_break, 5);
    }

    #[test]
    fn set_persists_and_parses_by_type() {
        let mem = Rc::new(MemoryStore::new());
        let mut store = SettingsStore::load(mem.clone());
        store.set("focus_time", "40").unwrap();
        store.set("auto_start_breaks", "true").unwrap();
        store.set("theme", "Forest").unwrap();

        let reloaded = SettingsStore::load(mem);
        assert_eq!(reloaded.settings().focus_time, 40);
        assert!(reloaded.settings().auto_start_breaks);
        assert_eq!(reloaded.settings().theme, Theme::Forest);
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_values() {
        let mut store = SettingsStore::load(Rc::new(MemoryStore::new()));
        assert!(store.set("colour", "red").is_err());
        assert!(store.set("volume", "loud").is_err());
        assert!(store.set("theme", "neon").is_err());
        assert_eq!(store.settings(), &Settings::default());
    }

    #[test]
    fn reset_restores_default_template() {
        let mut store = SettingsStore::load(Rc::new(MemoryStore::new()));
        store.set("long_break", "30").unwrap();
        store.reset_to_defaults().unwrap();
        assert_eq!(store.settings(), &Settings::default());
    }

    #[test]
    fn seconds_for_each_session_type() {
        let s = Settings::default();
        assert_eq!(s.seconds_for(SessionType::Focus), 25 * 60);
        assert_eq!(s.seconds_for(SessionType::ShortBreak), 5 * 60);
        assert_eq!(s.seconds_for(SessionType::LongBreak), 15 * 60);
    }

    #[test]
    fn theme_metadata() {
        assert_eq!(Theme::Ocean.class_token(), "theme-ocean");
        assert_eq!(Theme::Classic.color(), "#ff6b6b");
        assert_eq!("DARK".parse::<Theme>().unwrap(), Theme::Dark);
    }
}
