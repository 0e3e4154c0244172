mod config;
pub mod database;
mod merge;

pub use config::AppConfig;
pub use database::SqliteStore;
pub(crate) use merge::merge_fields;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

/// Record key for the persisted [`crate::Settings`].
pub const SETTINGS_KEY: &str = "settings";
/// Record key for the persisted [`crate::Stats`].
pub const STATS_KEY: &str = "stats";
/// Record key for the persisted task list.
pub const TASKS_KEY: &str = "tasks";

/// String-keyed, string-valued persistence.
///
/// Settings, stats and tasks are each stored as one serialized JSON record.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a single raw record.
    pub fn with_record(key: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }

    /// Make every subsequent write fail, to exercise write-error handling.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::QueryFailed(format!(
                "write to '{key}' rejected"
            )));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read a record and merge it over `T::default()` field by field.
///
/// Absent, unreadable or malformed records yield the default. Individual
/// fields that fail to parse keep their default value. Nothing here returns
/// an error: read failures are logged and swallowed.
pub fn load_merged<T>(store: &dyn KvStore, key: &str) -> T
where
    T: Serialize + DeserializeOwned + Default,
{
    let Some(raw) = read_raw(store, key) else {
        return T::default();
    };
    let parsed: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "stored record is not valid JSON, using defaults");
            return T::default();
        }
    };
    match merge_fields(&T::default(), &parsed) {
        Ok(outcome) => {
            for (field, message) in &outcome.rejected {
                tracing::warn!(key, field = %field, %message, "ignoring invalid stored field");
            }
            outcome.value
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "stored record has the wrong shape, using defaults");
            T::default()
        }
    }
}

/// Read a record that is replaced wholesale rather than merged (e.g. a list).
pub fn load_whole<T>(store: &dyn KvStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let Some(raw) = read_raw(store, key) else {
        return T::default();
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, "failed to parse stored record, using empty value");
        T::default()
    })
}

/// Serialize and write a record.
pub fn save_record<T: Serialize>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
) -> crate::error::Result<()> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)?;
    Ok(())
}

fn read_raw(store: &dyn KvStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read stored record, using defaults");
            None
        }
    }
}

/// Returns `~/.config/focustimer[-dev]/` based on FOCUSTIMER_ENV.
///
/// Set FOCUSTIMER_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSTIMER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focustimer-dev")
    } else {
        base_dir.join("focustimer")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    #[serde(default)]
    struct Sample {
        count: u32,
        label: String,
    }

    impl Default for Sample {
        fn default() -> Self {
            Self {
                count: 7,
                label: "seven".into(),
            }
        }
    }

    #[test]
    fn missing_record_yields_default() {
        let store = MemoryStore::new();
        let loaded: Sample = load_merged(&store, "sample");
        assert_eq!(loaded, Sample::default());
    }

    #[test]
    fn garbage_record_yields_default() {
        let store = MemoryStore::with_record("sample", "{not json");
        let loaded: Sample = load_merged(&store, "sample");
        assert_eq!(loaded, Sample::default());
    }

    #[test]
    fn bad_field_keeps_default_but_good_fields_load() {
        let store = MemoryStore::with_record("sample", r#"{"count":"lots","label":"x"}"#);
        let loaded: Sample = load_merged(&store, "sample");
        assert_eq!(loaded.count, 7);
        assert_eq!(loaded.label, "x");
    }

    #[test]
    fn failing_writes_surface_as_errors() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        assert!(save_record(&store, "sample", &Sample::default()).is_err());
        assert!(store.raw("sample").is_none());
    }

    #[test]
    fn load_whole_falls_back_to_empty() {
        let store = MemoryStore::with_record("list", "[1, 2,");
        let loaded: Vec<u32> = load_whole(&store, "list");
        assert!(loaded.is_empty());
    }
}
