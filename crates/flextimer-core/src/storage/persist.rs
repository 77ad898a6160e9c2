//! Persistence adapter: pure (de)serialization of durable state.
//!
//! Key layout (all values JSON):
//! - `agenda_data`: array of agenda items
//! - `timer_history`: object of date -> array of history records
//! - `timer_settings_<field>`: one entry per settings field
//! - `timer_session`: cursor and overtime flag
//!
//! Loads never fail: a missing value, a corrupt value or an unreadable
//! store yields the empty/default state (with a warning). Saves return
//! the store's error to the caller.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::warn;

use super::KvStore;
use crate::agenda::AgendaItem;
use crate::error::Result;
use crate::history::HistoryArchive;
use crate::settings::Settings;

pub const AGENDA_KEY: &str = "agenda_data";
pub const HISTORY_KEY: &str = "timer_history";
pub const SETTINGS_PREFIX: &str = "timer_settings_";
pub const SESSION_KEY: &str = "timer_session";

/// Run position that outlives a single process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub cursor: Option<usize>,
    #[serde(default = "default_true")]
    pub overtime_enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            cursor: None,
            overtime_enabled: true,
        }
    }
}

fn read_raw(store: &impl KvStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(key, error = %e, "store read failed, starting empty");
            None
        }
    }
}

fn load_json<T: DeserializeOwned + Default>(store: &impl KvStore, key: &str) -> T {
    let Some(raw) = read_raw(store, key) else {
        return T::default();
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(key, error = %e, "stored value is corrupt, starting empty");
        T::default()
    })
}

fn save_json<T: Serialize + ?Sized>(store: &impl KvStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

pub fn load_agenda(store: &impl KvStore) -> Vec<AgendaItem> {
    load_json(store, AGENDA_KEY)
}

/// # Errors
/// Returns an error if serialization or the store write fails.
pub fn save_agenda(store: &impl KvStore, items: &[AgendaItem]) -> Result<()> {
    save_json(store, AGENDA_KEY, items)
}

pub fn load_history(store: &impl KvStore) -> HistoryArchive {
    load_json(store, HISTORY_KEY)
}

/// # Errors
/// Returns an error if serialization or the store write fails.
pub fn save_history(store: &impl KvStore, history: &HistoryArchive) -> Result<()> {
    save_json(store, HISTORY_KEY, history)
}

pub fn load_session_state(store: &impl KvStore) -> SessionState {
    load_json(store, SESSION_KEY)
}

/// # Errors
/// Returns an error if serialization or the store write fails.
pub fn save_session_state(store: &impl KvStore, state: &SessionState) -> Result<()> {
    save_json(store, SESSION_KEY, state)
}

/// Assemble settings field by field. A missing, corrupt, or out-of-range
/// field keeps its default; the others still load.
pub fn load_settings(store: &impl KvStore) -> Settings {
    let mut settings = Settings::default();
    for field in Settings::FIELDS {
        let key = format!("{SETTINGS_PREFIX}{field}");
        let Some(raw) = read_raw(store, &key) else {
            continue;
        };
        let value = match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(serde_json::Value::String(s)) => s,
            Ok(other) => other.to_string(),
            Err(_) => raw,
        };
        if let Err(e) = settings.set(field, &value) {
            warn!(key, error = %e, "ignoring stored setting");
        }
    }
    settings
}

/// # Errors
/// Returns an error if serialization or a store write fails.
pub fn save_settings(store: &impl KvStore, settings: &Settings) -> Result<()> {
    let json = serde_json::to_value(settings)?;
    for field in Settings::FIELDS {
        if let Some(value) = json.get(field) {
            store.set(&format!("{SETTINGS_PREFIX}{field}"), &value.to_string())?;
        }
    }
    Ok(())
}
