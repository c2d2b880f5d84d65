use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde_json::{Map, Value};

use crate::DESKTOP_STATE_FILE;

const LIMIT_FIELD: &str = "txLimit";
const THEME_FIELD: &str = "theme";
pub const DEFAULT_TRANSACTION_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Dark => "🌙",
            Self::Light => "☀️",
        }
    }

    /// CSS class applied to the document body.
    pub fn body_class(self) -> Option<&'static str> {
        match self {
            Self::Dark => None,
            Self::Light => Some("light-theme"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub limit: u32,
    pub theme: Theme,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            limit: DEFAULT_TRANSACTION_LIMIT,
            theme: Theme::default(),
        }
    }
}

pub fn parse_limit(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|limit| *limit > 0)
}

pub fn desktop_state_path(state_dir: Option<&Path>) -> Option<PathBuf> {
    state_dir.map(|dir| dir.join(DESKTOP_STATE_FILE))
}

fn empty_state_object() -> Value {
    Value::Object(Map::new())
}

fn read_state(path: &Path) -> Option<Value> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str::<Value>(&raw).ok()
}

fn read_string_field(state: &Value, field: &str) -> Option<String> {
    match state.get(field)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Reads persisted preferences. Anything missing or malformed falls back to defaults.
fn load_preferences(state_dir: Option<&Path>) -> Preferences {
    let defaults = Preferences::default();
    let Some(state) = desktop_state_path(state_dir).and_then(|path| read_state(&path)) else {
        return defaults;
    };

    Preferences {
        limit: read_string_field(&state, LIMIT_FIELD)
            .as_deref()
            .and_then(parse_limit)
            .unwrap_or(defaults.limit),
        theme: read_string_field(&state, THEME_FIELD)
            .as_deref()
            .and_then(Theme::parse)
            .unwrap_or(defaults.theme),
    }
}

fn save_limit(state_dir: Option<&Path>, limit: u32) -> Result<(), String> {
    write_field(state_dir, LIMIT_FIELD, limit.to_string())
}

fn save_theme(state_dir: Option<&Path>, theme: Theme) -> Result<(), String> {
    write_field(state_dir, THEME_FIELD, theme.as_str().to_string())
}

/// Owner of `desktop_state.json`. Every write is a read-modify-write of the whole
/// file, so writers are serialized through one lock.
#[derive(Debug, Default)]
pub struct PreferenceStore {
    state_dir: Option<PathBuf>,
    write_lock: Mutex<()>,
}

impl PreferenceStore {
    pub fn new(state_dir: Option<PathBuf>) -> Self {
        Self {
            state_dir,
            write_lock: Mutex::new(()),
        }
    }

    pub fn load(&self) -> Preferences {
        load_preferences(self.state_dir.as_deref())
    }

    pub fn save_limit(&self, limit: u32) -> Result<(), String> {
        let _guard = self.lock()?;
        save_limit(self.state_dir.as_deref(), limit)
    }

    pub fn save_theme(&self, theme: Theme) -> Result<(), String> {
        let _guard = self.lock()?;
        save_theme(self.state_dir.as_deref(), theme)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, String> {
        self.write_lock
            .lock()
            .map_err(|_| "Preference store lock poisoned.".to_string())
    }
}

fn write_field(state_dir: Option<&Path>, field: &str, value: String) -> Result<(), String> {
    let Some(state_path) = desktop_state_path(state_dir) else {
        crate::append_desktop_log("preference state path is unavailable; skipping persistence");
        return Ok(());
    };

    if let Some(parent_dir) = state_path.parent() {
        fs::create_dir_all(parent_dir).map_err(|error| {
            format!(
                "Failed to create preference directory {}: {}",
                parent_dir.display(),
                error
            )
        })?;
    }

    let mut state = match fs::read_to_string(&state_path) {
        Ok(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(value) if value.is_object() => value,
            Ok(_) => {
                crate::append_desktop_log(&format!(
                    "preference state {} has non-object root; resetting state file",
                    state_path.display()
                ));
                empty_state_object()
            }
            Err(error) => {
                crate::append_desktop_log(&format!(
                    "failed to parse preference state {}: {}. resetting state file",
                    state_path.display(),
                    error
                ));
                empty_state_object()
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => empty_state_object(),
        Err(error) => {
            return Err(format!(
                "Failed to read preference state {}: {}",
                state_path.display(),
                error
            ));
        }
    };

    if let Value::Object(object) = &mut state {
        object.insert(field.to_string(), Value::String(value));
    }

    let serialized = serde_json::to_string_pretty(&state)
        .map_err(|error| format!("Failed to serialize preference state: {error}"))?;
    fs::write(&state_path, serialized).map_err(|error| {
        format!(
            "Failed to write preference state {}: {}",
            state_path.display(),
            error
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_preferences_defaults_without_state_file() {
        let temp = tempfile::tempdir().expect("create temp dir");
        assert_eq!(load_preferences(Some(temp.path())), Preferences::default());
        assert_eq!(load_preferences(None), Preferences::default());
    }

    #[test]
    fn saved_limit_and_theme_round_trip_as_strings() {
        let temp = tempfile::tempdir().expect("create temp dir");
        save_limit(Some(temp.path()), 25).expect("save limit");
        save_theme(Some(temp.path()), Theme::Light).expect("save theme");

        let raw = fs::read_to_string(temp.path().join(DESKTOP_STATE_FILE)).expect("read state");
        let parsed: Value = serde_json::from_str(&raw).expect("parse state");
        assert_eq!(parsed[LIMIT_FIELD], Value::String("25".to_string()));
        assert_eq!(parsed[THEME_FIELD], Value::String("light".to_string()));

        assert_eq!(
            load_preferences(Some(temp.path())),
            Preferences {
                limit: 25,
                theme: Theme::Light
            }
        );
    }

    #[test]
    fn write_keeps_unrelated_fields() {
        let temp = tempfile::tempdir().expect("create temp dir");
        fs::write(
            temp.path().join(DESKTOP_STATE_FILE),
            r#"{"windowX": 12, "theme": "light"}"#,
        )
        .expect("seed state");

        save_limit(Some(temp.path()), 50).expect("save limit");

        let raw = fs::read_to_string(temp.path().join(DESKTOP_STATE_FILE)).expect("read state");
        let parsed: Value = serde_json::from_str(&raw).expect("parse state");
        assert_eq!(parsed["windowX"], Value::from(12));
        assert_eq!(parsed[THEME_FIELD], Value::String("light".to_string()));
        assert_eq!(parsed[LIMIT_FIELD], Value::String("50".to_string()));
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let temp = tempfile::tempdir().expect("create temp dir");
        fs::write(
            temp.path().join(DESKTOP_STATE_FILE),
            r#"{"txLimit": "lots", "theme": "sepia"}"#,
        )
        .expect("seed state");

        assert_eq!(load_preferences(Some(temp.path())), Preferences::default());
    }

    #[test]
    fn corrupt_state_file_is_reset_on_write() {
        let temp = tempfile::tempdir().expect("create temp dir");
        fs::write(temp.path().join(DESKTOP_STATE_FILE), "{not json").expect("seed state");

        save_theme(Some(temp.path()), Theme::Dark).expect("save theme");
        assert_eq!(load_preferences(Some(temp.path())).theme, Theme::Dark);
    }

    #[test]
    fn concurrent_limit_and_theme_writes_both_survive() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let store = std::sync::Arc::new(PreferenceStore::new(Some(temp.path().to_path_buf())));

        let limit_writer = {
            let store = std::sync::Arc::clone(&store);
            std::thread::spawn(move || {
                for limit in 1..=40 {
                    store.save_limit(limit).expect("save limit");
                }
            })
        };
        let theme_writer = {
            let store = std::sync::Arc::clone(&store);
            std::thread::spawn(move || {
                for round in 0..40 {
                    let theme = if round % 2 == 0 { Theme::Dark } else { Theme::Light };
                    store.save_theme(theme).expect("save theme");
                }
            })
        };
        limit_writer.join().expect("limit writer");
        theme_writer.join().expect("theme writer");

        assert_eq!(
            store.load(),
            Preferences {
                limit: 40,
                theme: Theme::Light
            }
        );
    }

    #[test]
    fn store_without_state_dir_skips_persistence() {
        let store = PreferenceStore::new(None);
        store.save_limit(25).expect("nothing to write");
        assert_eq!(store.load(), Preferences::default());
    }

    #[test]
    fn parse_limit_rejects_zero_and_garbage() {
        assert_eq!(parse_limit(" 20 "), Some(20));
        assert_eq!(parse_limit("0"), None);
        assert_eq!(parse_limit("-5"), None);
        assert_eq!(parse_limit("ten"), None);
    }

    #[test]
    fn theme_toggles_twice_back_to_original_icon() {
        let theme = Theme::Dark;
        assert_eq!(theme.toggled(), Theme::Light);
        assert_eq!(theme.toggled().icon(), "☀️");
        assert_eq!(theme.toggled().toggled(), theme);
        assert_eq!(theme.toggled().toggled().icon(), theme.icon());
    }
}
