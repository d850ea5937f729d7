//! Display preferences persisted alongside the collection.
//!
//! `viewMode` and `theme` are stored as bare string literals; the three
//! toggles are stored as JSON booleans.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use archive_core::{get_json, keys, set_json, KeyValueStore, PersistenceError};
use serde::{Deserialize, Serialize};

/// Grid or list presentation of the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "grid" => Ok(ViewMode::Grid),
            "list" => Ok(ViewMode::List),
            other => Err(format!("unknown view mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("unknown theme: {}", other)),
        }
    }
}

/// Snapshot of every preference value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceValues {
    pub view_mode: ViewMode,
    pub theme: Theme,
    pub show_featured: bool,
    pub show_recently_added: bool,
    pub has_visited: bool,
}

impl Default for PreferenceValues {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Grid,
            theme: Theme::Dark,
            show_featured: true,
            show_recently_added: true,
            has_visited: false,
        }
    }
}

/// Typed, write-through access to the preference keys.
pub struct Preferences {
    values: PreferenceValues,
    storage: Arc<dyn KeyValueStore>,
}

impl Preferences {
    /// Read every preference, substituting defaults for missing or malformed values.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let defaults = PreferenceValues::default();
        let store = storage.as_ref();
        let values = PreferenceValues {
            view_mode: read_literal(store, keys::VIEW_MODE).unwrap_or(defaults.view_mode),
            theme: read_literal(store, keys::THEME).unwrap_or(defaults.theme),
            show_featured: read_flag(store, keys::SHOW_FEATURED).unwrap_or(defaults.show_featured),
            show_recently_added: read_flag(store, keys::SHOW_RECENTLY_ADDED)
                .unwrap_or(defaults.show_recently_added),
            has_visited: read_flag(store, keys::HAS_VISITED).unwrap_or(defaults.has_visited),
        };
        Self { values, storage }
    }

    pub fn values(&self) -> PreferenceValues {
        self.values
    }

    pub fn view_mode(&self) -> ViewMode {
        self.values.view_mode
    }

    pub fn theme(&self) -> Theme {
        self.values.theme
    }

    pub fn show_featured(&self) -> bool {
        self.values.show_featured
    }

    pub fn show_recently_added(&self) -> bool {
        self.values.show_recently_added
    }

    pub fn has_visited(&self) -> bool {
        self.values.has_visited
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> Result<(), PersistenceError> {
        self.values.view_mode = mode;
        self.storage.set(keys::VIEW_MODE, mode.as_str())
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), PersistenceError> {
        self.values.theme = theme;
        self.storage.set(keys::THEME, theme.as_str())
    }

    /// Flip between dark and light, returning the new theme.
    pub fn toggle_theme(&mut self) -> Result<Theme, PersistenceError> {
        let next = self.values.theme.toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    pub fn set_show_featured(&mut self, show: bool) -> Result<(), PersistenceError> {
        self.values.show_featured = show;
        set_json(self.storage.as_ref(), keys::SHOW_FEATURED, &show)
    }

    pub fn set_show_recently_added(&mut self, show: bool) -> Result<(), PersistenceError> {
        self.values.show_recently_added = show;
        set_json(self.storage.as_ref(), keys::SHOW_RECENTLY_ADDED, &show)
    }

    /// Record that the welcome screen has been seen.
    pub fn mark_visited(&mut self) -> Result<(), PersistenceError> {
        self.values.has_visited = true;
        set_json(self.storage.as_ref(), keys::HAS_VISITED, &true)
    }
}

impl fmt::Debug for Preferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preferences")
            .field("values", &self.values)
            .finish()
    }
}

fn read_literal<T: FromStr<Err = String>>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    match store.get(key) {
        Ok(Some(raw)) => match raw.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring stored {}: {}", key, e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", key, e);
            None
        }
    }
}

fn read_flag(store: &dyn KeyValueStore, key: &str) -> Option<bool> {
    match get_json::<bool>(store, key) {
        Ok(flag) => flag,
        Err(e) => {
            tracing::warn!("Ignoring stored {}: {}", key, e);
            None
        }
    }
}
