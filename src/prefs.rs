//! Viewer preferences and the store they persist to.

use directories::ProjectDirs;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::PrefsError;

/// Slot holding `day` or `night`.
pub const THEME_KEY: &str = "theme";
/// Slot holding the font size, e.g. `18px`.
pub const FONT_SIZE_KEY: &str = "font-size";
/// Slot holding expanded directory paths, one per line.
pub const EXPANDED_KEY: &str = "expanded";

pub const MIN_FONT_SIZE: u32 = 14;
pub const MAX_FONT_SIZE: u32 = 24;
pub const DEFAULT_FONT_SIZE: u32 = 18;

/// String valued preference slots.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;

    /// Writes a slot immediately.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError`] when the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError>;
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        (**self).set(key, value)
    }
}

/// Process local store, used by tests and one-shot builds.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON file backed store. Every `set` rewrites the file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    slots: RefCell<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError`] if the file exists but cannot be read or is not
    /// a JSON object of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PrefsError> {
        let path = path.into();
        let slots = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            slots: RefCell::new(slots),
        })
    }

    /// Default location in the user's configuration directory.
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "docnav")
            .map(|dirs| dirs.config_dir().join("prefs.json"))
            .unwrap_or_else(|| PathBuf::from("docnav-prefs.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&*self.slots.borrow())?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Color theme of the viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Day,
    Night,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Night => "night",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "day" => Some(Self::Day),
            "night" => Some(Self::Night),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Day => Self::Night,
            Self::Night => Self::Day,
        }
    }
}

/// Preference values restored at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub theme: Theme,
    pub font_size: u32,
    pub expanded: Vec<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Day,
            font_size: DEFAULT_FONT_SIZE,
            expanded: Vec::new(),
        }
    }
}

impl Preferences {
    /// Reads every slot, falling back to defaults for missing or unparsable values.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let theme = store
            .get(THEME_KEY)
            .and_then(|v| Theme::parse(&v))
            .unwrap_or_default();
        let font_size = store
            .get(FONT_SIZE_KEY)
            .and_then(|v| parse_font_size(&v))
            .unwrap_or(DEFAULT_FONT_SIZE);
        let expanded = store
            .get(EXPANDED_KEY)
            .map(|v| {
                v.lines()
                    .filter(|l| !l.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            theme,
            font_size,
            expanded,
        }
    }

    /// Font size as stored, e.g. `18px`.
    pub fn font_size_value(&self) -> String {
        format!("{}px", self.font_size)
    }
}

/// Parses `18px` or `18` and clamps to the supported range.
pub fn parse_font_size(value: &str) -> Option<u32> {
    let number = value.trim().trim_end_matches("px");
    let size = number.parse::<f64>().ok()?;
    if !size.is_finite() {
        return None;
    }
    Some((size.round() as i64).clamp(MIN_FONT_SIZE as i64, MAX_FONT_SIZE as i64) as u32)
}

/// Writes a slot, logging instead of failing. Preference persistence never
/// blocks the viewer.
pub(crate) fn persist(store: &dyn PreferenceStore, key: &str, value: &str) {
    if let Err(e) = store.set(key, value) {
        warn!(key, error = %e, "Failed to persist preference");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_from_empty_store() {
        // Arrange
        let store = MemoryStore::new();

        // Act
        let prefs = Preferences::load(&store);

        // Assert
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.font_size_value(), "18px");
    }

    #[test]
    fn test_load_parses_slots() {
        // Arrange
        let store = MemoryStore::new();
        store.set(THEME_KEY, "night").expect("set");
        store.set(FONT_SIZE_KEY, "21px").expect("set");
        store.set(EXPANDED_KEY, "topics/a\ntopics/a/b\n").expect("set");

        // Act
        let prefs = Preferences::load(&store);

        // Assert
        assert_eq!(prefs.theme, Theme::Night);
        assert_eq!(prefs.font_size, 21);
        assert_eq!(prefs.expanded, vec!["topics/a", "topics/a/b"]);
    }

    #[test]
    fn test_load_ignores_garbage() {
        // Arrange
        let store = MemoryStore::new();
        store.set(THEME_KEY, "sepia").expect("set");
        store.set(FONT_SIZE_KEY, "huge").expect("set");

        // Act
        let prefs = Preferences::load(&store);

        // Assert
        assert_eq!(prefs.theme, Theme::Day);
        assert_eq!(prefs.font_size, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn test_parse_font_size_clamps() {
        assert_eq!(parse_font_size("40px"), Some(MAX_FONT_SIZE));
        assert_eq!(parse_font_size("2"), Some(MIN_FONT_SIZE));
        assert_eq!(parse_font_size("16.4px"), Some(16));
        assert_eq!(parse_font_size("NaNpx"), None);
    }

    #[test]
    fn test_theme_toggle_round_trip() {
        assert_eq!(Theme::Day.toggled().toggled(), Theme::Day);
        assert_eq!(Theme::parse(Theme::Night.as_str()), Some(Theme::Night));
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        // Arrange
        let dir = TempDir::new().expect("Should create temp dir");
        let path = dir.path().join("nested/prefs.json");

        // Act
        {
            let store = FileStore::open(&path).expect("Should open");
            store.set(THEME_KEY, "night").expect("Should persist");
        }
        let reopened = FileStore::open(&path).expect("Should reopen");

        // Assert
        assert_eq!(reopened.get(THEME_KEY).as_deref(), Some("night"));
        assert_eq!(reopened.get(FONT_SIZE_KEY), None);
    }

    #[test]
    fn test_file_store_rejects_non_object() {
        // Arrange
        let dir = TempDir::new().expect("Should create temp dir");
        let path = dir.path().join("prefs.json");
        fs::write(&path, "[1, 2]").expect("Should write");

        // Act
        let result = FileStore::open(&path);

        // Assert
        assert!(matches!(result, Err(PrefsError::Json(_))));
    }
}
