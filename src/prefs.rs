//! Presentation-owned preference storage.
//!
//! The aggregation core never reads or writes preferences. Views hold a
//! `PreferenceStore` and pass the values they need into core calls.

use dashmap::DashMap;

pub const LAYOUT_KEY: &str = "layout";

pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// Process-local store, shared across threads without a lock.
pub struct InMemoryPreferences {
    values: DashMap<String, String>,
}

impl InMemoryPreferences {
    pub fn new() -> Self {
        Self {
            values: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&self) {
        self.values.clear();
    }
}

impl Default for InMemoryPreferences {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceStore for InMemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    Grid,
    Columns,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Grid => "vertical",
            Layout::Columns => "horizontal",
        }
    }

    /// Unknown or missing values fall back to the grid.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("horizontal") => Layout::Columns,
            _ => Layout::Grid,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Layout::Grid => Layout::Columns,
            Layout::Columns => Layout::Grid,
        }
    }

    pub fn load(store: &dyn PreferenceStore) -> Self {
        Self::parse(store.get(LAYOUT_KEY).as_deref())
    }

    pub fn save(self, store: &dyn PreferenceStore) {
        store.set(LAYOUT_KEY, self.as_str());
    }
}
