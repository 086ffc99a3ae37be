//! Settings snapshot model
//!
//! Settings are a flat string-to-string mapping. Two snapshots compare
//! equal iff every key and value matches, which is what the dirty check
//! in the application layer relies on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default UI language when settings carry none.
pub const DEFAULT_LANG: &str = "en";

/// Default theme for a fresh settings file.
pub const DEFAULT_THEME: &str = "light";

/// Well-known settings keys.
pub mod keys {
    pub const LANG: &str = "lang";
    pub const THEME: &str = "theme";
}

/// A point-in-time copy of the settings mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsSnapshot {
    values: BTreeMap<String, String>,
}

impl SettingsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The values every settings file is seeded with.
    pub fn defaults() -> Self {
        let mut snapshot = Self::new();
        snapshot.set(keys::LANG, DEFAULT_LANG);
        snapshot.set(keys::THEME, DEFAULT_THEME);
        snapshot
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Fill in any key present in `defaults` but missing here.
    ///
    /// Existing values always win over the default.
    pub fn merge_defaults(&mut self, defaults: &SettingsSnapshot) {
        for (key, value) in &defaults.values {
            self.values
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for SettingsSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
