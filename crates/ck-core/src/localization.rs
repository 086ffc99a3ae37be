//! Localization catalog model
//!
//! The catalog maps a language code to a table of translated strings.
//! Lookups fall back to the default language so a partially translated
//! catalog never produces a missing string for keys the default carries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    default_lang: String,
    translations: BTreeMap<String, BTreeMap<String, String>>,
}

impl Catalog {
    pub fn new(default_lang: impl Into<String>) -> Self {
        Self {
            default_lang: default_lang.into(),
            translations: BTreeMap::new(),
        }
    }

    pub fn default_lang(&self) -> &str {
        &self.default_lang
    }

    pub fn has_lang(&self, lang: &str) -> bool {
        self.translations.contains_key(lang)
    }

    pub fn insert(
        &mut self,
        lang: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.translations
            .entry(lang.into())
            .or_default()
            .insert(key.into(), value.into());
    }

    /// Look up `key` in `lang`, falling back to the default language.
    pub fn lookup(&self, lang: &str, key: &str) -> Option<&str> {
        self.translations
            .get(lang)
            .and_then(|table| table.get(key))
            .or_else(|| {
                self.translations
                    .get(&self.default_lang)
                    .and_then(|table| table.get(key))
            })
            .map(String::as_str)
    }

    /// Pick `lang` if the catalog carries it, the default language
    /// otherwise.
    pub fn select_lang<'a>(&'a self, lang: Option<&'a str>) -> &'a str {
        match lang {
            Some(lang) if self.has_lang(lang) => lang,
            _ => &self.default_lang,
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(crate::settings::DEFAULT_LANG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new("en");
        catalog.insert("en", "greeting", "Hello");
        catalog.insert("en", "farewell", "Goodbye");
        catalog.insert("es", "greeting", "Hola");
        catalog
    }

    #[test]
    fn lookup_prefers_requested_language() {
        assert_eq!(catalog().lookup("es", "greeting"), Some("Hola"));
    }

    #[test]
    fn lookup_falls_back_to_default_language() {
        assert_eq!(catalog().lookup("es", "farewell"), Some("Goodbye"));
        assert_eq!(catalog().lookup("fr", "greeting"), Some("Hello"));
        assert_eq!(catalog().lookup("en", "missing"), None);
    }

    #[test]
    fn select_lang_falls_back_when_unknown_or_unset() {
        let catalog = catalog();
        assert_eq!(catalog.select_lang(Some("es")), "es");
        assert_eq!(catalog.select_lang(Some("fr")), "en");
        assert_eq!(catalog.select_lang(None), "en");
    }
}
