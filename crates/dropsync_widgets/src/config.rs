//! Widget configuration
//!
//! All options deserialize with serde and default every missing field, so a
//! host can embed them in its own config file.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default activation selector for the dropdown search
pub const DEFAULT_SELECTOR: &str = "select.form-select";

/// Default class that hides the native control
pub const DEFAULT_HIDDEN_CLASS: &str = "d-none";

/// Default live-search quiet period
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// UI language for built-in strings
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Pl,
}

impl Locale {
    /// Trigger text when nothing is selected
    pub fn placeholder(self) -> &'static str {
        match self {
            Locale::En => "Choose...",
            Locale::Pl => "Wybierz...",
        }
    }

    /// Placeholder of the dropdown's filter input
    pub fn search_placeholder(self) -> &'static str {
        match self {
            Locale::En => "Search...",
            Locale::Pl => "Szukaj...",
        }
    }

    /// Accessible name of search inputs
    pub fn search_label(self) -> &'static str {
        match self {
            Locale::En => "Search",
            Locale::Pl => "Wyszukaj",
        }
    }
}

/// Dropdown search options
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropdownOptions {
    /// Selector of the native controls to enhance
    pub selector: String,
    pub locale: Locale,
    /// Overrides the locale's placeholder
    pub placeholder: Option<String>,
    /// Overrides the locale's search placeholder
    pub search_placeholder: Option<String>,
    /// Class added to the native control to hide it
    pub hidden_class: String,
}

impl Default for DropdownOptions {
    fn default() -> Self {
        Self {
            selector: DEFAULT_SELECTOR.to_string(),
            locale: Locale::default(),
            placeholder: None,
            search_placeholder: None,
            hidden_class: DEFAULT_HIDDEN_CLASS.to_string(),
        }
    }
}

impl DropdownOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Effective trigger placeholder
    pub fn placeholder_text(&self) -> &str {
        self.placeholder
            .as_deref()
            .unwrap_or_else(|| self.locale.placeholder())
    }

    /// Effective filter input placeholder
    pub fn search_placeholder_text(&self) -> &str {
        self.search_placeholder
            .as_deref()
            .unwrap_or_else(|| self.locale.search_placeholder())
    }
}

/// Live search options
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveSearchOptions {
    /// Quiet period after the last keystroke before a request fires
    pub debounce_ms: u64,
}

impl Default for LiveSearchOptions {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl LiveSearchOptions {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = DropdownOptions::default();
        assert_eq!(options.selector, "select.form-select");
        assert_eq!(options.hidden_class, "d-none");
        assert_eq!(options.placeholder_text(), "Choose...");
        assert_eq!(options.search_placeholder_text(), "Search...");
        assert_eq!(LiveSearchOptions::default().debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_partial_toml() {
        let options: DropdownOptions = toml::from_str("locale = \"pl\"").unwrap();
        assert_eq!(options.locale, Locale::Pl);
        assert_eq!(options.placeholder_text(), "Wybierz...");
        assert_eq!(options.search_placeholder_text(), "Szukaj...");
        assert_eq!(options.selector, DEFAULT_SELECTOR);
    }

    #[test]
    fn test_placeholder_override() {
        let options = DropdownOptions::new()
            .locale(Locale::Pl)
            .with_placeholder("Pick one");
        assert_eq!(options.placeholder_text(), "Pick one");
        assert_eq!(options.locale.search_label(), "Wyszukaj");
    }
}
