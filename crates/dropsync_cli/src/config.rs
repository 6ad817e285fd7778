//! Page fixture file handling
//!
//! A fixture describes one form page and, optionally, a script of user
//! interaction to replay against it:
//!
//! ```toml
//! [page]
//! path = "/sessions"
//! query = "page=2"
//! locale = "pl"
//!
//! [[controls]]
//! name = "fruit"
//! options = ["Apple", { label = "Banana", selected = true }]
//!
//! [[steps]]
//! action = "open"
//! control = "fruit"
//! ```

use anyhow::{Context, Result};
use dropsync_widgets::{DropdownOptions, LiveSearchOptions, Locale};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A page fixture
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Fixture {
    #[serde(default)]
    pub page: PageConfig,
    /// Dropdown options; `page.locale` wins over `dropdown.locale`
    #[serde(default)]
    pub dropdown: DropdownOptions,
    #[serde(default)]
    pub live_search: LiveSearchOptions,
    #[serde(default)]
    pub controls: Vec<ControlSpec>,
    #[serde(default)]
    pub inputs: Vec<InputSpec>,
    #[serde(default)]
    pub containers: Vec<ContainerSpec>,
    #[serde(default)]
    pub responses: Vec<ResponseSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Page-level settings
#[derive(Debug, Deserialize, Serialize)]
pub struct PageConfig {
    /// Path of the page, used as the form action and for live search
    #[serde(default = "default_path")]
    pub path: String,
    /// Query string of the page, without `?`
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub locale: Option<Locale>,
    /// Whether the page has a `#darkModeToggle` button
    #[serde(default = "default_true")]
    pub theme_toggle: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            query: String::new(),
            locale: None,
            theme_toggle: true,
        }
    }
}

fn default_path() -> String {
    "/".to_string()
}

fn default_true() -> bool {
    true
}

fn default_select_class() -> String {
    "form-select".to_string()
}

fn default_status() -> u16 {
    200
}

/// A native `<select>`
#[derive(Debug, Deserialize, Serialize)]
pub struct ControlSpec {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "default_select_class")]
    pub class: String,
    #[serde(default)]
    pub multiple: bool,
    /// Hand the control to the search-select bootstrap instead
    #[serde(default)]
    pub choices: bool,
    #[serde(default)]
    pub options: Vec<OptionSpec>,
}

/// An `<option>`, either a bare label or a table
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OptionSpec {
    Label(String),
    Full {
        label: String,
        #[serde(default)]
        value: Option<String>,
        #[serde(default)]
        selected: bool,
    },
}

impl OptionSpec {
    pub fn label(&self) -> &str {
        match self {
            OptionSpec::Label(label) | OptionSpec::Full { label, .. } => label,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            OptionSpec::Label(_) => None,
            OptionSpec::Full { value, .. } => value.as_deref(),
        }
    }

    pub fn selected(&self) -> bool {
        matches!(self, OptionSpec::Full { selected: true, .. })
    }
}

/// A text `<input>`
#[derive(Debug, Deserialize, Serialize)]
pub struct InputSpec {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub value: String,
    /// Live-search target selector
    #[serde(default)]
    pub live_search: Option<String>,
}

/// A `<div>` outside the form, e.g. a live-search target
#[derive(Debug, Deserialize, Serialize)]
pub struct ContainerSpec {
    pub id: String,
    #[serde(default)]
    pub markup: String,
}

/// Canned response for a live-search URL
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResponseSpec {
    pub url: String,
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default)]
    pub body: String,
    /// Simulate a transport failure instead of responding
    #[serde(default)]
    pub error: Option<String>,
}

/// One scripted interaction
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Click a dropdown's trigger
    Open { control: String },
    /// Type into a dropdown's filter input
    Filter { control: String, query: String },
    /// Click the entry with this label (or value)
    Select { control: String, option: String },
    /// Close a dropdown without choosing
    Dismiss { control: String },
    /// Press Escape in a dropdown
    Escape { control: String },
    /// Type into a page input, addressed by id or name
    Type { input: String, text: String },
    /// Let time pass
    Wait { ms: u64 },
    /// Click the dark mode toggle
    ToggleTheme,
    /// Click the page body
    ClickOutside,
}

impl Fixture {
    /// Load a fixture from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let fixture: Fixture = toml::from_str(content)?;
        Ok(fixture)
    }

    /// Dropdown options with the page locale applied
    pub fn dropdown_options(&self) -> DropdownOptions {
        let mut options = self.dropdown.clone();
        if let Some(locale) = self.page.locale {
            options.locale = locale;
        }
        options
    }

    pub fn locale(&self) -> Locale {
        self.dropdown_options().locale
    }
}
