//! Dark mode toggle with persistence
//!
//! The page carries a `#darkModeToggle` button holding an `<i>` icon. The
//! theme is a `dark-mode` class on `<body>`; the icon shows `bi-moon` in the
//! light theme and `bi-sun` in the dark one. The choice is persisted under
//! the `darkMode` storage key as `enabled` / `disabled`.

use dropsync_core::events::{event_types, Event};
use dropsync_core::store::Storage;
use dropsync_dom::{Document, NodeId};

use crate::error::{Result, WidgetError};

/// Storage key of the persisted theme
pub const STORAGE_KEY: &str = "darkMode";

/// Id of the toggle button
pub const TOGGLE_ID: &str = "darkModeToggle";

/// Body class of the dark theme
pub const DARK_CLASS: &str = "dark-mode";

const LIGHT_ICON: &str = "bi-moon";
const DARK_ICON: &str = "bi-sun";

/// Page theme
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Unknown values read as light
    pub fn from_storage_value(value: Option<&str>) -> Self {
        match value {
            Some("enabled") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn storage_value(self) -> &'static str {
        match self {
            Theme::Light => "disabled",
            Theme::Dark => "enabled",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }
}

/// The dark mode toggle bound to a page
pub struct ThemeToggle<S: Storage> {
    storage: S,
    button: NodeId,
}

impl<S: Storage> ThemeToggle<S> {
    /// Bind to `#darkModeToggle` and apply the persisted theme
    pub fn initialize(doc: &mut Document, storage: S) -> Result<Self> {
        let button = doc
            .get_element_by_id(TOGGLE_ID)
            .ok_or_else(|| WidgetError::MissingElement(format!("#{TOGGLE_ID}")))?;
        let toggle = Self { storage, button };
        let theme = toggle.get_persisted_theme();
        toggle.apply(doc, theme)?;
        tracing::debug!("theme: initialized to {:?}", theme);
        Ok(toggle)
    }

    pub fn button(&self) -> NodeId {
        self.button
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn get_persisted_theme(&self) -> Theme {
        Theme::from_storage_value(self.storage.get_item(STORAGE_KEY).as_deref())
    }

    pub fn set_persisted_theme(&self, theme: Theme) {
        self.storage.set_item(STORAGE_KEY, theme.storage_value());
    }

    /// Theme currently shown by the page
    pub fn current_theme(&self, doc: &Document) -> Theme {
        if doc.has_class(doc.body(), DARK_CLASS) {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    /// Flip the theme and persist the new one
    pub fn toggle(&self, doc: &mut Document) -> Result<Theme> {
        let theme = if doc.toggle_class(doc.body(), DARK_CLASS)? {
            Theme::Dark
        } else {
            Theme::Light
        };
        self.update_icon(doc, theme)?;
        self.set_persisted_theme(theme);
        tracing::debug!("theme: toggled to {:?}", theme);
        Ok(theme)
    }

    /// Toggle on a click inside the button; returns whether it was handled
    pub fn handle_event(&self, doc: &mut Document, event: &Event) -> Result<bool> {
        let target = NodeId::from_raw(event.target);
        if event.event_type == event_types::CLICK && doc.contains(self.button, target) {
            self.toggle(doc)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn apply(&self, doc: &mut Document, theme: Theme) -> Result<()> {
        doc.set_class(doc.body(), DARK_CLASS, theme.is_dark())?;
        self.update_icon(doc, theme)
    }

    fn update_icon(&self, doc: &mut Document, theme: Theme) -> Result<()> {
        let Some(icon) = doc.query_selector_within(self.button, "i")? else {
            tracing::debug!("theme: toggle button has no icon");
            return Ok(());
        };
        let (remove, add) = if theme.is_dark() {
            (LIGHT_ICON, DARK_ICON)
        } else {
            (DARK_ICON, LIGHT_ICON)
        };
        doc.remove_class(icon, remove)?;
        doc.add_class(icon, add)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dropsync_core::store::KVStore;

    fn page() -> (Document, NodeId) {
        let mut doc = Document::new();
        let button = doc.create_element("button");
        doc.set_attribute(button, "id", TOGGLE_ID).unwrap();
        let icon = doc.create_element("i");
        doc.set_attribute(icon, "class", "bi bi-moon").unwrap();
        doc.append_child(button, icon).unwrap();
        doc.append_child(doc.body(), button).unwrap();
        (doc, icon)
    }

    #[test]
    fn test_storage_values() {
        assert_eq!(Theme::from_storage_value(Some("enabled")), Theme::Dark);
        assert_eq!(Theme::from_storage_value(Some("disabled")), Theme::Light);
        assert_eq!(Theme::from_storage_value(Some("yes")), Theme::Light);
        assert_eq!(Theme::from_storage_value(None), Theme::Light);
        assert_eq!(Theme::Dark.toggled().storage_value(), "disabled");
    }

    #[test]
    fn test_initialize_applies_persisted_theme() {
        let (mut doc, icon) = page();
        let store = KVStore::with_entries([(STORAGE_KEY, "enabled")]);
        let toggle = ThemeToggle::initialize(&mut doc, &store).unwrap();
        assert_eq!(toggle.current_theme(&doc), Theme::Dark);
        assert!(doc.has_class(icon, "bi-sun"));
        assert!(!doc.has_class(icon, "bi-moon"));
        assert!(doc.has_class(icon, "bi"));
    }

    #[test]
    fn test_toggle_persists() {
        let (mut doc, icon) = page();
        let store = KVStore::new();
        let toggle = ThemeToggle::initialize(&mut doc, &store).unwrap();
        assert_eq!(toggle.current_theme(&doc), Theme::Light);
        // Initialization alone does not write
        assert!(!store.contains(STORAGE_KEY));

        assert_eq!(toggle.toggle(&mut doc).unwrap(), Theme::Dark);
        assert_eq!(store.get_item(STORAGE_KEY).as_deref(), Some("enabled"));
        assert!(doc.has_class(doc.body(), DARK_CLASS));

        let click = Event::click(icon.to_raw());
        assert!(toggle.handle_event(&mut doc, &click).unwrap());
        assert_eq!(store.get_item(STORAGE_KEY).as_deref(), Some("disabled"));
        assert!(doc.has_class(icon, "bi-moon"));

        // A fresh page picks up the stored value
        let (mut reloaded, _) = page();
        let toggle = ThemeToggle::initialize(&mut reloaded, &store).unwrap();
        assert_eq!(toggle.current_theme(&reloaded), Theme::Light);
    }

    #[test]
    fn test_missing_button() {
        let mut doc = Document::new();
        assert_eq!(
            ThemeToggle::initialize(&mut doc, KVStore::new()).err(),
            Some(WidgetError::MissingElement("#darkModeToggle".to_string()))
        );
    }
}
