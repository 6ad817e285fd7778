//! Search-select bootstrap for `select[data-choices]`
//!
//! Controls marked `data-choices` are handed to a third-party searchable
//! select through [`SearchSelectBackend`]. After attaching, the backend's
//! search input (an `input.choices__input` inside the container placed right
//! after the control) gets an accessible name.

use dropsync_dom::{Document, NodeId};

use crate::config::Locale;
use crate::error::{Result, WidgetError};

/// Selector of the controls this bootstrap owns
pub const SELECTOR: &str = "select[data-choices]";

/// Search input created by the backend
pub const SEARCH_INPUT_SELECTOR: &str = "input.choices__input";

/// Options passed to the backend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchSelectConfig {
    pub search_enabled: bool,
    /// Keep the control's option order when false
    pub should_sort: bool,
}

impl Default for SearchSelectConfig {
    fn default() -> Self {
        Self {
            search_enabled: true,
            should_sort: false,
        }
    }
}

/// A searchable-select implementation
pub trait SearchSelectBackend {
    /// Enhance `select`, placing the backend's container as its next
    /// element sibling
    fn attach(&mut self, doc: &mut Document, select: NodeId, config: &SearchSelectConfig) -> Result<()>;
}

/// Attach the backend to every `select[data-choices]`
///
/// Returns the controls that were attached. A backend failure is logged and
/// that control skipped.
pub fn initialize(
    doc: &mut Document,
    backend: &mut dyn SearchSelectBackend,
    locale: Locale,
) -> Vec<NodeId> {
    let selects = match doc.query_selector_all(SELECTOR) {
        Ok(selects) => selects,
        Err(e) => {
            tracing::warn!("search-select: {}", e);
            return Vec::new();
        }
    };

    let config = SearchSelectConfig::default();
    let mut attached = Vec::with_capacity(selects.len());
    for select in selects {
        if let Err(e) = backend.attach(doc, select, &config) {
            tracing::warn!("search-select: skipping {}: {}", select, e);
            continue;
        }
        label_search_input(doc, select, locale);
        attached.push(select);
    }
    tracing::debug!("search-select: {} controls attached", attached.len());
    attached
}

fn label_search_input(doc: &mut Document, select: NodeId, locale: Locale) {
    let Some(container) = doc.next_element_sibling(select) else {
        return;
    };
    match doc.query_selector_within(container, SEARCH_INPUT_SELECTOR) {
        Ok(Some(input)) => {
            if let Err(e) = doc.set_attribute(input, "aria-label", locale.search_label()) {
                tracing::warn!("search-select: {}", e);
            }
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("search-select: {}", e),
    }
}

/// Markup-only backend
///
/// Produces the container structure of the Choices.js library without any
/// behavior, so a page can be previewed offline:
///
/// ```text
/// div.choices[data-type=select-one|select-multiple]
/// ├── input.choices__input.choices__input--cloned[type=search]   when search is enabled
/// └── div.choices__list.choices__list--dropdown
///     └── div.choices__item.choices__item--choice[data-value]    one per option
/// ```
#[derive(Debug, Default)]
pub struct MarkupBackend;

impl MarkupBackend {
    pub fn new() -> Self {
        Self
    }
}

impl SearchSelectBackend for MarkupBackend {
    fn attach(&mut self, doc: &mut Document, select: NodeId, config: &SearchSelectConfig) -> Result<()> {
        if doc.attribute(select, "data-choice").as_deref() == Some("active") {
            return Err(WidgetError::Backend(format!("{select} is already attached")));
        }
        let parent = doc
            .parent(select)
            .ok_or_else(|| WidgetError::Backend(format!("{select} has no parent")))?;

        let kind = if doc.is_multiple(select) {
            "select-multiple"
        } else {
            "select-one"
        };
        let container = doc.create_element("div");
        doc.set_attribute(container, "class", "choices")?;
        doc.set_attribute(container, "data-type", kind)?;

        if config.search_enabled {
            let input = doc.create_element("input");
            doc.set_attribute(input, "type", "search")?;
            doc.set_attribute(input, "class", "choices__input choices__input--cloned")?;
            doc.append_child(container, input)?;
        }

        let list = doc.create_element("div");
        doc.set_attribute(list, "class", "choices__list choices__list--dropdown")?;
        let mut items: Vec<(String, String, bool)> = doc
            .options(select)?
            .into_iter()
            .map(|o| (doc.option_label(o), doc.option_value(o), doc.selected(o)))
            .collect();
        if config.should_sort {
            items.sort_by(|a, b| a.0.cmp(&b.0));
        }
        for (label, value, selected) in items {
            let item = doc.create_element("div");
            doc.set_attribute(item, "class", "choices__item choices__item--choice")?;
            if selected {
                doc.add_class(item, "is-selected")?;
            }
            doc.set_attribute(item, "data-value", &value)?;
            doc.append_text(item, &label)?;
            doc.append_child(list, item)?;
        }
        doc.append_child(container, list)?;

        let siblings = doc.children(parent);
        let next = siblings
            .iter()
            .position(|&c| c == select)
            .and_then(|pos| siblings.get(pos + 1).copied());
        doc.insert_before(parent, container, next)?;

        doc.add_class(select, "choices__input")?;
        doc.set_attribute(select, "hidden", "")?;
        doc.set_attribute(select, "data-choice", "active")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(doc: &mut Document, marked: bool) -> NodeId {
        let select = doc.create_element("select");
        if marked {
            doc.set_attribute(select, "data-choices", "").unwrap();
        }
        for (text, value) in [("Zebra", "z"), ("Ant", "a")] {
            let option = doc.create_element("option");
            doc.set_attribute(option, "value", value).unwrap();
            doc.append_text(option, text).unwrap();
            doc.append_child(select, option).unwrap();
        }
        doc.append_child(doc.body(), select).unwrap();
        select
    }

    struct FailingBackend;

    impl SearchSelectBackend for FailingBackend {
        fn attach(&mut self, _: &mut Document, select: NodeId, _: &SearchSelectConfig) -> Result<()> {
            Err(WidgetError::Backend(format!("refused {select}")))
        }
    }

    #[test]
    fn test_initialize_labels_search_input() {
        let mut doc = Document::new();
        let select = page(&mut doc, true);
        let plain = page(&mut doc, false);

        let attached = initialize(&mut doc, &mut MarkupBackend::new(), Locale::Pl);
        assert_eq!(attached, vec![select]);

        let container = doc.next_element_sibling(select).unwrap();
        assert!(doc.has_class(container, "choices"));
        let input = doc
            .query_selector_within(container, SEARCH_INPUT_SELECTOR)
            .unwrap()
            .unwrap();
        assert_eq!(doc.attribute(input, "aria-label").as_deref(), Some("Wyszukaj"));

        // Unsorted: option order is kept
        let items = doc
            .query_selector_all_within(container, ".choices__item")
            .unwrap();
        let values: Vec<_> = items
            .iter()
            .map(|&i| doc.attribute(i, "data-value").unwrap())
            .collect();
        assert_eq!(values, vec!["z", "a"]);

        assert!(!doc.has_class(plain, "choices__input"));
        assert!(doc.is_connected(select));
    }

    #[test]
    fn test_second_initialize_skips_attached() {
        let mut doc = Document::new();
        page(&mut doc, true);
        let mut backend = MarkupBackend::new();
        assert_eq!(initialize(&mut doc, &mut backend, Locale::En).len(), 1);
        assert!(initialize(&mut doc, &mut backend, Locale::En).is_empty());
        assert_eq!(doc.query_selector_all("div.choices").unwrap().len(), 1);
    }

    #[test]
    fn test_backend_failure_is_skipped() {
        let mut doc = Document::new();
        page(&mut doc, true);
        assert!(initialize(&mut doc, &mut FailingBackend, Locale::En).is_empty());
    }
}
