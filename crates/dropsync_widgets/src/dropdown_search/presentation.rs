//! Presentation builder: trigger, panel, filter input and entries
//!
//! Markup produced for a control (before the control, in its parent):
//!
//! ```text
//! div.dropdown.w-100
//! ├── button.form-select.dropdown-toggle.text-start   trigger
//! └── div.dropdown-menu.w-100.p-2                     panel
//!     ├── input.form-control.mb-2.dropdown-search     filter
//!     └── div.dropdown-options
//!         └── label.dropdown-item.d-flex.align-items-center   one per option
//!             ├── input.form-check-input.me-2 (checkbox | radio)
//!             └── "label text"
//! ```

use dropsync_dom::{Document, NodeId};

use super::{AdaptedControl, DropdownSearch};
use crate::config::DropdownOptions;
use crate::error::{Result, WidgetError};

/// Class toggled on the panel and trigger while open
pub const OPEN_CLASS: &str = "show";

/// Class on entries whose option is selected
pub const ACTIVE_CLASS: &str = "active";

/// The two nodes of one entry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryNodes {
    pub label: NodeId,
    pub input: NodeId,
}

/// Nodes created for a widget
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    pub wrapper: NodeId,
    pub trigger: NodeId,
    pub panel: NodeId,
    pub search: NodeId,
    pub list: NodeId,
    pub entries: Vec<EntryNodes>,
}

impl Surface {
    /// Whether `node` lies inside the widget
    pub fn contains(&self, doc: &Document, node: NodeId) -> bool {
        doc.contains(self.wrapper, node)
    }

    /// Index of the entry containing `node`
    pub fn entry_at(&self, doc: &Document, node: NodeId) -> Option<usize> {
        if !doc.contains(self.list, node) {
            return None;
        }
        self.entries
            .iter()
            .position(|entry| doc.contains(entry.label, node))
    }

    /// Index of the entry whose checkbox/radio is `node`
    pub fn entry_for_input(&self, node: NodeId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.input == node)
    }
}

/// Build the widget markup and insert it before the control
pub fn render(doc: &mut Document, adapted: &AdaptedControl, options: &DropdownOptions) -> Result<Surface> {
    let control = adapted.control;
    let parent = doc
        .parent(control)
        .ok_or_else(|| WidgetError::Unenhanceable(format!("{control} has no parent")))?;

    let wrapper = doc.create_element("div");
    doc.set_attribute(wrapper, "class", "dropdown w-100")?;

    let trigger = doc.create_element("button");
    doc.set_attribute(trigger, "type", "button")?;
    doc.set_attribute(trigger, "class", "form-select dropdown-toggle text-start")?;
    doc.set_attribute(trigger, "data-bs-toggle", "dropdown")?;
    doc.set_attribute(trigger, "aria-haspopup", "listbox")?;
    doc.set_attribute(trigger, "aria-expanded", "false")?;
    doc.append_child(wrapper, trigger)?;

    let panel = doc.create_element("div");
    doc.set_attribute(panel, "class", "dropdown-menu w-100 p-2")?;
    doc.set_attribute(panel, "role", "listbox")?;
    if adapted.multiple {
        doc.set_attribute(panel, "aria-multiselectable", "true")?;
    }
    doc.set_style(panel, "max-height", "300px")?;
    doc.set_style(panel, "overflow-y", "auto")?;
    doc.append_child(wrapper, panel)?;

    let search = doc.create_element("input");
    doc.set_attribute(search, "type", "text")?;
    doc.set_attribute(search, "class", "form-control mb-2 dropdown-search")?;
    doc.set_attribute(search, "placeholder", options.search_placeholder_text())?;
    doc.set_attribute(search, "aria-label", options.locale.search_label())?;
    doc.append_child(panel, search)?;

    let list = doc.create_element("div");
    doc.set_attribute(list, "class", "dropdown-options")?;
    doc.append_child(panel, list)?;

    let input_type = if adapted.multiple { "checkbox" } else { "radio" };
    let mut entries = Vec::with_capacity(adapted.options.len());
    for option in &adapted.options {
        let label = doc.create_element("label");
        doc.set_attribute(label, "class", "dropdown-item d-flex align-items-center")?;
        let input = doc.create_element("input");
        doc.set_attribute(input, "type", input_type)?;
        doc.set_attribute(input, "class", "form-check-input me-2")?;
        doc.set_checked(input, option.selected)?;
        doc.append_child(label, input)?;
        doc.append_text(label, &option.label)?;
        doc.append_child(list, label)?;
        entries.push(EntryNodes { label, input });
    }

    doc.insert_before(parent, wrapper, Some(control))?;

    Ok(Surface {
        wrapper,
        trigger,
        panel,
        search,
        list,
        entries,
    })
}

impl DropdownSearch {
    /// Set the trigger text from the current selection
    ///
    /// Selected labels joined with `", "` in option order, or the
    /// placeholder when nothing is selected.
    pub fn update_trigger_label(&self, doc: &mut Document) {
        let selected = self.selected_labels();
        let text = if selected.is_empty() {
            self.placeholder.clone()
        } else {
            selected.join(", ")
        };
        if let Err(e) = doc.set_text_content(self.surface.trigger, &text) {
            tracing::warn!("dropdown search: trigger label: {}", e);
        }
    }

    /// Show only entries whose label contains `query`, ignoring case
    ///
    /// Hidden entries stay in the document with `display: none`. Selection is
    /// not touched.
    pub fn apply_filter(&mut self, doc: &mut Document, query: &str) {
        self.filter_text = query.to_string();
        let mut shown = 0;
        for entry in &mut self.entries {
            entry.visible = self.options[entry.index].matches(query);
            shown += usize::from(entry.visible);
            let label = self.surface.entries[entry.index].label;
            let display = if entry.visible { "" } else { "none" };
            if let Err(e) = doc.set_style(label, "display", display) {
                tracing::warn!("dropdown search: filter: {}", e);
            }
        }
        tracing::trace!(
            "dropdown search: filter {:?} shows {}/{}",
            query,
            shown,
            self.entries.len()
        );
    }

    /// Re-render highlight and input checkedness from the option flags
    pub(crate) fn refresh_entries(&mut self, doc: &mut Document) {
        for entry in &mut self.entries {
            let selected = self.options[entry.index].selected;
            entry.highlighted = selected;
            let nodes = self.surface.entries[entry.index];
            let result = doc
                .set_class(nodes.label, ACTIVE_CLASS, selected)
                .and_then(|()| doc.set_checked(nodes.input, selected))
                .and_then(|()| {
                    doc.set_attribute(nodes.label, "aria-selected", if selected { "true" } else { "false" })
                });
            if let Err(e) = result {
                tracing::warn!("dropdown search: entry {}: {}", entry.index, e);
            }
        }
    }

    /// Mirror the open state onto the panel and trigger
    pub(crate) fn sync_open_state(&self, doc: &mut Document, open: bool) {
        let expanded = if open { "true" } else { "false" };
        let result = doc
            .set_class(self.surface.panel, OPEN_CLASS, open)
            .and_then(|()| doc.set_class(self.surface.trigger, OPEN_CLASS, open))
            .and_then(|()| doc.set_attribute(self.surface.trigger, "aria-expanded", expanded));
        if let Err(e) = result {
            tracing::warn!("dropdown search: open state: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dropdown_search::{adapt, SelectOption};

    fn mounted_control(doc: &mut Document, multiple: bool) -> NodeId {
        let form = doc.create_element("form");
        doc.append_child(doc.body(), form).unwrap();
        let select = doc.create_element("select");
        if multiple {
            doc.set_attribute(select, "multiple", "").unwrap();
        }
        for text in ["Apple", "Banana"] {
            let option = doc.create_element("option");
            doc.append_text(option, text).unwrap();
            doc.append_child(select, option).unwrap();
        }
        doc.append_child(form, select).unwrap();
        select
    }

    #[test]
    fn test_render_structure() {
        let mut doc = Document::new();
        let select = mounted_control(&mut doc, false);
        let adapted = adapt(&doc, select).unwrap();
        let surface = render(&mut doc, &adapted, &DropdownOptions::default()).unwrap();

        // Mounted right before the control
        let form = doc.parent(select).unwrap();
        assert_eq!(doc.children(form), &[surface.wrapper, select]);

        assert_eq!(doc.attribute(surface.trigger, "type").as_deref(), Some("button"));
        assert!(doc.matches(surface.trigger, ".form-select.dropdown-toggle.text-start").unwrap());
        assert!(doc.matches(surface.panel, "div.dropdown-menu.w-100.p-2").unwrap());
        assert!(!doc.has_attribute(surface.panel, "aria-multiselectable"));
        assert_eq!(doc.style(surface.panel, "max-height").as_deref(), Some("300px"));
        assert_eq!(doc.attribute(surface.search, "placeholder").as_deref(), Some("Search..."));

        assert_eq!(surface.entries.len(), 2);
        let first = surface.entries[0];
        assert_eq!(doc.attribute(first.input, "type").as_deref(), Some("radio"));
        assert!(!doc.has_attribute(first.input, "name"));
        assert_eq!(doc.text_content(first.label), "Apple");
        assert_eq!(surface.entry_at(&doc, first.input), Some(0));
        assert_eq!(surface.entry_at(&doc, surface.search), None);
        assert_eq!(surface.entry_for_input(first.input), Some(0));
        assert_eq!(surface.entry_for_input(first.label), None);
    }

    #[test]
    fn test_render_multi_uses_checkboxes() {
        let mut doc = Document::new();
        let select = mounted_control(&mut doc, true);
        let mut adapted = adapt(&doc, select).unwrap();
        adapted.options[1] = SelectOption {
            selected: true,
            ..adapted.options[1].clone()
        };
        let surface = render(&mut doc, &adapted, &DropdownOptions::default()).unwrap();
        assert_eq!(
            doc.attribute(surface.panel, "aria-multiselectable").as_deref(),
            Some("true")
        );
        assert_eq!(doc.attribute(surface.entries[0].input, "type").as_deref(), Some("checkbox"));
        assert!(!doc.checked(surface.entries[0].input));
        assert!(doc.checked(surface.entries[1].input));
    }

    #[test]
    fn test_render_requires_parent() {
        let mut doc = Document::new();
        let select = doc.create_element("select");
        for _ in 0..2 {
            let option = doc.create_element("option");
            doc.set_selected(option, true).unwrap();
            doc.append_child(select, option).unwrap();
        }
        let adapted = adapt(&doc, select).unwrap();
        assert!(matches!(
            render(&mut doc, &adapted, &DropdownOptions::default()),
            Err(WidgetError::Unenhanceable(_))
        ));

        // Nothing was written to the control
        assert_eq!(doc.selected_options(select).unwrap().len(), 2);
        assert!(!doc.has_class(select, "d-none"));
    }
}
