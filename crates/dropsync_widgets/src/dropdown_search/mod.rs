//! Dropdown search - a searchable dropdown synthesized over a native `<select>`
//!
//! The native control stays in the document, hidden, and remains the
//! authoritative form value. The widget renders a trigger button and a panel
//! with a filter input and one checkbox/radio entry per option, and keeps the
//! three in sync:
//!
//! - [`adapter`] reads the control's options, then hides the control
//! - [`presentation`] builds the trigger and panel, and re-renders text,
//!   visibility and highlight
//! - [`sync`] owns the open/closed state machine and writes selections back
//!   to the native options
//!
//! # Example
//!
//! ```rust
//! use dropsync_dom::Document;
//! use dropsync_widgets::dropdown_search;
//! use dropsync_widgets::{DropdownOptions, WidgetContext};
//!
//! let mut doc = Document::new();
//! let select = doc.create_element("select");
//! doc.set_attribute(select, "class", "form-select").unwrap();
//! for fruit in ["Apple", "Banana"] {
//!     let option = doc.create_element("option");
//!     doc.append_text(option, fruit).unwrap();
//!     doc.append_child(select, option).unwrap();
//! }
//! doc.append_child(doc.body(), select).unwrap();
//!
//! let mut ctx = WidgetContext::new();
//! let mut widgets = dropdown_search::initialize(&mut doc, &mut ctx, &DropdownOptions::default());
//! let widget = &mut widgets[0];
//!
//! widget.select_entry(&mut doc, &mut ctx, 1);
//! assert_eq!(widget.trigger_text(&doc), "Banana");
//! assert_eq!(doc.value(select).unwrap(), "Banana");
//! ```

pub mod adapter;
pub mod presentation;
pub mod sync;

use dropsync_dom::{Document, NodeId};

use crate::config::DropdownOptions;
use crate::context::WidgetContext;
use crate::error::{Result, WidgetError};
use crate::widget::WidgetId;

pub use adapter::{adapt, AdaptedControl};
pub use presentation::{render, EntryNodes, Surface};
pub use sync::{events, states};

/// Marker attribute set on controls that already have a widget
pub const ENHANCED_ATTRIBUTE: &str = "data-dropdown-search";

/// Controls carrying this attribute belong to the search-select bootstrap
pub const CHOICES_ATTRIBUTE: &str = "data-choices";

/// One option of the native control
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    /// Submitted value
    pub value: String,
    /// Display label (trimmed text content)
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected: false,
        }
    }

    /// Case-insensitive substring match against the label
    pub fn matches(&self, query: &str) -> bool {
        self.label.to_lowercase().contains(&query.to_lowercase())
    }
}

/// Rendered entry bound to the option at the same index
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub index: usize,
    pub visible: bool,
    /// Mirrors the option's `selected`
    pub highlighted: bool,
}

/// A dropdown search widget bound to one native control
#[derive(Debug)]
pub struct DropdownSearch {
    id: WidgetId,
    control: NodeId,
    multiple: bool,
    options: Vec<SelectOption>,
    option_nodes: Vec<NodeId>,
    entries: Vec<Entry>,
    filter_text: String,
    surface: Surface,
    placeholder: String,
}

impl DropdownSearch {
    /// Enhance one native control
    ///
    /// Fails when the control is not a `<select>`, has already been
    /// enhanced, or has no parent to mount the widget into. The control is
    /// only written to once the widget markup is mounted.
    pub fn enhance(
        doc: &mut Document,
        ctx: &mut WidgetContext,
        control: NodeId,
        options: &DropdownOptions,
    ) -> Result<Self> {
        if doc.has_attribute(control, ENHANCED_ATTRIBUTE) {
            return Err(WidgetError::Unenhanceable(format!(
                "{control} is already enhanced"
            )));
        }
        if doc.parent(control).is_none() {
            return Err(WidgetError::Unenhanceable(format!(
                "{control} has no parent"
            )));
        }

        let adapted = adapt(doc, control)?;
        let surface = render(doc, &adapted, options)?;
        adapted.apply(doc, &options.hidden_class)?;
        let id = ctx.register_widget_with_fsm(sync::create_fsm());
        doc.set_attribute(control, ENHANCED_ATTRIBUTE, "")?;

        let entries = (0..adapted.options.len())
            .map(|index| Entry {
                index,
                visible: true,
                highlighted: adapted.options[index].selected,
            })
            .collect();

        let mut widget = Self {
            id,
            control,
            multiple: adapted.multiple,
            options: adapted.options,
            option_nodes: adapted.option_nodes,
            entries,
            filter_text: String::new(),
            surface,
            placeholder: options.placeholder_text().to_string(),
        };
        widget.update_trigger_label(doc);
        widget.refresh_entries(doc);

        tracing::debug!(
            "dropdown search: enhanced {} ({} options, multiple: {})",
            control,
            widget.options.len(),
            widget.multiple
        );
        Ok(widget)
    }

    /// Get the widget ID
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// The native control this widget mirrors
    pub fn control(&self) -> NodeId {
        self.control
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    /// Nodes created for this widget
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Current trigger text
    pub fn trigger_text(&self, doc: &Document) -> String {
        doc.text_content(self.surface.trigger)
    }

    /// Labels of the selected options, in option order
    pub fn selected_labels(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.label.as_str())
            .collect()
    }

    /// Values of the selected options, in option order
    pub fn selected_values(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value.as_str())
            .collect()
    }
}

/// Enhance every matching control in the document
///
/// Controls marked `data-choices` or already enhanced are skipped. A failure
/// on one control is logged and does not affect the others.
pub fn initialize(
    doc: &mut Document,
    ctx: &mut WidgetContext,
    options: &DropdownOptions,
) -> Vec<DropdownSearch> {
    let controls = match doc.query_selector_all(&options.selector) {
        Ok(controls) => controls,
        Err(e) => {
            tracing::warn!("dropdown search: {}", e);
            return Vec::new();
        }
    };

    let mut widgets = Vec::with_capacity(controls.len());
    for control in controls {
        if doc.has_attribute(control, CHOICES_ATTRIBUTE) {
            tracing::debug!("dropdown search: {} left to search-select", control);
            continue;
        }
        if doc.has_attribute(control, ENHANCED_ATTRIBUTE) {
            tracing::debug!("dropdown search: {} already enhanced", control);
            continue;
        }
        match DropdownSearch::enhance(doc, ctx, control, options) {
            Ok(widget) => widgets.push(widget),
            Err(e) => tracing::warn!("dropdown search: skipping {}: {}", control, e),
        }
    }

    tracing::debug!("dropdown search: {} widgets initialized", widgets.len());
    widgets
}
