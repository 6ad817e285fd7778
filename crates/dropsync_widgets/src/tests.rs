//! Cross-module behavior of the dropdown search on whole pages

use dropsync_core::events::{Event, KeyCode};
use dropsync_dom::{Document, NodeId};

use crate::config::{DropdownOptions, Locale};
use crate::context::WidgetContext;
use crate::dropdown_search::{self, states, DropdownSearch, ENHANCED_ATTRIBUTE};

const FRUITS: [&str; 3] = ["Apple", "Banana", "Cherry"];

struct Page {
    doc: Document,
    ctx: WidgetContext,
    form: NodeId,
    select: NodeId,
}

impl Page {
    /// `<form><select name="fruit" class="form-select">` with the three fruits
    fn fruits(multiple: bool) -> Self {
        let mut doc = Document::new();
        let form = doc.create_element("form");
        doc.append_child(doc.body(), form).unwrap();
        let select = add_select(&mut doc, form, "fruit", multiple, &FRUITS);
        Self {
            doc,
            ctx: WidgetContext::new(),
            form,
            select,
        }
    }

    fn init(&mut self) -> Vec<DropdownSearch> {
        dropdown_search::initialize(&mut self.doc, &mut self.ctx, &DropdownOptions::default())
    }

    fn widget(&mut self) -> DropdownSearch {
        let mut widgets = self.init();
        assert_eq!(widgets.len(), 1);
        widgets.remove(0)
    }

    fn native_selected(&self) -> Vec<bool> {
        self.doc
            .options(self.select)
            .unwrap()
            .into_iter()
            .map(|o| self.doc.selected(o))
            .collect()
    }
}

fn add_select(doc: &mut Document, parent: NodeId, name: &str, multiple: bool, labels: &[&str]) -> NodeId {
    let select = doc.create_element("select");
    doc.set_attribute(select, "name", name).unwrap();
    doc.set_attribute(select, "class", "form-select").unwrap();
    if multiple {
        doc.set_attribute(select, "multiple", "").unwrap();
    }
    for label in labels {
        let option = doc.create_element("option");
        doc.set_attribute(option, "value", &label.to_lowercase()).unwrap();
        doc.append_text(option, label).unwrap();
        doc.append_child(select, option).unwrap();
    }
    doc.append_child(parent, select).unwrap();
    select
}

fn flags(widget: &DropdownSearch) -> Vec<bool> {
    widget.options().iter().map(|o| o.selected).collect()
}

fn visible(widget: &DropdownSearch) -> Vec<bool> {
    widget.entries().iter().map(|e| e.visible).collect()
}

/// Deterministic index sequence for property checks
fn index_sequence(seed: u64, len: usize, bound: usize) -> Vec<usize> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) as usize) % bound
        })
        .collect()
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_selection_mirrors_native_control() {
    for multiple in [false, true] {
        for seed in 0..8 {
            let mut page = Page::fruits(multiple);
            let mut widget = page.widget();
            for index in index_sequence(seed, 12, FRUITS.len()) {
                widget.select_entry(&mut page.doc, &mut page.ctx, index);
                assert_eq!(flags(&widget), page.native_selected());
                let highlighted: Vec<_> = widget.entries().iter().map(|e| e.highlighted).collect();
                assert_eq!(highlighted, flags(&widget));
            }
        }
    }
}

#[test]
fn test_single_select_exclusive() {
    for seed in 0..8 {
        let mut page = Page::fruits(false);
        let mut widget = page.widget();
        for index in index_sequence(seed, 10, FRUITS.len()) {
            widget.select_entry(&mut page.doc, &mut page.ctx, index);
            assert_eq!(flags(&widget).iter().filter(|&&s| s).count(), 1);
            assert!(widget.options()[index].selected);
            assert_eq!(page.doc.selected_options(page.select).unwrap().len(), 1);
        }
    }
}

#[test]
fn test_filter_is_non_destructive() {
    let mut page = Page::fruits(true);
    let mut widget = page.widget();
    widget.select_entry(&mut page.doc, &mut page.ctx, 1);
    let before = widget.options().to_vec();
    let entry_count = page.doc.children(widget.surface().list).len();

    for query in ["an", "APPLE", "zzz", "", "e", " "] {
        widget.apply_filter(&mut page.doc, query);
        assert_eq!(widget.options(), before.as_slice());
        assert_eq!(page.doc.children(widget.surface().list).len(), entry_count);
        assert_eq!(page.native_selected(), vec![false, true, false]);
    }
}

#[test]
fn test_filter_correctness() {
    let mut page = Page::fruits(false);
    let mut widget = page.widget();
    for query in ["an", "A", "rr", "", "cherry", "x", "PL"] {
        widget.apply_filter(&mut page.doc, query);
        assert_eq!(widget.filter_text(), query);
        for (entry, option) in widget.entries().iter().zip(widget.options()) {
            let expected = option.label.to_lowercase().contains(&query.to_lowercase());
            assert_eq!(entry.visible, expected, "{query:?} vs {}", option.label);

            let label = widget.surface().entries[entry.index].label;
            let display = page.doc.style(label, "display");
            assert_eq!(display.is_none(), expected);
        }
    }
}

#[test]
fn test_trigger_label_idempotent() {
    let mut page = Page::fruits(true);
    let mut widget = page.widget();
    for index in [0, 2] {
        widget.select_entry(&mut page.doc, &mut page.ctx, index);
        widget.update_trigger_label(&mut page.doc);
        let first = widget.trigger_text(&page.doc);
        widget.update_trigger_label(&mut page.doc);
        assert_eq!(widget.trigger_text(&page.doc), first);
        assert_eq!(page.doc.children(widget.surface().trigger).len(), 1);
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_single_select_scenario() {
    let mut page = Page::fruits(false);
    let mut widget = page.widget();
    assert_eq!(widget.trigger_text(&page.doc), "Choose...");

    widget.open(&mut page.doc, &mut page.ctx);
    widget.select_entry(&mut page.doc, &mut page.ctx, 1);
    assert_eq!(widget.trigger_text(&page.doc), "Banana");
    assert_eq!(page.ctx.get_fsm_state(widget.id()), Some(states::CLOSED));
    assert!(!page.doc.has_class(widget.surface().panel, "show"));
}

#[test]
fn test_multi_select_scenario() {
    let mut page = Page::fruits(true);
    let mut widget = page.widget();
    widget.open(&mut page.doc, &mut page.ctx);

    widget.select_entry(&mut page.doc, &mut page.ctx, 2);
    widget.select_entry(&mut page.doc, &mut page.ctx, 0);
    // Option order, not click order
    assert_eq!(widget.trigger_text(&page.doc), "Apple, Cherry");
    assert!(widget.is_open(&page.ctx));
    assert_eq!(
        page.doc.attribute(widget.surface().trigger, "aria-expanded").as_deref(),
        Some("true")
    );
}

#[test]
fn test_filter_scenario() {
    let mut page = Page::fruits(false);
    let mut widget = page.widget();

    widget.apply_filter(&mut page.doc, "an");
    // "apple" has no "an"
    assert_eq!(visible(&widget), vec![false, true, false]);

    widget.apply_filter(&mut page.doc, "");
    assert_eq!(visible(&widget), vec![true, true, true]);
    for entry in &widget.surface().entries {
        assert_eq!(page.doc.style(entry.label, "display"), None);
    }
}

#[test]
fn test_multi_toggle_restores_initial_state() {
    let mut page = Page::fruits(true);
    let mut widget = page.widget();
    let initial = flags(&widget);

    widget.select_entry(&mut page.doc, &mut page.ctx, 0);
    assert_eq!(widget.trigger_text(&page.doc), "Apple");
    widget.select_entry(&mut page.doc, &mut page.ctx, 0);

    assert_eq!(flags(&widget), initial);
    assert_eq!(page.native_selected(), initial);
    assert_eq!(widget.trigger_text(&page.doc), widget.placeholder());
}

// =============================================================================
// Initialization
// =============================================================================

#[test]
fn test_initialize_twice_creates_no_second_widget() {
    let mut page = Page::fruits(false);
    assert_eq!(page.init().len(), 1);
    assert!(page.init().is_empty());
    assert_eq!(page.doc.query_selector_all("div.dropdown").unwrap().len(), 1);
    assert_eq!(page.ctx.widget_count(), 1);
    assert!(page.doc.has_attribute(page.select, ENHANCED_ATTRIBUTE));
}

#[test]
fn test_choices_controls_are_left_alone() {
    let mut page = Page::fruits(false);
    let other = add_select(&mut page.doc, page.form, "tags", false, &["Red"]);
    page.doc.set_attribute(other, "data-choices", "").unwrap();

    let widgets = page.init();
    assert_eq!(widgets.len(), 1);
    assert_eq!(widgets[0].control(), page.select);
    assert!(!page.doc.has_class(other, "d-none"));
}

#[test]
fn test_detached_control_is_skipped() {
    let mut page = Page::fruits(false);
    let detached = page.doc.create_element("select");
    page.doc.set_attribute(detached, "class", "form-select").unwrap();

    // Only connected nodes are found by the scan, so enhance it directly
    let result = DropdownSearch::enhance(
        &mut page.doc,
        &mut page.ctx,
        detached,
        &DropdownOptions::default(),
    );
    assert!(result.is_err());
    assert!(!page.doc.has_class(detached, "d-none"));
    assert_eq!(page.init().len(), 1);
}

#[test]
fn test_empty_control_shows_placeholder() {
    let mut doc = Document::new();
    let body = doc.body();
    let select = add_select(&mut doc, body, "none", false, &[]);
    let mut ctx = WidgetContext::new();
    let options = DropdownOptions::default().locale(Locale::Pl);
    let widgets = dropdown_search::initialize(&mut doc, &mut ctx, &options);
    assert_eq!(widgets.len(), 1);
    assert!(widgets[0].entries().is_empty());
    assert_eq!(widgets[0].trigger_text(&doc), "Wybierz...");
    assert!(doc.has_class(select, "d-none"));
    assert_eq!(
        doc.attribute(widgets[0].surface().search, "placeholder").as_deref(),
        Some("Szukaj...")
    );
}

#[test]
fn test_preselected_option_labels_trigger() {
    let mut page = Page::fruits(false);
    let cherry = page.doc.options(page.select).unwrap()[2];
    page.doc.set_selected(cherry, true).unwrap();
    let widget = page.widget();
    assert_eq!(widget.trigger_text(&page.doc), "Cherry");
    let entry = widget.surface().entries[2];
    assert!(page.doc.checked(entry.input));
    assert!(page.doc.has_class(entry.label, "active"));
}

// =============================================================================
// Event routing
// =============================================================================

#[test]
fn test_click_trigger_toggles_and_focuses() {
    let mut page = Page::fruits(false);
    let mut widget = page.widget();
    let trigger = widget.surface().trigger;
    let search = widget.surface().search;

    assert!(widget.handle_event(&mut page.doc, &mut page.ctx, &Event::click(trigger.to_raw())));
    assert!(widget.is_open(&page.ctx));
    assert_eq!(page.doc.active_element(), Some(search));

    assert!(widget.handle_event(&mut page.doc, &mut page.ctx, &Event::click(trigger.to_raw())));
    assert!(!widget.is_open(&page.ctx));
}

#[test]
fn test_typing_filters_entries() {
    let mut page = Page::fruits(false);
    let mut widget = page.widget();
    let search = widget.surface().search;
    let typed = Event::text_input(search.to_raw(), "err");
    assert!(widget.handle_event(&mut page.doc, &mut page.ctx, &typed));
    assert_eq!(page.doc.value(search).unwrap(), "err");
    assert_eq!(visible(&widget), vec![false, false, true]);
}

#[test]
fn test_entry_change_selects() {
    let mut page = Page::fruits(false);
    let mut widget = page.widget();
    widget.open(&mut page.doc, &mut page.ctx);
    let entry = widget.surface().entries[2];
    let text = *page.doc.children(entry.label).last().unwrap();

    // The click is consumed and the input's change selects
    assert!(widget.handle_event(&mut page.doc, &mut page.ctx, &Event::click(text.to_raw())));
    assert_eq!(flags(&widget), vec![false, false, false]);
    assert!(widget.is_open(&page.ctx));

    assert!(widget.handle_event(&mut page.doc, &mut page.ctx, &Event::change(entry.input.to_raw())));
    assert_eq!(page.doc.value(page.select).unwrap(), "cherry");
    assert!(!widget.is_open(&page.ctx));

    // A change on the label itself is not an entry input
    assert!(!widget.handle_event(&mut page.doc, &mut page.ctx, &Event::change(entry.label.to_raw())));
}

#[test]
fn test_checkbox_click_then_change_toggles_once() {
    let mut page = Page::fruits(true);
    let mut widget = page.widget();
    widget.open(&mut page.doc, &mut page.ctx);
    let input = widget.surface().entries[0].input;

    // One user toggle: click on the checkbox, then its change
    widget.handle_event(&mut page.doc, &mut page.ctx, &Event::click(input.to_raw()));
    widget.handle_event(&mut page.doc, &mut page.ctx, &Event::change(input.to_raw()));
    assert_eq!(flags(&widget), vec![true, false, false]);
    assert_eq!(page.native_selected(), vec![true, false, false]);
    assert_eq!(widget.trigger_text(&page.doc), "Apple");
    assert!(widget.is_open(&page.ctx));

    widget.handle_event(&mut page.doc, &mut page.ctx, &Event::click(input.to_raw()));
    widget.handle_event(&mut page.doc, &mut page.ctx, &Event::change(input.to_raw()));
    assert_eq!(flags(&widget), vec![false, false, false]);
    assert_eq!(widget.trigger_text(&page.doc), "Choose...");
}

#[test]
fn test_outside_click_and_escape_keep_selection() {
    let mut page = Page::fruits(true);
    let mut widget = page.widget();
    widget.open(&mut page.doc, &mut page.ctx);
    widget.select_entry(&mut page.doc, &mut page.ctx, 1);

    let outside = page.doc.body();
    assert!(!widget.handle_event(&mut page.doc, &mut page.ctx, &Event::click(outside.to_raw())));
    assert!(!widget.is_open(&page.ctx));
    assert_eq!(page.native_selected(), vec![false, true, false]);

    widget.open(&mut page.doc, &mut page.ctx);
    let search = widget.surface().search;
    let other_key = Event::key_down(search.to_raw(), KeyCode::Char('a'));
    assert!(!widget.handle_event(&mut page.doc, &mut page.ctx, &other_key));
    assert!(widget.is_open(&page.ctx));

    let escape = Event::key_down(search.to_raw(), KeyCode::Escape);
    assert!(widget.handle_event(&mut page.doc, &mut page.ctx, &escape));
    assert!(!widget.is_open(&page.ctx));
    assert_eq!(page.doc.active_element(), Some(widget.surface().trigger));
    assert_eq!(page.native_selected(), vec![false, true, false]);

    // Escape while closed is not ours
    assert!(!widget.handle_event(&mut page.doc, &mut page.ctx, &escape));
}

#[test]
fn test_widgets_are_independent() {
    let mut page = Page::fruits(false);
    add_select(&mut page.doc, page.form, "veg", false, &["Leek", "Kale"]);
    let mut widgets = page.init();
    assert_eq!(widgets.len(), 2);

    let (first, second) = widgets.split_at_mut(1);
    first[0].open(&mut page.doc, &mut page.ctx);
    second[0].select_entry(&mut page.doc, &mut page.ctx, 1);
    assert!(first[0].is_open(&page.ctx));
    assert_eq!(second[0].trigger_text(&page.doc), "Kale");
    assert_eq!(first[0].trigger_text(&page.doc), "Choose...");
}

#[test]
fn test_form_data_reflects_widget_selection() {
    let mut page = Page::fruits(true);
    let mut widget = page.widget();
    widget.select_entry(&mut page.doc, &mut page.ctx, 0);
    widget.select_entry(&mut page.doc, &mut page.ctx, 2);
    widget.apply_filter(&mut page.doc, "app");

    // Widget inputs are unnamed, so only the native control submits
    assert_eq!(
        page.doc.form_data(page.form),
        vec![
            ("fruit".to_string(), "apple".to_string()),
            ("fruit".to_string(), "cherry".to_string()),
        ]
    );
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "out of range")]
fn test_out_of_range_entry_panics_in_debug() {
    let mut page = Page::fruits(false);
    let mut widget = page.widget();
    widget.select_entry(&mut page.doc, &mut page.ctx, FRUITS.len());
}
