//! Selection synchronizer: open/closed state and selection write-back
//!
//! ```text
//! Closed --TRIGGER--> Open
//! Open   --TRIGGER--> Closed
//! Open   --SINGLE_CHOSEN--> Closed
//! Open   --DISMISS--> Closed           outside click, Escape
//! Open   --MULTI_TOGGLED--> Open
//! ```

use dropsync_core::events::{event_types, Event, KeyCode};
use dropsync_core::fsm::StateMachine;
use dropsync_dom::{Document, NodeId};

use super::DropdownSearch;
use crate::context::WidgetContext;

/// Dropdown states
pub mod states {
    pub const CLOSED: u32 = 0;
    pub const OPEN: u32 = 1;
}

/// Dropdown FSM events
pub mod events {
    /// Trigger button activated
    pub const TRIGGER: u32 = 100;
    /// An entry of a single-select was chosen
    pub const SINGLE_CHOSEN: u32 = 101;
    /// Outside click or Escape
    pub const DISMISS: u32 = 102;
    /// An entry of a multi-select was toggled
    pub const MULTI_TOGGLED: u32 = 103;
}

/// Create the dropdown FSM, starting closed
pub fn create_fsm() -> StateMachine {
    use states::*;

    StateMachine::builder(CLOSED)
        .on(CLOSED, events::TRIGGER, OPEN)
        .on(OPEN, events::TRIGGER, CLOSED)
        .on(OPEN, events::SINGLE_CHOSEN, CLOSED)
        .on(OPEN, events::DISMISS, CLOSED)
        .on(OPEN, events::MULTI_TOGGLED, OPEN)
        .build()
}

impl DropdownSearch {
    /// Whether the panel is open
    pub fn is_open(&self, ctx: &WidgetContext) -> bool {
        ctx.get_fsm_state(self.id) == Some(states::OPEN)
    }

    /// Toggle the panel, as a trigger click does
    ///
    /// Opening moves focus to the filter input.
    pub fn toggle(&mut self, doc: &mut Document, ctx: &mut WidgetContext) {
        self.send(doc, ctx, events::TRIGGER);
        if self.is_open(ctx) {
            self.focus(doc, Some(self.surface.search));
        }
    }

    /// Open the panel if closed
    pub fn open(&mut self, doc: &mut Document, ctx: &mut WidgetContext) {
        if !self.is_open(ctx) {
            self.toggle(doc, ctx);
        }
    }

    /// Close the panel without changing the selection
    pub fn dismiss(&mut self, doc: &mut Document, ctx: &mut WidgetContext) {
        self.send(doc, ctx, events::DISMISS);
    }

    /// Select the entry at `index`
    ///
    /// Multi-select flips that option only and stays open. Single-select
    /// selects it, deselects the rest and closes. Either way the flags are
    /// written back to the native `<option>` nodes before the trigger label
    /// and entries are re-rendered.
    pub fn select_entry(&mut self, doc: &mut Document, ctx: &mut WidgetContext, index: usize) {
        debug_assert!(
            index < self.options.len(),
            "entry index {index} out of range ({} options)",
            self.options.len()
        );
        if index >= self.options.len() {
            tracing::warn!(
                "dropdown search: entry index {} out of range ({} options)",
                index,
                self.options.len()
            );
            return;
        }

        if self.multiple {
            self.options[index].selected = !self.options[index].selected;
        } else {
            for (i, option) in self.options.iter_mut().enumerate() {
                option.selected = i == index;
            }
        }

        for (option, &node) in self.options.iter().zip(&self.option_nodes) {
            if let Err(e) = doc.set_selected(node, option.selected) {
                tracing::warn!("dropdown search: write back to {}: {}", node, e);
            }
        }

        self.update_trigger_label(doc);
        self.refresh_entries(doc);
        ctx.mark_dirty(self.id);

        tracing::debug!(
            "dropdown search: {} entry {} -> {:?}",
            self.control,
            index,
            self.selected_values()
        );

        let event = if self.multiple {
            events::MULTI_TOGGLED
        } else {
            events::SINGLE_CHOSEN
        };
        self.send(doc, ctx, event);
    }

    /// Route a page event to this widget
    ///
    /// Returns true if the widget consumed the event.
    pub fn handle_event(&mut self, doc: &mut Document, ctx: &mut WidgetContext, event: &Event) -> bool {
        let target = NodeId::from_raw(event.target);
        let inside = self.surface.contains(doc, target);

        match event.event_type {
            event_types::CLICK if doc.contains(self.surface.trigger, target) => {
                self.toggle(doc, ctx);
                true
            }
            // A click on an entry only activates its input; the input's
            // change event is the one selection per interaction
            event_types::CLICK if inside => self.surface.entry_at(doc, target).is_some(),
            event_types::CHANGE => match self.surface.entry_for_input(target) {
                Some(index) => {
                    self.select_entry(doc, ctx, index);
                    true
                }
                None => false,
            },
            event_types::CLICK if self.is_open(ctx) => {
                self.dismiss(doc, ctx);
                false
            }
            event_types::TEXT_INPUT if target == self.surface.search => {
                let query = match event.text() {
                    Some(text) => {
                        if let Err(e) = doc.set_value(target, text) {
                            tracing::warn!("dropdown search: filter input: {}", e);
                        }
                        text.to_string()
                    }
                    None => doc.value(target).unwrap_or_default(),
                };
                self.apply_filter(doc, &query);
                true
            }
            event_types::KEY_DOWN
                if inside && self.is_open(ctx) && event.key() == Some(KeyCode::Escape) =>
            {
                self.dismiss(doc, ctx);
                self.focus(doc, Some(self.surface.trigger));
                true
            }
            _ => false,
        }
    }

    fn send(&mut self, doc: &mut Document, ctx: &mut WidgetContext, event: u32) {
        let was_open = self.is_open(ctx);
        ctx.send_fsm_event(self.id, event);
        let open = self.is_open(ctx);
        if open != was_open {
            tracing::debug!(
                "dropdown search: {} {}",
                self.control,
                if open { "opened" } else { "closed" }
            );
            self.sync_open_state(doc, open);
        }
    }

    fn focus(&self, doc: &mut Document, node: Option<NodeId>) {
        if let Err(e) = doc.focus(node) {
            tracing::warn!("dropdown search: focus: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fsm_transitions() {
        let mut fsm = create_fsm();
        assert_eq!(fsm.current_state(), states::CLOSED);

        // Only the trigger opens
        for event in [events::SINGLE_CHOSEN, events::DISMISS, events::MULTI_TOGGLED] {
            assert!(!fsm.send(event));
        }
        assert!(fsm.send(events::TRIGGER));
        assert_eq!(fsm.current_state(), states::OPEN);

        assert!(fsm.send(events::MULTI_TOGGLED));
        assert_eq!(fsm.current_state(), states::OPEN);

        assert!(fsm.send(events::SINGLE_CHOSEN));
        assert_eq!(fsm.current_state(), states::CLOSED);

        fsm.send(events::TRIGGER);
        assert!(fsm.send(events::DISMISS));
        assert_eq!(fsm.current_state(), states::CLOSED);

        fsm.send(events::TRIGGER);
        assert!(fsm.send(events::TRIGGER));
        assert_eq!(fsm.current_state(), states::CLOSED);
    }
}
