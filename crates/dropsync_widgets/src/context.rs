//! Widget Context - manages widget state machines and dirty tracking
//!
//! The WidgetContext provides:
//! - FSM-driven interaction states, one machine per widget
//! - Dirty tracking so hosts only re-read widgets whose state changed
//!
//! Widgets keep their own data and hold only a [`WidgetId`] into the
//! context, so any number of widgets can share one context.

use dropsync_core::fsm::{FsmId, FsmRuntime, StateId, StateMachine};
use dropsync_core::EventType;
use rustc_hash::FxHashSet;
use slotmap::SlotMap;

use crate::widget::WidgetId;

/// Per-widget data stored in the context
struct WidgetData {
    /// Interaction state machine (if any)
    fsm: Option<FsmId>,
}

/// The widget context that owns interaction state for all widgets
#[derive(Default)]
pub struct WidgetContext {
    fsms: FsmRuntime,
    widgets: SlotMap<WidgetId, WidgetData>,
    dirty: FxHashSet<WidgetId>,
}

impl WidgetContext {
    /// Create a new widget context
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Widget Registration
    // =========================================================================

    /// Register a new widget without a state machine
    pub fn register_widget(&mut self) -> WidgetId {
        self.widgets.insert(WidgetData { fsm: None })
    }

    /// Register a widget with a state machine
    pub fn register_widget_with_fsm(&mut self, fsm: StateMachine) -> WidgetId {
        let fsm = self.fsms.create(fsm);
        self.widgets.insert(WidgetData { fsm: Some(fsm) })
    }

    /// Unregister a widget
    pub fn unregister_widget(&mut self, id: WidgetId) {
        if let Some(data) = self.widgets.remove(id) {
            if let Some(fsm) = data.fsm {
                self.fsms.remove(fsm);
            }
        }
        self.dirty.remove(&id);
    }

    /// Check if a widget is registered
    pub fn is_registered(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(id)
    }

    /// Number of registered widgets
    pub fn widget_count(&self) -> usize {
        self.widgets.len()
    }

    // =========================================================================
    // State Machine Integration
    // =========================================================================

    /// Send an event to a widget's FSM
    ///
    /// Returns true if a transition fired. A fired transition marks the
    /// widget dirty.
    pub fn send_fsm_event(&mut self, widget_id: WidgetId, event: EventType) -> bool {
        let Some(fsm) = self.widgets.get(widget_id).and_then(|d| d.fsm) else {
            return false;
        };
        let fired = self.fsms.send(fsm, event);
        if fired {
            self.dirty.insert(widget_id);
        }
        fired
    }

    /// Get a widget's current FSM state
    pub fn get_fsm_state(&self, widget_id: WidgetId) -> Option<StateId> {
        let fsm = self.widgets.get(widget_id)?.fsm?;
        self.fsms.current_state(fsm)
    }

    // =========================================================================
    // Dirty Tracking
    // =========================================================================

    /// Mark a widget as changed
    pub fn mark_dirty(&mut self, widget_id: WidgetId) {
        if self.widgets.contains_key(widget_id) {
            self.dirty.insert(widget_id);
        }
    }

    /// Check if any widgets changed since the last clear
    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Check if a specific widget changed since the last clear
    pub fn is_dirty(&self, widget_id: WidgetId) -> bool {
        self.dirty.contains(&widget_id)
    }

    /// Take the set of changed widgets, clearing all dirty flags
    pub fn take_dirty(&mut self) -> Vec<WidgetId> {
        self.dirty.drain().collect()
    }

    /// Clear all dirty flags
    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFF: StateId = 0;
    const ON: StateId = 1;
    const FLIP: EventType = 7;

    fn flip_fsm() -> StateMachine {
        StateMachine::builder(OFF)
            .on(OFF, FLIP, ON)
            .on(ON, FLIP, OFF)
            .build()
    }

    #[test]
    fn test_fsm_events_mark_dirty() {
        let mut ctx = WidgetContext::new();
        let id = ctx.register_widget_with_fsm(flip_fsm());
        assert_eq!(ctx.get_fsm_state(id), Some(OFF));
        assert!(!ctx.has_dirty());

        assert!(ctx.send_fsm_event(id, FLIP));
        assert_eq!(ctx.get_fsm_state(id), Some(ON));
        assert!(ctx.is_dirty(id));

        assert_eq!(ctx.take_dirty(), vec![id]);
        assert!(!ctx.has_dirty());

        assert!(!ctx.send_fsm_event(id, 99));
        assert!(!ctx.is_dirty(id));
    }

    #[test]
    fn test_widget_without_fsm() {
        let mut ctx = WidgetContext::new();
        let id = ctx.register_widget();
        assert!(ctx.is_registered(id));
        assert_eq!(ctx.get_fsm_state(id), None);
        assert!(!ctx.send_fsm_event(id, FLIP));
        ctx.mark_dirty(id);
        assert!(ctx.is_dirty(id));
    }

    #[test]
    fn test_unregister_widget() {
        let mut ctx = WidgetContext::new();
        let a = ctx.register_widget_with_fsm(flip_fsm());
        let b = ctx.register_widget_with_fsm(flip_fsm());
        ctx.send_fsm_event(a, FLIP);
        ctx.unregister_widget(a);
        assert!(!ctx.is_registered(a));
        assert!(!ctx.is_dirty(a));
        assert_eq!(ctx.widget_count(), 1);
        assert_eq!(ctx.get_fsm_state(b), Some(OFF));

        // Stale ids are ignored
        ctx.mark_dirty(a);
        assert!(!ctx.has_dirty());
    }
}
