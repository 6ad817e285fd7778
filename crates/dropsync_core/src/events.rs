//! Page event types
//!
//! Events are plain values handed to widgets by whoever owns the event loop
//! (the CLI replayer, a test, or a browser bridge). Each event names its
//! target node through a raw `u64` so this crate stays independent of the
//! document model.

/// Event type identifier, used as the FSM input alphabet
pub type EventType = u32;

/// Event types the widgets route
pub mod event_types {
    use super::EventType;

    /// Full click (press + release on the same node)
    pub const CLICK: EventType = 3;
    /// Text content of an input changed (one per keystroke)
    pub const TEXT_INPUT: EventType = 10;
    /// Checked or selected state of a form control changed
    pub const CHANGE: EventType = 11;
    /// Key pressed
    pub const KEY_DOWN: EventType = 20;
}

/// Keyboard keys
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    /// Any other key, by its character
    Char(char),
}

/// Event payload
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EventData {
    #[default]
    None,
    Key(KeyCode),
    /// New value of a text input
    Text(String),
}

/// A single page event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub event_type: EventType,
    /// Raw id of the target node
    pub target: u64,
    pub data: EventData,
    /// Milliseconds since page load
    pub timestamp: u64,
}

impl Event {
    /// Create an event with no payload
    pub fn new(event_type: EventType, target: u64) -> Self {
        Self {
            event_type,
            target,
            data: EventData::None,
            timestamp: 0,
        }
    }

    /// Click on `target`
    pub fn click(target: u64) -> Self {
        Self::new(event_types::CLICK, target)
    }

    /// Text input on `target` carrying the input's new value
    pub fn text_input(target: u64, value: impl Into<String>) -> Self {
        Self {
            data: EventData::Text(value.into()),
            ..Self::new(event_types::TEXT_INPUT, target)
        }
    }

    /// Change notification on `target`
    pub fn change(target: u64) -> Self {
        Self::new(event_types::CHANGE, target)
    }

    /// Key press on `target`
    pub fn key_down(target: u64, key: KeyCode) -> Self {
        Self {
            data: EventData::Key(key),
            ..Self::new(event_types::KEY_DOWN, target)
        }
    }

    /// Set the timestamp
    pub fn at(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// The pressed key, if this is a keyboard event
    pub fn key(&self) -> Option<KeyCode> {
        match self.data {
            EventData::Key(key) => Some(key),
            _ => None,
        }
    }

    /// The text payload, if any
    pub fn text(&self) -> Option<&str> {
        match &self.data {
            EventData::Text(value) => Some(value),
            _ => None,
        }
    }
}
