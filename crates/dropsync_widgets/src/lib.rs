//! dropsync widget library
//!
//! Progressive enhancement of form pages over a [`dropsync_dom::Document`].
//!
//! # Architecture
//!
//! The widget system is built on three pillars:
//!
//! 1. **Native controls stay authoritative**: widgets are synthesized next to
//!    the native `<select>` and write every selection back to it, so form
//!    submission is unchanged.
//!
//! 2. **FSM-Driven Interactions**: each widget registers a state machine in the
//!    [`WidgetContext`] that holds its interaction state (open, closed).
//!
//! 3. **Caller-driven events**: hosts feed [`dropsync_core::Event`] values to
//!    `handle_event`; nothing runs in the background.
//!
//! Alongside the dropdown search live the page's smaller helpers: the dark
//! mode [`theme`] toggle, the [`choices`] search-select bootstrap and the
//! debounced [`live_search`].

pub mod choices;
pub mod config;
pub mod context;
pub mod dropdown_search;
pub mod error;
pub mod live_search;
pub mod theme;
pub mod widget;

#[cfg(test)]
mod tests;

pub use choices::{MarkupBackend, SearchSelectBackend, SearchSelectConfig};
pub use config::{DropdownOptions, LiveSearchOptions, Locale};
pub use context::WidgetContext;
pub use dropdown_search::{DropdownSearch, Entry, SelectOption};
pub use error::{Result, WidgetError};
pub use live_search::{
    Debouncer, FetchRequest, FetchResponse, Fetcher, LiveSearch, LiveSearchOutcome, Location,
};
pub use theme::{Theme, ThemeToggle};
pub use widget::WidgetId;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{DropdownOptions, LiveSearchOptions, Locale};
    pub use crate::context::WidgetContext;
    pub use crate::dropdown_search::{self, DropdownSearch};
    pub use crate::live_search::{Fetcher, LiveSearch, Location};
    pub use crate::theme::{Theme, ThemeToggle};
    pub use crate::widget::WidgetId;
}
