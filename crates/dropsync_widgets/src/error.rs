//! Widget error types

use dropsync_dom::DomError;
use thiserror::Error;

/// Widget-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    #[error(transparent)]
    Dom(#[from] DomError),

    /// A collaborator element the page is expected to contain is absent
    #[error("Missing element: {0}")]
    MissingElement(String),

    /// The native control cannot be enhanced
    #[error("Cannot enhance control: {0}")]
    Unenhanceable(String),

    /// The search-select backend refused a control
    #[error("Search-select backend error: {0}")]
    Backend(String),

    /// A live-search request could not be completed
    #[error("Fetch failed: {0}")]
    Fetch(String),
}

/// Result type for widget operations
pub type Result<T> = std::result::Result<T, WidgetError>;
