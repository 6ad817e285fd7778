//! Document error types

use thiserror::Error;

use crate::NodeId;

/// Document-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The id does not belong to this document
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// An element operation was applied to a text, markup or document node
    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    /// A select-only operation was applied to something else
    #[error("Node {0} is not a <select> element")]
    NotASelect(NodeId),

    /// Tree mutation would produce an invalid tree
    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(String),

    /// Selector text could not be parsed
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Result type for document operations
pub type Result<T> = std::result::Result<T, DomError>;
