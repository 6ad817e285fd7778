//! dropsync document model
//!
//! An arena-backed HTML document with the slice of the DOM that page
//! enhancement scripts use: tree mutation, attributes and class lists,
//! inline style, focus, form control state and CSS selector queries.
//!
//! ```rust
//! use dropsync_dom::Document;
//!
//! let mut doc = Document::new();
//! let select = doc.create_element("select");
//! doc.set_attribute(select, "class", "form-select").unwrap();
//! doc.append_child(doc.body(), select).unwrap();
//!
//! assert_eq!(doc.query_selector("select.form-select").unwrap(), Some(select));
//! ```

mod document;
mod element;
pub mod error;
mod forms;
pub mod markup;
pub mod selector;

pub use document::{Document, NodeId, NodeKind};
pub use element::Element;
pub use error::{DomError, Result};
pub use selector::Selector;
