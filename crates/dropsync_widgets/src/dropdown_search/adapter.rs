//! Source adapter: native control -> option list

use dropsync_dom::{Document, DomError, NodeId};

use super::SelectOption;
use crate::error::Result;

/// Options read from a native control
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdaptedControl {
    pub control: NodeId,
    pub multiple: bool,
    pub options: Vec<SelectOption>,
    /// Native `<option>` node for each entry of `options`
    pub option_nodes: Vec<NodeId>,
}

/// Read a control's options without touching the document
///
/// A single-select whose markup marks several options `selected` keeps only
/// the last one, the way a browser parses it. [`AdaptedControl::apply`]
/// writes that normalization back.
pub fn adapt(doc: &Document, control: NodeId) -> Result<AdaptedControl> {
    if doc.tag_name(control) != Some("select") {
        return Err(DomError::NotASelect(control).into());
    }
    let multiple = doc.is_multiple(control);
    let option_nodes = doc.options(control)?;

    let mut options: Vec<SelectOption> = option_nodes
        .iter()
        .map(|&node| SelectOption {
            value: doc.option_value(node),
            label: doc.option_label(node),
            selected: doc.selected(node),
        })
        .collect();

    if !multiple {
        if let Some(last) = options.iter().rposition(|o| o.selected) {
            let count = options.iter().filter(|o| o.selected).count();
            if count > 1 {
                tracing::debug!(
                    "adapter: {} marks {} options selected, keeping {}",
                    control,
                    count,
                    option_nodes[last]
                );
            }
            for (i, option) in options.iter_mut().enumerate() {
                option.selected = i == last;
            }
        }
    }

    Ok(AdaptedControl {
        control,
        multiple,
        options,
        option_nodes,
    })
}

impl AdaptedControl {
    /// Write the option flags back and hide the control with `hidden_class`
    ///
    /// The control is never removed or disabled.
    pub fn apply(&self, doc: &mut Document, hidden_class: &str) -> Result<()> {
        for (option, &node) in self.options.iter().zip(&self.option_nodes) {
            if doc.selected(node) != option.selected {
                doc.set_selected(node, option.selected)?;
            }
        }
        doc.add_class(self.control, hidden_class)?;
        Ok(())
    }
}
