//! Form control state: values, checkedness, option selection, form data

use crate::document::{Document, NodeId};
use crate::error::{DomError, Result};

impl Document {
    /// Current value of a form control
    ///
    /// Inputs and textareas report their live value. Options report
    /// their value attribute, falling back to trimmed text. Selects report
    /// the value of their first selected option.
    pub fn value(&self, id: NodeId) -> Result<String> {
        let el = self.element(id)?;
        match el.tag_name() {
            "input" | "textarea" => Ok(el.value.clone()),
            "option" => Ok(self.option_value(id)),
            "select" => Ok(self
                .selected_options(id)?
                .first()
                .map(|&o| self.option_value(o))
                .unwrap_or_default()),
            _ => Ok(el.attribute("value").unwrap_or_default()),
        }
    }

    /// Set a control's value
    ///
    /// On a select this selects the first option with that value and
    /// deselects the rest.
    pub fn set_value(&mut self, id: NodeId, value: &str) -> Result<()> {
        let tag = self.element(id)?.tag_name().to_string();
        match tag.as_str() {
            "select" => {
                let mut found = false;
                for option in self.options(id)? {
                    let hit = !found && self.option_value(option) == value;
                    found |= hit;
                    self.element_mut(option)?.selected = hit;
                }
                Ok(())
            }
            _ => self.set_attribute(id, "value", value),
        }
    }

    pub fn checked(&self, id: NodeId) -> bool {
        self.element(id).is_ok_and(|el| el.checked)
    }

    /// Set checkedness; checking a radio unchecks others of the same
    /// name in the same document
    pub fn set_checked(&mut self, id: NodeId, checked: bool) -> Result<()> {
        self.element_mut(id)?.checked = checked;
        if checked && self.attribute(id, "type").as_deref() == Some("radio") {
            if let Some(name) = self.attribute(id, "name") {
                let group: Vec<NodeId> = self
                    .descendants(self.root())
                    .into_iter()
                    .filter(|&n| {
                        n != id
                            && self.tag_name(n) == Some("input")
                            && self.attribute(n, "type").as_deref() == Some("radio")
                            && self.attribute(n, "name").as_deref() == Some(name.as_str())
                    })
                    .collect();
                for other in group {
                    self.element_mut(other)?.checked = false;
                }
            }
        }
        Ok(())
    }

    pub fn selected(&self, id: NodeId) -> bool {
        self.element(id).is_ok_and(|el| el.selected)
    }

    /// Set an option's selectedness without touching its siblings
    pub fn set_selected(&mut self, id: NodeId, selected: bool) -> Result<()> {
        self.element_mut(id)?.selected = selected;
        Ok(())
    }

    /// Option value: the `value` attribute, else the trimmed text
    pub fn option_value(&self, option: NodeId) -> String {
        self.attribute(option, "value")
            .unwrap_or_else(|| self.text_content(option).trim().to_string())
    }

    /// Option label: the trimmed text content
    pub fn option_label(&self, option: NodeId) -> String {
        self.text_content(option).trim().to_string()
    }

    /// Options of a select in document order, including those in optgroups
    pub fn options(&self, select: NodeId) -> Result<Vec<NodeId>> {
        self.expect_select(select)?;
        let mut out = Vec::new();
        for &child in self.children(select) {
            match self.tag_name(child) {
                Some("option") => out.push(child),
                Some("optgroup") => out.extend(
                    self.children(child)
                        .iter()
                        .copied()
                        .filter(|&c| self.tag_name(c) == Some("option")),
                ),
                _ => {}
            }
        }
        Ok(out)
    }

    pub fn selected_options(&self, select: NodeId) -> Result<Vec<NodeId>> {
        Ok(self
            .options(select)?
            .into_iter()
            .filter(|&o| self.selected(o))
            .collect())
    }

    pub fn is_multiple(&self, select: NodeId) -> bool {
        self.has_attribute(select, "multiple")
    }

    /// Disabled directly or through a disabled ancestor fieldset/optgroup
    pub fn is_disabled(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if self.has_attribute(current, "disabled")
                && matches!(
                    self.tag_name(current),
                    Some("input" | "select" | "textarea" | "button" | "option" | "optgroup" | "fieldset")
                )
            {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Name/value pairs a form submission of `scope` would carry
    pub fn form_data(&self, scope: NodeId) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for id in self.descendants(scope) {
            let Some(tag) = self.tag_name(id) else {
                continue;
            };
            let Some(name) = self.attribute(id, "name").filter(|n| !n.is_empty()) else {
                continue;
            };
            if self.is_disabled(id) {
                continue;
            }
            match tag {
                "input" => {
                    let kind = self
                        .attribute(id, "type")
                        .unwrap_or_default()
                        .to_ascii_lowercase();
                    match kind.as_str() {
                        "submit" | "button" | "reset" | "file" | "image" => {}
                        "checkbox" | "radio" => {
                            if self.checked(id) {
                                let value = self
                                    .element(id)
                                    .ok()
                                    .and_then(|el| el.attribute("value"))
                                    .filter(|v| !v.is_empty())
                                    .unwrap_or_else(|| "on".to_string());
                                pairs.push((name, value));
                            }
                        }
                        _ => pairs.push((name, self.value(id).unwrap_or_default())),
                    }
                }
                "textarea" => pairs.push((name, self.value(id).unwrap_or_default())),
                "select" => {
                    for option in self.selected_options(id).unwrap_or_default() {
                        if !self.is_disabled(option) {
                            pairs.push((name.clone(), self.option_value(option)));
                        }
                    }
                }
                _ => {}
            }
        }
        pairs
    }

    fn expect_select(&self, id: NodeId) -> Result<()> {
        match self.tag_name(id) {
            Some("select") => Ok(()),
            Some(_) => Err(DomError::NotASelect(id)),
            None => self.element(id).map(|_| ()),
        }
    }
}
