//! Element data: tag, attributes, class list, inline style, form state

use indexmap::IndexMap;
use smallvec::SmallVec;

/// Elements that never have children or a closing tag
pub(crate) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "wbr",
];

/// Per-element data
///
/// `class`, `style`, `checked` and `selected` are kept as structured state
/// rather than raw attribute strings; [`Element::attribute`] reassembles them
/// so callers see ordinary attribute semantics.
#[derive(Clone, Debug, Default)]
pub struct Element {
    tag_name: String,
    attrs: IndexMap<String, String>,
    classes: SmallVec<[String; 4]>,
    style: IndexMap<String, String>,
    /// Current value of an `<input>` or `<textarea>`
    pub(crate) value: String,
    pub(crate) checked: bool,
    pub(crate) selected: bool,
}

impl Element {
    pub(crate) fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Lowercase tag name
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag_name.as_str())
    }

    /// Whether `value` is a live property rather than an attribute
    fn has_value_property(&self) -> bool {
        matches!(self.tag_name.as_str(), "input" | "textarea")
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "class" if !self.classes.is_empty() => Some(self.classes.join(" ")),
            "class" => None,
            "style" if !self.style.is_empty() => Some(self.style_text()),
            "style" => None,
            "checked" => self.checked.then(String::new),
            "selected" => self.selected.then(String::new),
            "value" if self.has_value_property() => Some(self.value.clone()),
            _ => self.attrs.get(name).cloned(),
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        match name {
            "class" => !self.classes.is_empty(),
            "style" => !self.style.is_empty(),
            "checked" => self.checked,
            "selected" => self.selected,
            _ => self.attrs.contains_key(name),
        }
    }

    pub(crate) fn set_attribute(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "class" => {
                self.classes = value.split_whitespace().map(str::to_string).collect();
            }
            "style" => {
                self.style.clear();
                for declaration in value.split(';') {
                    if let Some((prop, val)) = declaration.split_once(':') {
                        let prop = prop.trim();
                        if !prop.is_empty() {
                            self.style.insert(prop.to_string(), val.trim().to_string());
                        }
                    }
                }
            }
            "checked" => self.checked = true,
            "selected" => self.selected = true,
            "value" if self.has_value_property() => self.value = value.to_string(),
            _ => {
                self.attrs.insert(name, value.to_string());
            }
        }
    }

    pub(crate) fn remove_attribute(&mut self, name: &str) {
        match name {
            "class" => self.classes.clear(),
            "style" => self.style.clear(),
            "checked" => self.checked = false,
            "selected" => self.selected = false,
            "value" if self.has_value_property() => self.value.clear(),
            _ => {
                self.attrs.shift_remove(name);
            }
        }
    }

    /// All attributes in serialization order
    pub fn attributes(&self) -> Vec<(String, String)> {
        let mut out = Vec::with_capacity(self.attrs.len() + 4);
        for (name, value) in &self.attrs {
            out.push((name.clone(), value.clone()));
        }
        if let Some(class) = self.attribute("class") {
            out.push(("class".to_string(), class));
        }
        if let Some(style) = self.attribute("style") {
            out.push(("style".to_string(), style));
        }
        if self.has_value_property() && !self.value.is_empty() && self.tag_name != "textarea" {
            out.push(("value".to_string(), self.value.clone()));
        }
        if self.checked {
            out.push(("checked".to_string(), String::new()));
        }
        if self.selected {
            out.push(("selected".to_string(), String::new()));
        }
        out
    }

    // =========================================================================
    // Class list
    // =========================================================================

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub(crate) fn add_class(&mut self, class: &str) {
        if !class.is_empty() && !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub(crate) fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    // =========================================================================
    // Inline style
    // =========================================================================

    pub fn style(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    pub(crate) fn set_style(&mut self, property: &str, value: &str) {
        if value.is_empty() {
            self.style.shift_remove(property);
        } else {
            self.style.insert(property.to_string(), value.to_string());
        }
    }

    fn style_text(&self) -> String {
        self.style
            .iter()
            .map(|(prop, val)| format!("{prop}: {val};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
