//! Fixture -> document

use anyhow::Result;
use dropsync_dom::{Document, NodeId};

use crate::config::{ControlSpec, Fixture};

/// A built page and the nodes steps refer to
pub struct Page {
    pub doc: Document,
    pub form: NodeId,
    /// Native controls by fixture name
    pub controls: Vec<(String, NodeId)>,
    /// Text inputs by fixture name and id
    pub inputs: Vec<(String, Option<String>, NodeId)>,
}

impl Page {
    /// Build the page markup
    ///
    /// ```text
    /// body
    /// ├── button#darkModeToggle > i.bi.bi-moon     when enabled
    /// ├── form[action][method=get]
    /// │   ├── div.mb-3 > select                     one per control
    /// │   └── div.mb-3 > input                      one per input
    /// └── div#id                                    one per container
    /// ```
    pub fn build(fixture: &Fixture) -> Result<Self> {
        let mut doc = Document::new();
        let body = doc.body();

        if fixture.page.theme_toggle {
            let button = doc.create_element("button");
            doc.set_attribute(button, "type", "button")?;
            doc.set_attribute(button, "id", "darkModeToggle")?;
            doc.set_attribute(button, "class", "btn btn-outline-secondary")?;
            let icon = doc.create_element("i");
            doc.set_attribute(icon, "class", "bi bi-moon")?;
            doc.append_child(button, icon)?;
            doc.append_child(body, button)?;
        }

        let form = doc.create_element("form");
        doc.set_attribute(form, "action", &fixture.page.path)?;
        doc.set_attribute(form, "method", "get")?;
        doc.append_child(body, form)?;

        let mut controls = Vec::with_capacity(fixture.controls.len());
        for spec in &fixture.controls {
            let group = form_group(&mut doc, form)?;
            let select = build_control(&mut doc, spec)?;
            doc.append_child(group, select)?;
            controls.push((spec.name.clone(), select));
        }

        let mut inputs = Vec::with_capacity(fixture.inputs.len());
        for spec in &fixture.inputs {
            let group = form_group(&mut doc, form)?;
            let input = doc.create_element("input");
            doc.set_attribute(input, "type", "text")?;
            doc.set_attribute(input, "class", "form-control")?;
            doc.set_attribute(input, "name", &spec.name)?;
            if let Some(id) = &spec.id {
                doc.set_attribute(input, "id", id)?;
            }
            if let Some(target) = &spec.live_search {
                doc.set_attribute(input, "data-live-search", target)?;
            }
            doc.set_value(input, &spec.value)?;
            doc.append_child(group, input)?;
            inputs.push((spec.name.clone(), spec.id.clone(), input));
        }

        for spec in &fixture.containers {
            let container = doc.create_element("div");
            doc.set_attribute(container, "id", &spec.id)?;
            if !spec.markup.is_empty() {
                doc.set_inner_markup(container, &spec.markup)?;
            }
            doc.append_child(body, container)?;
        }

        tracing::debug!(
            "page: built {} controls, {} inputs, {} containers",
            controls.len(),
            inputs.len(),
            fixture.containers.len()
        );

        Ok(Self {
            doc,
            form,
            controls,
            inputs,
        })
    }

    pub fn control(&self, name: &str) -> Option<NodeId> {
        self.controls
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, node)| node)
    }

    /// Input by id, falling back to name
    pub fn input(&self, key: &str) -> Option<NodeId> {
        self.inputs
            .iter()
            .find(|(_, id, _)| id.as_deref() == Some(key))
            .or_else(|| self.inputs.iter().find(|(name, _, _)| name == key))
            .map(|&(_, _, node)| node)
    }
}

fn form_group(doc: &mut Document, form: NodeId) -> Result<NodeId> {
    let group = doc.create_element("div");
    doc.set_attribute(group, "class", "mb-3")?;
    doc.append_child(form, group)?;
    Ok(group)
}

fn build_control(doc: &mut Document, spec: &ControlSpec) -> Result<NodeId> {
    let select = doc.create_element("select");
    doc.set_attribute(select, "name", &spec.name)?;
    doc.set_attribute(select, "class", &spec.class)?;
    if let Some(id) = &spec.id {
        doc.set_attribute(select, "id", id)?;
    }
    if spec.multiple {
        doc.set_attribute(select, "multiple", "")?;
    }
    if spec.choices {
        doc.set_attribute(select, "data-choices", "")?;
    }
    for option_spec in &spec.options {
        let option = doc.create_element("option");
        if let Some(value) = option_spec.value() {
            doc.set_attribute(option, "value", value)?;
        }
        doc.set_selected(option, option_spec.selected())?;
        doc.append_text(option, option_spec.label())?;
        doc.append_child(select, option)?;
    }
    Ok(select)
}
