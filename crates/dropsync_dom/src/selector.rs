//! CSS selector subset
//!
//! Supported: type, universal (`*`), `#id`, `.class`, `[attr]`,
//! `[attr=value]` (bare or quoted), compound selectors, the descendant
//! and child (`>`) combinators, and comma-separated lists.

use crate::document::{Document, NodeId};
use crate::error::{DomError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
struct AttributeMatch {
    name: String,
    value: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeMatch>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// `compounds[i]` relates to `compounds[i + 1]` through `combinators[i]`
#[derive(Clone, Debug, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
    combinators: Vec<Combinator>,
}

/// A parsed selector list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self> {
        let alternatives = Parser::new(source).parse_list()?;
        Ok(Self {
            source: source.to_string(),
            alternatives,
        })
    }

    /// Selector text as written
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether `node` matches any selector in the list
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        doc.is_element(node)
            && self.alternatives.iter().any(|complex| {
                let last = complex.compounds.len() - 1;
                match_complex(doc, complex, last, node)
            })
    }
}

fn match_complex(doc: &Document, complex: &Complex, index: usize, node: NodeId) -> bool {
    if !match_compound(doc, &complex.compounds[index], node) {
        return false;
    }
    if index == 0 {
        return true;
    }
    match complex.combinators[index - 1] {
        Combinator::Child => doc
            .parent(node)
            .is_some_and(|p| doc.is_element(p) && match_complex(doc, complex, index - 1, p)),
        Combinator::Descendant => {
            let mut cursor = doc.parent(node);
            while let Some(ancestor) = cursor {
                if doc.is_element(ancestor) && match_complex(doc, complex, index - 1, ancestor) {
                    return true;
                }
                cursor = doc.parent(ancestor);
            }
            false
        }
    }
}

fn match_compound(doc: &Document, compound: &Compound, node: NodeId) -> bool {
    let Ok(el) = doc.element(node) else {
        return false;
    };
    if compound.tag.as_deref().is_some_and(|tag| tag != el.tag_name()) {
        return false;
    }
    if let Some(id) = &compound.id {
        if el.attribute("id").as_deref() != Some(id.as_str()) {
            return false;
        }
    }
    if !compound.classes.iter().all(|c| el.has_class(c)) {
        return false;
    }
    compound.attributes.iter().all(|attr| match &attr.value {
        None => el.has_attribute(&attr.name),
        Some(expected) => el.attribute(&attr.name).as_deref() == Some(expected.as_str()),
    })
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> DomError {
        DomError::InvalidSelector {
            selector: self.source.to_string(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Skip whitespace, returning whether any was skipped
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn parse_list(&mut self) -> Result<Vec<Complex>> {
        let mut list = Vec::new();
        loop {
            self.skip_whitespace();
            list.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.bump() {
                None => return Ok(list),
                Some(',') => continue,
                Some(c) => return Err(self.error(format!("unexpected '{c}'"))),
            }
        }
    }

    fn parse_complex(&mut self) -> Result<Complex> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    Combinator::Child
                }
                Some(_) if had_whitespace => Combinator::Descendant,
                Some(c) => return Err(self.error(format!("unexpected '{c}'"))),
            };
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }
        Ok(Complex {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> Result<Compound> {
        let mut compound = Compound::default();
        let mut any = false;
        if self.peek() == Some('*') {
            self.pos += 1;
            any = true;
        } else if self.peek().is_some_and(is_ident_char) {
            compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
            any = true;
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.parse_ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.parse_ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attributes.push(self.parse_attribute()?);
                }
                _ => break,
            }
            any = true;
        }
        if any {
            Ok(compound)
        } else {
            match self.peek() {
                Some(c) => Err(self.error(format!("expected a selector, found '{c}'"))),
                None => Err(self.error("expected a selector")),
            }
        }
    }

    fn parse_ident(&mut self) -> Result<String> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected an identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_attribute(&mut self) -> Result<AttributeMatch> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();
        let value = match self.bump() {
            Some(']') => return Ok(AttributeMatch { name, value: None }),
            Some('=') => {
                self.skip_whitespace();
                match self.peek() {
                    Some(quote @ ('"' | '\'')) => {
                        self.pos += 1;
                        let start = self.pos;
                        while self.peek().is_some_and(|c| c != quote) {
                            self.pos += 1;
                        }
                        if self.peek().is_none() {
                            return Err(self.error("unterminated string"));
                        }
                        let value: String = self.chars[start..self.pos].iter().collect();
                        self.pos += 1;
                        value
                    }
                    _ => self.parse_ident()?,
                }
            }
            Some(c) => return Err(self.error(format!("unexpected '{c}' in attribute selector"))),
            None => return Err(self.error("unterminated attribute selector")),
        };
        self.skip_whitespace();
        match self.bump() {
            Some(']') => Ok(AttributeMatch {
                name,
                value: Some(value),
            }),
            _ => Err(self.error("expected ']'")),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

// =============================================================================
// Document queries
// =============================================================================

impl Document {
    /// First element in the document matching `selector`
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        self.query_selector_within(self.root(), selector)
    }

    /// All elements in the document matching `selector`, in document order
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.query_selector_all_within(self.root(), selector)
    }

    /// First descendant of `scope` matching `selector`
    pub fn query_selector_within(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(scope)
            .into_iter()
            .find(|&n| selector.matches(self, n)))
    }

    /// Descendants of `scope` matching `selector`
    ///
    /// Ancestors above `scope` still take part in combinator matching.
    pub fn query_selector_all_within(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(scope)
            .into_iter()
            .filter(|&n| selector.matches(self, n))
            .collect())
    }

    /// Whether `node` matches `selector`
    pub fn matches(&self, node: NodeId, selector: &str) -> Result<bool> {
        Ok(Selector::parse(selector)?.matches(self, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// body > form.search > (select.form-select#fruit[data-choices], div > input[name=q])
    fn fixture() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let form = doc.create_element("form");
        doc.set_attribute(form, "class", "search").unwrap();
        doc.append_child(doc.body(), form).unwrap();

        let select = doc.create_element("select");
        doc.set_attribute(select, "class", "form-select").unwrap();
        doc.set_attribute(select, "id", "fruit").unwrap();
        doc.set_attribute(select, "data-choices", "").unwrap();
        doc.append_child(form, select).unwrap();

        let div = doc.create_element("div");
        doc.append_child(form, div).unwrap();
        let input = doc.create_element("input");
        doc.set_attribute(input, "name", "q").unwrap();
        doc.append_child(div, input).unwrap();
        (doc, form, select, input)
    }

    #[test]
    fn test_compound_selectors() {
        let (doc, _, select, _) = fixture();
        assert_eq!(doc.query_selector("select.form-select").unwrap(), Some(select));
        assert_eq!(doc.query_selector("#fruit[data-choices]").unwrap(), Some(select));
        assert_eq!(doc.query_selector("select.other").unwrap(), None);
        assert_eq!(doc.query_selector("SELECT").unwrap(), Some(select));
    }

    #[test]
    fn test_attribute_values() {
        let (doc, _, _, input) = fixture();
        assert_eq!(doc.query_selector("input[name=q]").unwrap(), Some(input));
        assert_eq!(doc.query_selector("input[name=\"q\"]").unwrap(), Some(input));
        assert_eq!(doc.query_selector("input[ name = 'x' ]").unwrap(), None);
    }

    #[test]
    fn test_combinators() {
        let (doc, form, select, input) = fixture();
        assert_eq!(doc.query_selector_all("form input").unwrap(), vec![input]);
        assert_eq!(doc.query_selector_all("form > input").unwrap(), Vec::<NodeId>::new());
        assert_eq!(doc.query_selector_all("form > div > input").unwrap(), vec![input]);
        assert_eq!(
            doc.query_selector_all("input, select").unwrap(),
            vec![select, input]
        );

        // Ancestors outside the scope still count
        assert_eq!(
            doc.query_selector_all_within(form, "body select").unwrap(),
            vec![select]
        );
        assert!(doc.matches(select, "*").unwrap());
    }

    #[test]
    fn test_invalid_selectors() {
        for bad in ["", "div,", "[name", "a >", ".", "input[name=\"q]", "div!"] {
            assert!(
                matches!(Selector::parse(bad), Err(DomError::InvalidSelector { .. })),
                "{bad:?} should not parse"
            );
        }
    }
}
