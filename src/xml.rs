//! Minimal element tree for feed documents.
//!
//! The feed is parsed once with `quick-xml` into a tree of [`Element`]s. No
//! namespace resolution is done: prefixed names like `itunes:duration` are
//! kept verbatim and matched case-insensitively.
//!
//! ## Text representation
//!
//! An element's inner text is the concatenation of all character data below
//! it in document order. Entity-escaped text is unescaped, HTML5 named
//! entities (`&rsquo;`, `&eacute;`) included; a text node holding an entity
//! nobody defines is kept raw. CDATA sections are kept *wrapped*
//! (`<![CDATA[...]]>`) so callers can tell markup that was shipped verbatim
//! from markup that arrived escaped. [`crate::text::html_fragment`] and
//! [`crate::text::unwrap_cdata`] are the intended consumers.
//!
//! ## Lookups
//!
//! - [`tag_content`]: first matching descendant, depth-first, trimmed text
//! - [`attr_value`]: attribute of the first matching descendant
//! - [`all_items`]: every `<item>` in document order
//!
//! Lookups never fail. A missing element or attribute yields an empty string.
//! Callers scope lookups to a single `<item>` before extracting its fields, so
//! a field of one item can never be read from another.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("XML parse error: {0}")]
    Parse(#[from] quick_xml::Error),
    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("Document has no root element")]
    Empty,
}

/// A parsed element: name, attributes, character data and child elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Character data of this element and all descendants, in document order.
    inner: String,
    pub children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart) -> Result<Self, XmlError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = match attr.unescape_value() {
                Ok(v) => v.into_owned(),
                Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
            };
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Self::default()
        })
    }

    /// Case-insensitive name comparison.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.is(name))
    }

    /// First descendant (excluding `self`) with the given name, depth-first.
    pub fn find(&self, name: &str) -> Option<&Element> {
        for child in &self.children {
            if child.is(name) {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// Every descendant with the given name, in document order.
    pub fn find_all<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.is(name) {
                out.push(child);
            }
            child.find_all(name, out);
        }
    }

    /// Attribute value by case-insensitive name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All character data at or below this element, in document order.
    pub fn inner_text(&self) -> &str {
        &self.inner
    }
}

/// Parse a whole document and return its root element.
pub fn parse_document(xml: &str) -> Result<Element, XmlError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    // stack[0] is a synthetic holder for the root element.
    let mut stack: Vec<Element> = vec![Element::default()];

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(element);
                }
            }
            Event::End(_) => close_top(&mut stack),
            Event::Text(text) => {
                let decoded = match text.unescape() {
                    Ok(t) => t.into_owned(),
                    Err(_) => String::from_utf8_lossy(&text).into_owned(),
                };
                push_text(&mut stack, &decoded);
            }
            Event::CData(cdata) => {
                let inner = cdata.into_inner();
                let wrapped = format!("<![CDATA[{}]]>", String::from_utf8_lossy(&inner));
                push_text(&mut stack, &wrapped);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    // Truncated documents: close whatever is still open.
    while stack.len() > 1 {
        close_top(&mut stack);
    }

    stack
        .pop()
        .and_then(|holder| holder.children.into_iter().next())
        .ok_or(XmlError::Empty)
}

fn push_text(stack: &mut [Element], text: &str) {
    // Skip the synthetic holder at index 0.
    for open in stack.iter_mut().skip(1) {
        open.inner.push_str(text);
    }
}

fn close_top(stack: &mut Vec<Element>) {
    if stack.len() < 2 {
        return;
    }
    if let Some(done) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(done);
        }
    }
}

/// Trimmed text of the first `tag` element inside `scope`; empty if absent.
pub fn tag_content(scope: &Element, tag: &str) -> String {
    scope
        .find(tag)
        .map(|e| e.inner_text().trim().to_string())
        .unwrap_or_default()
}

/// Attribute `attr` of the first `tag` element inside `scope`; empty if absent.
pub fn attr_value(scope: &Element, tag: &str, attr: &str) -> String {
    scope
        .find(tag)
        .and_then(|e| e.attr(attr))
        .map(str::to_string)
        .unwrap_or_default()
}

/// Every `<item>` element in document order.
pub fn all_items(root: &Element) -> Vec<&Element> {
    let mut items = Vec::new();
    root.find_all("item", &mut items);
    items
}
