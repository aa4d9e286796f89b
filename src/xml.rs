//! Small owned element tree used as the wire form of fdscript documents.
//!
//! Commands convert to and from [`Element`]; only this module talks to
//! `quick-xml` directly.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{FdError, FdResult};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: Option<String>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Append an attribute. Attributes are written in insertion order.
    pub fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attributes.push((key.to_string(), value.into()));
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn require_attr(&self, key: &str) -> FdResult<&str> {
        self.get_attr(key).ok_or_else(|| {
            FdError::SchemaViolation(format!("<{}> is missing attribute '{}'", self.name, key))
        })
    }

    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.find(name).and_then(|c| c.text.as_deref())
    }

    pub fn require_child_text(&self, name: &str) -> FdResult<&str> {
        self.child_text(name).ok_or_else(|| {
            FdError::SchemaViolation(format!("<{}> is missing child <{}>", self.name, name))
        })
    }

    pub fn expect_name(&self, name: &str) -> FdResult<()> {
        if self.name == name {
            Ok(())
        } else {
            Err(FdError::SchemaViolation(format!(
                "expected <{}>, found <{}>",
                name, self.name
            )))
        }
    }
}

/// Serialize `root` as a complete document, XML declaration first.
pub fn write_document(root: &Element) -> FdResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(FdError::xml)?;
    write_element(&mut writer, root)?;
    String::from_utf8(writer.into_inner()).map_err(FdError::xml)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> FdResult<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() && element.text.is_none() {
        writer
            .write_event(Event::Empty(start))
            .map_err(FdError::xml)?;
        return Ok(());
    }

    writer
        .write_event(Event::Start(start))
        .map_err(FdError::xml)?;
    if let Some(text) = &element.text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(FdError::xml)?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(FdError::xml)?;
    Ok(())
}

/// Parse a document into its root element. Whitespace-only text, such as
/// indentation, is dropped; any other text is kept verbatim.
pub fn parse_document(xml: &str) -> FdResult<Element> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event().map_err(FdError::xml)? {
            Event::Start(e) => stack.push(element_from_start(&e)?),
            Event::Empty(e) => {
                let element = element_from_start(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let mut element = stack
                    .pop()
                    .ok_or_else(|| FdError::Xml("unbalanced end tag".to_string()))?;
                if element.text.as_deref().is_some_and(|t| t.trim().is_empty()) {
                    element.text = None;
                }
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(FdError::xml)?;
                if let Some(current) = stack.last_mut() {
                    current.text.get_or_insert_with(String::new).push_str(&text);
                }
            }
            Event::CData(c) => {
                let raw = c.into_inner();
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .get_or_insert_with(String::new)
                        .push_str(&String::from_utf8_lossy(&raw));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(FdError::Xml("unexpected end of document".to_string()));
    }
    root.ok_or_else(|| FdError::SchemaViolation("document has no root element".to_string()))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> FdResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        Ok(())
    } else if root.is_some() {
        Err(FdError::SchemaViolation(
            "document has more than one root element".to_string(),
        ))
    } else {
        *root = Some(element);
        Ok(())
    }
}

fn element_from_start(start: &BytesStart<'_>) -> FdResult<Element> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(FdError::xml)?
        .to_string();
    let mut element = Element::new(&name);
    for attr in start.attributes() {
        let attr = attr.map_err(FdError::xml)?;
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(FdError::xml)?;
        let value = attr.unescape_value().map_err(FdError::xml)?;
        element.attributes.push((key.to_string(), value.into_owned()));
    }
    Ok(element)
}
