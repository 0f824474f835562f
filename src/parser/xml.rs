//! Lossless XML tree used for DOCX parts.
//!
//! Word parts are read into a small element tree that keeps every element,
//! attribute, text node, comment and processing instruction so that the part
//! can be written back without losing markup the filler does not understand.

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A node in the XML tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Node {
    /// A child element
    Element(Element),
    /// Unescaped character data
    Text(String),
    /// A CDATA section
    CData(String),
    /// A comment (raw content)
    Comment(String),
    /// A processing instruction (raw content)
    ProcessingInstruction(String),
}

/// An XML element with its qualified name, attributes and children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Qualified name, e.g. `w:p`
    pub name: String,

    /// Attributes in document order, values unescaped
    pub attributes: Vec<(String, String)>,

    /// Child nodes in document order
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute and return self.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Add a child element and return self.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Add a text child and return self.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Get an attribute value by qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Find the first child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.name == name)
    }

    /// Concatenated text of all direct text and CDATA children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) | Node::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Parse an XML part into its root element.
///
/// Prolog content (declaration, doctype, comments before the root) is
/// dropped; the writer emits a standard declaration instead.
pub fn parse(data: &[u8]) -> Result<Element> {
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => {
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                attach(&mut stack, &mut root, Node::Element(element))?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::Xml("unbalanced end tag".into()))?;
                attach(&mut stack, &mut root, Node::Element(element))?;
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    let text = text.unescape()?.into_owned();
                    push_text(parent, text);
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&data).into_owned();
                    parent.children.push(Node::CData(text));
                }
            }
            Event::Comment(comment) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&comment).into_owned();
                    parent.children.push(Node::Comment(text));
                }
            }
            Event::PI(pi) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&pi).into_owned();
                    parent.children.push(Node::ProcessingInstruction(text));
                }
            }
            Event::Decl(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(Error::Xml("unexpected end of document".into()));
    }

    root.ok_or_else(|| Error::Xml("document has no root element".into()))
}

/// Serialize a root element into an XML part with a standalone declaration.
pub fn write(root: &Element) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    // Word emits the declaration on its own line
    writer.get_mut().extend_from_slice(b"\r\n");
    write_element(&mut writer, root)?;
    Ok(writer.into_inner())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            Node::Element(e) => write_element(writer, e)?,
            Node::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
            Node::CData(t) => writer.write_event(Event::CData(BytesCData::new(t.as_str())))?,
            Node::Comment(t) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(t.as_str())))?
            }
            Node::ProcessingInstruction(t) => {
                writer.write_event(Event::PI(BytesPI::new(t.as_str())))?
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, node: Node) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    match node {
        Node::Element(e) if root.is_none() => {
            *root = Some(e);
            Ok(())
        }
        _ => Err(Error::Xml("multiple root elements".into())),
    }
}

// The reader may split text around entity references; keep one node per run
// of character data.
fn push_text(parent: &mut Element, text: String) {
    if let Some(Node::Text(prev)) = parent.children.last_mut() {
        prev.push_str(&text);
    } else {
        parent.children.push(Node::Text(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested() {
        let xml = br#"<?xml version="1.0"?><a x="1"><b>hi</b><c/></a>"#;
        let root = parse(xml).unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.attribute("x"), Some("1"));
        assert_eq!(root.child("b").unwrap().text(), "hi");
        assert!(root.child("c").unwrap().children.is_empty());
    }

    #[test]
    fn test_entities_unescaped_and_escaped_again() {
        let xml = br#"<t a="&quot;q&quot;">a &amp; b &lt; c</t>"#;
        let root = parse(xml).unwrap();
        assert_eq!(root.text(), "a & b < c");
        assert_eq!(root.attribute("a"), Some("\"q\""));

        let out = String::from_utf8(write(&root).unwrap()).unwrap();
        assert!(out.contains("a &amp; b &lt; c"));
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
    }

    #[test]
    fn test_whitespace_text_preserved() {
        let root = parse(b"<t>  padded  </t>").unwrap();
        assert_eq!(root.text(), "  padded  ");
    }

    #[test]
    fn test_round_trip_is_stable() {
        let xml = br#"<w:document xmlns:w="urn:w"><w:body><w:p><!--note--><w:r><w:t xml:space="preserve"> x </w:t></w:r></w:p></w:body></w:document>"#;
        let first = parse(xml).unwrap();
        let written = write(&first).unwrap();
        let second = parse(&written).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unbalanced_document_fails() {
        assert!(parse(b"<a><b></a>").is_err());
        assert!(parse(b"").is_err());
    }
}
