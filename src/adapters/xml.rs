//! Owned XML document tree
//!
//! Export documents are parsed with quick-xml into a small mutable tree so the
//! anonymization passes can revisit the same elements several times, then
//! written back. Whitespace is preserved; the XML declaration is always
//! regenerated as UTF-8.

use crate::domain::{AnonymizerError, Result};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs;
use std::path::Path;

/// Declaration written at the top of every serialized document
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#;

/// A node of the document tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Unescaped character data
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

/// An element with unescaped attribute values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Builder-style child setter
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attribute(key).is_some()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Concatenated text and CDATA of all descendants
    pub fn text_content(&self) -> String {
        let mut content = String::new();
        collect_text(&self.children, &mut content);
        content
    }

    /// Replace all children with a single text node
    pub fn set_text_content(&mut self, text: impl Into<String>) {
        self.children = vec![Node::Text(text.into())];
    }

    /// The first child's value, if that child is a text or CDATA node
    pub fn first_text_mut(&mut self) -> Option<&mut String> {
        match self.children.first_mut() {
            Some(Node::Text(text)) | Some(Node::CData(text)) => Some(text),
            _ => None,
        }
    }

    /// Visit descendant elements named `name` in document order
    pub fn visit_descendants_mut<E>(
        &mut self,
        name: &str,
        f: &mut dyn FnMut(&mut Element) -> std::result::Result<(), E>,
    ) -> std::result::Result<(), E> {
        visit_nodes_mut(&mut self.children, name, f)
    }

    /// Number of descendant elements named `name`
    pub fn count_descendants(&self, name: &str) -> usize {
        let mut found = Vec::new();
        collect_elements(&self.children, name, &mut found);
        found.len()
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = utf8(start.name().as_ref())?;
        let mut element = Element::new(name);
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| AnonymizerError::Xml(e.to_string()))?;
            let key = utf8(attribute.key.as_ref())?;
            let value = attribute
                .unescape_value()
                .map_err(|e| AnonymizerError::Xml(e.to_string()))?
                .into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }
}

/// A parsed document: the top-level nodes, root element included
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            nodes: vec![Node::Element(root)],
        }
    }

    /// Parse a document from a string
    ///
    /// # Errors
    ///
    /// Returns [`AnonymizerError::Xml`] for malformed markup, unknown entities
    /// or unclosed elements.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut open: Vec<Element> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| {
                AnonymizerError::Xml(format!(
                    "Parse error at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            })?;

            match event {
                Event::Start(start) => open.push(Element::from_start(&start)?),
                Event::Empty(start) => {
                    let element = Element::from_start(&start)?;
                    push_node(&mut open, &mut nodes, Node::Element(element));
                }
                Event::End(_) => {
                    let element = open.pop().ok_or_else(|| {
                        AnonymizerError::Xml("Closing tag without matching start".to_string())
                    })?;
                    push_node(&mut open, &mut nodes, Node::Element(element));
                }
                Event::Text(text) => {
                    let value = text
                        .unescape()
                        .map_err(|e| AnonymizerError::Xml(e.to_string()))?
                        .into_owned();
                    // whitespace outside the root element is not kept
                    if open.is_empty() && value.trim().is_empty() {
                        continue;
                    }
                    push_node(&mut open, &mut nodes, Node::Text(value));
                }
                Event::CData(data) => {
                    push_node(&mut open, &mut nodes, Node::CData(utf8(&data)?));
                }
                Event::Comment(comment) => {
                    push_node(&mut open, &mut nodes, Node::Comment(utf8(&comment)?));
                }
                Event::PI(instruction) => {
                    let value = utf8(&instruction)?;
                    push_node(&mut open, &mut nodes, Node::ProcessingInstruction(value));
                }
                Event::DocType(doctype) => {
                    push_node(&mut open, &mut nodes, Node::DocType(utf8(&doctype)?));
                }
                Event::Eof => break,
                // the declaration is regenerated on write
                _ => {}
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(AnonymizerError::Xml(format!(
                "Unclosed element <{}>",
                unclosed.name
            )));
        }

        Ok(Self { nodes })
    }

    /// Read and parse a document file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            AnonymizerError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&contents).map_err(|e| match e {
            AnonymizerError::Xml(message) => {
                AnonymizerError::Xml(format!("{}: {}", path.display(), message))
            }
            other => other,
        })
    }

    /// Serialize the document, declaration first
    pub fn to_xml_string(&self) -> String {
        let mut out = String::with_capacity(XML_DECLARATION.len() + 1);
        out.push_str(XML_DECLARATION);
        out.push('\n');
        for node in &self.nodes {
            write_node(&mut out, node);
        }
        out
    }

    /// Serialize to `path`, creating parent directories
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AnonymizerError::Io(format!(
                    "Directory \"{}\" cannot be created: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        fs::write(path, self.to_xml_string()).map_err(|e| {
            AnonymizerError::Io(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The first top-level element
    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// All elements named `name`, in document order
    pub fn elements(&self, name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        collect_elements(&self.nodes, name, &mut found);
        found
    }

    /// Visit every element named `name` in document order
    ///
    /// An element is visited before its descendants, so changes the callback
    /// makes to its children are what the walk descends into.
    pub fn visit_elements_mut<E>(
        &mut self,
        name: &str,
        mut f: impl FnMut(&mut Element) -> std::result::Result<(), E>,
    ) -> std::result::Result<(), E> {
        visit_nodes_mut(&mut self.nodes, name, &mut f)
    }
}

fn push_node(open: &mut [Element], nodes: &mut Vec<Node>, node: Node) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => nodes.push(node),
    }
}

fn visit_nodes_mut<E>(
    nodes: &mut [Node],
    name: &str,
    f: &mut dyn FnMut(&mut Element) -> std::result::Result<(), E>,
) -> std::result::Result<(), E> {
    for node in nodes.iter_mut() {
        if let Node::Element(element) = node {
            if element.name == name {
                f(element)?;
            }
            visit_nodes_mut(&mut element.children, name, f)?;
        }
    }
    Ok(())
}

fn collect_elements<'a>(nodes: &'a [Node], name: &str, found: &mut Vec<&'a Element>) {
    for node in nodes {
        if let Node::Element(element) = node {
            if element.name == name {
                found.push(element);
            }
            collect_elements(&element.children, name, found);
        }
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) | Node::CData(text) => out.push_str(text),
            Node::Element(element) => collect_text(&element.children, out),
            _ => {}
        }
    }
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Element(element) => {
            out.push('<');
            out.push_str(&element.name);
            for (key, value) in &element.attributes {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&partial_escape(value.as_str()).replace('"', "&quot;"));
                out.push('"');
            }
            if element.children.is_empty() {
                out.push_str("/>");
            } else {
                out.push('>');
                for child in &element.children {
                    write_node(out, child);
                }
                out.push_str("</");
                out.push_str(&element.name);
                out.push('>');
            }
        }
        Node::Text(text) => out.push_str(&partial_escape(text.as_str())),
        Node::CData(data) => {
            out.push_str("<![CDATA[");
            out.push_str(data);
            out.push_str("]]>");
        }
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Node::ProcessingInstruction(instruction) => {
            out.push_str("<?");
            out.push_str(instruction);
            out.push_str("?>");
        }
        Node::DocType(doctype) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(doctype);
            out.push('>');
        }
    }
}

fn utf8(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| AnonymizerError::Xml(format!("Invalid UTF-8 in document: {e}")))
}
