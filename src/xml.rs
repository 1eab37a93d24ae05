//! Owned, mutable markup document tree
//!
//! Profile documents are parsed once, mutated in place by the exporter and
//! written back out. Insignificant whitespace is dropped on parse and the
//! writer re-indents, so writing the same tree twice yields the same bytes.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>";
const INDENT: &str = "  ";

/// A parse failure with the byte offset where the parser stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlError {
    pub message: String,
    pub position: u64,
}

impl XmlError {
    fn at(message: impl std::fmt::Display, position: u64) -> Self {
        Self {
            message: message.to_string(),
            position,
        }
    }
}

impl std::fmt::Display for XmlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.position)
    }
}

impl std::error::Error for XmlError {}

/// A child of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

/// An element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    attributes: Vec<(String, String)>,
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

    /// Add an attribute (builder pattern)
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Add a child element (builder pattern)
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Add a comment child (builder pattern)
    pub fn with_comment(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Comment(text.into()));
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing the value in place if it already exists
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Direct child elements with the given tag name, in document order
    pub fn elements<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter_map(move |node| match node {
            Node::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }

    /// First direct child element with the given tag name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            Node::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }

    /// True if a direct child `<tag>` carries `name="<value>"`
    pub fn has_named(&self, tag: &str, value: &str) -> bool {
        self.elements(tag).any(|el| el.attr("name") == Some(value))
    }

    /// Mutable access to the first direct child `<tag>` carrying `name="<value>"`
    pub fn named_mut(&mut self, tag: &str, value: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(el) if el.name == tag && el.attr("name") == Some(value) => Some(el),
            _ => None,
        })
    }

    /// The first direct child `<tag>` carrying `name="<value>"`, appending
    /// `create()` first if there is none
    pub fn named_or_insert_with(
        &mut self,
        tag: &str,
        value: &str,
        create: impl FnOnce() -> Element,
    ) -> &mut Element {
        let index = self.children.iter().position(|node| {
            matches!(node, Node::Element(el) if el.name == tag && el.attr("name") == Some(value))
        });
        let index = index.unwrap_or_else(|| {
            self.children.push(Node::Element(create()));
            self.children.len() - 1
        });
        match &mut self.children[index] {
            Node::Element(el) => el,
            _ => unreachable!("index always points at an element"),
        }
    }

    /// Concatenated text content of direct text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// A parsed document: comments ahead of the root, then the root element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    prolog: Vec<Node>,
    pub root: Element,
}

impl Document {
    /// A fresh document with an empty root element
    pub fn new(root_name: &str) -> Self {
        Self {
            prolog: Vec::new(),
            root: Element::new(root_name),
        }
    }

    pub fn parse(text: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(text);

        let mut prolog = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| XmlError::at(e, reader.buffer_position() as u64))?;
            let position = reader.buffer_position() as u64;

            match event {
                Event::Start(start) => stack.push(element_from_start(&start, position)?),
                Event::Empty(start) => {
                    let el = element_from_start(&start, position)?;
                    attach(&mut stack, &mut root, el, position)?;
                }
                Event::End(_) => {
                    let el = stack
                        .pop()
                        .ok_or_else(|| XmlError::at("unexpected closing tag", position))?;
                    attach(&mut stack, &mut root, el, position)?;
                }
                Event::Text(t) => {
                    let text = t.unescape().map_err(|e| XmlError::at(e, position))?;
                    push_text(&mut stack, text, position)?;
                }
                Event::CData(c) => {
                    let text = String::from_utf8_lossy(&c).into_owned();
                    push_text(&mut stack, Cow::Owned(text), position)?;
                }
                Event::Comment(c) => {
                    let comment = Node::Comment(String::from_utf8_lossy(&c).into_owned());
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(comment),
                        None if root.is_none() => prolog.push(comment),
                        None => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(XmlError::at(
                format!("unclosed element <{}>", open.name),
                reader.buffer_position() as u64,
            ));
        }

        let root = root.ok_or_else(|| XmlError::at("no root element", 0))?;
        Ok(Self { prolog, root })
    }

    /// Serialize with an XML declaration and two-space indentation
    pub fn to_xml_string(&self) -> String {
        let mut out = String::with_capacity(4096);
        out.push_str(DECLARATION);
        out.push('\n');
        for node in &self.prolog {
            write_node(&mut out, node, 0);
        }
        write_element(&mut out, &self.root, 0);
        out
    }
}

fn element_from_start(start: &BytesStart<'_>, position: u64) -> Result<Element, XmlError> {
    let mut el = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::at(e, position))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError::at(e, position))?;
        el.attributes.push((key, value.into_owned()));
    }
    Ok(el)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    el: Element,
    position: u64,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push(el);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(el);
            Ok(())
        }
        None => Err(XmlError::at(
            format!("second root element <{}>", el.name),
            position,
        )),
    }
}

fn push_text(stack: &mut [Element], text: Cow<'_, str>, position: u64) -> Result<(), XmlError> {
    if text.trim().is_empty() {
        return Ok(());
    }
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Text(text.into_owned()));
            Ok(())
        }
        None => Err(XmlError::at("text outside the root element", position)),
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_open_tag(out: &mut String, el: &Element) {
    out.push('<');
    out.push_str(&el.name);
    for (key, value) in &el.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&quick_xml::escape::escape(value.as_str()));
        out.push('"');
    }
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    match node {
        Node::Element(el) => write_element(out, el, depth),
        Node::Text(text) => {
            indent(out, depth);
            out.push_str(&quick_xml::escape::escape(text.as_str()));
            out.push('\n');
        }
        Node::Comment(text) => {
            indent(out, depth);
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->\n");
        }
    }
}

fn write_element(out: &mut String, el: &Element, depth: usize) {
    indent(out, depth);
    if el.children.iter().any(|c| matches!(c, Node::Text(_))) {
        // Mixed content is written on one line so no whitespace is introduced
        write_inline(out, el);
        out.push('\n');
        return;
    }

    write_open_tag(out, el);
    if el.children.is_empty() {
        out.push_str(" />\n");
        return;
    }
    out.push_str(">\n");
    for child in &el.children {
        write_node(out, child, depth + 1);
    }
    indent(out, depth);
    out.push_str("</");
    out.push_str(&el.name);
    out.push_str(">\n");
}

fn write_inline(out: &mut String, el: &Element) {
    write_open_tag(out, el);
    if el.children.is_empty() {
        out.push_str(" />");
        return;
    }
    out.push('>');
    for child in &el.children {
        match child {
            Node::Element(inner) => write_inline(out, inner),
            Node::Text(text) => out.push_str(&quick_xml::escape::escape(text.as_str())),
            Node::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
        }
    }
    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}
