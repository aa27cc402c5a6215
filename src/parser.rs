// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! XML loading for documentation comment files.
//!
//! This module reads the XML emitted by documentation-comment extractors
//! into a small owned tree. The tree keeps exactly what rendering needs:
//! element local names, attributes, text, and CDATA sections.
//!
//! # Format Overview
//!
//! A documentation file contains:
//! - An `assembly` element naming the documented library
//! - A `members` element with one `member` per documented entity
//! - Per-member blocks such as `summary`, `param`, and `returns`
//!
//! Whitespace-only text between elements is discarded while loading, so
//! indentation in the source file never reaches the rendered output.
//!
//! # Example
//!
//! ```
//! use xmldoc2md::parser::parse_document;
//!
//! let xml = r#"<doc>
//!     <assembly><name>Lib</name></assembly>
//!     <members>
//!         <member name="M:Lib.Foo"><summary>Does X</summary></member>
//!     </members>
//! </doc>"#;
//!
//! let root = parse_document(xml).unwrap();
//! assert_eq!(root.name, "doc");
//! assert_eq!(root.child("members").unwrap().children_named("member").count(), 1);
//! ```

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use snafu::prelude::*;

/// Error type for XML loading failures.
#[derive(Debug, Snafu)]
pub enum ParseError {
    /// The input is not well-formed XML.
    #[snafu(display("malformed XML at byte {position}: {source}"))]
    Xml {
        /// The underlying reader error.
        source: quick_xml::Error,
        /// Byte offset where the reader gave up.
        position: u64,
    },

    /// The input ended before an element was closed.
    #[snafu(display("unexpected end of input: <{name}> is not closed"))]
    Unclosed {
        /// Local name of the innermost open element.
        name: String,
    },

    /// The input contains no element at all.
    #[snafu(display("document has no root element"))]
    NoRoot,
}

/// An XML element with its attributes and child nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Local name of the element (namespace prefix removed).
    pub name: String,

    /// Attributes in document order, keyed by their qualified name.
    pub attributes: Vec<(String, String)>,

    /// Child nodes in document order.
    pub children: Vec<Node>,
}

/// A node in the loaded tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A nested element.
    Element(Element),

    /// Character data with entity references already resolved.
    Text(String),

    /// The contents of a `<![CDATA[...]]>` section.
    CData(String),
}

impl Element {
    /// Creates an element with no attributes or children.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Returns the value of the attribute named `name`, if present.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the first child element named `name`.
    #[must_use]
    pub fn child<'a>(&'a self, name: &'a str) -> Option<&'a Self> {
        self.children_named(name).next()
    }

    /// Iterates over the direct child elements named `name`.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        self.child_elements().filter(move |el| el.name == name)
    }

    /// Iterates over all direct child elements, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) | Node::CData(_) => None,
        })
    }

    /// Returns the concatenated text and CDATA of all descendants.
    #[must_use]
    pub fn value(&self) -> String {
        let mut out = String::new();
        collect_value(self, &mut out);
        out
    }
}

fn collect_value(el: &Element, out: &mut String) {
    for node in &el.children {
        match node {
            Node::Element(child) => collect_value(child, out),
            Node::Text(text) | Node::CData(text) => out.push_str(text),
        }
    }
}

/// Parses an XML document and returns its root element.
///
/// Entity and character references are resolved into the surrounding text.
/// Comments, processing instructions, and the XML declaration are dropped.
///
/// # Errors
///
/// Returns an error if the input is not well-formed or has no root element.
pub fn parse_document(xml: &str) -> Result<Element, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = true;

    let mut stack: Vec<Element> = Vec::new();
    let mut text = String::new();
    let mut root = None;

    loop {
        let event = reader
            .read_event()
            .with_context(|_| XmlSnafu {
                position: reader.error_position(),
            })?;

        match event {
            Event::Start(e) => {
                flush_text(&mut stack, &mut text);
                let el = open_element(&e).with_context(|_| XmlSnafu {
                    position: reader.buffer_position(),
                })?;
                stack.push(el);
            }
            Event::Empty(e) => {
                flush_text(&mut stack, &mut text);
                let el = open_element(&e).with_context(|_| XmlSnafu {
                    position: reader.buffer_position(),
                })?;
                attach(&mut stack, &mut root, el);
            }
            Event::End(_) => {
                flush_text(&mut stack, &mut text);
                if let Some(el) = stack.pop() {
                    attach(&mut stack, &mut root, el);
                }
            }
            Event::Text(e) => {
                if !stack.is_empty() {
                    text.push_str(&normalize_newlines(&String::from_utf8_lossy(&e)));
                }
            }
            Event::GeneralRef(e) => {
                if !stack.is_empty() {
                    text.push_str(&decode_entity(&String::from_utf8_lossy(&e)));
                }
            }
            Event::CData(e) => {
                flush_text(&mut stack, &mut text);
                if let Some(parent) = stack.last_mut() {
                    let data = normalize_newlines(&String::from_utf8_lossy(&e));
                    parent.children.push(Node::CData(data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return UnclosedSnafu { name: open.name }.fail();
    }
    root.context(NoRootSnafu)
}

fn open_element(e: &BytesStart) -> Result<Element, quick_xml::Error> {
    let mut el = Element::new(String::from_utf8_lossy(e.local_name().as_ref()));
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            std::borrow::Cow::into_owned,
        );
        el.attributes.push((key, value));
    }
    Ok(el)
}

/// Places a finished element under its parent, or makes it the root.
fn attach(stack: &mut [Element], root: &mut Option<Element>, el: Element) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(el));
    } else if root.is_none() {
        *root = Some(el);
    }
}

/// Moves pending character data into the current element.
///
/// Whitespace-only runs are insignificant and dropped.
fn flush_text(stack: &mut [Element], text: &mut String) {
    if text.is_empty() {
        return;
    }
    let pending = std::mem::take(text);
    if pending.chars().all(char::is_whitespace) {
        return;
    }
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Text(pending));
    }
}

/// Translates `\r\n` and lone `\r` line breaks to `\n`.
///
/// Applied to literal text only; a `&#13;` reference still yields `\r`.
fn normalize_newlines(raw: &str) -> String {
    raw.replace("\r\n", "\n").replace('\r', "\n")
}

/// Decodes an XML entity reference to its character value.
fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        // Unknown entity - preserve as-is
        _ => format!("&{entity};"),
    }
}
