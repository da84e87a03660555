//! Conversion between wire XML text and the generic [`Node`] tree.
//!
//! Mapping rules:
//! - the returned root is a mapping holding the document element;
//! - an element with neither attributes nor children becomes a scalar;
//! - attributes become `@name` fields, text next to them becomes `#text`;
//! - repeated sibling elements are collected into a sequence.
//!
//! Declarations, comments, processing instructions and DOCTYPE are dropped.
//!
//! The conversion is lossy for text: leading and trailing whitespace of each
//! text piece is trimmed, and the pieces of mixed content are concatenated
//! without a separator (`<a>x<b/>y</a>` keeps `xy` as the text of `a`).
//!
//! Documents nested deeper than [`MAX_DEPTH`] elements are rejected.

use std::fmt::Display;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::TreeError;
use crate::tree::{Node, ATTRIBUTE_PREFIX, TEXT_KEY};

/// Maximum element nesting accepted by [`to_tree`].
///
/// Tree operations recurse per level, so the limit bounds stack use for
/// responses coming from remote servers.
pub const MAX_DEPTH: usize = 512;

/// An element whose end tag has not been seen yet.
struct OpenElement {
    name: String,
    node: Node,
    text: String,
}

impl OpenElement {
    fn new(name: String) -> Self {
        Self {
            name,
            node: Node::mapping(),
            text: String::new(),
        }
    }

    fn has_fields(&self) -> bool {
        matches!(&self.node, Node::Mapping(fields) if !fields.is_empty())
    }

    fn finish(self) -> (String, Node) {
        if !self.has_fields() {
            return (self.name, Node::Scalar(self.text));
        }
        let mut node = self.node;
        if !self.text.is_empty() {
            node.push_field(TEXT_KEY.to_string(), Node::Scalar(self.text));
        }
        (self.name, node)
    }
}

fn position_of(reader: &Reader<&[u8]>) -> usize {
    usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX)
}

fn parse_error(reader: &Reader<&[u8]>, message: impl Display) -> TreeError {
    TreeError::Parse {
        position: position_of(reader),
        message: message.to_string(),
    }
}

fn open_element(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<OpenElement, TreeError> {
    let mut element = OpenElement::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| parse_error(reader, e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref());
        let value = attr.unescape_value().map_err(|e| parse_error(reader, e))?;
        element.node.push_field(
            format!("{ATTRIBUTE_PREFIX}{key}"),
            Node::Scalar(value.into_owned()),
        );
    }
    Ok(element)
}

/// Parses XML text into a tree.
///
/// # Errors
///
/// Returns `TreeError::Parse` for malformed input: mismatched or unclosed
/// tags, bad attributes or escapes, a document without an element, or
/// nesting deeper than [`MAX_DEPTH`].
pub fn to_tree(xml: &str) -> Result<Node, TreeError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut document = Node::mapping();
    let mut open: Vec<OpenElement> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| parse_error(&reader, e))?;
        if matches!(event, Event::Start(_) | Event::Empty(_)) && open.len() >= MAX_DEPTH {
            return Err(parse_error(
                &reader,
                format!("element nesting exceeds {MAX_DEPTH} levels"),
            ));
        }
        match event {
            Event::Start(start) => open.push(open_element(&reader, &start)?),
            Event::Empty(start) => {
                let (name, node) = open_element(&reader, &start)?.finish();
                match open.last_mut() {
                    Some(parent) => parent.node.push_field(name, node),
                    None => document.push_field(name, node),
                }
            }
            Event::End(_) => {
                let element = open
                    .pop()
                    .ok_or_else(|| parse_error(&reader, "unexpected closing tag"))?;
                let (name, node) = element.finish();
                match open.last_mut() {
                    Some(parent) => parent.node.push_field(name, node),
                    None => document.push_field(name, node),
                }
            }
            Event::Text(text) => {
                let unescaped = text.unescape().map_err(|e| parse_error(&reader, e))?;
                if let Some(current) = open.last_mut() {
                    current.text.push_str(&unescaped);
                }
            }
            Event::CData(data) => {
                if let Some(current) = open.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(element) = open.last() {
        return Err(parse_error(
            &reader,
            format!("unclosed element <{}>", element.name),
        ));
    }
    if !matches!(&document, Node::Mapping(fields) if !fields.is_empty()) {
        return Err(parse_error(&reader, "document has no root element"));
    }
    Ok(document)
}

fn write_error(e: impl Display) -> TreeError {
    TreeError::Serialize(e.to_string())
}

fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, node: &Node) -> Result<(), TreeError> {
    match node {
        Node::Scalar(text) if text.is_empty() => writer
            .write_event(Event::Empty(BytesStart::new(name)))
            .map_err(write_error),
        Node::Scalar(text) => {
            writer
                .write_event(Event::Start(BytesStart::new(name)))
                .map_err(write_error)?;
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_error)?;
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(write_error)
        }
        Node::Sequence(items) => items
            .iter()
            .try_for_each(|item| write_element(writer, name, item)),
        Node::Mapping(fields) => {
            let mut start = BytesStart::new(name);
            let mut body = Vec::new();
            for (key, value) in fields {
                match key.strip_prefix(ATTRIBUTE_PREFIX) {
                    Some(attr) => start.push_attribute((attr, value.text().unwrap_or_default())),
                    None => body.push((key.as_str(), value)),
                }
            }

            if body.is_empty() {
                return writer.write_event(Event::Empty(start)).map_err(write_error);
            }
            writer.write_event(Event::Start(start)).map_err(write_error)?;
            for (key, value) in body {
                if key == TEXT_KEY {
                    let text = value.text().unwrap_or_default();
                    writer
                        .write_event(Event::Text(BytesText::new(text)))
                        .map_err(write_error)?;
                } else {
                    write_element(writer, key, value)?;
                }
            }
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(write_error)
        }
    }
}

/// Serializes a tree produced by [`to_tree`] (or built by hand in the same
/// shape) back to XML text.
///
/// # Errors
///
/// Returns `TreeError::Serialize` if `tree` is not a mapping of root
/// elements.
pub fn to_xml_text(tree: &Node) -> Result<String, TreeError> {
    let Node::Mapping(roots) = tree else {
        return Err(TreeError::Serialize(
            "tree root must be a mapping of elements".to_string(),
        ));
    };

    let mut writer = Writer::new(Vec::new());
    for (name, node) in roots {
        write_element(&mut writer, name, node)?;
    }
    String::from_utf8(writer.into_inner()).map_err(write_error)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
