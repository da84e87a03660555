//! Generic tree produced from wire XML, and the deep key search over it.
//!
//! The tree has no schema: the same response shape varies per operation and
//! per document version, so consumers address fields by name with
//! [`Node::find`] instead of by path.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Field name under which an element's text is stored when the element also
/// carries attributes or child elements.
pub const TEXT_KEY: &str = "#text";

/// Prefix prepended to attribute names when stored as mapping fields.
pub const ATTRIBUTE_PREFIX: char = '@';

/// A node of the converted XML tree.
///
/// Mappings keep their fields in document order. Repeated sibling elements
/// are folded into a single [`Node::Sequence`] stored under the shared name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Text content of a leaf element.
    Scalar(String),
    /// Ordered fields of an element (child elements, attributes, text).
    Mapping(Vec<(String, Node)>),
    /// Repeated sibling elements sharing one name, in document order.
    Sequence(Vec<Node>),
}

impl Node {
    /// Creates an empty mapping.
    #[must_use]
    pub fn mapping() -> Self {
        Self::Mapping(Vec::new())
    }

    /// Creates a scalar from anything string-like.
    #[must_use]
    pub fn scalar(text: impl Into<String>) -> Self {
        Self::Scalar(text.into())
    }

    /// Returns the direct field `name` of a mapping.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Node> {
        match self {
            Self::Mapping(fields) => fields
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value),
            Self::Scalar(_) | Self::Sequence(_) => None,
        }
    }

    /// Textual content of this node: the scalar itself, or the `#text` field
    /// of a mapping. Sequences have no single text.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Scalar(text) => Some(text),
            Self::Mapping(_) => self.get(TEXT_KEY).and_then(Node::text),
            Self::Sequence(_) => None,
        }
    }

    /// Whether this node counts as "nothing found" when returned from a
    /// nested search: an empty scalar.
    fn is_blank(&self) -> bool {
        matches!(self, Self::Scalar(text) if text.is_empty())
    }

    /// Depth-first search for the field `name` anywhere in the tree.
    ///
    /// A mapping that directly holds `name` answers immediately, so the
    /// outermost occurrence wins over deeper ones. Otherwise fields are
    /// visited in document order and the first nested hit is returned.
    /// Nested hits that are empty scalars do not end the search.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Node> {
        match self {
            Self::Scalar(_) => None,
            Self::Mapping(fields) => {
                if let Some(hit) = self.get(name) {
                    return Some(hit);
                }
                fields
                    .iter()
                    .filter(|(_, value)| !matches!(value, Self::Scalar(_)))
                    .find_map(|(_, value)| value.find(name).filter(|hit| !hit.is_blank()))
            }
            Self::Sequence(items) => items
                .iter()
                .find_map(|item| item.find(name).filter(|hit| !hit.is_blank())),
        }
    }

    /// Like [`find`](Self::find), returning the hit's text.
    ///
    /// A repeated field yields the text of its first element.
    #[must_use]
    pub fn find_text(&self, name: &str) -> Option<&str> {
        match self.find(name)? {
            Self::Sequence(items) => items.first().and_then(Node::text),
            hit => hit.text(),
        }
    }

    /// Appends a child field, folding a repeated name into a sequence.
    ///
    /// No-op on scalars and sequences.
    pub fn push_field(&mut self, name: String, value: Node) {
        let Self::Mapping(fields) = self else {
            return;
        };
        match fields.iter_mut().find(|(key, _)| *key == name) {
            Some((_, Self::Sequence(items))) => items.push(value),
            Some((_, existing)) => {
                let first = std::mem::replace(existing, Self::Sequence(Vec::new()));
                *existing = Self::Sequence(vec![first, value]);
            }
            None => fields.push((name, value)),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(text) => serializer.serialize_str(text),
            Self::Mapping(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Self::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
