//! Streaming XML codec: pull reader, push writer, path-tracking decode.
//!
//! Listing payloads can be arbitrarily large, so nothing here materializes
//! a document tree. The reader scans raw bytes and yields one node per
//! call holding O(depth) state; the writer emits nodes as they arrive; the
//! [`PathDecoder`] is the reusable loop every payload parser is built on.

mod path;
mod reader;
mod writer;

use std::borrow::Cow;

pub use path::{PathDecoder, PathStep, XmlTag};
pub use reader::XmlReader;
pub use writer::XmlWriter;

/// One streaming token of an XML document.
///
/// Attributes are reported as standalone nodes immediately after the
/// `StartTag` that owns them. `EndTag` carries no name: the reader verifies
/// it against the open element before yielding it, and the writer closes
/// the most recently opened element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode<'a> {
    StartTag(Cow<'a, str>),
    EndTag,
    Text(Cow<'a, str>),
    Attribute {
        name: Cow<'a, str>,
        value: Cow<'a, str>,
    },
    /// End of document. The reader keeps returning this once reached.
    End,
}

impl<'a> XmlNode<'a> {
    /// Start-tag constructor, mostly for writer call sites.
    pub fn start(name: &'a str) -> Self {
        Self::StartTag(Cow::Borrowed(name))
    }

    /// Text constructor, mostly for writer call sites.
    pub fn text(value: &'a str) -> Self {
        Self::Text(Cow::Borrowed(value))
    }

    /// Attribute constructor, mostly for writer call sites.
    pub fn attribute(name: &'a str, value: &'a str) -> Self {
        Self::Attribute {
            name: Cow::Borrowed(name),
            value: Cow::Borrowed(value),
        }
    }
}
