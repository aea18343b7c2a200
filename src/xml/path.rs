//! Path-tracking decode: the reusable loop behind every payload parser.
//!
//! A decoder keeps an explicit stack of enumerated tag identities, one
//! frame per open element. A field assignment fires only when the stack
//! matches an exact expected path, which makes parsers robust to unknown
//! siblings, absent elements, and reordered content — unrecognized names
//! push an `UNKNOWN` frame and fall out of every match. A recognized
//! nested-record boundary delegates to a child decoder over the same
//! reader, then pops the frame it pushed, since the child consumed the
//! record's own end tag.

use std::borrow::Cow;

use super::{XmlNode, XmlReader};
use crate::error::ClientError;

/// Enumerated identity of a tag name: small, copyable, comparable.
///
/// One enum per record shape, with a variant per recognized element and an
/// `UNKNOWN` marker for everything else.
pub trait XmlTag: Copy + PartialEq {
    /// Marker frame for names the decoder does not recognize.
    const UNKNOWN: Self;

    fn from_name(name: &str) -> Self;
}

/// One step a decoder loop reacts to.
#[derive(Debug)]
pub enum PathStep<'a, T> {
    /// An element just opened; the decoder path now ends with it.
    Open(T),
    /// Character data of the element at the current path.
    Text(Cow<'a, str>),
    /// An attribute of the element at the current path.
    Attribute {
        name: Cow<'a, str>,
        value: Cow<'a, str>,
    },
}

/// Drives a reader while tracking the element path as [`XmlTag`] frames.
///
/// A decoder's scope is the element content the reader currently sits in:
/// created at document start it spans the whole document; created right
/// after a record's start tag was consumed it spans exactly that record,
/// and [`next`](Self::next) returns `None` once the record's end tag has
/// been consumed.
pub struct PathDecoder<'r, 'a, T: XmlTag> {
    reader: &'r mut XmlReader<'a>,
    path: Vec<T>,
    done: bool,
}

impl<'r, 'a, T: XmlTag> PathDecoder<'r, 'a, T> {
    pub fn new(reader: &'r mut XmlReader<'a>) -> Self {
        Self {
            reader,
            path: Vec::new(),
            done: false,
        }
    }

    /// The next step within this decoder's scope, or `None` once the scope
    /// is fully consumed (end of document, or the enclosing record's end
    /// tag). End tags of elements opened within the scope are balanced
    /// against their frames internally and never surface.
    pub fn next(&mut self) -> Result<Option<PathStep<'a, T>>, ClientError> {
        if self.done {
            return Ok(None);
        }
        loop {
            match self.reader.read()? {
                XmlNode::End => {
                    self.done = true;
                    return Ok(None);
                }
                XmlNode::EndTag => {
                    if self.path.pop().is_none() {
                        self.done = true;
                        return Ok(None);
                    }
                }
                XmlNode::StartTag(name) => {
                    let tag = T::from_name(&name);
                    self.path.push(tag);
                    return Ok(Some(PathStep::Open(tag)));
                }
                XmlNode::Text(value) => return Ok(Some(PathStep::Text(value))),
                XmlNode::Attribute { name, value } => {
                    return Ok(Some(PathStep::Attribute { name, value }));
                }
            }
        }
    }

    /// The current stack of tag frames, outermost first.
    pub fn path(&self) -> &[T] {
        &self.path
    }

    /// Exact-path match against the current stack (depth and contents).
    pub fn matches(&self, expected: &[T]) -> bool {
        self.path.as_slice() == expected
    }

    /// Drop the frame of a nested record whose child decoder already
    /// consumed the record's end tag.
    pub fn pop(&mut self) {
        self.path.pop();
    }

    /// The underlying reader, for handing to a child decoder.
    pub fn reader(&mut self) -> &mut XmlReader<'a> {
        self.reader
    }
}
