//! Push-based XML emitter.

use super::XmlNode;
use crate::error::ClientError;

/// Emits well-formed XML from a sequence of [`XmlNode`] values.
///
/// The writer preserves the exact start/end pairing supplied by the caller
/// and performs no pretty-printing and no schema validation; the caller is
/// responsible for meaningful nesting. What it does enforce is the shape of
/// the node sequence itself: attributes only directly after a start tag,
/// text only inside the root, an [`XmlNode::EndTag`] for every open
/// element. `EndTag` closes the most recently opened unclosed element — the
/// writer keeps an implicit stack mirroring the reader's explicit one.
#[derive(Debug, Default)]
pub struct XmlWriter {
    buf: String,
    open: Vec<String>,
    in_start_tag: bool,
    root_written: bool,
    finished: bool,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, node: XmlNode<'_>) -> Result<(), ClientError> {
        if self.finished {
            return Err(malformed("write after end of document"));
        }
        match node {
            XmlNode::StartTag(name) => {
                check_name(&name)?;
                if self.open.is_empty() && self.root_written {
                    return Err(malformed("second root element"));
                }
                self.close_start_tag();
                self.buf.push('<');
                self.buf.push_str(&name);
                self.open.push(name.into_owned());
                self.in_start_tag = true;
                self.root_written = true;
            }
            XmlNode::Attribute { name, value } => {
                if !self.in_start_tag {
                    return Err(malformed("attribute outside a start tag"));
                }
                check_name(&name)?;
                self.buf.push(' ');
                self.buf.push_str(&name);
                self.buf.push_str("=\"");
                escape_into(&mut self.buf, &value, true);
                self.buf.push('"');
            }
            XmlNode::Text(value) => {
                if self.open.is_empty() {
                    return Err(malformed("text outside the root element"));
                }
                self.close_start_tag();
                escape_into(&mut self.buf, &value, false);
            }
            XmlNode::EndTag => {
                self.close_start_tag();
                let name = self
                    .open
                    .pop()
                    .ok_or_else(|| malformed("end tag without an open element"))?;
                self.buf.push_str("</");
                self.buf.push_str(&name);
                self.buf.push('>');
            }
            XmlNode::End => {
                if let Some(name) = self.open.last() {
                    return Err(malformed(format!(
                        "end of document with <{name}> still open"
                    )));
                }
                self.finished = true;
            }
        }
        Ok(())
    }

    /// The document written so far. Callers that want the balanced-document
    /// guarantee write [`XmlNode::End`] first.
    pub fn into_document(self) -> String {
        self.buf
    }

    fn close_start_tag(&mut self) {
        if self.in_start_tag {
            self.buf.push('>');
            self.in_start_tag = false;
        }
    }
}

fn malformed(message: impl Into<String>) -> ClientError {
    ClientError::MalformedProtocolData(message.into())
}

fn check_name(name: &str) -> Result<(), ClientError> {
    let ok = !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '/' | '=' | '"' | '\''));
    if ok {
        Ok(())
    } else {
        Err(malformed(format!("invalid tag or attribute name '{name}'")))
    }
}

fn escape_into(buf: &mut String, value: &str, attribute: bool) {
    for c in value.chars() {
        match c {
            '&' => buf.push_str("&amp;"),
            '<' => buf.push_str("&lt;"),
            '>' => buf.push_str("&gt;"),
            '"' if attribute => buf.push_str("&quot;"),
            '\'' if attribute => buf.push_str("&apos;"),
            _ => buf.push(c),
        }
    }
}
