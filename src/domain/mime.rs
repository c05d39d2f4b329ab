//! MIME tree model for slug scanning.
//!
//! The scanner needs to walk a message's part structure itself (depth-first,
//! first match wins), so raw RFC 5322 source is parsed into an explicit
//! tagged tree rather than scanned through a parsing library's own
//! traversal. Trees are built per-scan and discarded after classification.

use mail_parser::{MessageParser, MimeHeaders, PartType};

/// One node of a message's MIME structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MimeNode {
    /// A content-bearing part.
    Leaf {
        /// Content type, e.g. `text/plain`.
        content_type: String,
        /// Decoded payload text. `None` when the payload is not valid UTF-8.
        text: Option<String>,
        /// Attachment filename, if the part carries one.
        filename: Option<String>,
    },
    /// A container part with ordered children.
    Multipart {
        /// Child parts in message order.
        children: Vec<MimeNode>,
    },
}

impl MimeNode {
    /// Parses raw RFC 5322 source into a part tree.
    ///
    /// Returns `None` when the source cannot be parsed as a message at all;
    /// individual undecodable parts become text-less leaves instead of
    /// failing the whole parse.
    pub fn parse(raw: &[u8]) -> Option<MimeNode> {
        let message = MessageParser::default().parse(raw)?;
        Some(Self::build(&message, 0))
    }

    fn build(message: &mail_parser::Message<'_>, part_id: usize) -> MimeNode {
        let part = &message.parts[part_id];
        let content_type = part
            .content_type()
            .map(|ct| match ct.subtype() {
                Some(subtype) => format!("{}/{}", ct.ctype(), subtype),
                None => ct.ctype().to_string(),
            })
            .unwrap_or_else(|| "text/plain".to_string());
        let filename = part.attachment_name().map(str::to_string);

        match &part.body {
            PartType::Multipart(children) => MimeNode::Multipart {
                children: children
                    .iter()
                    .map(|child| Self::build(message, *child))
                    .collect(),
            },
            // An attached message scans like a single-child container.
            PartType::Message(nested) => MimeNode::Multipart {
                children: vec![Self::build(nested, 0)],
            },
            PartType::Text(text) | PartType::Html(text) => MimeNode::Leaf {
                content_type,
                text: Some(text.to_string()),
                filename,
            },
            PartType::Binary(bytes) | PartType::InlineBinary(bytes) => MimeNode::Leaf {
                content_type,
                text: std::str::from_utf8(bytes).ok().map(str::to_string),
                filename,
            },
        }
    }

    /// Returns true for container nodes.
    pub fn is_multipart(&self) -> bool {
        matches!(self, MimeNode::Multipart { .. })
    }
}
