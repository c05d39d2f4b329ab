//! Slug scanning over MIME part trees.
//!
//! Outgoing request letters embed an agency's hashtag-wrapped slug in the
//! body, so replies quote it somewhere — often inside a base64-encoded
//! part. The scanner walks a message's part tree depth-first and returns
//! the first chunk of text that matches a known slug.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use std::borrow::Cow;

use crate::domain::{MimeNode, SlugDirectory};

/// Whole-string check for the strict base64 alphabet: groups of four
/// characters with optional `=`/`==` padding at the very end.
const BASE64_TEXT: &str = r"^([A-Za-z0-9+/]{4})*([A-Za-z0-9+/]{3}=|[A-Za-z0-9+/]{2}==)?$";

/// Scans message part trees for a known agency slug.
///
/// Built once per run next to the [`SlugDirectory`]; holds the compiled
/// base64 pattern so leaf scans don't recompile it.
pub struct SlugScanner<'a> {
    directory: &'a SlugDirectory,
    base64_text: Regex,
}

impl<'a> SlugScanner<'a> {
    /// Creates a scanner over the given directory.
    pub fn new(directory: &'a SlugDirectory) -> Self {
        Self {
            directory,
            base64_text: Regex::new(BASE64_TEXT).expect("static pattern compiles"),
        }
    }

    /// Returns the first slug chunk found in the tree, unwrapped.
    ///
    /// Children are visited depth-first in message order; the first
    /// non-empty match short-circuits the walk. Undecodable payloads end
    /// their branch with no match rather than an error.
    pub fn scan(&self, node: &MimeNode) -> Option<String> {
        match node {
            MimeNode::Multipart { children } => {
                children.iter().find_map(|child| self.scan(child))
            }
            MimeNode::Leaf { text, .. } => self.scan_text(text.as_deref()?),
        }
    }

    fn scan_text(&self, text: &str) -> Option<String> {
        // Transport line-folding must not hide a base64 payload.
        let flat: Cow<'_, str> = if text.contains(['\n', '\r']) {
            Cow::Owned(text.chars().filter(|c| *c != '\n' && *c != '\r').collect())
        } else {
            Cow::Borrowed(text)
        };

        let working = if self.base64_text.is_match(&flat) {
            match STANDARD.decode(flat.as_bytes()) {
                // Decoded to binary that isn't text: nothing to find here.
                Ok(bytes) => String::from_utf8(bytes).ok()?,
                // Looked like base64 but wasn't; scan the original text.
                Err(_) => flat.into_owned(),
            }
        } else {
            flat.into_owned()
        };

        working
            .split('#')
            .find(|chunk| self.directory.resolve(chunk).is_some())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    fn directory() -> SlugDirectory {
        SlugDirectory::new(vec!["City Hall".to_string(), "Parks Dept".to_string()])
    }

    fn leaf(text: &str) -> MimeNode {
        MimeNode::Leaf {
            content_type: "text/plain".to_string(),
            text: Some(text.to_string()),
            filename: None,
        }
    }

    #[test]
    fn finds_slug_in_plain_body() {
        let dir = directory();
        let scanner = SlugScanner::new(&dir);
        let node = leaf("hello #CityHall# world");
        assert_eq!(scanner.scan(&node), Some("CityHall".to_string()));
    }

    #[test]
    fn no_slug_means_no_match() {
        let dir = directory();
        let scanner = SlugScanner::new(&dir);
        assert_eq!(scanner.scan(&leaf("no routing token here")), None);
        assert_eq!(scanner.scan(&leaf("#WaterBoard# is not configured")), None);
    }

    #[test]
    fn slug_comparison_is_case_sensitive() {
        let dir = directory();
        let scanner = SlugScanner::new(&dir);
        assert_eq!(scanner.scan(&leaf("see #cityhall# thanks")), None);
    }

    #[test]
    fn finds_slug_inside_base64_payload() {
        let dir = directory();
        let scanner = SlugScanner::new(&dir);
        let encoded = STANDARD.encode("regarding your request #ParksDept# attached");
        assert_eq!(scanner.scan(&leaf(&encoded)), Some("ParksDept".to_string()));
    }

    #[test]
    fn base64_payload_with_line_folding() {
        let dir = directory();
        let scanner = SlugScanner::new(&dir);
        let encoded = STANDARD.encode("regarding your request #ParksDept# attached");
        // Fold the transfer text the way a 76-column MIME body would.
        let folded: String = encoded
            .as_bytes()
            .chunks(20)
            .map(|chunk| std::str::from_utf8(chunk).unwrap())
            .collect::<Vec<_>>()
            .join("\r\n");
        assert_eq!(scanner.scan(&leaf(&folded)), Some("ParksDept".to_string()));
    }

    #[test]
    fn base64_decoding_to_binary_yields_no_match() {
        let dir = directory();
        let scanner = SlugScanner::new(&dir);
        // Valid base64, but the payload is not UTF-8 text.
        let encoded = STANDARD.encode([0xff, 0xfe, 0x00, 0x01, 0x80, 0x81]);
        assert_eq!(scanner.scan(&leaf(&encoded)), None);
    }

    #[test]
    fn non_base64_text_is_scanned_as_is() {
        let dir = directory();
        let scanner = SlugScanner::new(&dir);
        // Spaces fail the alphabet test, so no decode is attempted.
        let node = leaf("plain text #CityHall# with spaces");
        assert_eq!(scanner.scan(&node), Some("CityHall".to_string()));
    }

    #[test]
    fn multipart_first_match_wins_depth_first() {
        let dir = directory();
        let scanner = SlugScanner::new(&dir);
        let encoded = STANDARD.encode("body mentions #ParksDept# here");
        let node = MimeNode::Multipart {
            children: vec![
                leaf("nothing to see in the first part"),
                leaf(&encoded),
                leaf("later part names #CityHall#"),
            ],
        };
        assert_eq!(scanner.scan(&node), Some("ParksDept".to_string()));
    }

    #[test]
    fn nested_multipart_falls_through_to_siblings() {
        let dir = directory();
        let scanner = SlugScanner::new(&dir);
        let node = MimeNode::Multipart {
            children: vec![
                MimeNode::Multipart {
                    children: vec![leaf("no match in here")],
                },
                leaf("sibling carries #CityHall#"),
            ],
        };
        assert_eq!(scanner.scan(&node), Some("CityHall".to_string()));
    }

    #[test]
    fn textless_leaf_is_skipped() {
        let dir = directory();
        let scanner = SlugScanner::new(&dir);
        let node = MimeNode::Multipart {
            children: vec![
                MimeNode::Leaf {
                    content_type: "application/octet-stream".to_string(),
                    text: None,
                    filename: Some("blob.bin".to_string()),
                },
                leaf("#ParksDept#"),
            ],
        };
        assert_eq!(scanner.scan(&node), Some("ParksDept".to_string()));
    }
}
