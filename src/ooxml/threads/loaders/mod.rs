//! Comment and author loaders, one module per container format.
//!
//! Every loader works on a parsed element tree of one part and returns flat
//! records. Threading and locations are applied later, uniformly for all formats.

pub mod document;
pub mod presentation;
pub mod spreadsheet;

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::packuri::PackURI;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use roxmltree::{Document, Node};
use std::borrow::Cow;
use tracing::warn;

/// Part being loaded, plus how fragment errors are handled.
#[derive(Debug, Clone, Copy)]
pub struct LoadContext<'a> {
    pub part: &'a PackURI,
    pub strict_fragments: bool,
}

impl<'a> LoadContext<'a> {
    pub fn new(part: &'a PackURI, strict_fragments: bool) -> Self {
        Self {
            part,
            strict_fragments,
        }
    }

    /// Report one unusable fragment: a warning normally, an error when strict.
    pub fn fragment(&self, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        if self.strict_fragments {
            return Err(OoxmlError::MalformedFragment {
                part: self.part.to_string(),
                message,
            });
        }
        warn!(part = %self.part, "skipping malformed fragment: {}", message);
        Ok(())
    }

    /// A comment element the schema cannot identify.
    pub fn invalid(&self, reason: impl Into<String>) -> OoxmlError {
        OoxmlError::InvalidComment {
            part: self.part.to_string(),
            reason: reason.into(),
        }
    }

    /// Normalize a timestamp attribute, reporting a fragment error when it cannot be read.
    pub fn timestamp(&self, raw: Option<&str>) -> Result<String> {
        let raw = raw.unwrap_or_default().trim();
        if raw.is_empty() {
            return Ok(String::new());
        }
        match normalize_timestamp(raw) {
            Some(ts) => Ok(ts),
            None => {
                self.fragment(format!("unreadable timestamp '{}'", raw))?;
                Ok(String::new())
            },
        }
    }
}

/// Decode and parse a part. Failure is fatal for the whole part.
pub fn parse_part<'a>(part: &PackURI, xml: &'a str) -> Result<Document<'a>> {
    Document::parse(xml).map_err(|e| OoxmlError::malformed_part(part, e))
}

/// Decode the bytes of a part, without a byte order mark.
///
/// Parts may be UTF-8 or UTF-16. The encoding is taken from the byte order mark,
/// or from the byte pattern of the leading `<` when a UTF-16 part has none. UTF-8
/// parts are borrowed.
pub fn part_text<'a>(part: &PackURI, blob: &'a [u8]) -> Result<Cow<'a, str>> {
    let (encoding, bom_len) = match Encoding::for_bom(blob) {
        Some(found) => found,
        None => match blob {
            [b'<', 0, ..] => (UTF_16LE, 0),
            [0, b'<', ..] => (UTF_16BE, 0),
            _ => (UTF_8, 0),
        },
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(&blob[bom_len..])
        .ok_or_else(|| {
            OoxmlError::malformed_part(part, format!("invalid {} content", encoding.name()))
        })
}

/// Text of the `t`/`text` elements below `node`, concatenated in document order.
///
/// A `text` element only counts when it holds plain text; once it wraps runs, the
/// whitespace between them is formatting.
pub fn element_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter(|n| {
            n.parent_element().is_some_and(|p| match p.tag_name().name() {
                "t" => true,
                "text" => !p.children().any(|c| c.is_element()),
                _ => false,
            })
        })
        .filter_map(|n| n.text())
        .collect()
}

/// First direct child element with the given namespace and local name.
pub fn child<'a, 'input>(
    node: Node<'a, 'input>,
    namespace: &str,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name((namespace, name)))
}

/// Attribute by local name, whatever its prefix.
///
/// Producers disagree on whether some attributes are namespaced (`w15:paraId`) or
/// not, so loaders look them up by local name.
pub fn attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name() == name)
        .map(|a| a.value())
}

/// Parse the timestamp formats found in Office parts into `YYYY-MM-DDTHH:MM:SS.mmmZ`.
///
/// Zone-less values are taken as UTC; a bare date becomes midnight UTC.
pub fn normalize_timestamp(raw: &str) -> Option<String> {
    let utc: DateTime<Utc> = if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        dt.with_timezone(&Utc)
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        naive.and_utc()
    } else if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        date.and_hms_opt(0, 0, 0)?.and_utc()
    } else {
        return None;
    };

    Some(utc.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}
