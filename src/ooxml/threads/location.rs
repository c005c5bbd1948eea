//! Human-readable anchor descriptions for comments.
//!
//! - Sheets: `"<sheet>: <cell>"` for threaded comments, the sheet title for notes.
//! - Slides: `"<slide>: {"x":"..","y":".."}"`, or the slide name without a position.
//! - Documents: `"<heading>, selected: "<text>""`, computed from the main part by
//!   [`document_anchors`] and looked up by the comment's `w:id`.

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::namespace as ns;
use crate::ooxml::threads::format::CommentSchema;
use crate::ooxml::threads::loaders::{LoadContext, element_text};
use crate::ooxml::threads::record::CommentRecord;
use roxmltree::{Document, Node, NodeId};
use std::collections::HashMap;
use tracing::warn;

/// Location of every comment range in a document, keyed by `w:id`.
pub type AnchorMap = HashMap<String, String>;

/// Compute the location of every `w:commentRangeStart` of a document main part.
///
/// # Errors
/// [`OoxmlError::MalformedPart`] when the document has no body, and
/// [`OoxmlError::MissingAnchor`] when a range sits before the first body paragraph.
pub fn document_anchors(ctx: &LoadContext<'_>, doc: &Document<'_>) -> Result<AnchorMap> {
    let body = doc
        .descendants()
        .find(|n| n.has_tag_name((ns::WML_MAIN, "body")))
        .ok_or_else(|| OoxmlError::malformed_part(ctx.part, "document has no w:body"))?;
    let headings = heading_map(body);

    let mut anchors = AnchorMap::new();
    for start in doc
        .descendants()
        .filter(|n| n.has_tag_name((ns::WML_MAIN, "commentRangeStart")))
    {
        let Some(id) = start.attribute((ns::WML_MAIN, "id")) else {
            ctx.fragment("commentRangeStart without w:id")?;
            continue;
        };

        let paragraph = nearest_paragraph(start, &headings).ok_or_else(|| {
            OoxmlError::MissingAnchor {
                comment_ref: id.to_string(),
            }
        })?;
        let heading = headings.get(&paragraph).map(String::as_str).unwrap_or_default();

        anchors.insert(
            id.to_string(),
            format!("{}, selected: \"{}\"", heading, selected_text(start)),
        );
    }

    Ok(anchors)
}

/// For each direct body paragraph, the nearest heading at or above it.
///
/// A heading is a paragraph whose style starts with `Heading`; it is described as
/// `"<style>: <text>"`. Paragraphs before the first heading map to an empty string.
fn heading_map(body: Node<'_, '_>) -> HashMap<NodeId, String> {
    let mut headings = HashMap::new();
    let mut last_heading = String::new();

    for paragraph in body
        .children()
        .filter(|n| n.has_tag_name((ns::WML_MAIN, "p")))
    {
        let style = paragraph
            .descendants()
            .find(|n| n.has_tag_name((ns::WML_MAIN, "pStyle")))
            .and_then(|s| s.attribute((ns::WML_MAIN, "val")));
        if let Some(style) = style.filter(|s| s.starts_with("Heading")) {
            last_heading = format!("{}: {}", style, element_text(paragraph));
        }
        headings.insert(paragraph.id(), last_heading.clone());
    }

    headings
}

/// Walk up from an anchor to the body paragraph that holds it.
///
/// An anchor that sits directly under the body belongs to the paragraph before it,
/// so the walk moves to the previous sibling there instead of the parent.
fn nearest_paragraph(anchor: Node<'_, '_>, headings: &HashMap<NodeId, String>) -> Option<NodeId> {
    let mut cursor = Some(anchor);

    while let Some(node) = cursor {
        if headings.contains_key(&node.id()) {
            return Some(node.id());
        }
        cursor = match node.parent_element() {
            Some(parent) if parent.has_tag_name((ns::WML_MAIN, "body")) => {
                node.prev_sibling_element()
            },
            parent => parent,
        };
    }

    None
}

/// Text of the first run after the range start, or the name of the drawing it holds.
fn selected_text(start: Node<'_, '_>) -> String {
    let run = std::iter::successors(start.next_sibling_element(), |n| n.next_sibling_element())
        .find(|n| n.has_tag_name((ns::WML_MAIN, "r")));
    let Some(run) = run else {
        return String::new();
    };

    let text = element_text(run);
    if !text.is_empty() {
        return text;
    }
    run.descendants()
        .find(|n| n.has_tag_name((ns::DML_WORDPROCESSING_DRAWING, "docPr")))
        .and_then(|n| n.attribute("name"))
        .unwrap_or_default()
        .to_string()
}

/// Location of one comment inside its container.
///
/// `container` is the display name of the owning sheet or slide; `anchors` is only
/// consulted for document comments.
pub fn locate(comment: &CommentRecord, container: &str, anchors: &AnchorMap) -> Result<Option<String>> {
    let location = match comment.schema() {
        CommentSchema::SheetThreaded if !comment.reference.is_empty() => {
            format!("{}: {}", container, comment.reference)
        },
        CommentSchema::SheetThreaded | CommentSchema::SheetNotes => container.to_string(),
        CommentSchema::SlideLegacy | CommentSchema::SlideModern => match &comment.position {
            Some(position) => {
                let json = serde_json::to_string(position)
                    .map_err(|e| OoxmlError::Other(format!("position of {}: {}", comment.id, e)))?;
                format!("{}: {}", container, json)
            },
            None => container.to_string(),
        },
        CommentSchema::WordComments => match anchors.get(&comment.reference) {
            Some(anchor) => anchor.clone(),
            None => {
                warn!(comment = %comment.id, reference = %comment.reference, "comment has no range in the document");
                return Ok(None);
            },
        },
    };

    Ok(Some(location))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::packuri::PackURI;
    use crate::ooxml::threads::record::Position;

    const DOCUMENT: &str = r#"<w:document
            xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"
            xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing">
        <w:body>
            <w:p><w:r><w:t>Preamble</w:t></w:r></w:p>
            <w:p>
                <w:pPr><w:pStyle w:val="Heading1"/></w:pPr>
                <w:r><w:t>Intro</w:t></w:r>
            </w:p>
            <w:p>
                <w:r><w:t>Some </w:t></w:r>
                <w:commentRangeStart w:id="0"/>
                <w:r><w:t>foo</w:t></w:r>
                <w:commentRangeEnd w:id="0"/>
            </w:p>
            <w:commentRangeStart w:id="1"/>
            <w:p>
                <w:commentRangeStart w:id="2"/>
                <w:r><w:drawing><wp:inline><wp:docPr id="1" name="Picture 1"/></wp:inline></w:drawing></w:r>
            </w:p>
            <w:sectPr/>
        </w:body>
    </w:document>"#;

    fn anchors(xml: &str) -> Result<AnchorMap> {
        let part = PackURI::from_member("word/document.xml");
        let doc = Document::parse(xml).unwrap();
        document_anchors(&LoadContext::new(&part, false), &doc)
    }

    #[test]
    fn test_heading_anchor() {
        let anchors = anchors(DOCUMENT).unwrap();
        assert_eq!(anchors["0"], "Heading1: Intro, selected: \"foo\"");
    }

    #[test]
    fn test_anchor_between_paragraphs_uses_previous_paragraph() {
        let anchors = anchors(DOCUMENT).unwrap();
        assert_eq!(anchors["1"], "Heading1: Intro, selected: \"\"");
    }

    #[test]
    fn test_drawing_name_when_run_has_no_text() {
        let anchors = anchors(DOCUMENT).unwrap();
        assert_eq!(anchors["2"], "Heading1: Intro, selected: \"Picture 1\"");
    }

    #[test]
    fn test_anchor_before_first_paragraph_is_missing() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
            <w:body>
                <w:commentRangeStart w:id="7"/>
                <w:p><w:r><w:t>text</w:t></w:r></w:p>
            </w:body>
        </w:document>"#;
        match anchors(xml) {
            Err(OoxmlError::MissingAnchor { comment_ref }) => assert_eq!(comment_ref, "7"),
            other => panic!("expected MissingAnchor, got {:?}", other),
        }
    }

    #[test]
    fn test_locate_sheet_and_slide() {
        let mut threaded = CommentRecord::new(CommentSchema::SheetThreaded, "C1");
        threaded.reference = "A1".to_string();
        assert_eq!(
            locate(&threaded, "Sheet1", &AnchorMap::new()).unwrap().as_deref(),
            Some("Sheet1: A1")
        );

        let mut slide = CommentRecord::new(CommentSchema::SlideLegacy, "0-1");
        slide.position = Some(Position {
            x: "10".to_string(),
            y: "20".to_string(),
        });
        assert_eq!(
            locate(&slide, "slide1", &AnchorMap::new()).unwrap().as_deref(),
            Some(r#"slide1: {"x":"10","y":"20"}"#)
        );
    }

    #[test]
    fn test_locate_word_comment_without_range() {
        let mut comment = CommentRecord::new(CommentSchema::WordComments, "0A000001");
        comment.reference = "9".to_string();
        assert_eq!(locate(&comment, "document", &AnchorMap::new()).unwrap(), None);
    }
}
