//! Spreadsheet loaders: threaded comments, persons, legacy notes and sheet titles.

use super::{LoadContext, attr, element_text};
use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::namespace as ns;
use crate::ooxml::threads::format::CommentSchema;
use crate::ooxml::threads::record::{CommentRecord, Person};
use roxmltree::Document;
use std::collections::HashMap;

/// Read `<threadedComment>` elements.
///
/// `id` is required; every other attribute may be missing.
pub fn load_threaded_comments(ctx: &LoadContext<'_>, doc: &Document<'_>) -> Result<Vec<CommentRecord>> {
    let mut comments = Vec::new();

    for element in doc
        .descendants()
        .filter(|n| n.has_tag_name((ns::SML_THREADED_COMMENTS, "threadedComment")))
    {
        let id = attr(element, "id")
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ctx.invalid("threadedComment without id"))?;

        let mut record = CommentRecord::new(CommentSchema::SheetThreaded, id);
        record.reference = attr(element, "ref").unwrap_or_default().to_string();
        record.timestamp = ctx.timestamp(attr(element, "dT"))?;
        record.author_id = attr(element, "personId").unwrap_or_default().to_string();
        record.parent_id = attr(element, "parentId").unwrap_or_default().to_string();
        record.done = matches!(attr(element, "done"), Some("1" | "true"));
        record.text = element_text(element);
        record.owner_part = Some(ctx.part.to_string());
        comments.push(record);
    }

    Ok(comments)
}

/// Read the `<person>` elements of a person list.
pub fn load_persons(ctx: &LoadContext<'_>, doc: &Document<'_>) -> Result<Vec<Person>> {
    let mut persons = Vec::new();

    for element in doc
        .descendants()
        .filter(|n| n.has_tag_name((ns::SML_THREADED_COMMENTS, "person")))
    {
        let Some(id) = attr(element, "id").filter(|id| !id.is_empty()) else {
            ctx.fragment("person without id")?;
            continue;
        };
        persons.push(Person {
            id: id.to_string(),
            display_name: attr(element, "displayName").unwrap_or_default().to_string(),
            provider_id: attr(element, "providerId").unwrap_or_default().to_string(),
        });
    }

    Ok(persons)
}

/// Read legacy notes (`<commentList><comment ref authorId>`).
///
/// Notes have no id of their own. A cell holds at most one note, so the cell
/// reference identifies it. The author id is replaced by the author's name from
/// the part's own `<authors>` list.
pub fn load_notes(ctx: &LoadContext<'_>, doc: &Document<'_>) -> Result<Vec<CommentRecord>> {
    let authors: Vec<String> = doc
        .descendants()
        .filter(|n| n.has_tag_name((ns::SML_MAIN, "author")))
        .map(|n| n.text().unwrap_or_default().to_string())
        .collect();

    let mut notes = Vec::new();

    for element in doc
        .descendants()
        .filter(|n| n.has_tag_name((ns::SML_MAIN, "comment")))
    {
        let reference = attr(element, "ref")
            .filter(|r| !r.is_empty())
            .ok_or_else(|| ctx.invalid("note without cell reference"))?;

        let author = match attr(element, "authorId").map(str::parse::<usize>) {
            Some(Ok(index)) if index < authors.len() => authors[index].clone(),
            Some(_) => {
                ctx.fragment(format!("note {} has an unknown author", reference))?;
                String::new()
            },
            None => String::new(),
        };

        let mut record = CommentRecord::new(CommentSchema::SheetNotes, format!("note-{}", reference));
        record.reference = reference.to_string();
        record.author_id = author;
        record.text = element_text(element);
        record.owner_part = Some(ctx.part.to_string());
        notes.push(record);
    }

    Ok(notes)
}

/// Map relationship ids of the workbook's `<sheet>` elements to sheet titles.
pub fn sheet_titles(doc: &Document<'_>) -> HashMap<String, String> {
    doc.descendants()
        .filter(|n| n.has_tag_name((ns::SML_MAIN, "sheet")))
        .filter_map(|n| {
            let r_id = n.attribute((ns::OFC_RELATIONSHIPS, "id"))?;
            let name = n.attribute("name")?;
            Some((r_id.to_string(), name.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::error::OoxmlError;
    use crate::ooxml::opc::packuri::PackURI;

    const THREADED: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
        <ThreadedComments xmlns="http://schemas.microsoft.com/office/spreadsheetml/2018/threadedcomments">
            <threadedComment ref="A1" dT="2021-05-04T10:12:00.00" personId="P1" id="C1" done="1">
                <text>Hi</text>
            </threadedComment>
            <threadedComment ref="A1" dT="2021-05-04T10:13:00.00" personId="P2" id="C2" parentId="C1">
                <text>Thanks</text>
            </threadedComment>
        </ThreadedComments>"#;

    fn ctx(part: &PackURI) -> LoadContext<'_> {
        LoadContext::new(part, false)
    }

    #[test]
    fn test_load_threaded_comments() {
        let part = PackURI::from_member("xl/threadedComments/threadedComment1.xml");
        let doc = Document::parse(THREADED).unwrap();
        let comments = load_threaded_comments(&ctx(&part), &doc).unwrap();

        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].id, "C1");
        assert_eq!(comments[0].reference, "A1");
        assert_eq!(comments[0].timestamp, "2021-05-04T10:12:00.000Z");
        assert_eq!(comments[0].text, "Hi");
        assert!(comments[0].done);
        assert!(comments[0].is_root());
        assert_eq!(comments[1].parent_id, "C1");
        assert_eq!(comments[1].author_id, "P2");
        assert_eq!(
            comments[1].owner_part.as_deref(),
            Some("/xl/threadedComments/threadedComment1.xml")
        );
    }

    #[test]
    fn test_threaded_comment_without_id_is_invalid() {
        let xml = r#"<ThreadedComments xmlns="http://schemas.microsoft.com/office/spreadsheetml/2018/threadedcomments">
            <threadedComment ref="A1"><text>Hi</text></threadedComment>
        </ThreadedComments>"#;
        let part = PackURI::from_member("xl/threadedComments/threadedComment1.xml");
        let doc = Document::parse(xml).unwrap();

        assert!(matches!(
            load_threaded_comments(&ctx(&part), &doc),
            Err(OoxmlError::InvalidComment { .. })
        ));
    }

    #[test]
    fn test_load_persons_skips_bad_fragment() {
        let xml = r#"<personList xmlns="http://schemas.microsoft.com/office/spreadsheetml/2018/threadedcomments">
            <person displayName="Alice" id="P1" userId="alice@example.com" providerId="AD"/>
            <person displayName="Nobody"/>
        </personList>"#;
        let part = PackURI::from_member("xl/persons/person.xml");
        let doc = Document::parse(xml).unwrap();

        let persons = load_persons(&ctx(&part), &doc).unwrap();
        assert_eq!(persons.len(), 1);
        assert_eq!(persons[0].display_name, "Alice");
        assert_eq!(persons[0].provider_id, "AD");

        let strict = LoadContext::new(&part, true);
        assert!(load_persons(&strict, &doc).is_err());
    }

    #[test]
    fn test_load_notes() {
        let xml = r#"<comments xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
            <authors><author>Bob</author></authors>
            <commentList>
                <comment ref="B2" authorId="0">
                    <text><r><t>Bob:</t></r><r><t xml:space="preserve"> check this</t></r></text>
                </comment>
            </commentList>
        </comments>"#;
        let part = PackURI::from_member("xl/comments1.xml");
        let doc = Document::parse(xml).unwrap();

        let notes = load_notes(&ctx(&part), &doc).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, "note-B2");
        assert_eq!(notes[0].author_id, "Bob");
        assert_eq!(notes[0].text, "Bob: check this");
        assert_eq!(notes[0].schema(), CommentSchema::SheetNotes);
    }

    #[test]
    fn test_sheet_titles() {
        let xml = r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
                xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
            <sheets>
                <sheet name="Budget" sheetId="1" r:id="rId1"/>
                <sheet name="Notes" sheetId="2" r:id="rId2"/>
            </sheets>
        </workbook>"#;
        let doc = Document::parse(xml).unwrap();
        let titles = sheet_titles(&doc);
        assert_eq!(titles.get("rId1").map(String::as_str), Some("Budget"));
        assert_eq!(titles.get("rId2").map(String::as_str), Some("Notes"));
    }
}
