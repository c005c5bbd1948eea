//! Presentation loaders for both comment schemas.
//!
//! Legacy comments (`p:cm`) are numbered per author, so their id combines the
//! author id and `idx`. Modern comments (`p188:cm`) nest their replies; each reply
//! becomes its own record whose parent is the enclosing comment.

use super::{LoadContext, attr, child, element_text};
use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::namespace as ns;
use crate::ooxml::threads::format::CommentSchema;
use crate::ooxml::threads::record::{CommentRecord, Person, Position};
use roxmltree::{Document, Node};

fn legacy_id(author_id: &str, idx: &str) -> String {
    format!("{}-{}", author_id, idx)
}

fn position(ctx: &LoadContext<'_>, pos: Option<Node<'_, '_>>, id: &str) -> Result<Option<Position>> {
    let Some(pos) = pos else {
        return Ok(None);
    };
    match (attr(pos, "x"), attr(pos, "y")) {
        (Some(x), Some(y)) => Ok(Some(Position {
            x: x.to_string(),
            y: y.to_string(),
        })),
        _ => {
            ctx.fragment(format!("comment {} has an incomplete position", id))?;
            Ok(None)
        },
    }
}

/// Read legacy `<p:cm>` elements.
pub fn load_legacy_comments(ctx: &LoadContext<'_>, doc: &Document<'_>) -> Result<Vec<CommentRecord>> {
    let mut comments = Vec::new();

    for element in doc
        .descendants()
        .filter(|n| n.has_tag_name((ns::PML_MAIN, "cm")))
    {
        let (Some(author_id), Some(idx)) = (attr(element, "authorId"), attr(element, "idx")) else {
            return Err(ctx.invalid("p:cm without authorId and idx"));
        };
        let id = legacy_id(author_id, idx);

        let pos = child(element, ns::PML_MAIN, "pos");
        if pos.is_none() {
            ctx.fragment(format!("comment {} has no position", id))?;
        }

        let parent_id = element
            .descendants()
            .find(|n| n.has_tag_name((ns::PML_2012, "parentCm")))
            .and_then(|p| Some(legacy_id(attr(p, "authorId")?, attr(p, "idx")?)))
            .unwrap_or_default();

        let mut record = CommentRecord::new(CommentSchema::SlideLegacy, id.as_str());
        record.timestamp = ctx.timestamp(attr(element, "dt"))?;
        record.author_id = author_id.to_string();
        record.parent_id = parent_id;
        record.text = child(element, ns::PML_MAIN, "text")
            .and_then(|t| t.text())
            .unwrap_or_default()
            .to_string();
        record.position = position(ctx, pos, &id)?;
        record.owner_part = Some(ctx.part.to_string());
        comments.push(record);
    }

    Ok(comments)
}

/// Read modern `<p188:cm>` elements, flattening their replies.
pub fn load_modern_comments(ctx: &LoadContext<'_>, doc: &Document<'_>) -> Result<Vec<CommentRecord>> {
    let mut comments = Vec::new();

    for element in doc
        .descendants()
        .filter(|n| n.has_tag_name((ns::PML_2018, "cm")))
    {
        let mut record = modern_record(ctx, element, "comment")?;
        record.done = attr(element, "status") == Some("resolved");
        record.position = position(ctx, child(element, ns::PML_2018, "pos"), &record.id)?;

        let replies = child(element, ns::PML_2018, "replyLst")
            .into_iter()
            .flat_map(|list| list.children())
            .filter(|n| n.has_tag_name((ns::PML_2018, "reply")));
        let mut flattened = Vec::new();
        for reply in replies {
            let mut reply_record = modern_record(ctx, reply, "reply")?;
            reply_record.parent_id = record.id.clone();
            reply_record.position = record.position.clone();
            flattened.push(reply_record);
        }

        comments.push(record);
        comments.append(&mut flattened);
    }

    Ok(comments)
}

fn modern_record(ctx: &LoadContext<'_>, element: Node<'_, '_>, what: &str) -> Result<CommentRecord> {
    let id = attr(element, "id")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ctx.invalid(format!("{} without id", what)))?;
    let body = child(element, ns::PML_2018, "txBody")
        .ok_or_else(|| ctx.invalid(format!("{} {} has no txBody", what, id)))?;

    let mut record = CommentRecord::new(CommentSchema::SlideModern, id);
    record.timestamp = ctx.timestamp(attr(element, "created"))?;
    record.author_id = attr(element, "authorId").unwrap_or_default().to_string();
    record.text = element_text(body);
    record.owner_part = Some(ctx.part.to_string());
    Ok(record)
}

/// Read legacy `<p:cmAuthor>` elements.
pub fn load_legacy_authors(ctx: &LoadContext<'_>, doc: &Document<'_>) -> Result<Vec<Person>> {
    load_authors(ctx, doc, (ns::PML_MAIN, "cmAuthor"))
}

/// Read modern `<p188:author>` elements.
pub fn load_modern_authors(ctx: &LoadContext<'_>, doc: &Document<'_>) -> Result<Vec<Person>> {
    load_authors(ctx, doc, (ns::PML_2018, "author"))
}

fn load_authors(
    ctx: &LoadContext<'_>,
    doc: &Document<'_>,
    tag: (&str, &str),
) -> Result<Vec<Person>> {
    let mut persons = Vec::new();

    for element in doc.descendants().filter(|n| n.has_tag_name(tag)) {
        let Some(id) = attr(element, "id") else {
            ctx.fragment("author without id")?;
            continue;
        };
        persons.push(Person {
            id: id.to_string(),
            display_name: attr(element, "name").unwrap_or_default().to_string(),
            provider_id: attr(element, "providerId").unwrap_or_default().to_string(),
        });
    }

    Ok(persons)
}
