//! Word loaders: `w:comments`, `w15:commentsEx` and `w15:people`.
//!
//! Word keeps threading outside the comments part. A comment is known to
//! `commentsExtended` by the `w14:paraId` of its last paragraph, so that paragraph
//! id becomes the comment id and `w:id` stays available as the anchor reference.

use super::{LoadContext, child, element_text};
use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::namespace as ns;
use crate::ooxml::threads::format::CommentSchema;
use crate::ooxml::threads::record::{CommentRecord, Person};
use roxmltree::Document;

/// Threading data of one comment from `commentsExtended`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentExtension {
    pub para_id: String,
    pub parent_para_id: String,
    pub done: bool,
}

/// Read `<w:comment>` elements.
pub fn load_comments(ctx: &LoadContext<'_>, doc: &Document<'_>) -> Result<Vec<CommentRecord>> {
    let mut comments = Vec::new();

    for element in doc
        .descendants()
        .filter(|n| n.has_tag_name((ns::WML_MAIN, "comment")))
    {
        let w_id = element
            .attribute((ns::WML_MAIN, "id"))
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ctx.invalid("w:comment without w:id"))?;

        let paragraphs: Vec<_> = element
            .children()
            .filter(|n| n.has_tag_name((ns::WML_MAIN, "p")))
            .collect();
        let Some(last) = paragraphs.last() else {
            return Err(ctx.invalid(format!("comment {} has no paragraph", w_id)));
        };
        let id = last
            .attribute((ns::WML_2010, "paraId"))
            .filter(|id| !id.is_empty())
            .unwrap_or(w_id);

        let mut record = CommentRecord::new(CommentSchema::WordComments, id);
        record.reference = w_id.to_string();
        record.timestamp = ctx.timestamp(element.attribute((ns::WML_MAIN, "date")))?;
        record.author_id = element
            .attribute((ns::WML_MAIN, "author"))
            .unwrap_or_default()
            .to_string();
        record.text = paragraphs
            .iter()
            .map(|p| element_text(*p))
            .collect::<Vec<_>>()
            .join("\n");
        record.owner_part = Some(ctx.part.to_string());
        comments.push(record);
    }

    Ok(comments)
}

/// Read `<w15:commentEx>` elements.
pub fn load_extensions(ctx: &LoadContext<'_>, doc: &Document<'_>) -> Result<Vec<CommentExtension>> {
    let mut extensions = Vec::new();

    for element in doc
        .descendants()
        .filter(|n| n.has_tag_name((ns::WML_2012, "commentEx")))
    {
        let Some(para_id) = element
            .attribute((ns::WML_2012, "paraId"))
            .filter(|id| !id.is_empty())
        else {
            ctx.fragment("commentEx without paraId")?;
            continue;
        };

        extensions.push(CommentExtension {
            para_id: para_id.to_string(),
            parent_para_id: element
                .attribute((ns::WML_2012, "paraIdParent"))
                .unwrap_or_default()
                .to_string(),
            done: matches!(element.attribute((ns::WML_2012, "done")), Some("1" | "true")),
        });
    }

    Ok(extensions)
}

/// Read `<w15:person>` elements.
///
/// Word comments name their author by display name, so the person is keyed by
/// `w15:author`. The provider comes from the nested `w15:presenceInfo`.
pub fn load_people(ctx: &LoadContext<'_>, doc: &Document<'_>) -> Result<Vec<Person>> {
    let mut persons = Vec::new();

    for element in doc
        .descendants()
        .filter(|n| n.has_tag_name((ns::WML_2012, "person")))
    {
        let Some(author) = element
            .attribute((ns::WML_2012, "author"))
            .filter(|a| !a.is_empty())
        else {
            ctx.fragment("w15:person without author")?;
            continue;
        };

        let provider_id = child(element, ns::WML_2012, "presenceInfo")
            .and_then(|info| info.attribute((ns::WML_2012, "providerId")))
            .unwrap_or_default();

        persons.push(Person {
            id: author.to_string(),
            display_name: author.to_string(),
            provider_id: provider_id.to_string(),
        });
    }

    Ok(persons)
}
