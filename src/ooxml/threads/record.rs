//! Comment, person and forest value types.
//!
//! Records are created while the package is read and frozen once the forest is
//! built. They serialize to JSON with camelCase field names.

use crate::ooxml::threads::format::CommentSchema;
use serde::Serialize;
use std::collections::BTreeMap;

/// Position of a slide comment, kept as written in the part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    pub x: String,
    pub y: String,
}

/// One comment, either a thread root or a reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    /// Unique within the comment's container
    pub id: String,
    /// Anchor reference: a cell, a comment range id, or empty
    #[serde(rename = "ref")]
    pub reference: String,
    /// `YYYY-MM-DDTHH:MM:SS.mmmZ`, or empty when the part carries none
    pub timestamp: String,
    pub author_id: String,
    pub done: bool,
    /// Empty for a thread root
    pub parent_id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<CommentRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_part: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip)]
    pub(crate) schema: CommentSchema,
    #[serde(skip)]
    pub(crate) position: Option<Position>,
}

impl CommentRecord {
    pub(crate) fn new(schema: CommentSchema, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reference: String::new(),
            timestamp: String::new(),
            author_id: String::new(),
            done: false,
            parent_id: String::new(),
            text: String::new(),
            children: None,
            owner_part: None,
            location: None,
            schema,
            position: None,
        }
    }

    /// Whether this comment starts a thread.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent_id.is_empty()
    }

    /// Schema the comment was read from.
    #[inline]
    pub fn schema(&self) -> CommentSchema {
        self.schema
    }

    /// Replies, in document order.
    pub fn replies(&self) -> &[CommentRecord] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Number of comments in this thread, this one included.
    pub fn thread_len(&self) -> usize {
        1 + self.replies().iter().map(CommentRecord::thread_len).sum::<usize>()
    }
}

/// An author as declared by a person or author-list part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub display_name: String,
    pub provider_id: String,
}

/// Thread roots of one container (a worksheet, a slide, the document body).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerThreads {
    /// Display name: the sheet title, the slide or document part stem
    pub name: String,
    /// Main part of the container
    pub part: String,
    pub roots: Vec<CommentRecord>,
}

/// The result of one extraction.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CommentForest {
    /// Containers in discovery order
    pub containers: Vec<ContainerThreads>,
    pub persons: BTreeMap<String, Person>,
}

impl CommentForest {
    /// Thread roots of all containers, in container discovery order.
    pub fn roots(&self) -> impl Iterator<Item = &CommentRecord> {
        self.containers.iter().flat_map(|c| c.roots.iter())
    }

    /// Consume the forest into its roots.
    pub fn into_roots(self) -> Vec<CommentRecord> {
        self.containers.into_iter().flat_map(|c| c.roots).collect()
    }

    /// Total number of comments, replies included.
    pub fn comment_count(&self) -> usize {
        self.roots().map(CommentRecord::thread_len).sum()
    }

    /// Display name of an author, or the raw id when no person matches.
    pub fn display_name<'a>(&'a self, author_id: &'a str) -> &'a str {
        self.persons
            .get(author_id)
            .map(|p| p.display_name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(author_id)
    }

    /// Look up a comment anywhere in the forest.
    pub fn find(&self, id: &str) -> Option<&CommentRecord> {
        fn walk<'a>(records: &'a [CommentRecord], id: &str) -> Option<&'a CommentRecord> {
            records
                .iter()
                .find_map(|r| if r.id == id { Some(r) } else { walk(r.replies(), id) })
        }
        self.containers.iter().find_map(|c| walk(&c.roots, id))
    }
}
