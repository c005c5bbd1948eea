//! Container formats and the per-format resolution profile.
//!
//! The three formats share one resolver. What differs between them is captured
//! here: which relationship names a sub-container, which relationships name
//! comment parts, and which content types carry comment or author data.

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use std::fmt;
use std::path::Path;

/// A supported container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Word processing document (`.docx`)
    Document,
    /// Spreadsheet workbook (`.xlsx`)
    Workbook,
    /// Presentation (`.pptx`)
    Presentation,
}

impl Format {
    /// Pick the format from a file extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "docx" => Some(Format::Document),
            "xlsx" => Some(Format::Workbook),
            "pptx" => Some(Format::Presentation),
            _ => None,
        }
    }

    /// Pick the format from the extension of `path`.
    ///
    /// # Errors
    /// [`OoxmlError::UnrecognizedExtension`] for anything but `docx`, `xlsx` and `pptx`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        Self::from_extension(ext).ok_or_else(|| OoxmlError::UnrecognizedExtension {
            path: path.display().to_string(),
            ext: ext.to_string(),
        })
    }

    /// The resolution profile of this format.
    pub fn profile(self) -> Profile {
        match self {
            Format::Document => Profile {
                format: self,
                container_reltype: None,
                comment_reltypes: &[rt::COMMENTS, rt::COMMENTS_EXTENDED],
            },
            Format::Workbook => Profile {
                format: self,
                container_reltype: Some(rt::WORKSHEET),
                comment_reltypes: &[rt::THREADED_COMMENT, rt::COMMENTS],
            },
            Format::Presentation => Profile {
                format: self,
                container_reltype: Some(rt::SLIDE),
                comment_reltypes: &[rt::COMMENTS, rt::MODERN_COMMENTS],
            },
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Document => "docx",
            Format::Workbook => "xlsx",
            Format::Presentation => "pptx",
        })
    }
}

/// Comment schema variants, one per comment-bearing content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentSchema {
    /// `threadedComments` part of a worksheet
    SheetThreaded,
    /// Legacy `comments` (notes) part of a worksheet
    SheetNotes,
    /// `w:comments` part of a document
    WordComments,
    /// Legacy `p:cmLst` part of a slide
    SlideLegacy,
    /// Modern `p188:cmLst` part of a slide
    SlideModern,
}

/// Author list variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeopleSchema {
    SheetPersons,
    WordPeople,
    SlideLegacyAuthors,
    SlideModernAuthors,
}

/// What the resolver has to do with a part, derived from its content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    /// A `.rels` part
    Relationships,
    /// The main part: sheet titles of a workbook, anchors of a document
    MainPart,
    /// Author or person records
    People(PeopleSchema),
    /// Comment records
    Comments(CommentSchema),
    /// Threading data of document comments
    CommentsExtended,
    /// Anything else; read and dropped
    Other,
}

/// Per-format knobs of the shared resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub format: Format,
    /// Relationship type from the main part to each sub-container; `None` when
    /// the main part is the only container
    pub container_reltype: Option<&'static str>,
    /// Relationship types from a container to its comment parts
    pub comment_reltypes: &'static [&'static str],
}

impl Profile {
    /// Map a content type onto the work the resolver does for it.
    pub fn classify(&self, content_type: &str) -> PartKind {
        if content_type == ct::OPC_RELATIONSHIPS {
            return PartKind::Relationships;
        }

        match self.format {
            Format::Workbook => match content_type {
                ct::SML_SHEET_MAIN | ct::SML_SHEET_MACRO => PartKind::MainPart,
                ct::SML_PERSONS => PartKind::People(PeopleSchema::SheetPersons),
                ct::SML_THREADED_COMMENTS => PartKind::Comments(CommentSchema::SheetThreaded),
                ct::SML_COMMENTS => PartKind::Comments(CommentSchema::SheetNotes),
                _ => PartKind::Other,
            },
            Format::Document => match content_type {
                ct::WML_DOCUMENT_MAIN | ct::WML_DOCUMENT_MACRO => PartKind::MainPart,
                ct::WML_PEOPLE => PartKind::People(PeopleSchema::WordPeople),
                ct::WML_COMMENTS => PartKind::Comments(CommentSchema::WordComments),
                ct::WML_COMMENTS_EXTENDED => PartKind::CommentsExtended,
                _ => PartKind::Other,
            },
            Format::Presentation => match content_type {
                ct::PML_COMMENT_AUTHORS => PartKind::People(PeopleSchema::SlideLegacyAuthors),
                ct::PML_AUTHORS => PartKind::People(PeopleSchema::SlideModernAuthors),
                ct::PML_COMMENTS => PartKind::Comments(CommentSchema::SlideLegacy),
                ct::PML_MODERN_COMMENTS => PartKind::Comments(CommentSchema::SlideModern),
                _ => PartKind::Other,
            },
        }
    }

    /// Whether `reltype` links a container to one of its comment parts.
    #[inline]
    pub fn is_comment_reltype(&self, reltype: &str) -> bool {
        self.comment_reltypes.contains(&reltype)
    }
}
