/// Constant values related to the Open Packaging Convention.
///
/// This module contains the content type URIs (like MIME-types), XML namespaces and
/// relationship types that the comment extractor has to recognize by exact string.

/// Content type URIs (like MIME-types) that specify a part's format
pub mod content_type {
    // OPC core content types
    pub const OPC_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";

    // WordprocessingML content types
    pub const WML_DOCUMENT_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
    pub const WML_DOCUMENT_MACRO: &str = "application/vnd.ms-word.document.macroEnabled.main+xml";
    pub const WML_COMMENTS: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.comments+xml";
    pub const WML_COMMENTS_EXTENDED: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.commentsExtended+xml";
    pub const WML_PEOPLE: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.people+xml";

    // SpreadsheetML content types
    pub const SML_SHEET_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
    pub const SML_SHEET_MACRO: &str = "application/vnd.ms-excel.sheet.macroEnabled.main+xml";
    pub const SML_COMMENTS: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.comments+xml";
    pub const SML_THREADED_COMMENTS: &str = "application/vnd.ms-excel.threadedcomments+xml";
    pub const SML_PERSONS: &str = "application/vnd.ms-excel.person+xml";

    // PresentationML content types
    pub const PML_COMMENTS: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.comments+xml";
    pub const PML_COMMENT_AUTHORS: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.commentAuthors+xml";
    pub const PML_MODERN_COMMENTS: &str = "application/vnd.ms-powerpoint.comments+xml";
    pub const PML_AUTHORS: &str = "application/vnd.ms-powerpoint.authors+xml";
}

/// XML namespace URIs used by the comment-bearing parts
pub mod namespace {
    /// DrawingML wordprocessing drawing namespace
    pub const DML_WORDPROCESSING_DRAWING: &str =
        "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";

    /// Office relationships namespace
    pub const OFC_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    /// WordprocessingML main namespace
    pub const WML_MAIN: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    /// Word 2010 extensions (`w14:paraId`)
    pub const WML_2010: &str = "http://schemas.microsoft.com/office/word/2010/wordml";

    /// Word 2012 extensions (`w15:commentEx`, `w15:person`)
    pub const WML_2012: &str = "http://schemas.microsoft.com/office/word/2012/wordml";

    /// SpreadsheetML main namespace
    pub const SML_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

    /// Excel 2018 threaded comments namespace
    pub const SML_THREADED_COMMENTS: &str =
        "http://schemas.microsoft.com/office/spreadsheetml/2018/threadedcomments";

    /// PresentationML main namespace
    pub const PML_MAIN: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

    /// PowerPoint 2012 extensions (`p15:parentCm`)
    pub const PML_2012: &str = "http://schemas.microsoft.com/office/powerpoint/2012/main";

    /// PowerPoint 2018 modern comments (`p188:cm`)
    pub const PML_2018: &str = "http://schemas.microsoft.com/office/powerpoint/2018/8/main";
}

/// Open XML relationship target modes
pub mod target_mode {
    /// Internal relationship target mode (default)
    pub const INTERNAL: &str = "Internal";

    /// External relationship target mode (e.g., hyperlinks to external URLs)
    pub const EXTERNAL: &str = "External";
}

/// Relationship type URIs used in OPC packages
pub mod relationship_type {
    // Office document
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

    // Sub-containers
    pub const WORKSHEET: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
    pub const SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

    // Comment parts
    pub const COMMENTS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments";
    pub const THREADED_COMMENT: &str =
        "http://schemas.microsoft.com/office/2017/10/relationships/threadedComment";
    pub const MODERN_COMMENTS: &str =
        "http://schemas.microsoft.com/office/2018/10/relationships/comments";
    pub const COMMENTS_EXTENDED: &str =
        "http://schemas.microsoft.com/office/2011/relationships/commentsExtended";
}
