/// Error types for comment thread extraction.
use thiserror::Error;

/// Result type for OOXML operations.
pub type Result<T> = std::result::Result<T, OoxmlError>;

/// Error types for OOXML operations.
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// OPC package error
    #[error("OPC error: {0}")]
    Opc(#[from] crate::ooxml::opc::error::OpcError),

    /// The input path does not name a supported container format
    #[error("Unrecognizable extension '{ext}' for {path}")]
    UnrecognizedExtension { path: String, ext: String },

    /// A recognized part could not be parsed as XML at all
    #[error("Malformed part {part}: {message}")]
    MalformedPart { part: String, message: String },

    /// A single element inside an otherwise readable part is unusable
    #[error("Malformed fragment in {part}: {message}")]
    MalformedFragment { part: String, message: String },

    /// A comment element lacks what its schema requires to identify it
    #[error("Invalid comment in {part}: {reason}")]
    InvalidComment { part: String, reason: String },

    /// Two comments of one container share an id
    #[error("Duplicate comment id '{id}' in {container}")]
    DuplicateComment { container: String, id: String },

    /// A reply whose parent is not among the loaded comments
    #[error("Comment '{id}' replies to unknown comment '{parent_id}'")]
    OrphanComment { id: String, parent_id: String },

    /// Following parent ids from a comment leads back to itself
    #[error("Comment '{id}' is part of a parent cycle")]
    CommentCycle { id: String },

    /// A comment range anchor has no enclosing addressable paragraph
    #[error("Comment anchor '{comment_ref}' has no enclosing paragraph")]
    MissingAnchor { comment_ref: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl OoxmlError {
    pub(crate) fn malformed_part(part: impl ToString, err: impl std::fmt::Display) -> Self {
        OoxmlError::MalformedPart {
            part: part.to_string(),
            message: err.to_string(),
        }
    }
}
