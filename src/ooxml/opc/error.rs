/// Error types for OPC package operations
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpcError {
    #[error("Package not found: {0}")]
    PackageNotFound(String),

    #[error("Invalid pack URI: {0}")]
    InvalidPackUri(String),

    #[error("Package has no [Content_Types].xml part")]
    MissingManifest,

    #[error("Content type could not be identified for part: {0}")]
    UnidentifiedContentType(String),

    #[error("Parts still unresolved after {passes} passes: {}", .parts.join(", "))]
    UnresolvedPart { passes: usize, parts: Vec<String> },

    #[error("Relationship {r_id} in {rels_part} points to an unresolvable target '{target}'")]
    MissingRelationshipTarget {
        rels_part: String,
        r_id: String,
        target: String,
    },

    #[error("XML parsing error: {0}")]
    XmlError(String),

    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Quick-XML error: {0}")]
    QuickXmlError(#[from] quick_xml::Error),

    #[error("Attribute error: {0}")]
    AttrError(String),
}

impl From<quick_xml::events::attributes::AttrError> for OpcError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        OpcError::AttrError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OpcError>;
