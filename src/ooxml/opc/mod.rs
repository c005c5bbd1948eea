/// Open Packaging Conventions (OPC) implementation.
///
/// This module covers the part of the OPC specification needed to walk a package
/// without trusting the order of its archive entries:
///
/// - Part names (`PackURI`) and relationship target resolution
/// - Content type lookup from `[Content_Types].xml`
/// - ZIP-based physical packaging with parallel inflation
/// - A bounded retry queue for parts that arrive before their dependencies
///
/// # Performance Features
///
/// - Uses `quick-xml` for streaming parsing of manifests and `.rels` parts
/// - Uses `rayon` to decompress archive entries concurrently
/// - Uses `smallvec` for the short relationship lists of typical parts

pub mod constants;
pub mod content_types;
pub mod error;
pub mod packuri;
pub mod pending;
pub mod phys_pkg;
pub mod rel;

// Re-export commonly used types
pub use content_types::ContentTypeRegistry;
pub use error::OpcError;
pub use packuri::PackURI;
pub use pending::PendingQueue;
pub use phys_pkg::{ArchiveEntry, PhysPkgReader};
pub use rel::{Relationship, Relationships};
