//! Longan - recovers reviewer comment threads from Office Open XML packages
//!
//! Word (.docx), Excel (.xlsx) and PowerPoint (.pptx) files keep comments, their
//! authors and their threading in separate parts linked by relationships. This
//! library reads a package in whatever order its archive entries come, resolves
//! which container (worksheet, slide, document body) owns each comment, and
//! returns the comments as reply trees with a readable location.
//!
//! # Features
//!
//! - **Order independent**: parts that arrive before what they depend on are
//!   retried a bounded number of times
//! - **Threaded and legacy comments**: Excel threaded comments and notes, Word
//!   comments with `commentsExtended`, PowerPoint legacy and modern comments
//! - **Locations**: `"Sheet1: A1"`, the slide and position, or the nearest heading
//!   and the selected text of a document comment
//! - **Serde**: the forest serializes to JSON with camelCase fields
//!
//! # Example - Reading a workbook
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! for root in longan::extract("budget.xlsx")? {
//!     println!("{}: {}", root.location.as_deref().unwrap_or_default(), root.text);
//!     for reply in root.replies() {
//!         println!("  {}", reply.text);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Feeding entries yourself
//!
//! ```no_run
//! use longan::{ExtractOptions, Format, PackURI, PackageResolver};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let entries: Vec<(String, Vec<u8>)> = Vec::new();
//! let mut resolver = PackageResolver::new(Format::Presentation, ExtractOptions::default());
//! for (name, bytes) in entries {
//!     resolver.ingest(PackURI::from_member(&name), bytes)?;
//! }
//! let forest = resolver.finish()?;
//! # Ok(())
//! # }
//! ```

pub mod ooxml;

pub use ooxml::error::{OoxmlError, Result};
pub use ooxml::opc::{OpcError, PackURI};
pub use ooxml::threads::{
    CommentExtractor, CommentForest, CommentRecord, ExtractOptions, Format, PackageResolver, Person,
};

use std::path::Path;

/// Extract the thread roots of a package, flattened in container order.
///
/// The format is picked from the file extension.
pub fn extract<P: AsRef<Path>>(path: P) -> Result<Vec<CommentRecord>> {
    Ok(CommentExtractor::from_path(path)?.extract()?.into_roots())
}
