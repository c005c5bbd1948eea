//! Office Open XML (OOXML) package handling.
//!
//! # Architecture
//!
//! 1. **OPC Layer** (`opc`): archive entries, part names, content types,
//!    relationships and the pending-part queue
//! 2. **Threads Layer** (`threads`): per-format loaders, the relationship graph,
//!    locations and thread assembly
//!
//! # Example
//!
//! ```rust,no_run
//! use longan::ooxml::threads::{CommentExtractor, ExtractOptions};
//!
//! let extractor = CommentExtractor::from_path("minutes.docx")?
//!     .with_options(ExtractOptions::new().with_strict_fragments(true));
//! let forest = extractor.extract()?;
//! println!("{} comments", forest.comment_count());
//! # Ok::<(), longan::OoxmlError>(())
//! ```
pub mod error;
pub mod opc;
pub mod threads;

pub use error::{OoxmlError, Result};
pub use opc::PackURI;
