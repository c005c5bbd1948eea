//! Reviewer comment threads of Word, Excel and PowerPoint packages.
//!
//! The three formats share one resolution shape and differ in relationship types,
//! comment schemas and location rules, which [`format::Profile`] captures:
//!
//! | Format | Containers | Comment parts |
//! |--------|------------|---------------|
//! | `.xlsx` | worksheets | threaded comments, legacy notes |
//! | `.docx` | the document body | comments + `commentsExtended` |
//! | `.pptx` | slides | legacy and modern comments |
//!
//! Entry points are [`CommentExtractor`] for files and [`PackageResolver`] for
//! entries already in memory.

pub mod dump;
pub mod format;
pub mod graph;
pub mod loaders;
pub mod location;
pub mod options;
pub mod record;
pub mod resolver;
pub mod threader;

pub use dump::dump;
pub use format::Format;
pub use options::ExtractOptions;
pub use record::{CommentForest, CommentRecord, ContainerThreads, Person, Position};
pub use resolver::{CommentExtractor, PackageResolver, resolve_entries};
