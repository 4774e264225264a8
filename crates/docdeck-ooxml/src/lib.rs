//! # docdeck-ooxml
//!
//! Office Open XML plumbing shared by the docdeck adapters:
//! - [`OoxmlArchive`], an unpacked ZIP package that can be written back
//! - [`Relationships`] for `_rels/*.rels` parts
//! - XML helpers and a small element tree ([`xml::XmlElement`])
//! - [`WordDocument`] / [`DocxSource`], the DOCX paragraph reader
//!
//! ## Example: reading a Word document
//!
//! ```no_run
//! use docdeck_model::DocumentSource;
//! use docdeck_ooxml::DocxSource;
//!
//! let source = DocxSource::open("report.docx");
//! for paragraph in source.read_paragraphs()? {
//!     println!("{}", paragraph.text);
//! }
//! # Ok::<(), docdeck_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod document;
pub mod error;
pub mod relationships;
pub mod xml;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use archive::{OoxmlArchive, CONTENT_TYPES_PART, DOCUMENT_PART};
pub use document::{DocxSource, WordDocument};
pub use error::{OoxmlError, Result};
pub use relationships::{RelationshipTarget, Relationships};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
