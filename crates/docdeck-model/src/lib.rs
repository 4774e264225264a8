//! docdeck-model - Document and slide-deck model
//!
//! This crate provides the types shared by every docdeck crate: the
//! paragraphs read from a source document, the shapes and slides of a
//! deck, and the per-run [`FormatDescriptor`] that carries formatting
//! between the two.
//!
//! Nothing here performs I/O. Reading and writing the container formats
//! is delegated to implementations of [`DocumentSource`] and
//! [`DeckStore`].

pub mod error;
pub mod format;
pub mod shape;
pub mod slide;
pub mod source;
pub mod text;

pub use error::{ModelError, Result};
pub use format::{Alignment, FormatDescriptor, RgbColor, CENTIPOINTS_PER_POINT};
pub use shape::{
    Emu, Fill, FillKind, Geometry, ImageBlob, ImageFormat, Line, Picture, PlaceholderType, Shape,
    ShapeKind, Table, TableCell, EMU_PER_INCH, EMU_PER_POINT,
};
pub use slide::{
    Deck, LayoutInfo, LayoutRef, PlaceholderSpec, Slide, SlideRelationship, DEFAULT_SLIDE_HEIGHT,
    DEFAULT_SLIDE_WIDTH,
};
pub use source::{DeckStore, DocumentSource, SourceParagraph};
pub use text::{AutoFit, BodyProperties, Run, TextFrame, TextParagraph, VerticalAnchor};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
