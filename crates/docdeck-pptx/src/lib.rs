//! # docdeck-pptx
//!
//! PowerPoint packages as [`Deck`](docdeck_model::Deck)s.
//!
//! [`PptxPackage`] opens a `.pptx` or `.potx` file, reads its slides into
//! the shared model and writes a converted deck back on top of the
//! original package, so masters, layouts, themes and anything else the
//! model does not touch survive unchanged.
//!
//! ## Example
//!
//! ```rust,no_run
//! use docdeck_model::DeckStore;
//! use docdeck_pptx::PptxPackage;
//! use std::path::Path;
//!
//! let package = PptxPackage::open("template.pptx")?;
//! let mut deck = package.load()?;
//! deck.truncate(1);
//! package.save(&deck, Path::new("out.pptx"))?;
//! # Ok::<(), docdeck_pptx::PptxError>(())
//! ```

pub mod drawing;
pub mod error;
pub mod media;
pub mod package;
pub mod reader;
pub mod writer;

pub use error::{PptxError, Result};
pub use media::MediaStore;
pub use package::PptxPackage;
pub use reader::read_deck;
pub use writer::write_deck;

/// Part locations, namespaces and units of PresentationML packages
pub mod constants {
    /// Rotation units per degree (`a:xfrm/@rot`)
    pub const ROTATION_UNITS_PER_DEGREE: f64 = 60_000.0;

    /// First id PowerPoint hands out in `p:sldIdLst`
    pub const FIRST_SLIDE_ID: u32 = 256;

    /// Where the presentation part lives when `_rels/.rels` does not say
    pub const PRESENTATION_PART: &str = "ppt/presentation.xml";

    pub const SLIDES_DIR: &str = "ppt/slides/";
    pub const NOTES_SLIDES_DIR: &str = "ppt/notesSlides/";
    pub const SLIDE_LAYOUTS_DIR: &str = "ppt/slideLayouts/";
    pub const MEDIA_DIR: &str = "ppt/media/";

    pub const NS_PRESENTATION: &str =
        "http://schemas.openxmlformats.org/presentationml/2006/main";
    pub const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
    pub const NS_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    /// `a:graphicData/@uri` of a DrawingML table
    pub const URI_TABLE: &str = "http://schemas.openxmlformats.org/drawingml/2006/table";

    pub const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
