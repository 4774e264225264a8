//! docdeck-core - Numbered documents to template-styled slide decks
//!
//! The conversion engine. It splits a paragraph stream into numbered
//! sections, analyses a template slide, and gives every section its own
//! slide cloned from that template.
//!
//! # Example
//!
//! ```
//! use docdeck_core::{ConversionContext, Converter};
//! use docdeck_model::{Deck, Geometry, Slide, SourceParagraph};
//!
//! let mut deck = Deck::default();
//! deck.push_slide(Slide::default())
//!     .add_textbox(Geometry::new(0, 0, 9_144_000, 1_000_000));
//!
//! let paragraphs = vec![
//!     SourceParagraph::new("1. Welcome"),
//!     SourceParagraph::new("Agenda for today"),
//!     SourceParagraph::new("2. Results"),
//! ];
//!
//! let mut ctx = ConversionContext::default();
//! let outcome = Converter::new()
//!     .convert_deck(&paragraphs, &mut deck, &mut ctx)
//!     .unwrap();
//!
//! assert_eq!(outcome.slides_created, 2);
//! assert_eq!(deck.slides()[0].texts(), vec!["1. Welcome\nAgenda for today"]);
//! ```

pub mod analyzer;
pub mod cloner;
pub mod config;
pub mod context;
pub mod convert;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod injector;
pub mod preview;
pub mod sections;

pub use analyzer::{
    analyze_presentation, analyze_slide, analyze_template, PresentationAnalysis, SlideStructure,
    TemplateAnalysis,
};
pub use cloner::{clone_shape, clone_slide, duplicate_slide, CloneReport, ClonedShape};
pub use config::ConvertConfig;
pub use context::{ConversionContext, ProgressEvent, Stage};
pub use convert::{derive_output_path, ConversionResult, Converter, DeckOutcome, SkippedSection};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{ConfigError, ContentInjectionError, ConvertError, Result, ShapeCloneError};
pub use injector::{ContentInjector, TemplateInjector};
pub use preview::{preview, ConversionPreview, SectionPreview};
pub use sections::{parse_sections, Section};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "0.1.0");
    }
}
