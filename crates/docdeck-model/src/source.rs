//! Source paragraphs and the collaborator traits for reading documents
//! and loading or saving decks

use std::convert::Infallible;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::slide::Deck;
use crate::text::Run;

/// One paragraph of the input document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceParagraph {
    /// Raw paragraph text
    pub text: String,
    /// Formatted runs making up `text`; may be empty when the reader
    /// has no formatting information
    #[serde(default)]
    pub runs: Vec<Run>,
}

impl SourceParagraph {
    /// A paragraph without run information
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            runs: Vec::new(),
        }
    }

    /// A paragraph whose text is the concatenation of `runs`
    pub fn from_runs(runs: Vec<Run>) -> Self {
        Self {
            text: runs.iter().map(|r| r.text.as_str()).collect(),
            runs,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Something that yields the ordered paragraphs of a document
pub trait DocumentSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn read_paragraphs(&self) -> Result<Vec<SourceParagraph>, Self::Error>;
}

impl DocumentSource for [SourceParagraph] {
    type Error = Infallible;

    fn read_paragraphs(&self) -> Result<Vec<SourceParagraph>, Self::Error> {
        Ok(self.to_vec())
    }
}

impl DocumentSource for Vec<SourceParagraph> {
    type Error = Infallible;

    fn read_paragraphs(&self) -> Result<Vec<SourceParagraph>, Self::Error> {
        Ok(self.clone())
    }
}

/// Loads a template deck and persists the converted one
pub trait DeckStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn load(&self) -> Result<Deck, Self::Error>;

    /// Write `deck` to `path` in one operation
    fn save(&self, deck: &Deck, path: &Path) -> Result<(), Self::Error>;
}
