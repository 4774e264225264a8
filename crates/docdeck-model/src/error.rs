//! Error types for model operations

use thiserror::Error;

/// Errors raised by deck and shape operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Image bytes do not match any supported format
    #[error("Unreadable image payload: {reason}")]
    UnreadableImage { reason: String },

    /// Slide index outside the deck
    #[error("Slide index {index} out of range (deck has {count} slides)")]
    SlideOutOfRange { index: usize, count: usize },
}

impl ModelError {
    /// Create an unreadable image error
    pub fn unreadable_image(reason: impl Into<String>) -> Self {
        Self::UnreadableImage {
            reason: reason.into(),
        }
    }
}

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
