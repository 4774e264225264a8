//! Error taxonomy for conversion
//!
//! Fatal failures abort a run and are carried by [`ConvertError`].
//! [`ShapeCloneError`] and [`ContentInjectionError`] are recoverable:
//! they are recorded by their owner and never escalate.

use thiserror::Error;

/// Stable result codes
pub mod codes {
    pub const SOURCE_NOT_FOUND: &str = "SOURCE_NOT_FOUND";
    pub const TEMPLATE_NOT_FOUND: &str = "TEMPLATE_NOT_FOUND";
    pub const UNSUPPORTED_SOURCE_FORMAT: &str = "UNSUPPORTED_SOURCE_FORMAT";
    pub const UNSUPPORTED_TEMPLATE_FORMAT: &str = "UNSUPPORTED_TEMPLATE_FORMAT";
    pub const EMPTY_TEMPLATE: &str = "EMPTY_TEMPLATE";
    pub const TEMPLATE_LOAD_ERROR: &str = "TEMPLATE_LOAD_ERROR";
    pub const WORD_PARSE_ERROR: &str = "WORD_PARSE_ERROR";
    pub const SAVE_ERROR: &str = "SAVE_ERROR";

    pub const FORMAT_FILL_DEGRADED: &str = "FORMAT_FILL_DEGRADED";
    pub const FORMAT_BACKGROUND_DEGRADED: &str = "FORMAT_BACKGROUND_DEGRADED";
    pub const FORMAT_IMAGE_UNREADABLE: &str = "FORMAT_IMAGE_UNREADABLE";
    pub const FORMAT_SHAPE_UNSUPPORTED: &str = "FORMAT_SHAPE_UNSUPPORTED";
    pub const FORMAT_BASIC_FALLBACK: &str = "FORMAT_BASIC_FALLBACK";

    pub const INJECT_NO_TEXT_FRAME: &str = "INJECT_NO_TEXT_FRAME";
    pub const INJECT_FORMATTING_MISMATCH: &str = "INJECT_FORMATTING_MISMATCH";
    pub const INJECT_FAILED: &str = "INJECT_FAILED";
    pub const SECTION_SKIPPED: &str = "SECTION_SKIPPED";
}

/// Fatal conversion errors
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Missing file, wrong kind of file, or a template with no slides.
    /// Raised before the deck is touched.
    #[error("{message}")]
    InputValidation { code: &'static str, message: String },

    /// The source document or the template could not be read
    #[error("{message}")]
    Parse { code: &'static str, message: String },

    /// The final save failed
    #[error("Failed to save presentation: {message}")]
    Persist { message: String },
}

impl ConvertError {
    /// Create an input validation error
    pub fn input(code: &'static str, message: impl Into<String>) -> Self {
        Self::InputValidation {
            code,
            message: message.into(),
        }
    }

    /// The template deck has no slide to use as a design reference
    pub fn empty_template() -> Self {
        Self::input(
            codes::EMPTY_TEMPLATE,
            "Template presentation contains no slides",
        )
    }

    /// Create a parse error for the source document
    pub fn source_parse(message: impl Into<String>) -> Self {
        Self::Parse {
            code: codes::WORD_PARSE_ERROR,
            message: format!("Failed to read source document: {}", message.into()),
        }
    }

    /// Create a parse error for the template deck
    pub fn template_load(message: impl Into<String>) -> Self {
        Self::Parse {
            code: codes::TEMPLATE_LOAD_ERROR,
            message: format!("Failed to load template presentation: {}", message.into()),
        }
    }

    /// Create a persist error
    pub fn persist(message: impl Into<String>) -> Self {
        Self::Persist {
            message: message.into(),
        }
    }

    /// Get the result code
    pub fn code(&self) -> &'static str {
        match self {
            Self::InputValidation { code, .. } | Self::Parse { code, .. } => code,
            Self::Persist { .. } => codes::SAVE_ERROR,
        }
    }
}

/// A single shape could not be reproduced on the target slide
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeCloneError {
    /// Picture whose image payload is missing or corrupt
    #[error("Picture '{shape}' skipped: {reason}")]
    UnreadableImage { shape: String, reason: String },

    /// Shape kind the cloner does not reproduce
    #[error("Shape '{shape}' ({element}) not cloned: unsupported kind")]
    Unsupported { shape: String, element: String },
}

impl ShapeCloneError {
    pub fn unreadable_image(shape: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnreadableImage {
            shape: shape.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported(shape: impl Into<String>, element: impl Into<String>) -> Self {
        Self::Unsupported {
            shape: shape.into(),
            element: element.into(),
        }
    }

    /// Get the diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnreadableImage { .. } => codes::FORMAT_IMAGE_UNREADABLE,
            Self::Unsupported { .. } => codes::FORMAT_SHAPE_UNSUPPORTED,
        }
    }
}

/// A section could not be written into its slide
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentInjectionError {
    /// The selected shape has no text frame
    #[error("Shape '{shape}' has no text frame")]
    NoTextFrame { shape: String },

    /// Section content and formatting are not aligned
    #[error("Section has {content} content lines but {formatting} formatting entries")]
    FormattingMismatch { content: usize, formatting: usize },

    /// Any other injection failure
    #[error("{reason}")]
    Failed { reason: String },
}

impl ContentInjectionError {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Get the diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoTextFrame { .. } => codes::INJECT_NO_TEXT_FRAME,
            Self::FormattingMismatch { .. } => codes::INJECT_FORMATTING_MISMATCH,
            Self::Failed { .. } => codes::INJECT_FAILED,
        }
    }
}

/// Errors loading a [`ConvertConfig`](crate::config::ConvertConfig)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_error_codes() {
        assert_eq!(ConvertError::empty_template().code(), "EMPTY_TEMPLATE");
        assert_eq!(ConvertError::source_parse("bad zip").code(), "WORD_PARSE_ERROR");
        assert_eq!(
            ConvertError::template_load("bad zip").code(),
            "TEMPLATE_LOAD_ERROR"
        );
        assert_eq!(ConvertError::persist("disk full").code(), "SAVE_ERROR");
        assert_eq!(
            ConvertError::input(codes::SOURCE_NOT_FOUND, "missing").code(),
            "SOURCE_NOT_FOUND"
        );
    }

    #[test]
    fn test_error_display() {
        let err = ConvertError::template_load("not a zip archive");
        assert!(err.to_string().contains("not a zip archive"));

        let err = ShapeCloneError::unreadable_image("Picture 3", "empty payload");
        assert!(err.to_string().contains("Picture 3"));
        assert_eq!(err.code(), "FORMAT_IMAGE_UNREADABLE");

        let err = ContentInjectionError::FormattingMismatch {
            content: 3,
            formatting: 2,
        };
        assert!(err.to_string().contains('3'));
        assert_eq!(err.code(), "INJECT_FORMATTING_MISMATCH");
    }
}
