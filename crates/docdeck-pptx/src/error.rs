//! Error types for PPTX loading and saving.

use docdeck_ooxml::OoxmlError;
use thiserror::Error;

/// Result type for PPTX operations
pub type Result<T> = std::result::Result<T, PptxError>;

/// Errors that can occur while reading or writing a presentation
#[derive(Error, Debug)]
pub enum PptxError {
    /// Template file not found or inaccessible
    #[error("Template not found: {path}")]
    TemplateNotFound { path: String },

    /// Package is not a usable presentation
    #[error("Invalid template: {reason}")]
    InvalidTemplate { reason: String },

    /// A part referenced from the package is absent
    #[error("Missing part '{part}' referenced from {from}")]
    MissingPart { part: String, from: String },

    /// Image processing error
    #[error("Image error: {reason}")]
    ImageError { reason: String },

    /// Package-level error
    #[error("Package error: {0}")]
    OoxmlError(#[from] OoxmlError),

    /// XML generation or parsing error
    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PptxError {
    /// Create a template not found error
    pub fn template_not_found(path: impl Into<String>) -> Self {
        Self::TemplateNotFound { path: path.into() }
    }

    /// Create an invalid template error
    pub fn invalid_template(reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            reason: reason.into(),
        }
    }

    /// Create a missing part error
    pub fn missing_part(part: impl Into<String>, from: impl Into<String>) -> Self {
        Self::MissingPart {
            part: part.into(),
            from: from.into(),
        }
    }

    /// Create an image error
    pub fn image_error(reason: impl Into<String>) -> Self {
        Self::ImageError {
            reason: reason.into(),
        }
    }

    /// Get the error code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::TemplateNotFound { .. } => "PPTX001",
            Self::InvalidTemplate { .. } => "PPTX002",
            Self::MissingPart { .. } => "PPTX003",
            Self::ImageError { .. } => "PPTX004",
            Self::OoxmlError(_) => "PPTX005",
            Self::XmlError(_) => "PPTX006",
            Self::IoError(_) => "PPTX007",
        }
    }
}
