//! Errors raised while reading or writing OOXML packages

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OoxmlError {
    /// The ZIP container could not be read or written
    #[error("Package container error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A part the caller needs is absent from the package
    #[error("Package has no part '{0}'")]
    MissingPart(String),

    /// Well-formed input that does not have the expected shape
    #[error("Unexpected package content: {0}")]
    Malformed(String),
}

impl OoxmlError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// The package part this error is about, when it names one
    pub fn part(&self) -> Option<&str> {
        match self {
            Self::MissingPart(part) => Some(part),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, OoxmlError>;
