//! A template package on disk and the [`DeckStore`] built on it

use std::io::Write;
use std::path::{Path, PathBuf};

use docdeck_model::{Deck, DeckStore};
use docdeck_ooxml::OoxmlArchive;
use tracing::{debug, info};

use crate::error::{PptxError, Result};
use crate::reader::read_deck;
use crate::writer::write_deck;

/// An opened `.pptx` / `.potx` package
#[derive(Debug, Clone)]
pub struct PptxPackage {
    archive: OoxmlArchive,
    path: Option<PathBuf>,
}

impl PptxPackage {
    /// Open a package from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PptxError::template_not_found(path.display().to_string()));
        }
        let archive = OoxmlArchive::open(path)
            .map_err(|e| PptxError::invalid_template(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), parts = archive.len(), "opened package");
        Ok(Self {
            archive,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let archive = OoxmlArchive::from_bytes(bytes)
            .map_err(|e| PptxError::invalid_template(e.to_string()))?;
        Ok(Self {
            archive,
            path: None,
        })
    }

    pub fn archive(&self) -> &OoxmlArchive {
        &self.archive
    }

    /// Where the package was read from, if it came from disk
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load_deck(&self) -> Result<Deck> {
        read_deck(&self.archive)
    }

    /// The package bytes for `deck` written over this template
    pub fn write_deck(&self, deck: &Deck) -> Result<Vec<u8>> {
        let archive = write_deck(&self.archive, deck)?;
        Ok(archive.to_bytes()?)
    }
}

impl DeckStore for PptxPackage {
    type Error = PptxError;

    fn load(&self) -> Result<Deck> {
        self.load_deck()
    }

    /// Writes to a temporary file next to `path` and renames it into
    /// place, so a failed save never leaves a truncated file behind
    fn save(&self, deck: &Deck, path: &Path) -> Result<()> {
        let bytes = self.write_deck(deck)?;

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(&bytes)?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| PptxError::IoError(e.error))?;

        info!(path = %path.display(), bytes = bytes.len(), "deck saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdeck_ooxml::test_utils::{placeholder_xml, PptxFixture};

    fn fixture() -> Vec<u8> {
        PptxFixture::new()
            .slide(placeholder_xml(2, "Title 1", Some("title"), None, "Agenda"))
            .build()
    }

    #[test]
    fn test_open_missing_file() {
        let err = PptxPackage::open("/nonexistent/template.pptx").unwrap_err();
        assert_eq!(err.code(), "PPTX001");
    }

    #[test]
    fn test_open_rejects_non_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pptx");
        std::fs::write(&path, b"plain text").unwrap();

        let err = PptxPackage::open(&path).unwrap_err();
        assert_eq!(err.code(), "PPTX002");
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.pptx");
        std::fs::write(&template, fixture()).unwrap();

        let package = PptxPackage::open(&template).unwrap();
        assert_eq!(package.path(), Some(template.as_path()));
        let deck = package.load().unwrap();
        assert_eq!(deck.slide_count(), 1);

        let output = dir.path().join("out.pptx");
        package.save(&deck, &output).unwrap();

        let reopened = PptxPackage::open(&output).unwrap().load().unwrap();
        assert_eq!(reopened.slides()[0].texts(), vec!["Agenda".to_string()]);
        // Only the output and the template remain in the directory
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pptx");
        std::fs::write(&output, b"old").unwrap();

        let package = PptxPackage::from_bytes(&fixture()).unwrap();
        let deck = package.load().unwrap();
        package.save(&deck, &output).unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let package = PptxPackage::from_bytes(&fixture()).unwrap();
        let deck = package.load().unwrap();
        let err = package
            .save(&deck, Path::new("/nonexistent/dir/out.pptx"))
            .unwrap_err();
        assert_eq!(err.code(), "PPTX007");
    }

    #[test]
    fn test_write_is_deterministic() {
        let package = PptxPackage::from_bytes(&fixture()).unwrap();
        let deck = package.load().unwrap();
        assert_eq!(package.write_deck(&deck).unwrap(), package.write_deck(&deck).unwrap());
    }
}
