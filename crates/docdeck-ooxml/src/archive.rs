//! In-memory OOXML packages
//!
//! DOCX and PPTX files are ZIP archives of XML parts and media. The whole
//! package is unpacked into memory so parts can be read, replaced and
//! written back in one pass.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use tracing::debug;
use zip::read::ZipArchive;
use zip::write::ZipWriter;
use zip::CompressionMethod;

use crate::error::{OoxmlError, Result};

/// Main part of a WordprocessingML package
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Package content types part
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// An unpacked OOXML package
#[derive(Debug, Clone, Default)]
pub struct OoxmlArchive {
    /// Part contents keyed by package path (no leading slash)
    parts: HashMap<String, Vec<u8>>,
}

impl OoxmlArchive {
    /// An empty package
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and unpack a package file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Unpack a package held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Unpack from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut parts = HashMap::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut contents = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut contents)?;
            parts.insert(name, contents);
        }

        debug!(parts = parts.len(), "package unpacked");
        Ok(Self { parts })
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.parts.get(path).map(Vec::as_slice)
    }

    /// A part that must be present
    pub fn require(&self, path: &str) -> Result<&[u8]> {
        self.get(path)
            .ok_or_else(|| OoxmlError::MissingPart(path.to_string()))
    }

    /// A part decoded as UTF-8 text
    pub fn get_str(&self, path: &str) -> Result<Option<&str>> {
        match self.parts.get(path) {
            Some(bytes) => std::str::from_utf8(bytes).map(Some).map_err(|e| {
                OoxmlError::Malformed(format!("{} is not valid UTF-8: {}", path, e))
            }),
            None => Ok(None),
        }
    }

    /// The main document part of a DOCX package
    pub fn document_xml(&self) -> Result<&[u8]> {
        self.require(DOCUMENT_PART)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.parts.contains_key(path)
    }

    /// All part paths, sorted
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<_> = self.parts.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Sorted part paths under `prefix`
    pub fn paths_with_prefix(&self, prefix: &str) -> Vec<&str> {
        self.paths()
            .into_iter()
            .filter(|p| p.starts_with(prefix))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Insert or replace a part
    pub fn set(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        self.parts.insert(path.into(), contents);
    }

    /// Insert or replace a text part
    pub fn set_string(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.parts.insert(path.into(), contents.into().into_bytes());
    }

    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.parts.remove(path)
    }

    /// Keep only the parts for which `keep` returns true
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.parts.retain(|path, _| keep(path));
    }

    /// Write the package to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Write the package to any writer.
    ///
    /// Parts are written in sorted order with Deflate compression and a
    /// fixed timestamp, so the same package always produces the same bytes.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());

        // [Content_Types].xml goes first, as Office expects
        let mut paths = self.paths();
        if let Some(pos) = paths.iter().position(|p| *p == CONTENT_TYPES_PART) {
            let content_types = paths.remove(pos);
            paths.insert(0, content_types);
        }

        for path in paths {
            zip.start_file(path, options)?;
            zip.write_all(&self.parts[path])?;
        }

        zip.finish()?;
        Ok(())
    }

    /// Serialize the package into a byte vector
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_to(&mut buffer)?;
        Ok(buffer.into_inner())
    }
}
