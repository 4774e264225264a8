//! Media parts of a package
//!
//! Pictures are stored once per distinct payload: the store keys every
//! `ppt/media/*` part by the SHA-256 of its bytes, so a logo repeated on
//! every slide is written a single time.

use std::collections::{BTreeMap, HashMap};

use docdeck_model::{ImageBlob, ImageFormat};
use docdeck_ooxml::OoxmlArchive;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::constants::MEDIA_DIR;
use crate::error::{PptxError, Result};

/// Content-addressed media parts
#[derive(Debug, Clone, Default)]
pub struct MediaStore {
    /// Hex digest -> part path
    by_hash: HashMap<String, String>,
    /// Parts added since the store was created
    added: BTreeMap<String, Vec<u8>>,
    /// Formats of the added parts
    formats: Vec<ImageFormat>,
    next_index: u32,
}

impl MediaStore {
    pub fn new() -> Self {
        Self {
            next_index: 1,
            ..Self::default()
        }
    }

    /// A store that already knows the media parts of `archive`
    pub fn from_archive(archive: &OoxmlArchive) -> Self {
        let mut store = Self::new();
        for path in archive.paths_with_prefix(MEDIA_DIR) {
            let Some(bytes) = archive.get(path) else {
                continue;
            };
            if let Some(index) = media_index(path) {
                store.next_index = store.next_index.max(index + 1);
            }
            store.by_hash.entry(digest(bytes)).or_insert_with(|| path.to_string());
        }
        store
    }

    /// Part path holding `image`, adding a new part on first sight
    pub fn insert(&mut self, image: &ImageBlob) -> Result<String> {
        let format = image
            .format()
            .map_err(|e| PptxError::image_error(e.to_string()))?;
        let hash = digest(&image.bytes);
        if let Some(path) = self.by_hash.get(&hash) {
            return Ok(path.clone());
        }

        let path = format!("{}image{}.{}", MEDIA_DIR, self.next_index, format.extension());
        self.next_index += 1;
        debug!(part = %path, bytes = image.bytes.len(), "new media part");

        self.by_hash.insert(hash, path.clone());
        self.added.insert(path.clone(), image.bytes.clone());
        if !self.formats.contains(&format) {
            self.formats.push(format);
        }
        Ok(path)
    }

    /// Formats of the parts added so far, in first-use order
    pub fn formats(&self) -> &[ImageFormat] {
        &self.formats
    }

    pub fn added_count(&self) -> usize {
        self.added.len()
    }

    /// Consume the store, yielding the added parts
    pub fn into_parts(self) -> impl Iterator<Item = (String, Vec<u8>)> {
        self.added.into_iter()
    }
}

fn digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Number in a `ppt/media/imageN.ext` name
fn media_index(path: &str) -> Option<u32> {
    let file = path.rsplit('/').next()?;
    let stem = file.split('.').next()?;
    stem.strip_prefix("image")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdeck_ooxml::test_utils::PNG_1X1;

    const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;";

    #[test]
    fn test_identical_payloads_share_a_part() {
        let mut store = MediaStore::new();
        let first = store.insert(&ImageBlob::new(PNG_1X1.to_vec())).unwrap();
        let second = store.insert(&ImageBlob::new(PNG_1X1.to_vec())).unwrap();
        let gif = store.insert(&ImageBlob::new(GIF.to_vec())).unwrap();

        assert_eq!(first, "ppt/media/image1.png");
        assert_eq!(first, second);
        assert_eq!(gif, "ppt/media/image2.gif");
        assert_eq!(store.added_count(), 2);
        assert_eq!(store.formats(), &[ImageFormat::Png, ImageFormat::Gif]);
    }

    #[test]
    fn test_existing_media_is_reused() {
        let mut archive = OoxmlArchive::new();
        archive.set("ppt/media/image7.png", PNG_1X1.to_vec());

        let mut store = MediaStore::from_archive(&archive);
        let path = store.insert(&ImageBlob::new(PNG_1X1.to_vec())).unwrap();
        assert_eq!(path, "ppt/media/image7.png");
        assert_eq!(store.added_count(), 0);

        let gif = store.insert(&ImageBlob::new(GIF.to_vec())).unwrap();
        assert_eq!(gif, "ppt/media/image8.gif");
    }

    #[test]
    fn test_unreadable_payload_is_rejected() {
        let mut store = MediaStore::new();
        let err = store.insert(&ImageBlob::new(b"not an image".to_vec())).unwrap_err();
        assert_eq!(err.code(), "PPTX004");
    }

    #[test]
    fn test_media_index() {
        assert_eq!(media_index("ppt/media/image12.jpeg"), Some(12));
        assert_eq!(media_index("ppt/media/logo.png"), None);
    }
}
