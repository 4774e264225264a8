//! Relationship parts (`_rels/*.rels`)
//!
//! Every OOXML part that references another part (a slide pointing at its
//! layout, a picture at its media file) does so through an id in the
//! part's relationship file.
//!
//! # Example
//!
//! ```
//! use docdeck_ooxml::relationships::{rels_path_for, resolve_target, Relationships};
//!
//! let mut rels = Relationships::new();
//! let id = rels.add("../media/image1.png", Relationships::TYPE_IMAGE);
//! assert_eq!(id, "rId1");
//!
//! let part = "ppt/slides/slide1.xml";
//! assert_eq!(rels_path_for(part), "ppt/slides/_rels/slide1.xml.rels");
//! assert_eq!(resolve_target(part, "../media/image1.png"), "ppt/media/image1.png");
//! ```

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};
use crate::xml::{escape_xml, get_attr};

/// OOXML namespace for relationships
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Relationship type URIs used by docdeck
impl Relationships {
    pub const TYPE_OFFICE_DOCUMENT: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const TYPE_IMAGE: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const TYPE_HYPERLINK: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
    pub const TYPE_SLIDE: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const TYPE_SLIDE_LAYOUT: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const TYPE_SLIDE_MASTER: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
    pub const TYPE_NOTES_SLIDE: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";
}

/// Parsed relationships of one part
///
/// Keeps insertion order so serialization is deterministic.
#[derive(Debug, Clone)]
pub struct Relationships {
    order: Vec<String>,
    map: HashMap<String, RelationshipTarget>,
    next_id_counter: u32,
}

impl Default for Relationships {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            map: HashMap::new(),
            next_id_counter: 1,
        }
    }
}

/// A relationship target with its type and mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipTarget {
    pub target: String,
    pub rel_type: String,
    /// `Some("External")` for targets outside the package
    pub target_mode: Option<String>,
}

impl RelationshipTarget {
    pub fn is_external(&self) -> bool {
        self.target_mode.as_deref() == Some("External")
    }
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `.rels` part
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut rels = Self::new();
        let mut max_id: u32 = 0;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let id = get_attr(e, b"Id");
                        let target = get_attr(e, b"Target");
                        if let (Some(id), Some(target)) = (id, target) {
                            if let Some(num) = extract_id_number(&id) {
                                max_id = max_id.max(num);
                            }
                            rels.insert(
                                id,
                                RelationshipTarget {
                                    target,
                                    rel_type: get_attr(e, b"Type").unwrap_or_default(),
                                    target_mode: get_attr(e, b"TargetMode"),
                                },
                            );
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        rels.next_id_counter = max_id + 1;
        Ok(rels)
    }

    fn insert(&mut self, id: String, target: RelationshipTarget) {
        if self.map.insert(id.clone(), target).is_none() {
            self.order.push(id);
        }
    }

    /// Add an internal relationship and return its generated id
    pub fn add(&mut self, target: impl Into<String>, rel_type: impl Into<String>) -> String {
        self.add_with_mode(target, rel_type, None)
    }

    /// Add a relationship with an explicit target mode
    pub fn add_with_mode(
        &mut self,
        target: impl Into<String>,
        rel_type: impl Into<String>,
        target_mode: Option<String>,
    ) -> String {
        let id = self.peek_next_id();
        if let Some(num) = extract_id_number(&id) {
            self.next_id_counter = num + 1;
        }
        self.insert(
            id.clone(),
            RelationshipTarget {
                target: target.into(),
                rel_type: rel_type.into(),
                target_mode,
            },
        );
        id
    }

    /// Add a relationship under a caller-chosen id.
    ///
    /// Later generated ids continue after it. Returns false, leaving the
    /// existing entry alone, when the id is taken.
    pub fn add_with_id(&mut self, id: impl Into<String>, target: RelationshipTarget) -> bool {
        let id = id.into();
        if self.map.contains_key(&id) {
            return false;
        }
        if let Some(num) = extract_id_number(&id) {
            self.next_id_counter = self.next_id_counter.max(num + 1);
        }
        self.insert(id, target);
        true
    }

    /// Keep only the relationships for which `keep` returns true.
    ///
    /// Generated ids still continue after the highest id ever seen, so a
    /// dropped id is never handed out again.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &RelationshipTarget) -> bool) {
        let map = &mut self.map;
        self.order.retain(|id| {
            let kept = map.get(id).is_some_and(|rel| keep(id, rel));
            if !kept {
                map.remove(id);
            }
            kept
        });
    }

    /// Serialize to a `.rels` part
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Relationships xmlns="{}">"#, RELATIONSHIPS_NS));

        for (id, rel) in self.iter() {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}""#,
                escape_xml(id),
                escape_xml(&rel.rel_type),
                escape_xml(&rel.target)
            ));
            if let Some(mode) = &rel.target_mode {
                xml.push_str(&format!(r#" TargetMode="{}""#, escape_xml(mode)));
            }
            xml.push_str("/>");
        }

        xml.push_str("</Relationships>");
        xml
    }

    /// Target of a relationship id
    pub fn get(&self, id: &str) -> Option<&str> {
        self.map.get(id).map(|r| r.target.as_str())
    }

    pub fn get_target(&self, id: &str) -> Option<&RelationshipTarget> {
        self.map.get(id)
    }

    /// First relationship of the given type
    pub fn find_by_type(&self, rel_type: &str) -> Option<(&str, &RelationshipTarget)> {
        self.iter().find(|(_, rel)| rel.rel_type == rel_type)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.map.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RelationshipTarget)> {
        self.order
            .iter()
            .filter_map(|id| self.map.get(id).map(|rel| (id.as_str(), rel)))
    }

    /// The id the next `add` would generate
    pub fn peek_next_id(&self) -> String {
        let mut counter = self.next_id_counter;
        while self.map.contains_key(&format!("rId{}", counter)) {
            counter += 1;
        }
        format!("rId{}", counter)
    }
}

/// Numeric part of a relationship id ("rId5" -> 5)
fn extract_id_number(id: &str) -> Option<u32> {
    id.strip_prefix("rId")
        .or_else(|| id.strip_prefix("RId"))
        .or_else(|| id.strip_prefix("rid"))
        .and_then(|num_str| num_str.parse().ok())
}

/// Path of the relationship part belonging to `part`
/// (`ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`)
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Part owning a relationship part, the inverse of [`rels_path_for`].
/// Package relationships (`_rels/.rels`) belong to `""`.
pub fn owner_of_rels_path(rels_path: &str) -> Option<String> {
    let file = rels_path.strip_suffix(".rels")?;
    let (dir, name) = match file.rsplit_once("/_rels/") {
        Some((dir, name)) => (Some(dir), name),
        None => (None, file.strip_prefix("_rels/")?),
    };
    Some(match dir {
        Some(dir) => format!("{}/{}", dir, name),
        None => name.to_string(),
    })
}

/// Resolve a relationship target against the part that owns it.
///
/// Absolute targets (`/ppt/media/a.png`) are taken from the package root;
/// relative ones are resolved against the owning part's directory, with
/// `..` segments collapsed. Package-level relationships use `""` as base.
pub fn resolve_target(base_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize(absolute.split('/'));
    }
    let base_dir = base_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    normalize(base_dir.split('/').chain(target.split('/')))
}

fn normalize<'a>(segments: impl Iterator<Item = &'a str>) -> String {
    let mut out: Vec<&str> = Vec::new();
    for segment in segments {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            s => out.push(s),
        }
    }
    out.join("/")
}

/// Express `target_part` relative to the directory of `base_part`
/// (`ppt/slides/slide1.xml`, `ppt/media/image1.png` -> `../media/image1.png`)
pub fn relative_target(base_part: &str, target_part: &str) -> String {
    let base_dir: Vec<&str> = match base_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let target: Vec<&str> = target_part.split('/').collect();

    let common = base_dir
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count()
        .min(target.len().saturating_sub(1));

    let mut parts: Vec<&str> = vec![".."; base_dir.len() - common];
    parts.extend(&target[common..]);
    parts.join("/")
}
