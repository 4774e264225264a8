//! WordprocessingML paragraph reader
//!
//! Reads `word/document.xml` into the ordered [`SourceParagraph`] stream
//! the conversion engine works on. Only what a slide can carry is kept:
//! run text, direct run formatting, paragraph alignment and list level.
//! Style inheritance is not resolved; attributes that are not set
//! directly on a run stay `None` so the slide template decides.

use std::path::{Path, PathBuf};

use docdeck_model::{
    Alignment, DocumentSource, FormatDescriptor, RgbColor, Run, SourceParagraph,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::archive::{OoxmlArchive, DOCUMENT_PART};
use crate::error::{OoxmlError, Result};
use crate::relationships::{resolve_target, Relationships};
use crate::xml::{get_attr, get_attr_with_ns};

/// Hundredths of a point per WordprocessingML half-point
const CENTIPOINTS_PER_HALF_POINT: u32 = 50;

/// The body paragraphs of a Word document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordDocument {
    paragraphs: Vec<SourceParagraph>,
}

impl WordDocument {
    /// Parse the main document part.
    ///
    /// Paragraphs inside tables are returned in document order along with
    /// top-level ones. Text boxes and other drawings are skipped, as is
    /// field instruction text.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        // Whitespace inside w:t is significant
        reader.config_mut().trim_text(false);

        let mut state = ParseState::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => state.handle_start(e, false),
                Ok(Event::Empty(ref e)) => state.handle_start(e, true),
                Ok(Event::End(ref e)) => state.handle_end(e.local_name().as_ref()),
                Ok(Event::Text(ref e)) => {
                    if state.in_text {
                        if let Some(run) = state.current_run.as_mut() {
                            let text = e.unescape().unwrap_or_default();
                            run.text.push_str(&text);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        if !state.seen_body {
            return Err(OoxmlError::malformed("document part has no w:body"));
        }

        debug!(paragraphs = state.paragraphs.len(), "document parsed");
        Ok(Self {
            paragraphs: state.paragraphs,
        })
    }

    /// Locate the main document part through the package relationships
    /// and parse it
    pub fn from_archive(archive: &OoxmlArchive) -> Result<Self> {
        let part = main_document_part(archive)?;
        Self::parse(archive.require(&part)?)
    }

    pub fn paragraphs(&self) -> &[SourceParagraph] {
        &self.paragraphs
    }

    pub fn into_paragraphs(self) -> Vec<SourceParagraph> {
        self.paragraphs
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Paragraph texts joined by newlines
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The main part named by `_rels/.rels`, or `word/document.xml`
fn main_document_part(archive: &OoxmlArchive) -> Result<String> {
    if let Some(xml) = archive.get("_rels/.rels") {
        let rels = Relationships::parse(xml)?;
        if let Some((_, main)) = rels.find_by_type(Relationships::TYPE_OFFICE_DOCUMENT) {
            return Ok(resolve_target("", &main.target));
        }
    }
    Ok(DOCUMENT_PART.to_string())
}

#[derive(Default)]
struct ParseState {
    paragraphs: Vec<SourceParagraph>,
    seen_body: bool,
    in_body: bool,
    /// Depth inside w:drawing / w:pict / w:object, whose paragraphs are not body text
    drawing_depth: u32,
    in_paragraph_props: bool,
    in_run_props: bool,
    in_text: bool,
    current_para: Option<ParagraphBuilder>,
    current_run: Option<RunBuilder>,
}

impl ParseState {
    fn handle_start(&mut self, e: &BytesStart, is_empty: bool) {
        let name = e.local_name();
        match name.as_ref() {
            b"body" => {
                self.seen_body = true;
                self.in_body = !is_empty;
            }
            b"drawing" | b"pict" | b"object" if !is_empty => self.drawing_depth += 1,
            _ if !self.in_body || self.drawing_depth > 0 => {}
            b"p" => {
                self.current_para = Some(ParagraphBuilder::new());
                if is_empty {
                    self.finish_paragraph();
                }
            }
            b"pPr" if self.current_run.is_none() => self.in_paragraph_props = !is_empty,
            b"jc" if self.in_paragraph_props => {
                if let Some(para) = self.current_para.as_mut() {
                    para.alignment = get_attr(e, b"w:val")
                        .as_deref()
                        .and_then(Alignment::from_wordml);
                }
            }
            b"numPr" if self.in_paragraph_props => {
                if let Some(para) = self.current_para.as_mut() {
                    para.indent_level.get_or_insert(0);
                }
            }
            b"ilvl" if self.in_paragraph_props => {
                if let Some(para) = self.current_para.as_mut() {
                    if let Some(level) = get_attr(e, b"w:val").and_then(|v| v.parse().ok()) {
                        para.indent_level = Some(level);
                    }
                }
            }
            b"r" if self.current_para.is_some() => {
                self.current_run = Some(RunBuilder::new());
            }
            b"rPr" if self.current_run.is_some() => self.in_run_props = !is_empty,
            b"t" if self.current_run.is_some() => self.in_text = !is_empty,
            b"tab" if self.current_run.is_some() && !self.in_run_props => {
                self.push_text("\t");
            }
            b"br" | b"cr" if self.current_run.is_some() => self.push_text("\n"),
            _ if self.in_run_props => {
                if let Some(run) = self.current_run.as_mut() {
                    run.apply_property(name.as_ref(), e);
                }
            }
            _ => {}
        }
    }

    fn handle_end(&mut self, local_name: &[u8]) {
        match local_name {
            b"body" => self.in_body = false,
            b"drawing" | b"pict" | b"object" => {
                self.drawing_depth = self.drawing_depth.saturating_sub(1);
            }
            _ if self.drawing_depth > 0 => {}
            b"p" => self.finish_paragraph(),
            b"pPr" => self.in_paragraph_props = false,
            b"rPr" => self.in_run_props = false,
            b"t" => self.in_text = false,
            b"r" => {
                self.in_text = false;
                if let (Some(run), Some(para)) = (self.current_run.take(), self.current_para.as_mut()) {
                    para.push_run(run.build());
                }
            }
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(run) = self.current_run.as_mut() {
            run.text.push_str(text);
        }
    }

    fn finish_paragraph(&mut self) {
        self.in_paragraph_props = false;
        if let Some(para) = self.current_para.take() {
            self.paragraphs.push(para.build());
        }
    }
}

#[derive(Default)]
struct ParagraphBuilder {
    runs: Vec<Run>,
    alignment: Option<Alignment>,
    indent_level: Option<u8>,
}

impl ParagraphBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Append a run, merging it into the previous one when both share a format
    fn push_run(&mut self, run: Run) {
        if run.text.is_empty() {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.format == run.format => last.text.push_str(&run.text),
            _ => self.runs.push(run),
        }
    }

    fn build(self) -> SourceParagraph {
        let runs = self
            .runs
            .into_iter()
            .map(|mut run| {
                run.format.alignment = self.alignment;
                run.format.indent_level = self.indent_level;
                run
            })
            .collect();
        SourceParagraph::from_runs(runs)
    }
}

#[derive(Default)]
struct RunBuilder {
    text: String,
    format: FormatDescriptor,
}

impl RunBuilder {
    fn new() -> Self {
        Self::default()
    }

    fn apply_property(&mut self, local_name: &[u8], e: &BytesStart) {
        let val = get_attr(e, b"w:val");
        match local_name {
            b"rFonts" => {
                if let Some(font) =
                    get_attr_with_ns(e, b"w:ascii").or_else(|| get_attr_with_ns(e, b"w:hAnsi"))
                {
                    self.format.font_name = Some(font);
                }
            }
            b"sz" => {
                if let Some(size) = val
                    .and_then(|v| v.parse::<u32>().ok())
                    .and_then(|half_points| half_points.checked_mul(CENTIPOINTS_PER_HALF_POINT))
                {
                    self.format.font_size = Some(size);
                }
            }
            b"b" => self.format.bold = Some(toggle_value(val.as_deref())),
            b"i" => self.format.italic = Some(toggle_value(val.as_deref())),
            b"u" => self.format.underline = Some(val.as_deref() != Some("none")),
            b"color" => {
                self.format.color = val
                    .filter(|v| v != "auto")
                    .and_then(|v| RgbColor::from_hex(&v));
            }
            _ => {}
        }
    }

    fn build(self) -> Run {
        Run::formatted(self.text, self.format)
    }
}

/// An on/off property: present without a value means on
fn toggle_value(val: Option<&str>) -> bool {
    !matches!(val, Some("0") | Some("false") | Some("off"))
}

/// A Word document read from a file or from memory
#[derive(Debug, Clone)]
pub struct DocxSource {
    origin: Origin,
}

#[derive(Debug, Clone)]
enum Origin {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl DocxSource {
    /// A source reading `path` when paragraphs are requested
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            origin: Origin::Path(path.into()),
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            origin: Origin::Bytes(bytes),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.origin {
            Origin::Path(path) => Some(path),
            Origin::Bytes(_) => None,
        }
    }

    pub fn read_document(&self) -> Result<WordDocument> {
        let archive = match &self.origin {
            Origin::Path(path) => OoxmlArchive::open(path)?,
            Origin::Bytes(bytes) => OoxmlArchive::from_bytes(bytes)?,
        };
        WordDocument::from_archive(&archive)
    }
}

impl DocumentSource for DocxSource {
    type Error = OoxmlError;

    fn read_paragraphs(&self) -> Result<Vec<SourceParagraph>> {
        Ok(self.read_document()?.into_paragraphs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(body: &str) -> Vec<u8> {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"
            xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing">
<w:body>{}<w:sectPr/></w:body>
</w:document>"#,
            body
        )
        .into_bytes()
    }

    #[test]
    fn test_parse_plain_paragraphs() {
        let xml = wrap(
            r#"<w:p><w:r><w:t>1. Introduction</w:t></w:r></w:p>
               <w:p/>
               <w:p><w:r><w:t xml:space="preserve">Hello, </w:t></w:r><w:r><w:t>world</w:t></w:r></w:p>"#,
        );
        let doc = WordDocument::parse(&xml).unwrap();

        assert_eq!(doc.len(), 3);
        assert_eq!(doc.paragraphs()[0].text, "1. Introduction");
        assert!(doc.paragraphs()[1].is_blank());
        assert_eq!(doc.paragraphs()[2].text, "Hello, world");
        // Same (empty) format: merged into one run
        assert_eq!(doc.paragraphs()[2].runs.len(), 1);
    }

    #[test]
    fn test_run_formatting() {
        let xml = wrap(
            r#"<w:p>
                 <w:pPr><w:jc w:val="center"/><w:rPr><w:b/></w:rPr></w:pPr>
                 <w:r>
                   <w:rPr>
                     <w:rFonts w:ascii="Georgia" w:hAnsi="Georgia"/>
                     <w:b/><w:i w:val="0"/><w:u w:val="single"/>
                     <w:color w:val="1F4E79"/><w:sz w:val="48"/>
                   </w:rPr>
                   <w:t>Bold</w:t>
                 </w:r>
                 <w:r><w:rPr><w:u w:val="none"/><w:color w:val="auto"/></w:rPr><w:t> plain</w:t></w:r>
               </w:p>"#,
        );
        let doc = WordDocument::parse(&xml).unwrap();
        let runs = &doc.paragraphs()[0].runs;

        assert_eq!(runs.len(), 2);
        let bold = &runs[0].format;
        assert_eq!(bold.font_name.as_deref(), Some("Georgia"));
        assert_eq!(bold.font_size, Some(2400));
        assert_eq!(bold.bold, Some(true));
        assert_eq!(bold.italic, Some(false));
        assert_eq!(bold.underline, Some(true));
        assert_eq!(bold.color, Some(RgbColor::new(0x1F, 0x4E, 0x79)));
        assert_eq!(bold.alignment, Some(Alignment::Center));

        let plain = &runs[1].format;
        assert_eq!(plain.bold, None, "paragraph mark properties must not leak");
        assert_eq!(plain.underline, Some(false));
        assert_eq!(plain.color, None);
        assert_eq!(plain.alignment, Some(Alignment::Center));
    }

    #[test]
    fn test_out_of_range_font_size_is_dropped() {
        let xml = wrap(
            r#"<w:p><w:r><w:rPr><w:b/><w:sz w:val="4294967295"/></w:rPr><w:t>Huge</w:t></w:r></w:p>"#,
        );
        let doc = WordDocument::parse(&xml).unwrap();
        let format = &doc.paragraphs()[0].runs[0].format;
        assert_eq!(format.font_size, None);
        assert_eq!(format.bold, Some(true));
    }

    #[test]
    fn test_list_level() {
        let xml = wrap(
            r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="2"/><w:numId w:val="1"/></w:numPr></w:pPr>
                 <w:r><w:t>Nested item</w:t></w:r></w:p>
               <w:p><w:pPr><w:numPr><w:numId w:val="1"/></w:numPr></w:pPr>
                 <w:r><w:t>Top item</w:t></w:r></w:p>"#,
        );
        let doc = WordDocument::parse(&xml).unwrap();

        assert_eq!(doc.paragraphs()[0].runs[0].format.indent_level, Some(2));
        assert_eq!(doc.paragraphs()[1].runs[0].format.indent_level, Some(0));
    }

    #[test]
    fn test_tabs_breaks_and_field_codes() {
        let xml = wrap(
            r#"<w:p>
                 <w:r><w:t>A</w:t><w:tab/><w:t>B</w:t><w:br/><w:t>C</w:t></w:r>
                 <w:r><w:fldChar w:fldCharType="begin"/></w:r>
                 <w:r><w:instrText xml:space="preserve"> PAGE </w:instrText></w:r>
                 <w:r><w:fldChar w:fldCharType="separate"/></w:r>
                 <w:r><w:t>7</w:t></w:r>
                 <w:r><w:fldChar w:fldCharType="end"/></w:r>
               </w:p>"#,
        );
        let doc = WordDocument::parse(&xml).unwrap();
        assert_eq!(doc.paragraphs()[0].text, "A\tB\nC7");
    }

    #[test]
    fn test_table_paragraphs_in_document_order() {
        let xml = wrap(
            r#"<w:p><w:r><w:t>before</w:t></w:r></w:p>
               <w:tbl><w:tr>
                 <w:tc><w:p><w:r><w:t>cell one</w:t></w:r></w:p></w:tc>
                 <w:tc><w:p><w:r><w:t>cell two</w:t></w:r></w:p></w:tc>
               </w:tr></w:tbl>
               <w:p><w:r><w:t>after</w:t></w:r></w:p>"#,
        );
        let doc = WordDocument::parse(&xml).unwrap();
        assert_eq!(doc.plain_text(), "before\ncell one\ncell two\nafter");
    }

    #[test]
    fn test_text_box_paragraphs_are_skipped() {
        let xml = wrap(
            r#"<w:p>
                 <w:r><w:t>Body</w:t></w:r>
                 <w:r><w:drawing><wp:anchor>
                   <w:txbxContent><w:p><w:r><w:t>Floating</w:t></w:r></w:p></w:txbxContent>
                 </wp:anchor></w:drawing></w:r>
               </w:p>"#,
        );
        let doc = WordDocument::parse(&xml).unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.paragraphs()[0].text, "Body");
    }

    #[test]
    fn test_hyperlink_runs_are_read() {
        let xml = wrap(
            r#"<w:p><w:hyperlink w:anchor="x"><w:r><w:t>See here</w:t></w:r></w:hyperlink></w:p>"#,
        );
        let doc = WordDocument::parse(&xml).unwrap();
        assert_eq!(doc.paragraphs()[0].text, "See here");
    }

    #[test]
    fn test_missing_body_is_invalid() {
        let xml = br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#;
        assert!(matches!(
            WordDocument::parse(xml),
            Err(OoxmlError::Malformed(_))
        ));
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            WordDocument::parse(b"<w:document><w:body><w:p></w:body>"),
            Err(OoxmlError::Xml(_))
        ));
    }

    #[test]
    fn test_source_from_bytes_requires_document_part() {
        let mut archive = OoxmlArchive::new();
        archive.set_string("ppt/presentation.xml", "<p:presentation/>");
        let source = DocxSource::from_bytes(archive.to_bytes().unwrap());

        let err = source.read_paragraphs().unwrap_err();
        assert!(matches!(err, OoxmlError::MissingPart(ref p) if p == DOCUMENT_PART));
        assert!(source.path().is_none());
    }

    #[test]
    fn test_main_part_from_package_relationships() {
        let mut archive = OoxmlArchive::new();
        archive.set_string(
            "_rels/.rels",
            format!(
                r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{}" Target="/word/main.xml"/></Relationships>"#,
                Relationships::TYPE_OFFICE_DOCUMENT
            ),
        );
        archive.set(
            "word/main.xml",
            wrap(r#"<w:p><w:r><w:t>Renamed part</w:t></w:r></w:p>"#),
        );

        let doc = WordDocument::from_archive(&archive).unwrap();
        assert_eq!(doc.plain_text(), "Renamed part");
    }
}
