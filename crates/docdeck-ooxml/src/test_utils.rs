//! Shared test fixtures
//!
//! Builders for minimal but well-formed DOCX and PPTX packages, plus
//! snippets for the slide shapes the converter cares about. Enabled for
//! this crate's tests and for dependents through the `test-utils` feature.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::xml::escape_xml;

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const P_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// A valid 1x1 transparent PNG
pub const PNG_1X1: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Zip the given parts, in order, without compression
pub fn zip_parts(parts: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for (path, contents) in parts {
        zip.start_file(path.as_str(), options).unwrap();
        zip.write_all(contents).unwrap();
    }

    zip.finish().unwrap();
    buffer.into_inner()
}

fn rel(id: &str, kind: &str, target: &str) -> String {
    format!(
        r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
        id,
        REL_BASE,
        kind,
        escape_xml(target)
    )
}

fn rels(entries: &[String]) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{}">{}</Relationships>"#,
        RELS_NS,
        entries.concat()
    )
    .into_bytes()
}

// ---------------------------------------------------------------------------
// DOCX
// ---------------------------------------------------------------------------

/// A `w:p` holding one unformatted run
pub fn paragraph_xml(text: &str) -> String {
    format!(
        r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape_xml(text)
    )
}

/// A `w:p` holding one run with the given `w:rPr` children
pub fn formatted_paragraph_xml(text: &str, run_properties: &str) -> String {
    format!(
        r#"<w:p><w:r><w:rPr>{}</w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        run_properties,
        escape_xml(text)
    )
}

/// A DOCX package whose body is `body_xml`
pub fn docx_from_body(body_xml: &str) -> Vec<u8> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}"><w:body>{}<w:sectPr/></w:body></w:document>"#,
        W_NS, body_xml
    );

    zip_parts(&[
        (
            "[Content_Types].xml".to_string(),
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#
                .to_vec(),
        ),
        (
            "_rels/.rels".to_string(),
            rels(&[rel("rId1", "officeDocument", "word/document.xml")]),
        ),
        ("word/_rels/document.xml.rels".to_string(), rels(&[])),
        ("word/document.xml".to_string(), document.into_bytes()),
    ])
}

/// A DOCX package with one plain paragraph per line
pub fn docx_from_lines(lines: &[&str]) -> Vec<u8> {
    let body: String = lines.iter().map(|l| paragraph_xml(l)).collect();
    docx_from_body(&body)
}

// ---------------------------------------------------------------------------
// PPTX shapes
// ---------------------------------------------------------------------------

fn xfrm(geometry: (i64, i64, i64, i64)) -> String {
    let (x, y, cx, cy) = geometry;
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        x, y, cx, cy
    )
}

fn text_body(text: &str, run_properties: &str) -> String {
    let paragraphs: String = text
        .split('\n')
        .map(|line| {
            format!(
                r#"<a:p><a:r><a:rPr lang="en-US"{}/><a:t>{}</a:t></a:r></a:p>"#,
                run_properties,
                escape_xml(line)
            )
        })
        .collect();
    format!(
        r#"<p:txBody><a:bodyPr wrap="square" lIns="91440" anchor="t"/><a:lstStyle/>{}</p:txBody>"#,
        paragraphs
    )
}

/// A text box with explicit geometry, 20pt bold text
pub fn textbox_xml(id: u32, name: &str, geometry: (i64, i64, i64, i64), text: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>{}</p:sp>"#,
        id,
        escape_xml(name),
        xfrm(geometry),
        text_body(text, r#" sz="2000" b="1""#)
    )
}

/// A placeholder inheriting its geometry from the layout
pub fn placeholder_xml(id: u32, name: &str, ph_type: Option<&str>, idx: Option<u32>, text: &str) -> String {
    let mut ph = String::from("<p:ph");
    if let Some(ty) = ph_type {
        ph.push_str(&format!(r#" type="{}""#, ty));
    }
    if let Some(idx) = idx {
        ph.push_str(&format!(r#" idx="{}""#, idx));
    }
    ph.push_str("/>");
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{}</p:nvPr></p:nvSpPr><p:spPr/>{}</p:sp>"#,
        id,
        escape_xml(name),
        ph,
        text_body(text, "")
    )
}

/// A rectangle autoshape with the given fill and outline markup
pub fn rect_xml(id: u32, name: &str, geometry: (i64, i64, i64, i64), fill_and_line: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>{}</p:spPr></p:sp>"#,
        id,
        escape_xml(name),
        xfrm(geometry),
        fill_and_line
    )
}

/// A picture referencing media through relationship `rel_id`
pub fn picture_xml(id: u32, name: &str, rel_id: &str, geometry: (i64, i64, i64, i64)) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="{}" descr="fixture image"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
        id,
        escape_xml(name),
        rel_id,
        xfrm(geometry)
    )
}

/// A table graphic frame; every row must have the same number of cells
pub fn table_xml(id: u32, name: &str, geometry: (i64, i64, i64, i64), rows: &[&[&str]]) -> String {
    let (x, y, cx, cy) = geometry;
    let columns = rows.first().map(|r| r.len()).unwrap_or(0).max(1);
    let grid: String = (0..columns)
        .map(|_| format!(r#"<a:gridCol w="{}"/>"#, cx / columns as i64))
        .collect();
    let row_height = cy / rows.len().max(1) as i64;
    let body: String = rows
        .iter()
        .map(|cells| {
            let cells: String = cells
                .iter()
                .map(|text| {
                    format!(
                        r#"<a:tc><a:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US"/><a:t>{}</a:t></a:r></a:p></a:txBody><a:tcPr/></a:tc>"#,
                        escape_xml(text)
                    )
                })
                .collect();
            format!(r#"<a:tr h="{}">{}</a:tr>"#, row_height, cells)
        })
        .collect();
    format!(
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{}" name="{}"/><p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr><p:nvPr/></p:nvGraphicFramePr><p:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></p:xfrm><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl><a:tblPr firstRow="1" bandRow="1"><a:tableStyleId>{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}</a:tableStyleId></a:tblPr><a:tblGrid>{}</a:tblGrid>{}</a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#,
        id,
        escape_xml(name),
        x,
        y,
        cx,
        cy,
        grid,
        body
    )
}

/// A straight connector, which the model keeps as raw markup
pub fn connector_xml(id: u32, name: &str, geometry: (i64, i64, i64, i64)) -> String {
    format!(
        r#"<p:cxnSp><p:nvCxnSpPr><p:cNvPr id="{}" name="{}"/><p:cNvCxnSpPr/><p:nvPr/></p:nvCxnSpPr><p:spPr>{}<a:prstGeom prst="line"><a:avLst/></a:prstGeom><a:ln w="12700"><a:solidFill><a:srgbClr val="000000"/></a:solidFill></a:ln></p:spPr></p:cxnSp>"#,
        id,
        escape_xml(name),
        xfrm(geometry)
    )
}

// ---------------------------------------------------------------------------
// PPTX package
// ---------------------------------------------------------------------------

/// Layout parts of every fixture package: (file, name, placeholders)
const LAYOUTS: &[(&str, &str, &[(&str, Option<u32>, &str)])] = &[
    (
        "slideLayout1.xml",
        "Title Slide",
        &[("ctrTitle", None, "Title 1"), ("subTitle", Some(1), "Subtitle 2")],
    ),
    (
        "slideLayout2.xml",
        "Title and Content",
        &[
            ("title", None, "Title 1"),
            ("body", Some(1), "Content Placeholder 2"),
            ("dt", Some(10), "Date Placeholder 3"),
        ],
    ),
];

struct FixtureSlide {
    layout: usize,
    shapes: String,
    background: Option<String>,
    rels: Vec<String>,
    notes: bool,
}

/// Builder for a minimal PPTX package: one master named "Office Theme",
/// the layouts "Title Slide" and "Title and Content", and the slides added
#[derive(Default)]
pub struct PptxFixture {
    size: Option<(i64, i64)>,
    slides: Vec<FixtureSlide>,
    media: Vec<(String, Vec<u8>)>,
}

impl PptxFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slide size in EMU (default 9144000 x 6858000)
    pub fn size(mut self, width: i64, height: i64) -> Self {
        self.size = Some((width, height));
        self
    }

    /// Add a "Title and Content" slide whose shape tree holds `shapes_xml`
    pub fn slide(self, shapes_xml: impl Into<String>) -> Self {
        self.slide_on_layout(2, shapes_xml)
    }

    /// Add a slide on layout `layout` (1-based)
    pub fn slide_on_layout(mut self, layout: usize, shapes_xml: impl Into<String>) -> Self {
        self.slides.push(FixtureSlide {
            layout,
            shapes: shapes_xml.into(),
            background: None,
            rels: Vec::new(),
            notes: false,
        });
        self
    }

    /// Set the `p:bg` children of the last slide
    pub fn background(mut self, bg_xml: impl Into<String>) -> Self {
        if let Some(slide) = self.slides.last_mut() {
            slide.background = Some(bg_xml.into());
        }
        self
    }

    /// Store `bytes` as `ppt/media/<file>` and link it from the last slide as `rel_id`
    pub fn image(mut self, rel_id: &str, file: &str, bytes: &[u8]) -> Self {
        if let Some(slide) = self.slides.last_mut() {
            slide
                .rels
                .push(rel(rel_id, "image", &format!("../media/{}", file)));
        }
        if !self.media.iter().any(|(name, _)| name == file) {
            self.media.push((file.to_string(), bytes.to_vec()));
        }
        self
    }

    /// Link an arbitrary relationship from the last slide
    pub fn slide_rel(mut self, rel_id: &str, kind: &str, target: &str) -> Self {
        if let Some(slide) = self.slides.last_mut() {
            slide.rels.push(rel(rel_id, kind, target));
        }
        self
    }

    /// Give the last slide a notes page
    pub fn notes(mut self) -> Self {
        if let Some(slide) = self.slides.last_mut() {
            slide.notes = true;
        }
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let (width, height) = self.size.unwrap_or((9_144_000, 6_858_000));
        let mut parts: Vec<(String, Vec<u8>)> = Vec::new();

        // Content types
        let mut overrides = String::new();
        let mut add_override = |part: &str, kind: &str| {
            overrides.push_str(&format!(
                r#"<Override PartName="/{}" ContentType="application/vnd.openxmlformats-officedocument.{}+xml"/>"#,
                part, kind
            ));
        };
        add_override("ppt/presentation.xml", "presentationml.presentation.main");
        add_override("ppt/slideMasters/slideMaster1.xml", "presentationml.slideMaster");
        add_override("ppt/theme/theme1.xml", "theme");
        for (file, _, _) in LAYOUTS {
            add_override(&format!("ppt/slideLayouts/{}", file), "presentationml.slideLayout");
        }
        for (i, slide) in self.slides.iter().enumerate() {
            add_override(&format!("ppt/slides/slide{}.xml", i + 1), "presentationml.slide");
            if slide.notes {
                add_override(
                    &format!("ppt/notesSlides/notesSlide{}.xml", i + 1),
                    "presentationml.notesSlide",
                );
            }
        }
        parts.push((
            "[Content_Types].xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/>{}</Types>"#,
                overrides
            )
            .into_bytes(),
        ));

        parts.push((
            "_rels/.rels".to_string(),
            rels(&[rel("rId1", "officeDocument", "ppt/presentation.xml")]),
        ));

        // Presentation: rId1 master, rId2 theme, slides from rId3
        let mut presentation_rels = vec![
            rel("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
            rel("rId2", "theme", "theme/theme1.xml"),
        ];
        let mut slide_ids = String::new();
        for i in 0..self.slides.len() {
            let rid = format!("rId{}", i + 3);
            presentation_rels.push(rel(&rid, "slide", &format!("slides/slide{}.xml", i + 1)));
            slide_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + i, rid));
        }
        let slide_id_list = if slide_ids.is_empty() {
            String::new()
        } else {
            format!("<p:sldIdLst>{}</p:sldIdLst>", slide_ids)
        };
        parts.push((
            "ppt/presentation.xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>{}<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
                A_NS, R_NS, P_NS, slide_id_list, width, height
            )
            .into_bytes(),
        ));
        parts.push(("ppt/_rels/presentation.xml.rels".to_string(), rels(&presentation_rels)));

        parts.push((
            "ppt/theme/theme1.xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><a:theme xmlns:a="{}" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:srgbClr val="000000"/></a:dk1><a:lt1><a:srgbClr val="FFFFFF"/></a:lt1><a:accent1><a:srgbClr val="4472C4"/></a:accent1></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"/></a:themeElements></a:theme>"#,
                A_NS
            )
            .into_bytes(),
        ));

        // Master and layouts
        let mut master_rels = Vec::new();
        let mut layout_ids = String::new();
        for (i, (file, name, placeholders)) in LAYOUTS.iter().enumerate() {
            let rid = format!("rId{}", i + 1);
            master_rels.push(rel(&rid, "slideLayout", &format!("../slideLayouts/{}", file)));
            layout_ids.push_str(&format!(
                r#"<p:sldLayoutId id="{}" r:id="{}"/>"#,
                2_147_483_649u64 + i as u64,
                rid
            ));

            let shapes: String = placeholders
                .iter()
                .enumerate()
                .map(|(n, (ty, idx, ph_name))| {
                    let geometry = (457_200, 274_638 + n as i64 * 1_400_000, 8_229_600, 1_143_000);
                    let ph_idx = idx.map(|i| format!(r#" idx="{}""#, i)).unwrap_or_default();
                    format!(
                        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="{}"{}/></p:nvPr></p:nvSpPr><p:spPr>{}</p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US"/><a:t>Click to edit</a:t></a:r></a:p></p:txBody></p:sp>"#,
                        n + 2,
                        ph_name,
                        ty,
                        ph_idx,
                        xfrm(geometry)
                    )
                })
                .collect();
            parts.push((
                format!("ppt/slideLayouts/{}", file),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" preserve="1"><p:cSld name="{}"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
                    A_NS, R_NS, P_NS, name, shapes
                )
                .into_bytes(),
            ));
            parts.push((
                format!("ppt/slideLayouts/_rels/{}.rels", file),
                rels(&[rel("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
            ));
        }
        master_rels.push(rel(
            &format!("rId{}", LAYOUTS.len() + 1),
            "theme",
            "../theme/theme1.xml",
        ));
        parts.push((
            "ppt/slideMasters/slideMaster1.xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld name="Office Theme"><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst>{}</p:sldLayoutIdLst></p:sldMaster>"#,
                A_NS, R_NS, P_NS, layout_ids
            )
            .into_bytes(),
        ));
        parts.push((
            "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
            rels(&master_rels),
        ));

        // Slides
        for (i, slide) in self.slides.iter().enumerate() {
            let number = i + 1;
            let layout_file = LAYOUTS
                .get(slide.layout.saturating_sub(1))
                .map(|(file, _, _)| *file)
                .unwrap_or(LAYOUTS[0].0);
            let background = slide
                .background
                .as_ref()
                .map(|bg| format!("<p:bg>{}</p:bg>", bg))
                .unwrap_or_default();
            parts.push((
                format!("ppt/slides/slide{}.xml", number),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld>{}<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
                    A_NS, R_NS, P_NS, background, slide.shapes
                )
                .into_bytes(),
            ));

            let mut slide_rels = vec![rel(
                "rId1",
                "slideLayout",
                &format!("../slideLayouts/{}", layout_file),
            )];
            slide_rels.extend(slide.rels.iter().cloned());
            if slide.notes {
                let notes_part = format!("notesSlide{}.xml", number);
                slide_rels.push(rel(
                    "rId99",
                    "notesSlide",
                    &format!("../notesSlides/{}", notes_part),
                ));
                parts.push((
                    format!("ppt/notesSlides/{}", notes_part),
                    format!(
                        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:notes xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld></p:notes>"#,
                        A_NS, R_NS, P_NS
                    )
                    .into_bytes(),
                ));
                parts.push((
                    format!("ppt/notesSlides/_rels/{}.rels", notes_part),
                    rels(&[rel("rId1", "slide", &format!("../slides/slide{}.xml", number))]),
                ));
            }
            parts.push((
                format!("ppt/slides/_rels/slide{}.xml.rels", number),
                rels(&slide_rels),
            ));
        }

        for (file, bytes) in &self.media {
            parts.push((format!("ppt/media/{}", file), bytes.clone()));
        }

        zip_parts(&parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::OoxmlArchive;
    use crate::document::WordDocument;
    use crate::relationships::Relationships;
    use crate::xml::XmlElement;

    #[test]
    fn test_docx_fixture_is_readable() {
        let docx = docx_from_lines(&["1. First", "Body & more"]);
        let archive = OoxmlArchive::from_bytes(&docx).unwrap();
        assert!(archive.contains("[Content_Types].xml"));

        let doc = WordDocument::from_archive(&archive).unwrap();
        assert_eq!(doc.plain_text(), "1. First\nBody & more");
    }

    #[test]
    fn test_formatted_paragraph_fixture() {
        let docx = docx_from_body(&formatted_paragraph_xml("Big", r#"<w:sz w:val="64"/>"#));
        let archive = OoxmlArchive::from_bytes(&docx).unwrap();
        let doc = WordDocument::from_archive(&archive).unwrap();
        assert_eq!(doc.paragraphs()[0].runs[0].format.font_size, Some(3200));
    }

    #[test]
    fn test_pptx_fixture_structure() {
        let pptx = PptxFixture::new()
            .slide(textbox_xml(2, "TextBox 1", (0, 0, 100, 100), "Hello"))
            .image("rId2", "image1.png", PNG_1X1)
            .notes()
            .slide_on_layout(1, "")
            .build();
        let archive = OoxmlArchive::from_bytes(&pptx).unwrap();

        for part in [
            "ppt/presentation.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide2.xml",
            "ppt/slideLayouts/slideLayout2.xml",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/notesSlides/notesSlide1.xml",
            "ppt/media/image1.png",
        ] {
            assert!(archive.contains(part), "missing {}", part);
        }

        let rels = Relationships::parse(archive.get("ppt/slides/_rels/slide1.xml.rels").unwrap())
            .unwrap();
        assert_eq!(rels.get("rId2"), Some("../media/image1.png"));

        let slide = XmlElement::parse(archive.get("ppt/slides/slide1.xml").unwrap()).unwrap();
        let tree = slide.find(&["cSld", "spTree"]).unwrap();
        assert_eq!(tree.children_named("sp").count(), 1);
    }

    #[test]
    fn test_shape_snippets_are_well_formed() {
        let snippets = [
            placeholder_xml(2, "Title 1", Some("title"), None, "T"),
            rect_xml(3, "Rect", (0, 0, 1, 1), "<a:noFill/>"),
            picture_xml(4, "Pic", "rId2", (0, 0, 1, 1)),
            table_xml(5, "Table", (0, 0, 200, 100), &[&["a", "b"], &["c", "d"]]),
            connector_xml(6, "Line", (0, 0, 1, 1)),
        ];
        for snippet in snippets {
            let wrapped = format!(
                r#"<p:spTree xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">{}</p:spTree>"#,
                A_NS, R_NS, P_NS, snippet
            );
            assert!(XmlElement::parse(wrapped.as_bytes()).is_ok(), "{}", snippet);
        }
    }
}
