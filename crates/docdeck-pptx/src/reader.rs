//! Reading a presentation package into a [`Deck`]

use std::collections::{HashMap, HashSet};

use docdeck_model::{
    Deck, Fill, FillKind, ImageBlob, LayoutInfo, LayoutRef, Picture, PlaceholderSpec,
    PlaceholderType, Shape, ShapeKind, Slide, SlideRelationship, Table, TableCell,
    DEFAULT_SLIDE_HEIGHT, DEFAULT_SLIDE_WIDTH,
};
use docdeck_ooxml::relationships::{rels_path_for, resolve_target};
use docdeck_ooxml::xml::{get_attr, get_attr_with_ns, XmlElement};
use docdeck_ooxml::{OoxmlArchive, Relationships};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::constants::{PRESENTATION_PART, SLIDE_LAYOUTS_DIR};
use crate::drawing::{self, Namespaces};
use crate::error::{PptxError, Result};

/// Slide size and ordered slide relationship ids of `presentation.xml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationInfo {
    pub width: i64,
    pub height: i64,
    pub slide_rel_ids: Vec<String>,
}

/// Location of the presentation part, from the package relationships
pub fn presentation_part(archive: &OoxmlArchive) -> String {
    archive
        .get("_rels/.rels")
        .and_then(|xml| Relationships::parse(xml).ok())
        .and_then(|rels| {
            rels.find_by_type(Relationships::TYPE_OFFICE_DOCUMENT)
                .map(|(_, rel)| resolve_target("", &rel.target))
        })
        .filter(|part| archive.contains(part))
        .unwrap_or_else(|| PRESENTATION_PART.to_string())
}

/// Relationships of `part`, empty when it has none
pub fn part_relationships(archive: &OoxmlArchive, part: &str) -> Result<Relationships> {
    match archive.get(&rels_path_for(part)) {
        Some(xml) => Ok(Relationships::parse(xml)?),
        None => Ok(Relationships::new()),
    }
}

/// Parse `presentation.xml`
pub fn parse_presentation(xml: &[u8]) -> Result<PresentationInfo> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut info = PresentationInfo {
        width: DEFAULT_SLIDE_WIDTH,
        height: DEFAULT_SLIDE_HEIGHT,
        slide_rel_ids: Vec::new(),
    };
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"sldSz" => {
                    if let Some(cx) = get_attr(e, b"cx").and_then(|v| v.parse().ok()) {
                        info.width = cx;
                    }
                    if let Some(cy) = get_attr(e, b"cy").and_then(|v| v.parse().ok()) {
                        info.height = cy;
                    }
                }
                b"sldId" => {
                    if let Some(rid) = get_attr_with_ns(e, b"r:id") {
                        info.slide_rel_ids.push(rid);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(PptxError::XmlError(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(info)
}

/// Read the slides, layouts and slide size of a presentation package
pub fn read_deck(archive: &OoxmlArchive) -> Result<Deck> {
    let presentation = presentation_part(archive);
    let xml = archive.get(&presentation).ok_or_else(|| {
        PptxError::invalid_template(format!("package has no presentation part ({})", presentation))
    })?;
    let info = parse_presentation(xml)?;
    let presentation_rels = part_relationships(archive, &presentation)?;

    let mut deck = Deck::new(info.width, info.height);
    deck.layouts = read_layouts(archive)?;

    for rid in &info.slide_rel_ids {
        let target = presentation_rels
            .get(rid)
            .ok_or_else(|| PptxError::missing_part(rid.as_str(), presentation.as_str()))?;
        let part = resolve_target(&presentation, target);
        let slide = SlideReader::new(archive, &part, &presentation)?.read(&deck.layouts)?;
        deck.push_slide(slide);
    }

    debug!(
        slides = deck.slide_count(),
        layouts = deck.layouts.len(),
        width = deck.slide_width,
        height = deck.slide_height,
        "presentation read"
    );
    Ok(deck)
}

/// Number in a `slideLayoutN.xml` name, for ordering
fn layout_index(part: &str) -> u32 {
    part.trim_start_matches(SLIDE_LAYOUTS_DIR)
        .trim_start_matches("slideLayout")
        .trim_end_matches(".xml")
        .parse()
        .unwrap_or(u32::MAX)
}

/// Every slide layout of the package, in layout number order
pub fn read_layouts(archive: &OoxmlArchive) -> Result<Vec<LayoutInfo>> {
    let mut parts: Vec<&str> = archive
        .paths_with_prefix(SLIDE_LAYOUTS_DIR)
        .into_iter()
        .filter(|p| p.ends_with(".xml") && !p.contains("/_rels/"))
        .collect();
    parts.sort_by_key(|p| (layout_index(p), p.to_string()));

    let mut master_names: HashMap<String, Option<String>> = HashMap::new();
    let mut layouts = Vec::with_capacity(parts.len());

    for part in parts {
        let root = XmlElement::parse(archive.require(part)?)?;
        let rels = part_relationships(archive, part)?;

        let master_name = match rels.find_by_type(Relationships::TYPE_SLIDE_MASTER) {
            Some((_, rel)) => {
                let master = resolve_target(part, &rel.target);
                if !master_names.contains_key(&master) {
                    let name = read_master_name(archive, &master)?;
                    master_names.insert(master.clone(), name);
                }
                master_names.get(&master).cloned().flatten()
            }
            None => None,
        };

        layouts.push(LayoutInfo {
            part: part.to_string(),
            name: root
                .child("cSld")
                .and_then(|c| c.attr("name"))
                .unwrap_or_default()
                .to_string(),
            master_name,
            placeholders: layout_placeholders(&root),
        });
    }

    Ok(layouts)
}

fn read_master_name(archive: &OoxmlArchive, part: &str) -> Result<Option<String>> {
    let Some(xml) = archive.get(part) else {
        warn!(part, "slide master referenced but missing");
        return Ok(None);
    };
    let root = XmlElement::parse(xml)?;
    Ok(root
        .child("cSld")
        .and_then(|c| c.attr("name"))
        .filter(|name| !name.is_empty())
        .map(str::to_string))
}

fn layout_placeholders(root: &XmlElement) -> Vec<PlaceholderSpec> {
    let Some(tree) = root.find(&["cSld", "spTree"]) else {
        return Vec::new();
    };
    tree.children_named("sp")
        .filter_map(|sp| {
            let nv = sp.child("nvSpPr")?;
            let ph = nv.find(&["nvPr", "ph"])?;
            Some(PlaceholderSpec {
                idx: ph.attr_parse("idx").unwrap_or(0),
                ph_type: PlaceholderType::from_ooxml_type(ph.attr("type").unwrap_or("obj")),
                name: nv
                    .child("cNvPr")
                    .and_then(|c| c.attr("name"))
                    .unwrap_or_default()
                    .to_string(),
                has_text: sp.child("txBody").is_some(),
            })
        })
        .collect()
}

/// Reads one slide part and the parts it references
struct SlideReader<'a> {
    archive: &'a OoxmlArchive,
    part: &'a str,
    root: XmlElement,
    rels: Relationships,
    namespaces: Vec<(String, String)>,
    /// Relationship ids resolved into picture payloads
    consumed: HashSet<String>,
}

impl<'a> SlideReader<'a> {
    fn new(archive: &'a OoxmlArchive, part: &'a str, referrer: &str) -> Result<Self> {
        let xml = archive
            .get(part)
            .ok_or_else(|| PptxError::missing_part(part, referrer))?;
        let root = XmlElement::parse(xml)?;
        let namespaces = root.namespace_declarations();
        Ok(Self {
            archive,
            part,
            root,
            rels: part_relationships(archive, part)?,
            namespaces,
            consumed: HashSet::new(),
        })
    }

    fn read(mut self, layouts: &[LayoutInfo]) -> Result<Slide> {
        let layout = match self.rels.find_by_type(Relationships::TYPE_SLIDE_LAYOUT) {
            Some((_, rel)) => {
                let part = resolve_target(self.part, &rel.target);
                let name = layouts
                    .iter()
                    .find(|l| l.part == part)
                    .map(|l| l.name.clone())
                    .unwrap_or_default();
                LayoutRef { part, name }
            }
            None => {
                warn!(slide = self.part, "slide has no layout relationship");
                LayoutRef::default()
            }
        };

        let root = std::mem::take(&mut self.root);
        let c_sld = root
            .child("cSld")
            .ok_or_else(|| PptxError::invalid_template(format!("{} has no p:cSld", self.part)))?;

        let mut slide = Slide::new(layout);
        slide.background = c_sld
            .child("bg")
            .and_then(|bg| read_background(bg, &self.namespaces));

        if let Some(tree) = c_sld.child("spTree") {
            for element in tree.elements() {
                if let Some(shape) = self.read_shape(element) {
                    slide.shapes.push(shape);
                }
            }
        }

        slide.relationships = self
            .rels
            .iter()
            .filter(|(id, rel)| {
                rel.rel_type != Relationships::TYPE_SLIDE_LAYOUT
                    && rel.rel_type != Relationships::TYPE_NOTES_SLIDE
                    && !self.consumed.contains(*id)
            })
            .map(|(id, rel)| SlideRelationship {
                id: id.to_string(),
                rel_type: rel.rel_type.clone(),
                target: rel.target.clone(),
                external: rel.is_external(),
            })
            .collect();

        debug!(
            slide = self.part,
            shapes = slide.shapes.len(),
            kept_relationships = slide.relationships.len(),
            "slide read"
        );
        Ok(slide)
    }

    fn read_shape(&mut self, element: &XmlElement) -> Option<Shape> {
        match element.local_name() {
            "nvGrpSpPr" | "grpSpPr" | "extLst" => None,
            "sp" => Some(self.read_sp(element)),
            "pic" => Some(self.read_pic(element)),
            "graphicFrame" => Some(self.read_graphic_frame(element)),
            _ => Some(self.read_other(element)),
        }
    }

    fn new_shape(&self, element: &XmlElement, kind: ShapeKind) -> Shape {
        let c_nv_pr = element.descendants("cNvPr").into_iter().next();
        let id = c_nv_pr.and_then(|c| c.attr_parse("id")).unwrap_or(0);
        let name = c_nv_pr.and_then(|c| c.attr("name")).unwrap_or_default();
        Shape::new(id, name, kind)
    }

    /// Geometry, rotation, fill and outline from a `p:spPr`
    fn apply_shape_properties(&self, shape: &mut Shape, sp_pr: Option<&XmlElement>) {
        let Some(sp_pr) = sp_pr else {
            return;
        };
        if let Some(xfrm) = sp_pr.child("xfrm") {
            let (geometry, rotation) = drawing::parse_xfrm(xfrm);
            shape.geometry = geometry;
            shape.rotation = rotation;
        }
        shape.fill = drawing::parse_fill(sp_pr, &self.namespaces);
        shape.line = sp_pr.child("ln").map(drawing::parse_line);
    }

    fn read_sp(&self, element: &XmlElement) -> Shape {
        let nv = element.child("nvSpPr");
        let sp_pr = element.child("spPr");

        let kind = if let Some(ph) = nv.and_then(|nv| nv.find(&["nvPr", "ph"])) {
            ShapeKind::Placeholder {
                idx: ph.attr_parse("idx").unwrap_or(0),
                ph_type: PlaceholderType::from_ooxml_type(ph.attr("type").unwrap_or("obj")),
            }
        } else if nv
            .and_then(|nv| nv.child("cNvSpPr"))
            .and_then(|c| c.attr("txBox"))
            .is_some_and(|v| v == "1" || v == "true")
        {
            ShapeKind::TextBox
        } else if sp_pr.is_some_and(|p| p.child("custGeom").is_some()) {
            return self.read_other(element);
        } else {
            ShapeKind::AutoShape {
                preset: sp_pr
                    .and_then(|p| p.child("prstGeom"))
                    .and_then(|g| g.attr("prst"))
                    .unwrap_or("rect")
                    .to_string(),
            }
        };

        let mut shape = self.new_shape(element, kind);
        self.apply_shape_properties(&mut shape, sp_pr);
        shape.text_frame = element
            .child("txBody")
            .map(|body| drawing::parse_text_body(body, &self.namespaces));
        shape
    }

    fn read_pic(&mut self, element: &XmlElement) -> Shape {
        let description = element
            .descendants("cNvPr")
            .into_iter()
            .next()
            .and_then(|c| c.attr("descr"))
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        let image = element
            .find(&["blipFill", "blip"])
            .and_then(|blip| blip.attr("embed"))
            .and_then(|rid| self.resolve_image(rid));

        let mut shape = self.new_shape(element, ShapeKind::Picture(Picture { image, description }));
        self.apply_shape_properties(&mut shape, element.child("spPr"));
        shape
    }

    fn resolve_image(&mut self, rid: &str) -> Option<ImageBlob> {
        let rel = self.rels.get_target(rid)?;
        if rel.is_external() {
            debug!(rid, target = %rel.target, "linked picture left unresolved");
            return None;
        }
        let media = resolve_target(self.part, &rel.target);
        match self.archive.get(&media) {
            Some(bytes) => {
                self.consumed.insert(rid.to_string());
                Some(ImageBlob::new(bytes.to_vec()))
            }
            None => {
                warn!(slide = self.part, media = %media, "picture media is missing");
                None
            }
        }
    }

    fn read_graphic_frame(&self, element: &XmlElement) -> Shape {
        let Some(tbl) = element
            .find(&["graphic", "graphicData"])
            .and_then(|data| data.child("tbl"))
        else {
            return self.read_other(element);
        };

        let mut shape = self.new_shape(element, ShapeKind::Table(self.read_table(tbl)));
        if let Some(xfrm) = element.child("xfrm") {
            let (geometry, rotation) = drawing::parse_xfrm(xfrm);
            shape.geometry = geometry;
            shape.rotation = rotation;
        }
        shape
    }

    fn read_table(&self, tbl: &XmlElement) -> Table {
        let column_widths = tbl
            .child("tblGrid")
            .map(|grid| {
                grid.children_named("gridCol")
                    .map(|col| col.attr_parse("w").unwrap_or(0))
                    .collect()
            })
            .unwrap_or_default();

        let mut row_heights = Vec::new();
        let mut rows = Vec::new();
        for tr in tbl.children_named("tr") {
            row_heights.push(tr.attr_parse("h").unwrap_or(0));
            rows.push(
                tr.children_named("tc")
                    .map(|tc| TableCell {
                        text_frame: tc
                            .child("txBody")
                            .map(|body| drawing::parse_text_body(body, &self.namespaces))
                            .unwrap_or_default(),
                    })
                    .collect(),
            );
        }

        Table {
            rows,
            column_widths,
            row_heights,
            style_id: tbl
                .find(&["tblPr", "tableStyleId"])
                .map(|id| id.text().trim().to_string())
                .filter(|id| !id.is_empty()),
        }
    }

    /// Anything without a model of its own is kept as markup
    fn read_other(&self, element: &XmlElement) -> Shape {
        let kind = ShapeKind::Other {
            element: element.local_name().to_string(),
            raw: Some(element.to_xml_with_namespaces(&self.namespaces)),
        };
        let mut shape = self.new_shape(element, kind);
        let xfrm_paths: [&[&str]; 3] = [&["spPr", "xfrm"], &["grpSpPr", "xfrm"], &["xfrm"]];
        shape.geometry = xfrm_paths
            .iter()
            .find_map(|path| element.find(path))
            .and_then(|xfrm| drawing::parse_xfrm(xfrm).0);
        shape
    }
}

/// Background of a `p:bg`: an explicit `p:bgPr` fill or a theme reference
fn read_background(bg: &XmlElement, namespaces: &Namespaces) -> Option<Fill> {
    if let Some(bg_pr) = bg.child("bgPr") {
        return drawing::parse_fill(bg_pr, namespaces);
    }
    bg.child("bgRef").map(|bg_ref| Fill::Unsupported {
        kind: FillKind::ThemeColor,
        raw: Some(bg_ref.to_xml_with_namespaces(namespaces)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdeck_model::{Geometry, Line, RgbColor};
    use docdeck_ooxml::test_utils::{
        connector_xml, picture_xml, placeholder_xml, rect_xml, table_xml, textbox_xml, PptxFixture,
        PNG_1X1,
    };

    fn deck(fixture: PptxFixture) -> Deck {
        let archive = OoxmlArchive::from_bytes(&fixture.build()).unwrap();
        read_deck(&archive).unwrap()
    }

    #[test]
    fn test_parse_presentation() {
        let xml = br#"<p:presentation xmlns:p="urn:p" xmlns:r="urn:r">
            <p:sldIdLst><p:sldId id="256" r:id="rId7"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst>
            <p:sldSz cx="12192000" cy="6858000" type="custom"/></p:presentation>"#;
        let info = parse_presentation(xml).unwrap();
        assert_eq!(info.width, 12_192_000);
        assert_eq!(info.height, 6_858_000);
        assert_eq!(info.slide_rel_ids, vec!["rId7", "rId3"]);
    }

    #[test]
    fn test_presentation_defaults() {
        let info = parse_presentation(br#"<p:presentation xmlns:p="urn:p"/>"#).unwrap();
        assert_eq!((info.width, info.height), (DEFAULT_SLIDE_WIDTH, DEFAULT_SLIDE_HEIGHT));
        assert!(info.slide_rel_ids.is_empty());
    }

    #[test]
    fn test_layouts_and_master() {
        let deck = deck(PptxFixture::new().size(12_192_000, 6_858_000).slide(""));

        assert_eq!(deck.slide_width, 12_192_000);
        assert_eq!(deck.layouts.len(), 2);
        let content = &deck.layouts[1];
        assert_eq!(content.part, "ppt/slideLayouts/slideLayout2.xml");
        assert_eq!(content.name, "Title and Content");
        assert_eq!(content.master_name.as_deref(), Some("Office Theme"));
        let types: Vec<PlaceholderType> = content.placeholders.iter().map(|p| p.ph_type).collect();
        assert_eq!(
            types,
            vec![PlaceholderType::Title, PlaceholderType::Body, PlaceholderType::DateTime]
        );
        assert_eq!(content.placeholders[2].idx, 10);
        assert!(content.placeholders.iter().all(|p| p.has_text));

        let slide = &deck.slides()[0];
        assert_eq!(slide.layout.name, "Title and Content");
        assert_eq!(slide.layout.part, "ppt/slideLayouts/slideLayout2.xml");
    }

    #[test]
    fn test_shape_kinds() {
        let shapes = [
            placeholder_xml(2, "Title 1", Some("title"), None, "Quarterly review"),
            placeholder_xml(3, "Content 2", None, Some(1), "Body"),
            textbox_xml(4, "TextBox 3", (100, 200, 3000, 400), "Note"),
            rect_xml(5, "Band", (0, 0, 9_144_000, 600_000), r#"<a:solidFill><a:srgbClr val="1F4E79"/></a:solidFill>"#),
            picture_xml(6, "Logo", "rId2", (10, 10, 50, 50)),
            table_xml(7, "Figures", (0, 0, 400, 200), &[&["a", "b"], &["c", "d"]]),
            connector_xml(8, "Rule", (0, 0, 100, 0)),
        ]
        .concat();
        let deck = deck(PptxFixture::new().slide(shapes).image("rId2", "image1.png", PNG_1X1));
        let slide = &deck.slides()[0];
        let kinds: Vec<&str> = slide.shapes.iter().map(Shape::kind_name).collect();
        assert_eq!(
            kinds,
            vec!["placeholder", "placeholder", "textbox", "autoshape", "picture", "table", "other"]
        );

        let title = &slide.shapes[0];
        assert_eq!(
            title.kind,
            ShapeKind::Placeholder { idx: 0, ph_type: PlaceholderType::Title }
        );
        assert_eq!(title.geometry, None);
        assert_eq!(title.text().as_deref(), Some("Quarterly review"));
        assert_eq!(
            slide.shapes[1].kind,
            ShapeKind::Placeholder { idx: 1, ph_type: PlaceholderType::Object }
        );

        let textbox = &slide.shapes[2];
        assert_eq!(textbox.id, 4);
        assert_eq!(textbox.geometry, Some(Geometry::new(100, 200, 3000, 400)));
        assert_eq!(textbox.fill, Some(Fill::NoFill));
        let run = &textbox.text_frame.as_ref().unwrap().paragraphs[0].runs[0];
        assert_eq!(run.format.font_size, Some(2000));
        assert_eq!(run.format.bold, Some(true));

        assert_eq!(slide.shapes[3].fill, Some(Fill::Solid(RgbColor::new(0x1F, 0x4E, 0x79))));
        assert_eq!(
            slide.shapes[3].kind,
            ShapeKind::AutoShape { preset: "rect".to_string() }
        );

        let ShapeKind::Picture(picture) = &slide.shapes[4].kind else {
            panic!("expected picture");
        };
        assert_eq!(picture.image.as_ref().unwrap().bytes, PNG_1X1);
        assert_eq!(picture.description.as_deref(), Some("fixture image"));

        let table = slide.shapes[5].table().unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_widths, vec![200, 200]);
        assert_eq!(table.cell(1, 0).unwrap().text(), "c");
        assert_eq!(
            table.style_id.as_deref(),
            Some("{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}")
        );

        let connector = &slide.shapes[6];
        let ShapeKind::Other { element, raw: Some(raw) } = &connector.kind else {
            panic!("expected raw connector");
        };
        assert_eq!(element, "cxnSp");
        assert!(raw.starts_with("<p:cxnSp"));
        assert!(raw.contains("xmlns:a="));
        assert_eq!(connector.geometry, Some(Geometry::new(0, 0, 100, 0)));
        assert_eq!(connector.line, None);
    }

    #[test]
    fn test_relationships_kept_for_writing() {
        let deck = deck(
            PptxFixture::new()
                .slide(picture_xml(2, "Logo", "rId2", (0, 0, 10, 10)))
                .image("rId2", "image1.png", PNG_1X1)
                .slide_rel("rId3", "hyperlink", "https://example.com")
                .notes(),
        );
        let rels = &deck.slides()[0].relationships;
        let ids: Vec<&str> = rels.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["rId3"]);
        assert_eq!(rels[0].target, "https://example.com");
    }

    #[test]
    fn test_missing_media_leaves_picture_empty() {
        let deck = deck(PptxFixture::new().slide(picture_xml(2, "Broken", "rId5", (0, 0, 10, 10))));
        let ShapeKind::Picture(picture) = &deck.slides()[0].shapes[0].kind else {
            panic!("expected picture");
        };
        assert!(picture.image.is_none());
    }

    #[test]
    fn test_background_kinds() {
        let deck = deck(
            PptxFixture::new()
                .slide("")
                .background(r#"<p:bgPr><a:solidFill><a:srgbClr val="FFFFFF"/></a:solidFill><a:effectLst/></p:bgPr>"#)
                .slide("")
                .background(r#"<p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef>"#)
                .slide(""),
        );
        let backgrounds: Vec<Option<Fill>> =
            deck.slides().iter().map(|s| s.background.clone()).collect();
        assert_eq!(backgrounds[0], Some(Fill::Solid(RgbColor::WHITE)));
        assert!(matches!(
            &backgrounds[1],
            Some(Fill::Unsupported { kind: FillKind::ThemeColor, raw: Some(raw) }) if raw.contains("bgRef")
        ));
        assert_eq!(backgrounds[2], None);
    }

    #[test]
    fn test_outline_is_read() {
        let deck = deck(PptxFixture::new().slide(rect_xml(
            2,
            "Framed",
            (0, 0, 10, 10),
            r#"<a:noFill/><a:ln w="25400"><a:solidFill><a:srgbClr val="000000"/></a:solidFill></a:ln>"#,
        )));
        let shape = &deck.slides()[0].shapes[0];
        assert_eq!(shape.line, Some(Line::solid(25_400, RgbColor::BLACK)));
        assert_eq!(shape.fill, Some(Fill::NoFill));
    }

    #[test]
    fn test_not_a_presentation() {
        let mut archive = OoxmlArchive::new();
        archive.set_string("word/document.xml", "<w:document/>");
        let err = read_deck(&archive).unwrap_err();
        assert_eq!(err.code(), "PPTX002");
    }
}
