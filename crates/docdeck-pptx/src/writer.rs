//! Writing a [`Deck`] back into its template package.
//!
//! Every part outside `ppt/slides/` and `ppt/notesSlides/` is carried
//! over from the template. Slides are regenerated from the model, then
//! the presentation part, its relationships and the content types are
//! brought in line with the new slide list. Media that no relationship
//! points at any more is dropped.

use std::collections::{HashMap, HashSet};

use docdeck_model::{Deck, Fill, ImageFormat, Picture, Shape, ShapeKind, Slide, Table, TextFrame};
use docdeck_ooxml::relationships::{
    owner_of_rels_path, relative_target, rels_path_for, resolve_target,
};
use docdeck_ooxml::xml::{escape_xml, XmlElement, XmlNode};
use docdeck_ooxml::{OoxmlArchive, RelationshipTarget, Relationships, CONTENT_TYPES_PART};
use tracing::{debug, info, warn};

use crate::constants::*;
use crate::drawing::{fill_xml, line_xml, text_body_xml, xfrm_xml};
use crate::error::{PptxError, Result};
use crate::media::MediaStore;
use crate::reader::{part_relationships, presentation_part};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Elements of `p:presentation` that precede `p:sldIdLst`
const BEFORE_SLIDE_LIST: &[&str] = &["sldMasterIdLst", "notesMasterIdLst", "handoutMasterIdLst"];

/// Produce the package for `deck`, using `template` for everything the
/// deck does not describe
pub fn write_deck(template: &OoxmlArchive, deck: &Deck) -> Result<OoxmlArchive> {
    let mut out = template.clone();
    let presentation = presentation_part(template);
    if !out.contains(&presentation) {
        return Err(PptxError::invalid_template(format!(
            "package has no presentation part ({})",
            presentation
        )));
    }

    out.retain(|path| !path.starts_with(SLIDES_DIR) && !path.starts_with(NOTES_SLIDES_DIR));

    let mut presentation_rels = part_relationships(template, &presentation)?;
    presentation_rels.retain(|_, rel| rel.rel_type != Relationships::TYPE_SLIDE);

    let slide_parts: Vec<String> = (1..=deck.slide_count())
        .map(|n| format!("{}slide{}.xml", SLIDES_DIR, n))
        .collect();
    let default_layout = default_layout(&out, deck)?;

    let mut media = MediaStore::from_archive(&out);
    let mut slide_rids = Vec::with_capacity(deck.slide_count());

    for (slide, part) in deck.slides().iter().zip(&slide_parts) {
        let mut rels = Relationships::new();
        keep_relationships(slide, part, &out, &slide_parts, &mut rels);

        let layout = if out.contains(&slide.layout.part) {
            slide.layout.part.as_str()
        } else {
            warn!(
                slide = %part,
                layout = %slide.layout.part,
                fallback = %default_layout,
                "slide layout not in package"
            );
            default_layout.as_str()
        };
        rels.add(relative_target(part, layout), Relationships::TYPE_SLIDE_LAYOUT);

        let xml = SlideWriter::new(part, &mut rels, &mut media).slide_xml(slide);
        out.set_string(part.clone(), xml);
        out.set_string(rels_path_for(part), rels.to_xml());

        slide_rids.push(presentation_rels.add(
            relative_target(&presentation, part),
            Relationships::TYPE_SLIDE,
        ));
    }

    let formats = media.formats().to_vec();
    let added_media = media.added_count();
    for (path, bytes) in media.into_parts() {
        out.set(path, bytes);
    }

    let presentation_xml = rewrite_presentation(out.require(&presentation)?, deck, &slide_rids)?;
    out.set_string(presentation.clone(), presentation_xml);
    out.set_string(rels_path_for(&presentation), presentation_rels.to_xml());

    let content_types = rewrite_content_types(out.require(CONTENT_TYPES_PART)?, &slide_parts, &formats)?;
    out.set_string(CONTENT_TYPES_PART, content_types);

    let removed_media = prune_media(&mut out)?;

    info!(
        slides = deck.slide_count(),
        added_media,
        removed_media,
        "presentation package written"
    );
    Ok(out)
}

/// Layout used for slides whose own layout is not in the package
fn default_layout(archive: &OoxmlArchive, deck: &Deck) -> Result<String> {
    deck.layouts
        .iter()
        .map(|l| l.part.as_str())
        .find(|part| archive.contains(part))
        .map(str::to_string)
        .or_else(|| {
            archive
                .paths_with_prefix(SLIDE_LAYOUTS_DIR)
                .into_iter()
                .filter(|p| p.ends_with(".xml") && !p.contains("/_rels/"))
                .min()
                .map(str::to_string)
        })
        .ok_or_else(|| PptxError::invalid_template("package has no slide layouts"))
}

/// Carry over the slide's preserved relationships under their original
/// ids, dropping internal ones whose target no longer exists
fn keep_relationships(
    slide: &Slide,
    part: &str,
    package: &OoxmlArchive,
    slide_parts: &[String],
    rels: &mut Relationships,
) {
    for rel in &slide.relationships {
        if !rel.external {
            let target = resolve_target(part, &rel.target);
            if !package.contains(&target) && !slide_parts.contains(&target) {
                debug!(slide = %part, id = %rel.id, target = %target, "dropping dangling relationship");
                continue;
            }
        }
        let added = rels.add_with_id(
            rel.id.clone(),
            RelationshipTarget {
                target: rel.target.clone(),
                rel_type: rel.rel_type.clone(),
                target_mode: rel.external.then(|| "External".to_string()),
            },
        );
        if !added {
            warn!(slide = %part, id = %rel.id, "duplicate relationship id");
        }
    }
}

/// Serializes one slide, allocating relationships for its media
struct SlideWriter<'a> {
    part: &'a str,
    rels: &'a mut Relationships,
    media: &'a mut MediaStore,
    /// Media part -> relationship id on this slide
    image_rids: HashMap<String, String>,
}

impl<'a> SlideWriter<'a> {
    fn new(part: &'a str, rels: &'a mut Relationships, media: &'a mut MediaStore) -> Self {
        Self {
            part,
            rels,
            media,
            image_rids: HashMap::new(),
        }
    }

    fn slide_xml(&mut self, slide: &Slide) -> String {
        let background = slide
            .background
            .as_ref()
            .map(background_xml)
            .unwrap_or_default();
        let shapes: String = slide
            .shapes
            .iter()
            .filter_map(|shape| self.shape_xml(shape))
            .collect();

        format!(
            r#"{}
<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld>{}<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
            XML_DECLARATION, NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION, background, shapes
        )
    }

    fn shape_xml(&mut self, shape: &Shape) -> Option<String> {
        match &shape.kind {
            ShapeKind::Placeholder { idx, ph_type } => {
                let mut ph = String::from("<p:ph");
                if !ph_type.ooxml_type().is_empty() {
                    ph.push_str(&format!(r#" type="{}""#, ph_type.ooxml_type()));
                }
                if *idx != 0 {
                    ph.push_str(&format!(r#" idx="{}""#, idx));
                }
                ph.push_str("/>");
                Some(sp_xml(
                    shape,
                    r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#,
                    &ph,
                    None,
                ))
            }
            ShapeKind::TextBox => Some(sp_xml(shape, r#"<p:cNvSpPr txBox="1"/>"#, "", Some("rect"))),
            ShapeKind::AutoShape { preset } => Some(sp_xml(shape, "<p:cNvSpPr/>", "", Some(preset))),
            ShapeKind::Picture(picture) => self.picture_xml(shape, picture),
            ShapeKind::Table(table) => Some(graphic_frame_xml(shape, table)),
            ShapeKind::Other { raw: Some(raw), .. } => Some(raw.clone()),
            ShapeKind::Other { element, raw: None } => {
                warn!(shape = %shape.name, element = %element, "shape has no markup to write");
                None
            }
        }
    }

    fn picture_xml(&mut self, shape: &Shape, picture: &Picture) -> Option<String> {
        let Some(image) = &picture.image else {
            warn!(shape = %shape.name, "picture without payload dropped");
            return None;
        };
        let media = match self.media.insert(image) {
            Ok(path) => path,
            Err(e) => {
                warn!(shape = %shape.name, "picture dropped: {}", e);
                return None;
            }
        };
        let rid = match self.image_rids.get(&media) {
            Some(rid) => rid.clone(),
            None => {
                let rid = self
                    .rels
                    .add(relative_target(self.part, &media), Relationships::TYPE_IMAGE);
                self.image_rids.insert(media, rid.clone());
                rid
            }
        };

        let descr = picture
            .description
            .as_ref()
            .map(|d| format!(r#" descr="{}""#, escape_xml(d)))
            .unwrap_or_default();
        Some(format!(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="{}"{}/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>{}</p:spPr></p:pic>"#,
            shape.id,
            escape_xml(&shape.name),
            descr,
            rid,
            shape_properties(shape, Some("rect"))
        ))
    }
}

/// `p:spPr` content: transform, geometry, fill, outline
fn shape_properties(shape: &Shape, preset: Option<&str>) -> String {
    let mut xml = String::new();
    if let Some(geometry) = &shape.geometry {
        xml.push_str(&xfrm_xml("a:xfrm", geometry, shape.rotation));
    }
    if let Some(preset) = preset {
        xml.push_str(&format!(
            r#"<a:prstGeom prst="{}"><a:avLst/></a:prstGeom>"#,
            escape_xml(preset)
        ));
    }
    if let Some(fill) = &shape.fill {
        xml.push_str(&fill_xml(fill));
    }
    if let Some(line) = &shape.line {
        xml.push_str(&line_xml(line));
    }
    xml
}

fn sp_xml(shape: &Shape, c_nv_sp_pr: &str, nv_pr: &str, preset: Option<&str>) -> String {
    let nv_pr = if nv_pr.is_empty() {
        "<p:nvPr/>".to_string()
    } else {
        format!("<p:nvPr>{}</p:nvPr>", nv_pr)
    };
    let text_body = match (&shape.text_frame, &shape.kind) {
        (Some(frame), _) => text_body_xml("p:txBody", frame),
        (None, ShapeKind::TextBox) => text_body_xml("p:txBody", &TextFrame::new()),
        (None, _) => String::new(),
    };
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/>{}{}</p:nvSpPr><p:spPr>{}</p:spPr>{}</p:sp>"#,
        shape.id,
        escape_xml(&shape.name),
        c_nv_sp_pr,
        nv_pr,
        shape_properties(shape, preset),
        text_body
    )
}

fn graphic_frame_xml(shape: &Shape, table: &Table) -> String {
    let geometry = shape.geometry.unwrap_or_default();
    let columns = table.column_count();
    let fallback_width = if columns > 0 { geometry.width / columns as i64 } else { 0 };
    let fallback_height = if table.row_count() > 0 {
        geometry.height / table.row_count() as i64
    } else {
        0
    };

    let grid: String = (0..columns)
        .map(|c| {
            let width = table.column_widths.get(c).copied().unwrap_or(fallback_width);
            format!(r#"<a:gridCol w="{}"/>"#, width)
        })
        .collect();

    let rows: String = table
        .rows
        .iter()
        .enumerate()
        .map(|(r, cells)| {
            let height = table.row_heights.get(r).copied().unwrap_or(fallback_height);
            // Every row needs one cell per grid column
            let cells: String = (0..columns)
                .map(|c| {
                    let frame = cells.get(c).map(|cell| &cell.text_frame);
                    let body = match frame {
                        Some(frame) => text_body_xml("a:txBody", frame),
                        None => text_body_xml("a:txBody", &TextFrame::new()),
                    };
                    format!("<a:tc>{}<a:tcPr/></a:tc>", body)
                })
                .collect();
            format!(r#"<a:tr h="{}">{}</a:tr>"#, height, cells)
        })
        .collect();

    let style = table
        .style_id
        .as_ref()
        .map(|id| format!("<a:tableStyleId>{}</a:tableStyleId>", escape_xml(id)))
        .unwrap_or_default();

    format!(
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{}" name="{}"/><p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr><p:nvPr/></p:nvGraphicFramePr>{}<a:graphic><a:graphicData uri="{}"><a:tbl><a:tblPr>{}</a:tblPr><a:tblGrid>{}</a:tblGrid>{}</a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#,
        shape.id,
        escape_xml(&shape.name),
        xfrm_xml("p:xfrm", &geometry, shape.rotation),
        URI_TABLE,
        style,
        grid,
        rows
    )
}

fn is_background_reference(raw: &str) -> bool {
    raw.trim_start_matches('<')
        .split(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .next()
        .is_some_and(|name| name == "bgRef" || name.ends_with(":bgRef"))
}

fn background_xml(fill: &Fill) -> String {
    match fill {
        Fill::Unsupported { raw: None, .. } => String::new(),
        Fill::Unsupported { raw: Some(raw), .. } if is_background_reference(raw) => {
            format!("<p:bg>{}</p:bg>", raw)
        }
        fill => format!("<p:bg><p:bgPr>{}<a:effectLst/></p:bgPr></p:bg>", fill_xml(fill)),
    }
}

/// Prefix bound to `namespace` on `root`, declaring `fallback` when absent
fn namespace_prefix(root: &mut XmlElement, namespace: &str, fallback: &str) -> String {
    let declared = root.namespace_declarations().into_iter().find_map(|(key, value)| {
        (value == namespace)
            .then(|| key.strip_prefix("xmlns:").map(str::to_string))
            .flatten()
    });
    match declared {
        Some(prefix) => prefix,
        None => {
            root.set_attr(&format!("xmlns:{}", fallback), namespace);
            fallback.to_string()
        }
    }
}

/// Replace the slide id list of `presentation.xml` and sync the slide size
fn rewrite_presentation(xml: &[u8], deck: &Deck, slide_rids: &[String]) -> Result<String> {
    let mut root = XmlElement::parse(xml)?;
    let p = root
        .name
        .split_once(':')
        .map(|(prefix, _)| prefix.to_string())
        .unwrap_or_default();
    let qualify = |local: &str| {
        if p.is_empty() {
            local.to_string()
        } else {
            format!("{}:{}", p, local)
        }
    };
    let r = namespace_prefix(&mut root, NS_RELATIONSHIPS, "r");

    // Custom shows list slides through relationships that no longer exist
    root.children.retain(|node| {
        !matches!(node, XmlNode::Element(e) if e.is("sldIdLst") || e.is("custShowLst"))
    });

    if !slide_rids.is_empty() {
        let mut list = XmlElement::new(qualify("sldIdLst"));
        for (i, rid) in slide_rids.iter().enumerate() {
            let mut id = XmlElement::new(qualify("sldId"));
            id.set_attr("id", (FIRST_SLIDE_ID + i as u32).to_string());
            id.set_attr(&format!("{}:id", r), rid.as_str());
            list.children.push(XmlNode::Element(id));
        }
        let position = root
            .children
            .iter()
            .rposition(|node| {
                matches!(node, XmlNode::Element(e) if BEFORE_SLIDE_LIST.contains(&e.local_name()))
            })
            .map_or(0, |i| i + 1);
        root.children.insert(position, XmlNode::Element(list));
    }

    for node in root.children.iter_mut() {
        if let XmlNode::Element(e) = node {
            if e.is("sldSz") {
                e.set_attr("cx", deck.slide_width.to_string());
                e.set_attr("cy", deck.slide_height.to_string());
            }
        }
    }

    Ok(format!("{}\n{}", XML_DECLARATION, root.to_xml()))
}

/// Drop overrides of removed slide and notes parts, declare the new
/// slides and any media extension not yet covered
fn rewrite_content_types(xml: &[u8], slide_parts: &[String], formats: &[ImageFormat]) -> Result<String> {
    let mut root = XmlElement::parse(xml)?;
    let slides_prefix = format!("/{}", SLIDES_DIR);
    let notes_prefix = format!("/{}", NOTES_SLIDES_DIR);

    root.children.retain(|node| match node {
        XmlNode::Element(e) if e.is("Override") => e
            .attr("PartName")
            .map_or(true, |name| {
                !name.starts_with(&slides_prefix) && !name.starts_with(&notes_prefix)
            }),
        _ => true,
    });

    let mut known: HashSet<String> = root
        .children_named("Default")
        .filter_map(|e| e.attr("Extension"))
        .map(str::to_ascii_lowercase)
        .collect();
    // Defaults come before overrides
    let mut insert_at = root
        .children
        .iter()
        .rposition(|node| matches!(node, XmlNode::Element(e) if e.is("Default")))
        .map_or(0, |i| i + 1);
    for format in formats {
        if known.insert(format.extension().to_string()) {
            let mut default = XmlElement::new("Default");
            default.set_attr("Extension", format.extension());
            default.set_attr("ContentType", format.content_type());
            root.children.insert(insert_at, XmlNode::Element(default));
            insert_at += 1;
        }
    }

    for part in slide_parts {
        let mut entry = XmlElement::new("Override");
        entry.set_attr("PartName", format!("/{}", part));
        entry.set_attr("ContentType", CT_SLIDE);
        root.children.push(XmlNode::Element(entry));
    }

    Ok(format!("{}\n{}", XML_DECLARATION, root.to_xml()))
}

/// Remove media parts that no relationship in the package refers to
fn prune_media(archive: &mut OoxmlArchive) -> Result<usize> {
    let mut referenced = HashSet::new();
    let rels_parts: Vec<String> = archive
        .paths()
        .into_iter()
        .filter(|p| p.ends_with(".rels"))
        .map(str::to_string)
        .collect();

    for rels_path in rels_parts {
        let Some(owner) = owner_of_rels_path(&rels_path) else {
            continue;
        };
        let rels = Relationships::parse(archive.require(&rels_path)?)?;
        for (_, rel) in rels.iter().filter(|(_, rel)| !rel.is_external()) {
            referenced.insert(resolve_target(&owner, &rel.target));
        }
    }

    let unreferenced: Vec<String> = archive
        .paths_with_prefix(MEDIA_DIR)
        .into_iter()
        .filter(|p| !referenced.contains(*p))
        .map(str::to_string)
        .collect();
    for path in &unreferenced {
        debug!(part = %path, "removing unreferenced media");
        archive.remove(path);
    }
    Ok(unreferenced.len())
}
