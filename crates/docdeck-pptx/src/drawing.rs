//! DrawingML properties shared by every shape kind
//!
//! Reading goes from an [`XmlElement`] to model values; writing goes from
//! model values straight to markup strings. Anything the model cannot
//! represent is captured as raw markup on the way in and emitted verbatim
//! on the way out.

use docdeck_model::{
    Alignment, AutoFit, BodyProperties, Fill, FillKind, FormatDescriptor, Geometry, Line, RgbColor,
    Run, TextFrame, TextParagraph, VerticalAnchor,
};
use docdeck_ooxml::xml::{escape_xml, XmlElement};

use crate::constants::ROTATION_UNITS_PER_DEGREE;

/// Namespace declarations to lift onto raw fragments
pub type Namespaces = [(String, String)];

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Geometry and rotation of an `a:xfrm` or `p:xfrm`
pub fn parse_xfrm(xfrm: &XmlElement) -> (Option<Geometry>, Option<f64>) {
    let geometry = match (xfrm.child("off"), xfrm.child("ext")) {
        (Some(off), Some(ext)) => Some(Geometry::new(
            off.attr_parse("x").unwrap_or(0),
            off.attr_parse("y").unwrap_or(0),
            ext.attr_parse("cx").unwrap_or(0),
            ext.attr_parse("cy").unwrap_or(0),
        )),
        _ => None,
    };
    let rotation = xfrm
        .attr_parse::<i64>("rot")
        .filter(|rot| *rot != 0)
        .map(|rot| rot as f64 / ROTATION_UNITS_PER_DEGREE);
    (geometry, rotation)
}

/// The fill declared among the children of `properties` (`p:spPr`, `p:bgPr`)
pub fn parse_fill(properties: &XmlElement, namespaces: &Namespaces) -> Option<Fill> {
    properties
        .elements()
        .find_map(|child| fill_from_element(child, namespaces))
}

/// Interpret one fill element; `None` when `element` is not a fill
pub fn fill_from_element(element: &XmlElement, namespaces: &Namespaces) -> Option<Fill> {
    let kind = match element.local_name() {
        "noFill" => return Some(Fill::NoFill),
        "solidFill" => match solid_color(element) {
            Some(color) => return Some(Fill::Solid(color)),
            None if element.child("schemeClr").is_some() => FillKind::ThemeColor,
            None => FillKind::Unknown,
        },
        "gradFill" => FillKind::Gradient,
        "pattFill" => FillKind::Pattern,
        "blipFill" => FillKind::Picture,
        "grpFill" => FillKind::Group,
        _ => return None,
    };
    Some(Fill::Unsupported {
        kind,
        raw: Some(element.to_xml_with_namespaces(namespaces)),
    })
}

/// An explicit RGB colour of a fill element (`a:srgbClr`, or the last
/// computed value of an `a:sysClr`)
fn solid_color(fill: &XmlElement) -> Option<RgbColor> {
    if let Some(srgb) = fill.child("srgbClr") {
        return srgb.attr("val").and_then(RgbColor::from_hex);
    }
    fill.child("sysClr")
        .and_then(|sys| sys.attr("lastClr"))
        .and_then(RgbColor::from_hex)
}

/// Outline of an `a:ln`
pub fn parse_line(ln: &XmlElement) -> Line {
    if ln.child("noFill").is_some() {
        return Line::zero();
    }
    Line {
        width: ln.attr_parse("w"),
        color: ln.child("solidFill").and_then(solid_color),
    }
}

/// Text frame of a `p:txBody` or `a:txBody`
pub fn parse_text_body(tx_body: &XmlElement, namespaces: &Namespaces) -> TextFrame {
    let mut frame = TextFrame::new();
    if let Some(body_pr) = tx_body.child("bodyPr") {
        frame.body = parse_body_properties(body_pr);
    }

    if let Some(list_style) = tx_body.child("lstStyle") {
        if let Some(def_rpr) = list_style.find(&["lvl1pPr", "defRPr"]) {
            frame.default_format = parse_run_properties(def_rpr);
        }
        let inner: String = list_style
            .elements()
            .map(|e| e.to_xml_with_namespaces(namespaces))
            .collect();
        if !inner.is_empty() {
            frame.list_style_xml = Some(inner);
        }
    }

    let paragraphs: Vec<TextParagraph> = tx_body.children_named("p").map(parse_paragraph).collect();
    if !paragraphs.is_empty() {
        frame.paragraphs = paragraphs;
    }
    frame
}

fn parse_body_properties(body_pr: &XmlElement) -> BodyProperties {
    let auto_fit = body_pr.elements().find_map(|e| match e.local_name() {
        "noAutofit" => Some(AutoFit::None),
        "normAutofit" => Some(AutoFit::Normal),
        "spAutoFit" => Some(AutoFit::Shape),
        _ => None,
    });
    BodyProperties {
        margin_left: body_pr.attr_parse("lIns"),
        margin_right: body_pr.attr_parse("rIns"),
        margin_top: body_pr.attr_parse("tIns"),
        margin_bottom: body_pr.attr_parse("bIns"),
        anchor: body_pr.attr("anchor").and_then(VerticalAnchor::from_drawingml),
        word_wrap: body_pr.attr("wrap").map(|wrap| wrap != "none"),
        auto_fit,
    }
}

fn parse_paragraph(p: &XmlElement) -> TextParagraph {
    let mut paragraph = TextParagraph::new();
    if let Some(p_pr) = p.child("pPr") {
        paragraph.alignment = p_pr.attr("algn").and_then(Alignment::from_drawingml);
        paragraph.level = p_pr.attr_parse("lvl");
    }

    for child in p.elements() {
        let format = child
            .child("rPr")
            .map(parse_run_properties)
            .unwrap_or_default();
        match child.local_name() {
            "r" | "fld" => {
                let text = child.child("t").map(XmlElement::text).unwrap_or_default();
                paragraph.add_run(Run::formatted(text, format));
            }
            "br" => {
                paragraph.add_run(Run::formatted("\n", format));
            }
            _ => {}
        }
    }
    paragraph
}

/// Character properties of an `a:rPr`, `a:defRPr` or `a:endParaRPr`
pub fn parse_run_properties(rpr: &XmlElement) -> FormatDescriptor {
    FormatDescriptor {
        font_name: rpr
            .child("latin")
            .and_then(|latin| latin.attr("typeface"))
            .filter(|face| !face.is_empty())
            .map(str::to_string),
        font_size: rpr.attr_parse("sz"),
        bold: rpr.attr("b").map(parse_bool),
        italic: rpr.attr("i").map(parse_bool),
        underline: rpr.attr("u").map(|u| u != "none"),
        color: rpr.child("solidFill").and_then(solid_color),
        alignment: None,
        indent_level: None,
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "on")
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Transform element named `tag` (`a:xfrm` inside `p:spPr`, `p:xfrm` on
/// graphic frames)
pub fn xfrm_xml(tag: &str, geometry: &Geometry, rotation: Option<f64>) -> String {
    let rot = rotation
        .map(|deg| (deg * ROTATION_UNITS_PER_DEGREE).round() as i64)
        .filter(|rot| *rot != 0)
        .map(|rot| format!(r#" rot="{}""#, rot))
        .unwrap_or_default();
    format!(
        r#"<{tag}{}><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></{tag}>"#,
        rot,
        geometry.left,
        geometry.top,
        geometry.width.max(0),
        geometry.height.max(0),
        tag = tag
    )
}

/// Fill markup; empty for an unsupported fill without captured markup
pub fn fill_xml(fill: &Fill) -> String {
    match fill {
        Fill::NoFill => "<a:noFill/>".to_string(),
        Fill::Solid(color) => solid_fill_xml(color),
        Fill::Unsupported { raw, .. } => raw.clone().unwrap_or_default(),
    }
}

fn solid_fill_xml(color: &RgbColor) -> String {
    format!(r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color.to_hex())
}

/// Outline markup; empty when the line says nothing
pub fn line_xml(line: &Line) -> String {
    match (line.width, line.color) {
        (None, None) => String::new(),
        (Some(0), _) => "<a:ln><a:noFill/></a:ln>".to_string(),
        (width, color) => {
            let w = width
                .map(|w| format!(r#" w="{}""#, w))
                .unwrap_or_default();
            match color {
                Some(color) => format!("<a:ln{}>{}</a:ln>", w, solid_fill_xml(&color)),
                None => format!("<a:ln{}/>", w),
            }
        }
    }
}

/// Text body element named `tag` (`p:txBody` for shapes, `a:txBody` for
/// table cells)
pub fn text_body_xml(tag: &str, frame: &TextFrame) -> String {
    let mut xml = format!("<{}>", tag);
    xml.push_str(&body_properties_xml(&frame.body));

    match &frame.list_style_xml {
        Some(raw) => xml.push_str(&format!("<a:lstStyle>{}</a:lstStyle>", raw)),
        None if frame.default_format.is_empty() => xml.push_str("<a:lstStyle/>"),
        None => xml.push_str(&format!(
            "<a:lstStyle><a:lvl1pPr>{}</a:lvl1pPr></a:lstStyle>",
            run_properties_xml("a:defRPr", &frame.default_format)
        )),
    }

    if frame.paragraphs.is_empty() {
        xml.push_str("<a:p/>");
    }
    for paragraph in &frame.paragraphs {
        xml.push_str(&paragraph_xml(paragraph));
    }

    xml.push_str(&format!("</{}>", tag));
    xml
}

fn body_properties_xml(body: &BodyProperties) -> String {
    let mut attrs = String::new();
    if let Some(wrap) = body.word_wrap {
        attrs.push_str(if wrap { r#" wrap="square""# } else { r#" wrap="none""# });
    }
    for (name, value) in [
        ("lIns", body.margin_left),
        ("tIns", body.margin_top),
        ("rIns", body.margin_right),
        ("bIns", body.margin_bottom),
    ] {
        if let Some(value) = value {
            attrs.push_str(&format!(r#" {}="{}""#, name, value));
        }
    }
    if let Some(anchor) = body.anchor {
        attrs.push_str(&format!(r#" anchor="{}""#, anchor.drawingml()));
    }

    match body.auto_fit {
        Some(AutoFit::None) => format!("<a:bodyPr{}><a:noAutofit/></a:bodyPr>", attrs),
        Some(AutoFit::Normal) => format!("<a:bodyPr{}><a:normAutofit/></a:bodyPr>", attrs),
        Some(AutoFit::Shape) => format!("<a:bodyPr{}><a:spAutoFit/></a:bodyPr>", attrs),
        None => format!("<a:bodyPr{}/>", attrs),
    }
}

fn paragraph_xml(paragraph: &TextParagraph) -> String {
    let mut xml = String::from("<a:p>");

    let mut p_attrs = String::new();
    if let Some(level) = paragraph.level.filter(|l| *l > 0) {
        p_attrs.push_str(&format!(r#" lvl="{}""#, level));
    }
    if let Some(alignment) = paragraph.alignment {
        p_attrs.push_str(&format!(r#" algn="{}""#, alignment.drawingml()));
    }
    if !p_attrs.is_empty() {
        xml.push_str(&format!("<a:pPr{}/>", p_attrs));
    }

    for run in &paragraph.runs {
        let rpr = run_properties_xml("a:rPr", &run.format);
        for (i, piece) in run.text.split('\n').enumerate() {
            if i > 0 {
                xml.push_str(&format!("<a:br>{}</a:br>", rpr));
            }
            if !piece.is_empty() {
                xml.push_str(&format!(
                    "<a:r>{}<a:t>{}</a:t></a:r>",
                    rpr,
                    escape_xml(&xml_safe(piece))
                ));
            }
        }
    }

    xml.push_str("</a:p>");
    xml
}

/// Character properties element named `tag`
fn run_properties_xml(tag: &str, format: &FormatDescriptor) -> String {
    let mut attrs = String::from(r#" lang="en-US""#);
    if let Some(size) = format.font_size {
        attrs.push_str(&format!(r#" sz="{}""#, size));
    }
    if let Some(bold) = format.bold {
        attrs.push_str(if bold { r#" b="1""# } else { r#" b="0""# });
    }
    if let Some(italic) = format.italic {
        attrs.push_str(if italic { r#" i="1""# } else { r#" i="0""# });
    }
    if let Some(underline) = format.underline {
        attrs.push_str(if underline { r#" u="sng""# } else { r#" u="none""# });
    }

    // Schema order: fill before typefaces
    let mut children = String::new();
    if let Some(color) = &format.color {
        children.push_str(&solid_fill_xml(color));
    }
    if let Some(font) = &format.font_name {
        children.push_str(&format!(r#"<a:latin typeface="{}"/>"#, escape_xml(font)));
    }

    if children.is_empty() {
        format!("<{}{}/>", tag, attrs)
    } else {
        format!("<{tag}{}>{}</{tag}>", attrs, children, tag = tag)
    }
}

/// Drop characters XML 1.0 cannot carry
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdeck_model::EMU_PER_POINT;

    fn element(xml: &str) -> XmlElement {
        let wrapped = format!(
            r#"<root xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">{}</root>"#,
            xml
        );
        let root = XmlElement::parse(wrapped.as_bytes()).unwrap();
        let el = root.elements().next().unwrap().clone();
        el
    }

    fn a_ns() -> Vec<(String, String)> {
        vec![(
            "xmlns:a".to_string(),
            "http://schemas.openxmlformats.org/drawingml/2006/main".to_string(),
        )]
    }

    #[test]
    fn test_parse_xfrm_with_rotation() {
        let xfrm = element(
            r#"<a:xfrm rot="5400000"><a:off x="10" y="20"/><a:ext cx="300" cy="400"/></a:xfrm>"#,
        );
        let (geometry, rotation) = parse_xfrm(&xfrm);
        assert_eq!(geometry, Some(Geometry::new(10, 20, 300, 400)));
        assert_eq!(rotation, Some(90.0));
    }

    #[test]
    fn test_parse_xfrm_without_extent() {
        let (geometry, rotation) = parse_xfrm(&element(r#"<a:xfrm><a:off x="1" y="2"/></a:xfrm>"#));
        assert_eq!(geometry, None);
        assert_eq!(rotation, None);
    }

    #[test]
    fn test_fill_kinds() {
        let ns = a_ns();
        let fill = |xml: &str| fill_from_element(&element(xml), &ns);

        assert_eq!(fill("<a:noFill/>"), Some(Fill::NoFill));
        assert_eq!(
            fill(r#"<a:solidFill><a:srgbClr val="1F4E79"/></a:solidFill>"#),
            Some(Fill::Solid(RgbColor::new(0x1F, 0x4E, 0x79)))
        );
        assert_eq!(
            fill(r#"<a:solidFill><a:sysClr val="window" lastClr="FFFFFF"/></a:solidFill>"#),
            Some(Fill::Solid(RgbColor::WHITE))
        );
        assert!(matches!(
            fill(r#"<a:solidFill><a:schemeClr val="accent1"/></a:solidFill>"#),
            Some(Fill::Unsupported { kind: FillKind::ThemeColor, .. })
        ));
        assert_eq!(fill(r#"<a:prstGeom prst="rect"/>"#), None);
    }

    #[test]
    fn test_unsupported_fill_keeps_markup() {
        let gradient = element(
            r#"<a:gradFill><a:gsLst><a:gs pos="0"><a:srgbClr val="FF0000"/></a:gs></a:gsLst></a:gradFill>"#,
        );
        let Some(Fill::Unsupported { kind, raw: Some(raw) }) = fill_from_element(&gradient, &a_ns())
        else {
            panic!("expected captured gradient");
        };
        assert_eq!(kind, FillKind::Gradient);
        assert!(raw.starts_with("<a:gradFill xmlns:a="));
        assert!(raw.contains(r#"<a:gs pos="0">"#));
        assert_eq!(fill_xml(&Fill::Unsupported { kind, raw: Some(raw.clone()) }), raw);
    }

    #[test]
    fn test_parse_line() {
        let line = parse_line(&element(
            r#"<a:ln w="12700"><a:solidFill><a:srgbClr val="000000"/></a:solidFill></a:ln>"#,
        ));
        assert_eq!(line, Line::solid(EMU_PER_POINT, RgbColor::BLACK));
        assert_eq!(parse_line(&element("<a:ln><a:noFill/></a:ln>")), Line::zero());
    }

    #[test]
    fn test_line_xml() {
        assert_eq!(line_xml(&Line::default()), "");
        assert_eq!(line_xml(&Line::zero()), "<a:ln><a:noFill/></a:ln>");
        assert_eq!(
            line_xml(&Line::solid(25400, RgbColor::new(0xC0, 0, 0))),
            r#"<a:ln w="25400"><a:solidFill><a:srgbClr val="C00000"/></a:solidFill></a:ln>"#
        );
    }

    #[test]
    fn test_parse_text_body() {
        let body = element(
            r#"<p:txBody xmlns:p="urn:p"><a:bodyPr wrap="none" lIns="0" anchor="ctr"><a:normAutofit/></a:bodyPr>
               <a:lstStyle><a:lvl1pPr><a:defRPr sz="2400"/></a:lvl1pPr></a:lstStyle>
               <a:p><a:pPr algn="r" lvl="1"/>
                 <a:r><a:rPr sz="1800" b="1" u="none"><a:solidFill><a:srgbClr val="FF0000"/></a:solidFill><a:latin typeface="Georgia"/></a:rPr><a:t>Hello </a:t></a:r>
                 <a:br/>
                 <a:r><a:t>world</a:t></a:r></a:p>
               <a:p/></p:txBody>"#,
        );
        let frame = parse_text_body(&body, &a_ns());

        assert_eq!(frame.body.word_wrap, Some(false));
        assert_eq!(frame.body.margin_left, Some(0));
        assert_eq!(frame.body.anchor, Some(VerticalAnchor::Middle));
        assert_eq!(frame.body.auto_fit, Some(AutoFit::Normal));
        assert_eq!(frame.default_format.font_size, Some(2400));
        assert!(frame.list_style_xml.as_deref().unwrap().contains("lvl1pPr"));

        assert_eq!(frame.paragraphs.len(), 2);
        let first = &frame.paragraphs[0];
        assert_eq!(first.alignment, Some(Alignment::Right));
        assert_eq!(first.level, Some(1));
        assert_eq!(first.text(), "Hello \nworld");

        let format = &first.runs[0].format;
        assert_eq!(format.font_size, Some(1800));
        assert_eq!(format.bold, Some(true));
        assert_eq!(format.underline, Some(false));
        assert_eq!(format.color, Some(RgbColor::new(0xFF, 0, 0)));
        assert_eq!(format.font_name.as_deref(), Some("Georgia"));
        assert_eq!(frame.text(), "Hello \nworld\n");
    }

    #[test]
    fn test_text_body_xml() {
        let mut frame = TextFrame::new();
        frame.body.word_wrap = Some(true);
        frame.body.auto_fit = Some(AutoFit::Shape);
        frame.default_format = FormatDescriptor::new().with_font_size_pt(20);
        let paragraph = frame.first_paragraph_mut();
        paragraph.alignment = Some(Alignment::Center);
        paragraph.add_run(Run::formatted(
            "A & B\nnext",
            FormatDescriptor::new().with_bold(true).with_font_name("Arial"),
        ));

        let xml = text_body_xml("p:txBody", &frame);
        assert!(xml.starts_with(r#"<p:txBody><a:bodyPr wrap="square"><a:spAutoFit/></a:bodyPr>"#));
        assert!(xml.contains(r#"<a:lstStyle><a:lvl1pPr><a:defRPr lang="en-US" sz="2000"/></a:lvl1pPr></a:lstStyle>"#));
        assert!(xml.contains(r#"<a:pPr algn="ctr"/>"#));
        assert!(xml.contains(r#"<a:t>A &amp; B</a:t>"#));
        assert!(xml.contains("<a:br>"));
        assert!(xml.contains(r#"<a:latin typeface="Arial"/>"#));
        assert!(xml.ends_with("</p:txBody>"));
    }

    #[test]
    fn test_text_body_roundtrip() {
        let mut frame = TextFrame::new();
        frame.set_text("Line one\nLine two");
        frame.paragraphs[1].runs[0].format = FormatDescriptor::new()
            .with_italic(true)
            .with_color(RgbColor::new(0x12, 0x34, 0x56));

        let xml = text_body_xml("p:txBody", &frame);
        let wrapped = format!(
            r#"<p:sp xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="urn:p">{}</p:sp>"#,
            xml
        );
        let parsed = XmlElement::parse(wrapped.as_bytes()).unwrap();
        let reread = parse_text_body(parsed.child("txBody").unwrap(), &a_ns());

        assert_eq!(reread.paragraphs, frame.paragraphs);
    }

    #[test]
    fn test_control_characters_are_dropped() {
        assert_eq!(xml_safe("a\u{b}b\tc"), "ab\tc");
    }
}
