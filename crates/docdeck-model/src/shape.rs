//! Shapes placed on a slide
//!
//! Every positioned element is a [`Shape`] whose [`ShapeKind`] says what
//! it is. Attributes common to all kinds (geometry, fill, outline,
//! rotation, text) live on the shape itself.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::format::RgbColor;
use crate::text::TextFrame;

/// English Metric Units, the coordinate unit of DrawingML
pub type Emu = i64;

/// EMU per inch
pub const EMU_PER_INCH: Emu = 914_400;

/// EMU per point
pub const EMU_PER_POINT: Emu = 12_700;

/// Position and size of a shape in EMU
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Geometry {
    pub left: Emu,
    pub top: Emu,
    pub width: Emu,
    pub height: Emu,
}

impl Geometry {
    pub const fn new(left: Emu, top: Emu, width: Emu, height: Emu) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Build a geometry from inch values
    pub fn from_inches(left: f64, top: f64, width: f64, height: f64) -> Self {
        let emu = |inches: f64| (inches * EMU_PER_INCH as f64).round() as Emu;
        Self::new(emu(left), emu(top), emu(width), emu(height))
    }

    /// True when both dimensions reach `ratio` of the given area.
    ///
    /// Always false when the area has a non-positive dimension.
    pub fn covers(&self, area_width: Emu, area_height: Emu, ratio: f64) -> bool {
        if area_width <= 0 || area_height <= 0 {
            return false;
        }
        self.width as f64 >= area_width as f64 * ratio
            && self.height as f64 >= area_height as f64 * ratio
    }
}

/// Fill kinds that cannot be carried across a clone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillKind {
    Gradient,
    Pattern,
    Picture,
    Group,
    ThemeColor,
    Unknown,
}

impl FillKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gradient => "gradient",
            Self::Pattern => "pattern",
            Self::Picture => "picture",
            Self::Group => "group",
            Self::ThemeColor => "theme color",
            Self::Unknown => "unknown",
        }
    }
}

/// Shape or background fill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fill {
    NoFill,
    Solid(RgbColor),
    /// A fill the model cannot represent. `raw` holds the original
    /// markup so the owning shape can be written back unchanged.
    Unsupported {
        kind: FillKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        raw: Option<String>,
    },
}

impl Fill {
    pub fn unsupported(kind: FillKind) -> Self {
        Self::Unsupported { kind, raw: None }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::NoFill => "none",
            Self::Solid(_) => "solid",
            Self::Unsupported { kind, .. } => kind.name(),
        }
    }
}

/// Shape outline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub width: Option<Emu>,
    pub color: Option<RgbColor>,
}

impl Line {
    /// An explicit zero-width outline
    pub fn zero() -> Self {
        Self {
            width: Some(0),
            color: None,
        }
    }

    pub fn solid(width: Emu, color: RgbColor) -> Self {
        Self {
            width: Some(width),
            color: Some(color),
        }
    }

    /// True when the outline has a readable, positive width
    pub fn is_visible(&self) -> bool {
        self.width.is_some_and(|w| w > 0)
    }
}

/// Image encodings recognised by their leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    Emf,
    Wmf,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Emf => "emf",
            Self::Wmf => "wmf",
            Self::Svg => "svg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
            Self::Emf => "image/x-emf",
            Self::Wmf => "image/x-wmf",
            Self::Svg => "image/svg+xml",
        }
    }

    /// Detect the format from the first bytes of a payload
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";
        if bytes.starts_with(PNG) {
            return Some(Self::Png);
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }
        if bytes.starts_with(b"BM") && bytes.len() > 14 {
            return Some(Self::Bmp);
        }
        if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
            return Some(Self::Tiff);
        }
        if bytes.len() >= 44 && bytes.starts_with(&[1, 0, 0, 0]) && &bytes[40..44] == b" EMF" {
            return Some(Self::Emf);
        }
        if bytes.starts_with(&[0xD7, 0xCD, 0xC6, 0x9A])
            || bytes.starts_with(&[1, 0, 9, 0])
            || bytes.starts_with(&[2, 0, 9, 0])
        {
            return Some(Self::Wmf);
        }
        let head = &bytes[..bytes.len().min(1024)];
        let head = String::from_utf8_lossy(head);
        let trimmed = head.trim_start_matches('\u{feff}').trim_start();
        if (trimmed.starts_with("<?xml") || trimmed.starts_with("<svg")) && head.contains("<svg")
        {
            return Some(Self::Svg);
        }
        None
    }
}

/// Raw image bytes
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBlob {
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageBlob")
            .field("len", &self.bytes.len())
            .field("format", &ImageFormat::sniff(&self.bytes))
            .finish()
    }
}

impl ImageBlob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// The image format, or an error when the payload is not a known image
    pub fn format(&self) -> Result<ImageFormat> {
        if self.bytes.is_empty() {
            return Err(ModelError::unreadable_image("empty payload"));
        }
        ImageFormat::sniff(&self.bytes).ok_or_else(|| {
            ModelError::unreadable_image(format!(
                "unrecognized signature in {} bytes",
                self.bytes.len()
            ))
        })
    }
}

/// A picture shape's payload
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Picture {
    /// `None` when the embedded image could not be resolved
    pub image: Option<ImageBlob>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One table cell
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCell {
    pub text_frame: TextFrame,
}

impl TableCell {
    pub fn text(&self) -> String {
        self.text_frame.text()
    }

    pub fn set_text(&mut self, text: &str) {
        self.text_frame.set_text(text);
    }
}

/// A rows x columns grid of cells
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<Vec<TableCell>>,
    pub column_widths: Vec<Emu>,
    pub row_heights: Vec<Emu>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_id: Option<String>,
}

impl Table {
    /// An empty grid whose columns and rows share the given extent evenly
    pub fn new(rows: usize, columns: usize, width: Emu, height: Emu) -> Self {
        let column_width = if columns > 0 { width / columns as Emu } else { 0 };
        let row_height = if rows > 0 { height / rows as Emu } else { 0 };
        Self {
            rows: (0..rows)
                .map(|_| (0..columns).map(|_| TableCell::default()).collect())
                .collect(),
            column_widths: vec![column_width; columns],
            row_heights: vec![row_height; rows],
            style_id: None,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(self.column_widths.len())
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&TableCell> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    pub fn cell_mut(&mut self, row: usize, column: usize) -> Option<&mut TableCell> {
        self.rows.get_mut(row).and_then(|r| r.get_mut(column))
    }
}

/// Placeholder roles (`p:ph@type`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderType {
    Title,
    CenterTitle,
    Subtitle,
    Body,
    Object,
    DateTime,
    Footer,
    SlideNumber,
    Chart,
    Table,
    Diagram,
    Media,
    Picture,
    ClipArt,
    Other,
}

impl PlaceholderType {
    /// The OOXML type attribute value
    pub fn ooxml_type(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::CenterTitle => "ctrTitle",
            Self::Subtitle => "subTitle",
            Self::Body => "body",
            Self::Object => "obj",
            Self::DateTime => "dt",
            Self::Footer => "ftr",
            Self::SlideNumber => "sldNum",
            Self::Chart => "chart",
            Self::Table => "tbl",
            Self::Diagram => "dgm",
            Self::Media => "media",
            Self::Picture => "pic",
            Self::ClipArt => "clipArt",
            Self::Other => "",
        }
    }

    /// Parse the OOXML type attribute; a missing attribute means `obj`
    pub fn from_ooxml_type(s: &str) -> Self {
        match s {
            "title" => Self::Title,
            "ctrTitle" => Self::CenterTitle,
            "subTitle" => Self::Subtitle,
            "body" => Self::Body,
            "obj" | "" => Self::Object,
            "dt" => Self::DateTime,
            "ftr" => Self::Footer,
            "sldNum" => Self::SlideNumber,
            "chart" => Self::Chart,
            "tbl" => Self::Table,
            "dgm" => Self::Diagram,
            "media" => Self::Media,
            "pic" => Self::Picture,
            "clipArt" => Self::ClipArt,
            _ => Self::Other,
        }
    }

    /// Placeholders a new slide does not inherit from its layout
    pub fn is_layout_only(&self) -> bool {
        matches!(self, Self::DateTime | Self::Footer | Self::SlideNumber)
    }
}

/// What a shape is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeKind {
    Placeholder { idx: u32, ph_type: PlaceholderType },
    TextBox,
    Picture(Picture),
    AutoShape { preset: String },
    Table(Table),
    /// Anything else (connectors, charts, groups). `raw` is the original
    /// element so it can be written back in place.
    Other {
        element: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        raw: Option<String>,
    },
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Placeholder { .. } => "placeholder",
            Self::TextBox => "textbox",
            Self::Picture(_) => "picture",
            Self::AutoShape { .. } => "autoshape",
            Self::Table(_) => "table",
            Self::Other { .. } => "other",
        }
    }
}

/// A positioned element on a slide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: u32,
    pub name: String,
    pub kind: ShapeKind,
    /// `None` when the position is inherited from the layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    /// Clockwise rotation in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_frame: Option<TextFrame>,
}

impl Shape {
    pub fn new(id: u32, name: impl Into<String>, kind: ShapeKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            geometry: None,
            fill: None,
            line: None,
            rotation: None,
            text_frame: None,
        }
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_text_frame(mut self, frame: TextFrame) -> Self {
        self.text_frame = Some(frame);
        self
    }

    /// True when the shape can hold text
    pub fn is_text_capable(&self) -> bool {
        self.text_frame.is_some()
    }

    /// The shape's text, if it is text-capable
    pub fn text(&self) -> Option<String> {
        self.text_frame.as_ref().map(TextFrame::text)
    }

    pub fn placeholder_idx(&self) -> Option<u32> {
        match self.kind {
            ShapeKind::Placeholder { idx, .. } => Some(idx),
            _ => None,
        }
    }

    pub fn is_picture(&self) -> bool {
        matches!(self.kind, ShapeKind::Picture(_))
    }

    pub fn table(&self) -> Option<&Table> {
        match &self.kind {
            ShapeKind::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn table_mut(&mut self) -> Option<&mut Table> {
        match &mut self.kind {
            ShapeKind::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.extend_from_slice(&[0; 16]);
        bytes
    }

    #[test]
    fn test_geometry_from_inches() {
        let geometry = Geometry::from_inches(0.5, 1.0, 9.0, 6.5);
        assert_eq!(geometry.left, 457_200);
        assert_eq!(geometry.top, 914_400);
        assert_eq!(geometry.width, 8_229_600);
        assert_eq!(geometry.height, 5_943_600);
    }

    #[test]
    fn test_geometry_covers() {
        let full = Geometry::new(0, 0, 8_000_000, 6_000_000);
        assert!(full.covers(9_144_000, 6_858_000, 0.8));

        let narrow = Geometry::new(0, 0, 7_000_000, 6_858_000);
        assert!(!narrow.covers(9_144_000, 6_858_000, 0.8));

        assert!(!full.covers(0, 6_858_000, 0.8));
    }

    #[test]
    fn test_image_sniffing() {
        assert_eq!(ImageFormat::sniff(&png_bytes()), Some(ImageFormat::Png));
        assert_eq!(
            ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::sniff(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(
            ImageFormat::sniff(b"<?xml version=\"1.0\"?><svg></svg>"),
            Some(ImageFormat::Svg)
        );
        assert_eq!(ImageFormat::sniff(b"not an image"), None);
    }

    #[test]
    fn test_image_blob_format_errors() {
        assert!(ImageBlob::new(Vec::new()).format().is_err());
        assert!(ImageBlob::new(b"garbage".to_vec()).format().is_err());
        assert_eq!(
            ImageBlob::new(png_bytes()).format().unwrap(),
            ImageFormat::Png
        );
    }

    #[test]
    fn test_table_dimensions() {
        let table = Table::new(2, 3, 3000, 1000);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.column_widths, vec![1000, 1000, 1000]);
        assert_eq!(table.row_heights, vec![500, 500]);
        assert!(table.cell(1, 2).is_some());
        assert!(table.cell(2, 0).is_none());
    }

    #[test]
    fn test_placeholder_type_roundtrip() {
        for ty in ["title", "ctrTitle", "subTitle", "body", "obj", "pic"] {
            assert_eq!(PlaceholderType::from_ooxml_type(ty).ooxml_type(), ty);
        }
        assert_eq!(PlaceholderType::from_ooxml_type(""), PlaceholderType::Object);
        assert!(PlaceholderType::Footer.is_layout_only());
        assert!(!PlaceholderType::Body.is_layout_only());
    }

    #[test]
    fn test_line_visibility() {
        assert!(!Line::zero().is_visible());
        assert!(!Line::default().is_visible());
        assert!(Line::solid(12_700, RgbColor::BLACK).is_visible());
    }

    #[test]
    fn test_shape_accessors() {
        let shape = Shape::new(
            4,
            "Title 1",
            ShapeKind::Placeholder {
                idx: 0,
                ph_type: PlaceholderType::Title,
            },
        )
        .with_text_frame(TextFrame::new());

        assert!(shape.is_text_capable());
        assert_eq!(shape.placeholder_idx(), Some(0));
        assert_eq!(shape.kind_name(), "placeholder");
        assert!(shape.table().is_none());
    }
}
