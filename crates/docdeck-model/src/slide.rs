//! Slides, layouts and the deck

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::shape::{
    Emu, Fill, Geometry, ImageBlob, Picture, PlaceholderType, Shape, ShapeKind, Table,
};
use crate::text::TextFrame;

/// Default slide width in EMU (10in, 4:3)
pub const DEFAULT_SLIDE_WIDTH: Emu = 9_144_000;

/// Default slide height in EMU (7.5in)
pub const DEFAULT_SLIDE_HEIGHT: Emu = 6_858_000;

/// Reference from a slide to the layout it is based on
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutRef {
    /// Package path of the layout part (e.g. `ppt/slideLayouts/slideLayout2.xml`)
    pub part: String,
    pub name: String,
}

/// A placeholder declared by a layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderSpec {
    pub idx: u32,
    pub ph_type: PlaceholderType,
    pub name: String,
    /// True when the layout placeholder carries a text body
    pub has_text: bool,
}

/// A slide layout available in the deck
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub part: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_name: Option<String>,
    #[serde(default)]
    pub placeholders: Vec<PlaceholderSpec>,
}

impl LayoutInfo {
    pub fn reference(&self) -> LayoutRef {
        LayoutRef {
            part: self.part.clone(),
            name: self.name.clone(),
        }
    }
}

/// A slide relationship kept verbatim for shapes the model does not
/// interpret (charts, media, hyperlinks inside raw markup)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideRelationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    #[serde(default)]
    pub external: bool,
}

/// One slide: shapes in z-order, a layout and an optional background
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub shapes: Vec<Shape>,
    pub layout: LayoutRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Fill>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<SlideRelationship>,
}

impl Slide {
    pub fn new(layout: LayoutRef) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Next free shape id; id 1 belongs to the shape tree itself
    pub fn next_shape_id(&self) -> u32 {
        self.shapes.iter().map(|s| s.id).max().unwrap_or(1).max(1) + 1
    }

    /// Append a shape, assigning it a fresh id
    pub fn add_shape(&mut self, mut shape: Shape) -> &mut Shape {
        shape.id = self.next_shape_id();
        let index = self.shapes.len();
        self.shapes.push(shape);
        &mut self.shapes[index]
    }

    pub fn add_textbox(&mut self, geometry: Geometry) -> &mut Shape {
        let name = format!("TextBox {}", self.next_shape_id() - 1);
        let shape = Shape::new(0, name, ShapeKind::TextBox)
            .with_geometry(geometry)
            .with_text_frame(TextFrame::new());
        self.add_shape(shape)
    }

    /// Add a picture; the payload must be a recognised image
    pub fn add_picture(&mut self, image: ImageBlob, geometry: Geometry) -> Result<&mut Shape> {
        image.format()?;
        let name = format!("Picture {}", self.next_shape_id() - 1);
        let picture = Picture {
            image: Some(image),
            description: None,
        };
        let shape = Shape::new(0, name, ShapeKind::Picture(picture)).with_geometry(geometry);
        Ok(self.add_shape(shape))
    }

    pub fn add_autoshape(&mut self, preset: impl Into<String>, geometry: Geometry) -> &mut Shape {
        let name = format!("Shape {}", self.next_shape_id() - 1);
        let shape = Shape::new(
            0,
            name,
            ShapeKind::AutoShape {
                preset: preset.into(),
            },
        )
        .with_geometry(geometry)
        .with_text_frame(TextFrame::new());
        self.add_shape(shape)
    }

    pub fn add_table(&mut self, rows: usize, columns: usize, geometry: Geometry) -> &mut Shape {
        let name = format!("Table {}", self.next_shape_id() - 1);
        let table = Table::new(rows, columns, geometry.width, geometry.height);
        let shape = Shape::new(0, name, ShapeKind::Table(table)).with_geometry(geometry);
        self.add_shape(shape)
    }

    pub fn placeholder(&self, idx: u32) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.placeholder_idx() == Some(idx))
    }

    pub fn placeholder_mut(&mut self, idx: u32) -> Option<&mut Shape> {
        self.shapes
            .iter_mut()
            .find(|s| s.placeholder_idx() == Some(idx))
    }

    /// Indices of every text-capable shape, in z-order
    pub fn text_shape_indices(&self) -> Vec<usize> {
        self.shapes
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_text_capable())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn first_text_shape(&self) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.is_text_capable())
    }

    /// Text of every text-capable shape, in z-order
    pub fn texts(&self) -> Vec<String> {
        self.shapes.iter().filter_map(Shape::text).collect()
    }
}

/// An ordered sequence of slides plus the layouts they can use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub slide_width: Emu,
    pub slide_height: Emu,
    #[serde(default)]
    pub layouts: Vec<LayoutInfo>,
    slides: Vec<Slide>,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new(DEFAULT_SLIDE_WIDTH, DEFAULT_SLIDE_HEIGHT)
    }
}

impl Deck {
    pub fn new(slide_width: Emu, slide_height: Emu) -> Self {
        Self {
            slide_width,
            slide_height,
            layouts: Vec::new(),
            slides: Vec::new(),
        }
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn slide_mut(&mut self, index: usize) -> Option<&mut Slide> {
        self.slides.get_mut(index)
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn layout(&self, part: &str) -> Option<&LayoutInfo> {
        self.layouts.iter().find(|l| l.part == part)
    }

    /// Append a new slide based on `layout`.
    ///
    /// The layout's placeholders are instantiated empty, except date,
    /// footer and slide number which stay on the layout.
    pub fn add_slide(&mut self, layout: &LayoutRef) -> &mut Slide {
        let mut slide = Slide::new(layout.clone());
        if let Some(info) = self.layout(&layout.part) {
            for spec in info.placeholders.iter().filter(|p| !p.ph_type.is_layout_only()) {
                let mut shape = Shape::new(
                    0,
                    spec.name.clone(),
                    ShapeKind::Placeholder {
                        idx: spec.idx,
                        ph_type: spec.ph_type,
                    },
                );
                if spec.has_text {
                    shape.text_frame = Some(TextFrame::new());
                }
                slide.add_shape(shape);
            }
        }
        self.push_slide(slide)
    }

    pub fn push_slide(&mut self, slide: Slide) -> &mut Slide {
        let index = self.slides.len();
        self.slides.push(slide);
        &mut self.slides[index]
    }

    pub fn remove_slide(&mut self, index: usize) -> Result<Slide> {
        if index >= self.slides.len() {
            return Err(ModelError::SlideOutOfRange {
                index,
                count: self.slides.len(),
            });
        }
        Ok(self.slides.remove(index))
    }

    /// Keep only the first `len` slides, returning how many were removed
    pub fn truncate(&mut self, len: usize) -> usize {
        let removed = self.slides.len().saturating_sub(len);
        self.slides.truncate(len);
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ImageFormat;

    fn title_and_content() -> LayoutInfo {
        LayoutInfo {
            part: "ppt/slideLayouts/slideLayout2.xml".to_string(),
            name: "Title and Content".to_string(),
            master_name: Some("Office Theme".to_string()),
            placeholders: vec![
                PlaceholderSpec {
                    idx: 0,
                    ph_type: PlaceholderType::Title,
                    name: "Title 1".to_string(),
                    has_text: true,
                },
                PlaceholderSpec {
                    idx: 1,
                    ph_type: PlaceholderType::Object,
                    name: "Content Placeholder 2".to_string(),
                    has_text: true,
                },
                PlaceholderSpec {
                    idx: 10,
                    ph_type: PlaceholderType::DateTime,
                    name: "Date Placeholder 3".to_string(),
                    has_text: true,
                },
            ],
        }
    }

    #[test]
    fn test_add_slide_instantiates_placeholders() {
        let mut deck = Deck::default();
        let layout = title_and_content();
        let reference = layout.reference();
        deck.layouts.push(layout);

        let slide = deck.add_slide(&reference);
        assert_eq!(slide.shapes.len(), 2);
        assert!(slide.placeholder(0).is_some());
        assert!(slide.placeholder(1).is_some());
        assert!(slide.placeholder(10).is_none());
        assert_eq!(slide.shapes[0].id, 2);
        assert_eq!(slide.shapes[1].id, 3);
        assert_eq!(deck.slide_count(), 1);
    }

    #[test]
    fn test_add_slide_unknown_layout_is_blank() {
        let mut deck = Deck::default();
        let slide = deck.add_slide(&LayoutRef::default());
        assert!(slide.shapes.is_empty());
    }

    #[test]
    fn test_shape_ids_are_unique() {
        let mut slide = Slide::default();
        let a = slide.add_textbox(Geometry::default()).id;
        let b = slide.add_autoshape("rect", Geometry::default()).id;
        let c = slide.add_table(1, 1, Geometry::default()).id;
        assert_eq!((a, b, c), (2, 3, 4));
        assert_eq!(slide.text_shape_indices(), vec![0, 1]);
    }

    #[test]
    fn test_add_picture_validates_payload() {
        let mut slide = Slide::default();
        let err = slide
            .add_picture(ImageBlob::new(b"junk".to_vec()), Geometry::default())
            .unwrap_err();
        assert!(matches!(err, ModelError::UnreadableImage { .. }));
        assert!(slide.shapes.is_empty());

        let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
        png.extend_from_slice(&[0; 8]);
        let shape = slide
            .add_picture(ImageBlob::new(png), Geometry::default())
            .unwrap();
        match &shape.kind {
            ShapeKind::Picture(pic) => assert_eq!(
                pic.image.as_ref().unwrap().format().unwrap(),
                ImageFormat::Png
            ),
            other => panic!("expected picture, got {:?}", other),
        }
    }

    #[test]
    fn test_remove_and_truncate() {
        let mut deck = Deck::default();
        for _ in 0..4 {
            deck.push_slide(Slide::default());
        }
        assert!(deck.remove_slide(9).is_err());
        assert!(deck.remove_slide(3).is_ok());
        assert_eq!(deck.truncate(1), 2);
        assert_eq!(deck.slide_count(), 1);
        assert_eq!(deck.truncate(5), 0);
    }
}
