//! Template and presentation analysis
//!
//! [`analyze_template`] summarises the reference slide before any
//! cloning happens. [`analyze_presentation`] describes a whole deck and
//! backs the `analyze` command.

use docdeck_model::{Deck, Emu, ShapeKind, Slide};
use serde::{Deserialize, Serialize};

/// Summary used when no shape falls in any category
pub const NO_SPECIAL_ELEMENTS: &str = "no special elements";

/// Read-only summary of the template slide
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateAnalysis {
    pub layout_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_name: Option<String>,
    pub total_shapes: usize,
    pub text_box_count: usize,
    pub picture_count: usize,
    pub other_count: usize,
    pub has_background_image: bool,
    /// Names of pictures flagged as background images
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub background_shapes: Vec<String>,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TemplateAnalysis {
    /// An analysis that could not be carried out
    pub fn failed(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            summary: format!("analysis failed: {}", reason),
            error: Some(reason),
            ..Self::default()
        }
    }
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {}", singular)
    } else {
        format!("{} {}", count, plural)
    }
}

fn summarize(analysis: &TemplateAnalysis) -> String {
    let mut parts = Vec::new();
    if analysis.text_box_count > 0 {
        parts.push(plural(analysis.text_box_count, "text box", "text boxes"));
    }
    if analysis.picture_count > 0 {
        parts.push(plural(analysis.picture_count, "picture", "pictures"));
    }
    if analysis.other_count > 0 {
        parts.push(plural(analysis.other_count, "other shape", "other shapes"));
    }
    if analysis.has_background_image {
        parts.push("has background image".to_string());
    }
    if parts.is_empty() {
        NO_SPECIAL_ELEMENTS.to_string()
    } else {
        parts.join(", ")
    }
}

/// Classify the shapes of one slide.
///
/// A picture is a background image when its width and height each reach
/// `threshold` of the declared slide size. Pictures whose position is
/// inherited from the layout are never flagged.
pub fn analyze_slide(
    slide: &Slide,
    slide_width: Emu,
    slide_height: Emu,
    threshold: f64,
) -> TemplateAnalysis {
    let mut analysis = TemplateAnalysis {
        layout_name: slide.layout.name.clone(),
        total_shapes: slide.shapes.len(),
        ..TemplateAnalysis::default()
    };

    for shape in &slide.shapes {
        if shape.is_text_capable() {
            analysis.text_box_count += 1;
        } else if shape.is_picture() {
            analysis.picture_count += 1;
            let is_background = shape
                .geometry
                .is_some_and(|g| g.covers(slide_width, slide_height, threshold));
            if is_background {
                analysis.has_background_image = true;
                analysis.background_shapes.push(shape.name.clone());
            }
        } else {
            analysis.other_count += 1;
        }
    }

    analysis.summary = summarize(&analysis);
    analysis
}

/// Analyse the first slide of `deck` as the template.
///
/// Never fails: problems are reported through [`TemplateAnalysis::error`].
pub fn analyze_template(deck: &Deck, threshold: f64) -> TemplateAnalysis {
    let Some(slide) = deck.slide(0) else {
        return TemplateAnalysis::failed("template has no slides");
    };
    if deck.slide_width <= 0 || deck.slide_height <= 0 {
        let mut analysis = analyze_slide(slide, 0, 0, threshold);
        analysis.error = Some(format!(
            "declared slide size {}x{} is not usable for background detection",
            deck.slide_width, deck.slide_height
        ));
        return analysis;
    }

    let mut analysis = analyze_slide(slide, deck.slide_width, deck.slide_height, threshold);
    analysis.master_name = deck
        .layout(&slide.layout.part)
        .and_then(|l| l.master_name.clone());
    analysis
}

/// Structure of one slide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideStructure {
    /// 1-based slide number
    pub number: usize,
    pub layout_name: String,
    pub text_shapes: usize,
    pub image_shapes: usize,
    pub table_shapes: usize,
    pub other_shapes: usize,
    pub has_title: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub word_count: usize,
}

/// Structure of a whole deck
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationAnalysis {
    pub total_slides: usize,
    pub slide_width: Emu,
    pub slide_height: Emu,
    /// Distinct layout names in first-use order
    pub layouts_used: Vec<String>,
    pub total_words: usize,
    pub slides: Vec<SlideStructure>,
}

/// Text shorter than this is taken as a slide title
const TITLE_MAX_CHARS: usize = 100;

fn analyze_slide_structure(number: usize, slide: &Slide) -> SlideStructure {
    let mut structure = SlideStructure {
        number,
        layout_name: slide.layout.name.clone(),
        text_shapes: 0,
        image_shapes: 0,
        table_shapes: 0,
        other_shapes: 0,
        has_title: false,
        title: None,
        word_count: 0,
    };

    for shape in &slide.shapes {
        match &shape.kind {
            ShapeKind::Picture(_) => structure.image_shapes += 1,
            ShapeKind::Table(table) => {
                structure.table_shapes += 1;
                structure.word_count += table
                    .rows
                    .iter()
                    .flatten()
                    .map(|cell| cell.text().split_whitespace().count())
                    .sum::<usize>();
            }
            _ => match shape.text() {
                Some(text) => {
                    structure.text_shapes += 1;
                    let text = text.trim();
                    structure.word_count += text.split_whitespace().count();
                    if structure.title.is_none()
                        && !text.is_empty()
                        && text.chars().count() < TITLE_MAX_CHARS
                    {
                        structure.title = Some(text.to_string());
                        structure.has_title = true;
                    }
                }
                None => structure.other_shapes += 1,
            },
        }
    }

    structure
}

/// Describe every slide of a deck
pub fn analyze_presentation(deck: &Deck) -> PresentationAnalysis {
    let slides: Vec<_> = deck
        .slides()
        .iter()
        .enumerate()
        .map(|(i, slide)| analyze_slide_structure(i + 1, slide))
        .collect();

    let mut layouts_used: Vec<String> = Vec::new();
    for slide in deck.slides() {
        if !layouts_used.contains(&slide.layout.name) {
            layouts_used.push(slide.layout.name.clone());
        }
    }

    PresentationAnalysis {
        total_slides: deck.slide_count(),
        slide_width: deck.slide_width,
        slide_height: deck.slide_height,
        layouts_used,
        total_words: slides.iter().map(|s| s.word_count).sum(),
        slides,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdeck_model::{
        Geometry, ImageBlob, LayoutInfo, LayoutRef, Picture, Shape, ShapeKind, TextFrame,
    };

    const W: Emu = 9_144_000;
    const H: Emu = 6_858_000;

    fn picture(name: &str, geometry: Geometry) -> Shape {
        Shape::new(
            0,
            name,
            ShapeKind::Picture(Picture {
                image: Some(ImageBlob::new(b"GIF89a".to_vec())),
                description: None,
            }),
        )
        .with_geometry(geometry)
    }

    fn template_slide() -> Slide {
        let mut slide = Slide::new(LayoutRef {
            part: "ppt/slideLayouts/slideLayout1.xml".to_string(),
            name: "Title Slide".to_string(),
        });
        slide.add_textbox(Geometry::new(0, 0, 100, 100));
        slide.add_textbox(Geometry::new(0, 200, 100, 100));
        slide.add_shape(picture("Background", Geometry::new(0, 0, W, H)));
        slide
    }

    #[test]
    fn test_analyze_slide_counts_and_summary() {
        let analysis = analyze_slide(&template_slide(), W, H, 0.8);

        assert_eq!(analysis.total_shapes, 3);
        assert_eq!(analysis.text_box_count, 2);
        assert_eq!(analysis.picture_count, 1);
        assert_eq!(analysis.other_count, 0);
        assert!(analysis.has_background_image);
        assert_eq!(analysis.background_shapes, vec!["Background".to_string()]);
        assert_eq!(
            analysis.summary,
            "2 text boxes, 1 picture, has background image"
        );
    }

    #[test]
    fn test_small_picture_is_not_background() {
        let mut slide = Slide::default();
        slide.add_shape(picture("Logo", Geometry::new(0, 0, W, H / 2)));
        let analysis = analyze_slide(&slide, W, H, 0.8);
        assert!(!analysis.has_background_image);
        assert_eq!(analysis.summary, "1 picture");
    }

    #[test]
    fn test_threshold_is_tunable() {
        let mut slide = Slide::default();
        slide.add_shape(picture("Photo", Geometry::new(0, 0, W * 85 / 100, H * 85 / 100)));
        assert!(analyze_slide(&slide, W, H, 0.8).has_background_image);
        assert!(!analyze_slide(&slide, W, H, 0.9).has_background_image);
    }

    #[test]
    fn test_empty_slide_summary() {
        let analysis = analyze_slide(&Slide::default(), W, H, 0.8);
        assert_eq!(analysis.summary, NO_SPECIAL_ELEMENTS);
    }

    #[test]
    fn test_other_shapes_counted() {
        let mut slide = Slide::default();
        slide.add_shape(Shape::new(
            0,
            "Connector",
            ShapeKind::Other {
                element: "cxnSp".to_string(),
                raw: None,
            },
        ));
        slide.add_table(2, 2, Geometry::new(0, 0, 10, 10));
        let analysis = analyze_slide(&slide, W, H, 0.8);
        assert_eq!(analysis.other_count, 2);
        assert_eq!(analysis.summary, "2 other shapes");
    }

    #[test]
    fn test_analyze_template_reports_failure() {
        let analysis = analyze_template(&Deck::default(), 0.8);
        assert!(analysis.error.is_some());
        assert!(analysis.summary.starts_with("analysis failed: "));
    }

    #[test]
    fn test_analyze_template_zero_size_skips_background() {
        let mut deck = Deck::new(0, 0);
        deck.push_slide(template_slide());
        let analysis = analyze_template(&deck, 0.8);
        assert!(!analysis.has_background_image);
        assert!(analysis.error.is_some());
        assert_eq!(analysis.text_box_count, 2);
    }

    #[test]
    fn test_analyze_template_master_name() {
        let mut deck = Deck::default();
        deck.layouts.push(LayoutInfo {
            part: "ppt/slideLayouts/slideLayout1.xml".to_string(),
            name: "Title Slide".to_string(),
            master_name: Some("Corporate".to_string()),
            placeholders: Vec::new(),
        });
        deck.push_slide(template_slide());

        let analysis = analyze_template(&deck, 0.8);
        assert_eq!(analysis.layout_name, "Title Slide");
        assert_eq!(analysis.master_name.as_deref(), Some("Corporate"));
        assert!(analysis.error.is_none());
    }

    #[test]
    fn test_analyze_presentation() {
        let mut deck = Deck::default();
        let slide = deck.push_slide(template_slide());
        if let Some(frame) = slide.shapes[0].text_frame.as_mut() {
            frame.set_text("Quarterly results");
        }
        let second = deck.push_slide(Slide::new(LayoutRef {
            part: "ppt/slideLayouts/slideLayout2.xml".to_string(),
            name: "Title and Content".to_string(),
        }));
        let table = second.add_table(1, 2, Geometry::new(0, 0, 10, 10));
        if let Some(t) = table.table_mut() {
            t.rows[0][0].set_text("alpha beta");
            t.rows[0][1].set_text("gamma");
        }
        let long_text = "word ".repeat(30);
        second
            .add_textbox(Geometry::default())
            .text_frame = Some({
            let mut frame = TextFrame::new();
            frame.set_text(&long_text);
            frame
        });

        let analysis = analyze_presentation(&deck);
        assert_eq!(analysis.total_slides, 2);
        assert_eq!(
            analysis.layouts_used,
            vec!["Title Slide".to_string(), "Title and Content".to_string()]
        );
        assert_eq!(analysis.slides[0].title.as_deref(), Some("Quarterly results"));
        assert!(analysis.slides[0].has_title);
        assert_eq!(analysis.slides[0].image_shapes, 1);
        assert_eq!(analysis.slides[1].table_shapes, 1);
        assert!(!analysis.slides[1].has_title);
        assert_eq!(analysis.slides[1].word_count, 33);
        assert_eq!(analysis.total_words, 2 + 33);
    }
}
