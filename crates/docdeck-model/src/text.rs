//! Text frames, paragraphs and runs

use serde::{Deserialize, Serialize};

use crate::format::{Alignment, FormatDescriptor};
use crate::shape::Emu;

/// A contiguous span of text sharing one format
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    #[serde(default, skip_serializing_if = "FormatDescriptor::is_empty")]
    pub format: FormatDescriptor,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: FormatDescriptor::default(),
        }
    }

    pub fn formatted(text: impl Into<String>, format: FormatDescriptor) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }

    /// True when the text is empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A paragraph inside a text frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextParagraph {
    #[serde(default)]
    pub runs: Vec<Run>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
}

impl TextParagraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A paragraph holding a single unformatted run
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![Run::new(text)],
            ..Self::default()
        }
    }

    /// Append a run and return it for further formatting
    pub fn add_run(&mut self, run: Run) -> &mut Run {
        let index = self.runs.len();
        self.runs.push(run);
        &mut self.runs[index]
    }

    /// Concatenated text of all runs
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Drop all runs, keeping paragraph properties
    pub fn clear(&mut self) {
        self.runs.clear();
    }
}

/// Vertical anchoring of text inside its frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAnchor {
    Top,
    Middle,
    Bottom,
}

impl VerticalAnchor {
    pub fn from_drawingml(value: &str) -> Option<Self> {
        match value {
            "t" => Some(Self::Top),
            "ctr" => Some(Self::Middle),
            "b" => Some(Self::Bottom),
            _ => None,
        }
    }

    pub fn drawingml(&self) -> &'static str {
        match self {
            Self::Top => "t",
            Self::Middle => "ctr",
            Self::Bottom => "b",
        }
    }
}

/// Auto-fit behaviour of a text frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoFit {
    None,
    Normal,
    Shape,
}

/// Text frame body properties (`a:bodyPr`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyProperties {
    pub margin_left: Option<Emu>,
    pub margin_right: Option<Emu>,
    pub margin_top: Option<Emu>,
    pub margin_bottom: Option<Emu>,
    pub anchor: Option<VerticalAnchor>,
    pub word_wrap: Option<bool>,
    pub auto_fit: Option<AutoFit>,
}

impl BodyProperties {
    /// Copy every property set on `other` onto `self`
    pub fn overlay(&mut self, other: &BodyProperties) {
        self.margin_left = other.margin_left.or(self.margin_left);
        self.margin_right = other.margin_right.or(self.margin_right);
        self.margin_top = other.margin_top.or(self.margin_top);
        self.margin_bottom = other.margin_bottom.or(self.margin_bottom);
        self.anchor = other.anchor.or(self.anchor);
        self.word_wrap = other.word_wrap.or(self.word_wrap);
        self.auto_fit = other.auto_fit.or(self.auto_fit);
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The text container of a shape or table cell
///
/// A frame always holds at least one paragraph, mirroring how
/// PresentationML requires at least one `a:p` in a `txBody`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFrame {
    pub paragraphs: Vec<TextParagraph>,
    #[serde(default)]
    pub body: BodyProperties,
    /// Level-one default run format (`a:lstStyle/a:lvl1pPr/a:defRPr`)
    #[serde(default, skip_serializing_if = "FormatDescriptor::is_empty")]
    pub default_format: FormatDescriptor,
    /// Remaining `a:lstStyle` content, kept verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_style_xml: Option<String>,
}

impl Default for TextFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl TextFrame {
    pub fn new() -> Self {
        Self {
            paragraphs: vec![TextParagraph::new()],
            body: BodyProperties::default(),
            default_format: FormatDescriptor::default(),
            list_style_xml: None,
        }
    }

    /// Remove all text, leaving one empty paragraph.
    ///
    /// The surviving paragraph keeps its alignment and level.
    pub fn clear(&mut self) {
        self.paragraphs.truncate(1);
        match self.paragraphs.first_mut() {
            Some(first) => first.clear(),
            None => self.paragraphs.push(TextParagraph::new()),
        }
    }

    /// Replace the content with plain text, one paragraph per line.
    ///
    /// Paragraph and run styling is discarded.
    pub fn set_text(&mut self, text: &str) {
        self.paragraphs = text.split('\n').map(TextParagraph::with_text).collect();
        if self.paragraphs.is_empty() {
            self.paragraphs.push(TextParagraph::new());
        }
    }

    /// The first paragraph, created if the frame is somehow empty
    pub fn first_paragraph_mut(&mut self) -> &mut TextParagraph {
        if self.paragraphs.is_empty() {
            self.paragraphs.push(TextParagraph::new());
        }
        &mut self.paragraphs[0]
    }

    pub fn add_paragraph(&mut self) -> &mut TextParagraph {
        let index = self.paragraphs.len();
        self.paragraphs.push(TextParagraph::new());
        &mut self.paragraphs[index]
    }

    /// Text of all paragraphs joined by newlines
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(TextParagraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_blank(&self) -> bool {
        self.paragraphs
            .iter()
            .all(|p| p.runs.iter().all(Run::is_blank))
    }
}
