//! Run-level formatting
//!
//! A [`FormatDescriptor`] describes the formatting of one run of text.
//! Every field is optional: `None` means "inherit whatever the target
//! already has", never "reset to empty".

use std::fmt;

use serde::{Deserialize, Serialize};

/// Font sizes are stored in hundredths of a point
pub const CENTIPOINTS_PER_POINT: u32 = 100;

/// An sRGB color, serialized as a six digit hex string ("1F2937")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor::new(0, 0, 0);
    pub const WHITE: RgbColor = RgbColor::new(0xFF, 0xFF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color, with or without a leading `#`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Uppercase hex representation without `#`
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

impl TryFrom<String> for RgbColor {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::from_hex(&value).ok_or_else(|| format!("invalid RGB color: {}", value))
    }
}

impl From<RgbColor> for String {
    fn from(color: RgbColor) -> Self {
        color.to_hex()
    }
}

/// Horizontal paragraph alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
    Distributed,
}

impl Alignment {
    /// Parse a DrawingML `algn` value
    pub fn from_drawingml(value: &str) -> Option<Self> {
        match value {
            "l" => Some(Self::Left),
            "ctr" => Some(Self::Center),
            "r" => Some(Self::Right),
            "just" | "justLow" => Some(Self::Justify),
            "dist" | "thaiDist" => Some(Self::Distributed),
            _ => None,
        }
    }

    /// The DrawingML `algn` value
    pub fn drawingml(&self) -> &'static str {
        match self {
            Self::Left => "l",
            Self::Center => "ctr",
            Self::Right => "r",
            Self::Justify => "just",
            Self::Distributed => "dist",
        }
    }

    /// Parse a WordprocessingML `w:jc` value
    pub fn from_wordml(value: &str) -> Option<Self> {
        match value {
            "left" | "start" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" | "end" => Some(Self::Right),
            "both" => Some(Self::Justify),
            "distribute" => Some(Self::Distributed),
            _ => None,
        }
    }
}

/// Formatting attributes of one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,

    /// Size in hundredths of a point (2400 = 24pt)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<RgbColor>,

    /// Paragraph alignment of the paragraph the run belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,

    /// Outline / list level of the paragraph the run belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent_level: Option<u8>,
}

impl FormatDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font_name(mut self, name: impl Into<String>) -> Self {
        self.font_name = Some(name.into());
        self
    }

    pub fn with_font_size_pt(mut self, points: u32) -> Self {
        self.font_size = Some(points * CENTIPOINTS_PER_POINT);
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = Some(underline);
        self
    }

    pub fn with_color(mut self, color: RgbColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn with_indent_level(mut self, level: u8) -> Self {
        self.indent_level = Some(level);
        self
    }

    /// Font size in points, if set
    pub fn font_size_pt(&self) -> Option<f32> {
        self.font_size
            .map(|size| size as f32 / CENTIPOINTS_PER_POINT as f32)
    }

    /// True when no attribute is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True when any character-level attribute (font, size, emphasis, color) is set
    pub fn has_character_format(&self) -> bool {
        self.font_name.is_some()
            || self.font_size.is_some()
            || self.bold.is_some()
            || self.italic.is_some()
            || self.underline.is_some()
            || self.color.is_some()
    }

    /// Copy every attribute set on `other` onto `self`.
    ///
    /// Attributes that are `None` on `other` leave `self` untouched.
    pub fn overlay(&mut self, other: &FormatDescriptor) {
        if let Some(name) = &other.font_name {
            self.font_name = Some(name.clone());
        }
        if other.font_size.is_some() {
            self.font_size = other.font_size;
        }
        if other.bold.is_some() {
            self.bold = other.bold;
        }
        if other.italic.is_some() {
            self.italic = other.italic;
        }
        if other.underline.is_some() {
            self.underline = other.underline;
        }
        if other.color.is_some() {
            self.color = other.color;
        }
        if other.alignment.is_some() {
            self.alignment = other.alignment;
        }
        if other.indent_level.is_some() {
            self.indent_level = other.indent_level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_hex_roundtrip() {
        let color = RgbColor::from_hex("#1f2937").unwrap();
        assert_eq!(color, RgbColor::new(0x1F, 0x29, 0x37));
        assert_eq!(color.to_hex(), "1F2937");
        assert_eq!(color.to_string(), "#1F2937");
    }

    #[test]
    fn test_rgb_rejects_garbage() {
        assert!(RgbColor::from_hex("12345").is_none());
        assert!(RgbColor::from_hex("GG0000").is_none());
        assert!(RgbColor::from_hex("ÄÄÄ").is_none());
    }

    #[test]
    fn test_rgb_serializes_as_hex() {
        let json = serde_json::to_string(&RgbColor::new(255, 0, 16)).unwrap();
        assert_eq!(json, "\"FF0010\"");
        let back: RgbColor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RgbColor::new(255, 0, 16));
    }

    #[test]
    fn test_alignment_mappings() {
        assert_eq!(Alignment::from_drawingml("ctr"), Some(Alignment::Center));
        assert_eq!(Alignment::from_wordml("both"), Some(Alignment::Justify));
        assert_eq!(Alignment::from_wordml("bogus"), None);
        assert_eq!(Alignment::Right.drawingml(), "r");
    }

    #[test]
    fn test_overlay_null_means_inherit() {
        let mut target = FormatDescriptor::new()
            .with_font_name("Calibri")
            .with_font_size_pt(18)
            .with_bold(false);
        let source = FormatDescriptor::new().with_bold(true).with_italic(true);

        target.overlay(&source);

        assert_eq!(target.font_name.as_deref(), Some("Calibri"));
        assert_eq!(target.font_size, Some(1800));
        assert_eq!(target.bold, Some(true));
        assert_eq!(target.italic, Some(true));
        assert_eq!(target.underline, None);
    }

    #[test]
    fn test_empty_descriptor() {
        assert!(FormatDescriptor::new().is_empty());
        assert!(!FormatDescriptor::new().with_indent_level(0).is_empty());
        assert!(!FormatDescriptor::new()
            .with_alignment(Alignment::Left)
            .has_character_format());
        assert_eq!(
            FormatDescriptor::new().with_font_size_pt(24).font_size_pt(),
            Some(24.0)
        );
    }
}
