//! Conversion settings
//!
//! All fields have defaults, so an empty TOML file is a valid
//! configuration:
//!
//! ```toml
//! output_suffix = "_slides"
//! background_threshold = 0.9
//!
//! [default_textbox]
//! left = 457200
//! top = 914400
//! width = 8229600
//! height = 5943600
//!
//! [default_format]
//! font_name = "Arial"
//! font_size = 2400
//! ```

use std::path::Path;

use docdeck_model::{FormatDescriptor, Geometry};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Suffix inserted before the template extension when deriving an output path
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_converted";

/// Ratio of the slide size a picture must reach on both axes to count
/// as a background image
pub const DEFAULT_BACKGROUND_THRESHOLD: f64 = 0.8;

/// Settings for one conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub output_suffix: String,

    pub background_threshold: f64,

    /// Where a textbox is placed when neither the slide nor the template
    /// has a text-capable shape
    pub default_textbox: Geometry,

    /// Format applied to that fallback textbox
    pub default_format: FormatDescriptor,

    /// Number of sections listed by the conversion preview
    pub preview_sections: usize,

    /// Maximum title length in the conversion preview
    pub preview_title_chars: usize,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            background_threshold: DEFAULT_BACKGROUND_THRESHOLD,
            default_textbox: Geometry::from_inches(0.5, 1.0, 9.0, 6.5),
            default_format: FormatDescriptor::new()
                .with_font_name("Arial")
                .with_font_size_pt(24),
            preview_sections: 5,
            preview_title_chars: 50,
        }
    }
}

impl ConvertConfig {
    /// Parse a configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_suffix.is_empty() {
            return Err(ConfigError::Invalid(
                "output_suffix must not be empty".to_string(),
            ));
        }
        if !(self.background_threshold > 0.0 && self.background_threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "background_threshold must be in (0, 1], got {}",
                self.background_threshold
            )));
        }
        if self.default_textbox.width <= 0 || self.default_textbox.height <= 0 {
            return Err(ConfigError::Invalid(
                "default_textbox must have a positive size".to_string(),
            ));
        }
        Ok(())
    }
}
