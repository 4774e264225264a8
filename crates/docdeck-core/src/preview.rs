//! Conversion preview: what a conversion would produce, without a deck

use docdeck_model::SourceParagraph;
use serde::{Deserialize, Serialize};

use crate::config::ConvertConfig;
use crate::sections::parse_sections;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPreview {
    pub number: u64,
    pub title: String,
    pub content_length: usize,
    pub has_formatting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionPreview {
    pub total_sections: usize,
    pub sections: Vec<SectionPreview>,
    /// Sections not listed
    pub remaining: usize,
}

fn truncate_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() > max_chars {
        let mut cut: String = title.chars().take(max_chars).collect();
        cut.push_str("...");
        cut
    } else {
        title.to_string()
    }
}

/// List the first sections a conversion would turn into slides
pub fn preview(paragraphs: &[SourceParagraph], config: &ConvertConfig) -> ConversionPreview {
    let sections = parse_sections(paragraphs);
    let listed: Vec<_> = sections
        .iter()
        .take(config.preview_sections)
        .map(|s| SectionPreview {
            number: s.number,
            title: truncate_title(&s.title, config.preview_title_chars),
            content_length: s.content_length(),
            has_formatting: s.has_formatting(),
        })
        .collect();

    ConversionPreview {
        total_sections: sections.len(),
        remaining: sections.len() - listed.len(),
        sections: listed,
    }
}
