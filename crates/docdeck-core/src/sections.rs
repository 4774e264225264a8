//! Section parser
//!
//! Splits a flat paragraph stream into numbered sections. A header line
//! is one or more ASCII digits, a period, optional whitespace and an
//! optional title (`"3. Intro"`, `"12."`). Text before the first header
//! becomes section 0, the preamble.

use std::sync::OnceLock;

use docdeck_model::{Run, SourceParagraph};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Title given to the implicit section holding text before the first header
pub const PREAMBLE_TITLE: &str = "preamble";

/// Header line pattern: number, period, optional title
fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([0-9]+)\.\s*(.*)").unwrap())
}

/// A numbered chunk of the source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section number; 0 is the preamble
    pub number: u64,
    pub title: String,
    /// Trimmed source lines; the first one is the header line
    pub content: Vec<String>,
    /// Title followed by the body lines, newline separated
    pub text_only: String,
    /// Runs of each content line, aligned 1:1 with `content`
    pub formatting: Vec<Vec<Run>>,
}

impl Section {
    fn open(number: u64, title: String, line: String, runs: Vec<Run>) -> Self {
        Self {
            number,
            text_only: title.clone(),
            title,
            content: vec![line],
            formatting: vec![runs],
        }
    }

    fn preamble(line: String, runs: Vec<Run>) -> Self {
        Self {
            number: 0,
            title: PREAMBLE_TITLE.to_string(),
            text_only: line.clone(),
            content: vec![line],
            formatting: vec![runs],
        }
    }

    fn push_line(&mut self, line: String, runs: Vec<Run>) {
        if self.text_only.is_empty() {
            self.text_only = line.clone();
        } else {
            self.text_only.push('\n');
            self.text_only.push_str(&line);
        }
        self.content.push(line);
        self.formatting.push(runs);
    }

    pub fn is_preamble(&self) -> bool {
        self.number == 0
    }

    pub fn header_line(&self) -> Option<&str> {
        self.content.first().map(String::as_str)
    }

    /// Content lines after the header line
    pub fn body_lines(&self) -> &[String] {
        self.content.get(1..).unwrap_or(&[])
    }

    /// True when any run carries formatting information
    pub fn has_formatting(&self) -> bool {
        self.formatting
            .iter()
            .flatten()
            .any(|run| !run.format.is_empty())
    }

    /// Number of characters across all content lines
    pub fn content_length(&self) -> usize {
        self.content.iter().map(|l| l.chars().count()).sum()
    }
}

/// Parse a header line into its number and title
///
/// A number too large for `u64` saturates at `u64::MAX`; the line is
/// still a header.
pub fn parse_header(line: &str) -> Option<(u64, String)> {
    let captures = header_regex().captures(line.trim())?;
    let number = captures.get(1)?.as_str().parse().unwrap_or(u64::MAX);
    let title = captures
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    Some((number, title))
}

/// Split paragraphs into sections in encounter order.
///
/// Blank paragraphs are skipped entirely.
pub fn parse_sections(paragraphs: &[SourceParagraph]) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<Section> = None;

    for paragraph in paragraphs {
        let line = paragraph.text.trim();
        if line.is_empty() {
            continue;
        }
        let line = line.to_string();
        let runs = paragraph.runs.clone();

        match parse_header(&line) {
            Some((number, title)) => {
                if let Some(done) = current.take() {
                    sections.push(done);
                }
                current = Some(Section::open(number, title, line, runs));
            }
            None => match current.as_mut() {
                Some(section) => section.push_line(line, runs),
                None => current = Some(Section::preamble(line, runs)),
            },
        }
    }

    if let Some(done) = current {
        sections.push(done);
    }

    debug!(count = sections.len(), "parsed sections");
    sections
}
