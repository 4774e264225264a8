//! Conversion orchestrator
//!
//! Runs the fixed pipeline: parse the source, load the template deck,
//! analyse slide #1, drop every other slide, then give each section its
//! own slide. Slide #1 receives the first section; later sections get a
//! fresh clone of the template. A section that cannot be injected is
//! recorded as skipped and its slide keeps the template content. The
//! deck is saved once, at the end.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use docdeck_model::{Deck, DeckStore, DocumentSource, SourceParagraph};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analyzer::{analyze_template, TemplateAnalysis};
use crate::cloner::clone_slide;
use crate::context::{ConversionContext, Stage};
use crate::diagnostics::Diagnostic;
use crate::error::{codes, ContentInjectionError, ConvertError, Result};
use crate::injector::{ContentInjector, TemplateInjector};
use crate::sections::{parse_sections, Section};

/// Share of the 4..5 progress band used by the per-section events
const SECTION_PROGRESS_SPAN: f64 = 0.8;

/// A section whose content could not be injected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSection {
    pub number: u64,
    pub title: String,
    pub error: String,
}

/// What the in-memory pipeline did to the deck
#[derive(Debug, Clone, PartialEq)]
pub struct DeckOutcome {
    pub total_sections: usize,
    pub slides_created: usize,
    pub skipped_sections: Vec<SkippedSection>,
    pub template_analysis: TemplateAnalysis,
}

/// Record returned by every conversion, successful or not
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub success: bool,
    pub error: Option<String>,
    pub error_code: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub total_sections: usize,
    pub slides_created: usize,
    pub output_file: Option<PathBuf>,
    pub skipped_sections: Vec<SkippedSection>,
    pub format_issues: Vec<String>,
    /// Wall-clock duration in seconds
    pub processing_time: f64,
    pub template_analysis: Option<TemplateAnalysis>,
}

impl ConversionResult {
    /// A fatal outcome
    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            error_code: Some(code.into()),
            timestamp: Utc::now(),
            total_sections: 0,
            slides_created: 0,
            output_file: None,
            skipped_sections: Vec::new(),
            format_issues: Vec::new(),
            processing_time: 0.0,
            template_analysis: None,
        }
    }

    fn success(outcome: DeckOutcome, output: &Path, format_issues: Vec<String>) -> Self {
        Self {
            success: true,
            error: None,
            error_code: None,
            timestamp: Utc::now(),
            total_sections: outcome.total_sections,
            slides_created: outcome.slides_created,
            output_file: Some(output.to_path_buf()),
            skipped_sections: outcome.skipped_sections,
            format_issues,
            processing_time: 0.0,
            template_analysis: Some(outcome.template_analysis),
        }
    }
}

/// Insert `suffix` between the template's file stem and extension
pub fn derive_output_path(template: &Path, suffix: &str) -> PathBuf {
    let stem = template
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match template.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    template.with_file_name(name)
}

/// Drives a conversion with a given [`ContentInjector`]
#[derive(Debug, Clone, Default)]
pub struct Converter<I = TemplateInjector> {
    injector: I,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<I: ContentInjector> Converter<I> {
    pub fn with_injector(injector: I) -> Self {
        Self { injector }
    }

    /// Parse `paragraphs` and rebuild `deck` in memory, one slide per section.
    ///
    /// `deck` arrives already loaded, so the template-loaded checkpoint is
    /// reported straight after parsing to keep the progress sequence the
    /// same as [`Converter::convert`].
    pub fn convert_deck(
        &self,
        paragraphs: &[SourceParagraph],
        deck: &mut Deck,
        ctx: &mut ConversionContext<'_>,
    ) -> Result<DeckOutcome> {
        ctx.checkpoint(Stage::Parsing, "Parsing source document");
        let sections = parse_sections(paragraphs);
        ctx.checkpoint(Stage::Parsed, format!("Found {} sections", sections.len()));
        ctx.checkpoint(Stage::TemplateLoaded, "Template loaded");
        self.populate(&sections, deck, ctx)
    }

    /// Read `source`, convert it into the deck loaded from `store` and save
    /// the result to `output`.
    ///
    /// Never fails: fatal errors are reported in the returned record and
    /// nothing is written in that case.
    pub fn convert<S, D>(
        &self,
        source: &S,
        store: &D,
        output: &Path,
        ctx: &mut ConversionContext<'_>,
    ) -> ConversionResult
    where
        S: DocumentSource + ?Sized,
        D: DeckStore + ?Sized,
    {
        let started = Instant::now();
        let mut result = match self.run(source, store, output, ctx) {
            Ok(outcome) => {
                ConversionResult::success(outcome, output, ctx.diagnostics().format_issues())
            }
            Err(e) => {
                warn!(code = e.code(), "conversion failed: {}", e);
                ConversionResult::failure(e.code(), e.to_string())
            }
        };
        result.processing_time = started.elapsed().as_secs_f64();
        result
    }

    fn run<S, D>(
        &self,
        source: &S,
        store: &D,
        output: &Path,
        ctx: &mut ConversionContext<'_>,
    ) -> Result<DeckOutcome>
    where
        S: DocumentSource + ?Sized,
        D: DeckStore + ?Sized,
    {
        ctx.checkpoint(Stage::Parsing, "Parsing source document");
        let paragraphs = source
            .read_paragraphs()
            .map_err(|e| ConvertError::source_parse(e.to_string()))?;
        let sections = parse_sections(&paragraphs);
        ctx.checkpoint(Stage::Parsed, format!("Found {} sections", sections.len()));

        let mut deck = store
            .load()
            .map_err(|e| ConvertError::template_load(e.to_string()))?;
        ctx.checkpoint(Stage::TemplateLoaded, "Template loaded");

        let outcome = self.populate(&sections, &mut deck, ctx)?;

        ctx.checkpoint(Stage::Saving, "Saving presentation");
        store
            .save(&deck, output)
            .map_err(|e| ConvertError::persist(e.to_string()))?;
        info!(
            output = %output.display(),
            slides = outcome.slides_created,
            skipped = outcome.skipped_sections.len(),
            "presentation saved"
        );
        Ok(outcome)
    }

    fn populate(
        &self,
        sections: &[Section],
        deck: &mut Deck,
        ctx: &mut ConversionContext<'_>,
    ) -> Result<DeckOutcome> {
        if deck.is_empty() {
            return Err(ConvertError::empty_template());
        }

        let analysis = analyze_template(deck, ctx.config().background_threshold);
        info!(layout = %analysis.layout_name, "template: {}", analysis.summary);
        ctx.checkpoint(Stage::Analyzed, format!("Template: {}", analysis.summary));

        let removed = deck.truncate(1);
        if removed > 0 {
            info!(removed, "removed extra template slides");
        }
        let template = deck
            .slide(0)
            .cloned()
            .ok_or_else(ConvertError::empty_template)?;

        if sections.is_empty() {
            deck.truncate(0);
        }

        let total = sections.len();
        let mut skipped = Vec::new();
        for (i, section) in sections.iter().enumerate() {
            ctx.set_section(Some(section.number));
            ctx.progress(
                Stage::Section,
                Stage::Section.checkpoint() + i as f64 / total as f64 * SECTION_PROGRESS_SPAN,
                format!("Processing section {}/{}: {}", i + 1, total, section.title),
            );

            if i > 0 {
                let slide = deck.add_slide(&template.layout);
                clone_slide(&template, slide, ctx);
            }
            let index = deck.slide_count() - 1;

            let injected = match deck.slide_mut(index) {
                Some(target) => {
                    let pristine = target.clone();
                    let injected = self.injector.inject(section, target, &template, ctx);
                    if injected.is_err() {
                        // A failed section keeps the untouched template clone
                        *target = pristine;
                    }
                    injected
                }
                None => Err(ContentInjectionError::failed("target slide is missing")),
            };
            if let Err(e) = injected {
                ctx.report(
                    Diagnostic::warning(format!("Section {} skipped: {}", section.number, e))
                        .with_code(codes::SECTION_SKIPPED),
                );
                skipped.push(SkippedSection {
                    number: section.number,
                    title: section.title.clone(),
                    error: e.to_string(),
                });
            }
        }
        ctx.set_section(None);

        Ok(DeckOutcome {
            total_sections: total,
            slides_created: deck.slide_count(),
            skipped_sections: skipped,
            template_analysis: analysis,
        })
    }
}
