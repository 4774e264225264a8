//! Content injection
//!
//! Writes one [`Section`] into the primary text shape of a slide. The
//! formatted rendering is tried first; any failure there falls back to
//! the plain-text rendering, which discards styling.

use docdeck_model::{Run, Shape, ShapeKind, Slide, TextFrame};
use tracing::debug;

use crate::context::ConversionContext;
use crate::error::{codes, ContentInjectionError};
use crate::format::{copy_shape_format, copy_text_frame};
use crate::sections::Section;

/// Renders a section into a slide
pub trait ContentInjector {
    /// Write `section` into `target`. `template` is the pristine design
    /// slide, used when `target` has no text-capable shape.
    fn inject(
        &self,
        section: &Section,
        target: &mut Slide,
        template: &Slide,
        ctx: &mut ConversionContext<'_>,
    ) -> Result<(), ContentInjectionError>;
}

/// The default injector
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateInjector;

impl ContentInjector for TemplateInjector {
    fn inject(
        &self,
        section: &Section,
        target: &mut Slide,
        template: &Slide,
        ctx: &mut ConversionContext<'_>,
    ) -> Result<(), ContentInjectionError> {
        let primary = primary_shape(target, template, ctx);
        let shape = &mut target.shapes[primary];

        let rendered = if has_run_data(section) {
            match render_formatted(section, shape) {
                Ok(()) => Ok(()),
                Err(e) => {
                    ctx.degrade(
                        codes::FORMAT_BASIC_FALLBACK,
                        &shape.name,
                        format!(
                            "Section {} written without formatting: {}",
                            section.number, e
                        ),
                    );
                    render_basic(section, shape)
                }
            }
        } else {
            render_basic(section, shape)
        };
        rendered?;

        for (i, other) in target.shapes.iter_mut().enumerate() {
            if i == primary {
                continue;
            }
            if let Some(frame) = other.text_frame.as_mut() {
                frame.clear();
            }
        }

        debug!(section = section.number, shape = %target.shapes[primary].name, "section injected");
        Ok(())
    }
}

fn has_run_data(section: &Section) -> bool {
    section.formatting.iter().any(|runs| !runs.is_empty())
}

/// Index of the first text-capable shape, synthesizing a textbox if the
/// slide has none
fn primary_shape(target: &mut Slide, template: &Slide, ctx: &mut ConversionContext<'_>) -> usize {
    if let Some(index) = target.shapes.iter().position(Shape::is_text_capable) {
        return index;
    }

    let mut textbox = Shape::new(0, String::new(), ShapeKind::TextBox);
    let mut frame = TextFrame::new();
    match template.first_text_shape() {
        Some(source) => {
            copy_shape_format(source, &mut textbox, ctx);
            if let Some(source_frame) = &source.text_frame {
                copy_text_frame(source_frame, &mut frame);
                if let Some(run) = source_frame.paragraphs.iter().flat_map(|p| &p.runs).next() {
                    frame.default_format.overlay(&run.format);
                }
            }
            if textbox.geometry.is_none() {
                textbox.geometry = Some(ctx.config().default_textbox);
            }
            debug!(source = %source.name, "textbox synthesized from template shape");
        }
        None => {
            textbox.geometry = Some(ctx.config().default_textbox);
            frame.default_format = ctx.default_format().clone();
            debug!("textbox synthesized at default position");
        }
    }
    textbox.text_frame = Some(frame);

    let added = target.add_shape(textbox);
    added.name = format!("TextBox {}", added.id - 1);
    target.shapes.len() - 1
}

/// One paragraph per content line, one run per non-blank fragment
fn render_formatted(section: &Section, shape: &mut Shape) -> Result<(), ContentInjectionError> {
    if section.content.len() != section.formatting.len() {
        return Err(ContentInjectionError::FormattingMismatch {
            content: section.content.len(),
            formatting: section.formatting.len(),
        });
    }
    let frame = shape
        .text_frame
        .as_mut()
        .ok_or_else(|| ContentInjectionError::NoTextFrame {
            shape: shape.name.clone(),
        })?;

    frame.clear();
    for (i, (line, runs)) in section.content.iter().zip(&section.formatting).enumerate() {
        let paragraph = if i == 0 {
            frame.first_paragraph_mut()
        } else {
            frame.add_paragraph()
        };

        if runs.is_empty() {
            paragraph.add_run(Run::new(line.clone()));
            continue;
        }
        if let Some(alignment) = runs.iter().find_map(|r| r.format.alignment) {
            paragraph.alignment = Some(alignment);
        }
        if let Some(level) = runs.iter().find_map(|r| r.format.indent_level) {
            paragraph.level = Some(level);
        }
        for run in runs.iter().filter(|r| !r.is_blank()) {
            let added = paragraph.add_run(Run::new(run.text.clone()));
            added.format.overlay(&run.format);
            added.format.alignment = None;
            added.format.indent_level = None;
        }
    }
    Ok(())
}

/// Text written by the plain rendering, one entry per line
pub fn basic_lines(section: &Section) -> Vec<String> {
    let title_text = if section.is_preamble() {
        section.title.clone()
    } else {
        format!("{}. {}", section.number, section.title)
    };

    let body = section.body_lines();
    let mut body_text = if body.is_empty() {
        section.text_only.clone()
    } else {
        body.join("\n")
    };
    if body_text.trim().is_empty() {
        body_text = title_text.clone();
    }

    let text = if title_text == body_text {
        title_text
    } else {
        format!("{}\n{}", title_text, body_text)
    };

    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn render_basic(section: &Section, shape: &mut Shape) -> Result<(), ContentInjectionError> {
    let frame = shape
        .text_frame
        .as_mut()
        .ok_or_else(|| ContentInjectionError::NoTextFrame {
            shape: shape.name.clone(),
        })?;
    frame.set_text(&basic_lines(section).join("\n"));
    Ok(())
}
