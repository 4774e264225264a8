//! Format copy primitives
//!
//! Shared by the shape cloner and the content injector. Attributes that
//! are `None` on the source are left alone on the target, so a copy is a
//! partial overwrite rather than a reset. Fills the target cannot carry
//! are replaced by [`Fill::NoFill`] and recorded as format issues.

use docdeck_model::{Fill, Line, Run, Shape, Table, TextFrame, TextParagraph};
use tracing::debug;

use crate::context::ConversionContext;
use crate::error::codes;

fn transfer_fill(
    source: &Fill,
    ctx: &mut ConversionContext<'_>,
    code: &str,
    subject: &str,
) -> Fill {
    match source {
        Fill::NoFill => Fill::NoFill,
        Fill::Solid(color) => Fill::Solid(*color),
        Fill::Unsupported { kind, .. } => {
            ctx.degrade(
                code,
                subject,
                format!(
                    "{} fill on '{}' replaced by no fill",
                    kind.name(),
                    subject
                ),
            );
            Fill::NoFill
        }
    }
}

/// Copy a shape fill: solid colors verbatim, everything else degrades
pub fn copy_fill(source: &Fill, ctx: &mut ConversionContext<'_>, shape: &str) -> Fill {
    transfer_fill(source, ctx, codes::FORMAT_FILL_DEGRADED, shape)
}

/// Copy a slide background with the same rule as [`copy_fill`]
pub fn copy_background(source: &Fill, ctx: &mut ConversionContext<'_>) -> Fill {
    transfer_fill(source, ctx, codes::FORMAT_BACKGROUND_DEGRADED, "background")
}

/// Outline for the target: copied when visible, otherwise an explicit
/// zero width so no inherited outline appears
pub fn copy_line(source: Option<&Line>) -> Line {
    match source {
        Some(line) if line.is_visible() => *line,
        _ => Line::zero(),
    }
}

/// Copy geometry, fill, outline and rotation
pub fn copy_shape_format(source: &Shape, target: &mut Shape, ctx: &mut ConversionContext<'_>) {
    if let Some(geometry) = source.geometry {
        target.geometry = Some(geometry);
    }
    if let Some(fill) = &source.fill {
        target.fill = Some(copy_fill(fill, ctx, &source.name));
    }
    target.line = Some(copy_line(source.line.as_ref()));
    if source.rotation.is_some() {
        target.rotation = source.rotation;
    }
}

fn copy_paragraph(source: &TextParagraph, target: &mut TextParagraph) {
    if source.alignment.is_some() {
        target.alignment = source.alignment;
    }
    if source.level.is_some() {
        target.level = source.level;
    }
    for run in &source.runs {
        let copied = target.add_run(Run::new(run.text.clone()));
        copied.format.overlay(&run.format);
    }
}

/// Replace the text of `target` with the paragraphs of `source`.
///
/// The target is cleared first; its first paragraph is reused for the
/// first source paragraph. Body properties and the frame's default run
/// format are overlaid, and the list style is copied when the source
/// has one.
pub fn copy_text_frame(source: &TextFrame, target: &mut TextFrame) {
    target.clear();
    for (i, paragraph) in source.paragraphs.iter().enumerate() {
        let copied = if i == 0 {
            target.first_paragraph_mut()
        } else {
            target.add_paragraph()
        };
        copy_paragraph(paragraph, copied);
    }
    target.body.overlay(&source.body);
    target.default_format.overlay(&source.default_format);
    if source.list_style_xml.is_some() {
        target.list_style_xml = source.list_style_xml.clone();
    }
}

/// Copy cell text and cell frames over the region both tables share.
///
/// Returns the number of rows and columns copied.
pub fn copy_table(source: &Table, target: &mut Table) -> (usize, usize) {
    let rows = source.row_count().min(target.row_count());
    let columns = source.column_count().min(target.column_count());

    for row in 0..rows {
        for column in 0..columns {
            if let (Some(from), Some(to)) = (source.cell(row, column), target.cell_mut(row, column)) {
                copy_text_frame(&from.text_frame, &mut to.text_frame);
            }
        }
    }
    for (to, from) in target
        .column_widths
        .iter_mut()
        .zip(&source.column_widths)
        .take(columns)
    {
        *to = *from;
    }
    for (to, from) in target
        .row_heights
        .iter_mut()
        .zip(&source.row_heights)
        .take(rows)
    {
        *to = *from;
    }
    if target.style_id.is_none() {
        target.style_id = source.style_id.clone();
    }

    if rows != source.row_count() || columns != source.column_count() {
        debug!(
            rows,
            columns,
            source_rows = source.row_count(),
            source_columns = source.column_count(),
            "table copied over overlapping region"
        );
    }
    (rows, columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdeck_model::{
        Alignment, AutoFit, FillKind, FormatDescriptor, Geometry, RgbColor, ShapeKind,
        VerticalAnchor,
    };

    fn rich_frame() -> TextFrame {
        let mut frame = TextFrame::new();
        let first = frame.first_paragraph_mut();
        first.alignment = Some(Alignment::Center);
        first.add_run(Run::formatted(
            "Bold ",
            FormatDescriptor::new().with_bold(true).with_font_size_pt(32),
        ));
        first.add_run(Run::new("plain"));
        let second = frame.add_paragraph();
        second.level = Some(1);
        second.add_run(Run::formatted(
            "red",
            FormatDescriptor::new().with_color(RgbColor::new(0xFF, 0, 0)),
        ));
        frame.body.anchor = Some(VerticalAnchor::Middle);
        frame.body.auto_fit = Some(AutoFit::Normal);
        frame
    }

    #[test]
    fn test_solid_fill_copied() {
        let mut ctx = ConversionContext::default();
        let fill = copy_fill(&Fill::Solid(RgbColor::new(1, 2, 3)), &mut ctx, "Box");
        assert_eq!(fill, Fill::Solid(RgbColor::new(1, 2, 3)));
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn test_unsupported_fill_degrades() {
        for kind in [FillKind::Gradient, FillKind::Pattern, FillKind::Picture, FillKind::Unknown] {
            let mut ctx = ConversionContext::default();
            let source = Fill::Unsupported {
                kind,
                raw: Some("<a:gradFill/>".to_string()),
            };
            assert_eq!(copy_fill(&source, &mut ctx, "Oval 2"), Fill::NoFill);
            let issues = ctx.diagnostics().format_issues();
            assert_eq!(issues.len(), 1);
            assert!(issues[0].contains("Oval 2"));
        }
    }

    #[test]
    fn test_background_degradation_code() {
        let mut ctx = ConversionContext::default();
        copy_background(&Fill::unsupported(FillKind::Picture), &mut ctx);
        let diag = ctx.diagnostics().iter().next().unwrap();
        assert_eq!(diag.code.as_deref(), Some(codes::FORMAT_BACKGROUND_DEGRADED));
    }

    #[test]
    fn test_line_copy() {
        let visible = Line::solid(12_700, RgbColor::BLACK);
        assert_eq!(copy_line(Some(&visible)), visible);
        assert_eq!(copy_line(Some(&Line::default())), Line::zero());
        assert_eq!(copy_line(Some(&Line::zero())), Line::zero());
        assert_eq!(copy_line(None), Line::zero());
    }

    #[test]
    fn test_shape_format_copy() {
        let mut ctx = ConversionContext::default();
        let mut source = Shape::new(2, "Source", ShapeKind::TextBox)
            .with_geometry(Geometry::new(1, 2, 3, 4));
        source.fill = Some(Fill::Solid(RgbColor::WHITE));
        source.rotation = Some(45.0);
        let mut target = Shape::new(3, "Target", ShapeKind::TextBox);

        copy_shape_format(&source, &mut target, &mut ctx);
        assert_eq!(target.geometry, Some(Geometry::new(1, 2, 3, 4)));
        assert_eq!(target.fill, Some(Fill::Solid(RgbColor::WHITE)));
        assert_eq!(target.line, Some(Line::zero()));
        assert_eq!(target.rotation, Some(45.0));
    }

    #[test]
    fn test_text_frame_copy_reuses_first_paragraph() {
        let source = rich_frame();
        let mut target = TextFrame::new();
        target.set_text("old text\nmore old text\nand more");

        copy_text_frame(&source, &mut target);
        assert_eq!(target.paragraphs.len(), 2);
        assert_eq!(target.text(), "Bold plain\nred");
        assert_eq!(target.paragraphs[0].alignment, Some(Alignment::Center));
        assert_eq!(target.paragraphs[1].level, Some(1));
        assert_eq!(target.paragraphs[0].runs[0].format.bold, Some(true));
        assert_eq!(target.paragraphs[0].runs[0].format.font_size, Some(3200));
        assert!(target.paragraphs[0].runs[1].format.is_empty());
        assert_eq!(target.body.anchor, Some(VerticalAnchor::Middle));
    }

    #[test]
    fn test_text_frame_copy_keeps_target_defaults() {
        let mut source = TextFrame::new();
        source.set_text("x");
        let mut target = TextFrame::new();
        target.first_paragraph_mut().alignment = Some(Alignment::Right);
        target.body.word_wrap = Some(true);

        copy_text_frame(&source, &mut target);
        assert_eq!(target.paragraphs[0].alignment, Some(Alignment::Right));
        assert_eq!(target.body.word_wrap, Some(true));
    }

    #[test]
    fn test_table_copy_matching() {
        let mut source = Table::new(2, 3, 300, 200);
        for row in 0..2 {
            for column in 0..3 {
                if let Some(cell) = source.cell_mut(row, column) {
                    cell.set_text(&format!("r{}c{}", row, column));
                }
            }
        }
        let mut target = Table::new(2, 3, 300, 200);
        assert_eq!(copy_table(&source, &mut target), (2, 3));
        for row in 0..2 {
            for column in 0..3 {
                assert_eq!(
                    target.cell(row, column).map(|c| c.text()),
                    Some(format!("r{}c{}", row, column))
                );
            }
        }
    }

    #[test]
    fn test_table_copy_overlap_only() {
        let mut source = Table::new(2, 3, 300, 200);
        if let Some(cell) = source.cell_mut(0, 0) {
            cell.set_text("a");
        }
        if let Some(cell) = source.cell_mut(0, 1) {
            cell.set_text("b");
        }
        if let Some(cell) = source.cell_mut(1, 2) {
            cell.set_text("unreached");
        }
        let mut target = Table::new(1, 2, 300, 200);
        assert_eq!(copy_table(&source, &mut target), (1, 2));
        assert_eq!(target.cell(0, 0).map(|c| c.text()).as_deref(), Some("a"));
        assert_eq!(target.cell(0, 1).map(|c| c.text()).as_deref(), Some("b"));
        assert_eq!(target.row_count(), 1);
        assert_eq!(target.column_count(), 2);
    }
}
