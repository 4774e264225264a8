//! Format-preserving shape cloner
//!
//! [`clone_shape`] dispatches on the shape kind; each arm recreates the
//! shape on the target slide and copies its formatting through the
//! primitives in [`crate::format`]. [`clone_slide`] applies it to every
//! shape in z-order, recording failures without stopping.

use docdeck_model::{Deck, Picture, Shape, ShapeKind, Slide, Table, TextFrame};
use tracing::debug;

use crate::context::ConversionContext;
use crate::diagnostics::Diagnostic;
use crate::error::ShapeCloneError;
use crate::format::{copy_background, copy_shape_format, copy_table, copy_text_frame};

/// Outcome of a successful [`clone_shape`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClonedShape {
    /// A new shape was appended at this index of the target slide
    Added(usize),
    /// Text was copied into the target placeholder at this index
    Placeholder(usize),
    /// The target slide has no placeholder with the source index
    Unmatched,
}

/// Summary of a [`clone_slide`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloneReport {
    pub cloned: usize,
    pub unmatched: usize,
    pub failures: Vec<ShapeCloneError>,
}

impl CloneReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

fn recreate(
    source: &Shape,
    kind: ShapeKind,
    target: &mut Slide,
    ctx: &mut ConversionContext<'_>,
) -> ClonedShape {
    let mut shape = Shape::new(0, source.name.clone(), kind);
    copy_shape_format(source, &mut shape, ctx);
    if let Some(frame) = &source.text_frame {
        let mut copied = TextFrame::new();
        copy_text_frame(frame, &mut copied);
        shape.text_frame = Some(copied);
    }
    target.add_shape(shape);
    ClonedShape::Added(target.shapes.len() - 1)
}

/// Reproduce `source` on `target`.
///
/// Placeholders are matched by index and only receive text; every other
/// kind is recreated at the source geometry with a fresh id.
pub fn clone_shape(
    source: &Shape,
    target: &mut Slide,
    ctx: &mut ConversionContext<'_>,
) -> Result<ClonedShape, ShapeCloneError> {
    debug!(shape = %source.name, kind = source.kind_name(), "cloning shape");

    match &source.kind {
        ShapeKind::Placeholder { idx, .. } => {
            let Some(index) = target
                .shapes
                .iter()
                .position(|s| s.placeholder_idx() == Some(*idx))
            else {
                debug!(idx, "no matching placeholder on target");
                return Ok(ClonedShape::Unmatched);
            };
            if let Some(frame) = &source.text_frame {
                let placeholder = &mut target.shapes[index];
                copy_text_frame(frame, placeholder.text_frame.get_or_insert_with(TextFrame::new));
            }
            Ok(ClonedShape::Placeholder(index))
        }
        ShapeKind::TextBox => Ok(recreate(source, ShapeKind::TextBox, target, ctx)),
        ShapeKind::Picture(picture) => {
            let Some(image) = &picture.image else {
                return Err(ShapeCloneError::unreadable_image(
                    &source.name,
                    "image payload is missing",
                ));
            };
            if let Err(e) = image.format() {
                return Err(ShapeCloneError::unreadable_image(&source.name, e.to_string()));
            }
            let kind = ShapeKind::Picture(Picture {
                image: Some(image.clone()),
                description: picture.description.clone(),
            });
            Ok(recreate(source, kind, target, ctx))
        }
        ShapeKind::AutoShape { preset } => {
            let kind = ShapeKind::AutoShape {
                preset: preset.clone(),
            };
            Ok(recreate(source, kind, target, ctx))
        }
        ShapeKind::Table(table) => {
            let (width, height) = source
                .geometry
                .map(|g| (g.width, g.height))
                .unwrap_or_default();
            let mut copied = Table::new(table.row_count(), table.column_count(), width, height);
            copy_table(table, &mut copied);
            Ok(recreate(source, ShapeKind::Table(copied), target, ctx))
        }
        ShapeKind::Other { element, .. } => Err(ShapeCloneError::unsupported(&source.name, element)),
    }
}

fn record_failure(error: &ShapeCloneError, ctx: &mut ConversionContext<'_>) {
    match error {
        ShapeCloneError::UnreadableImage { shape, .. } => {
            ctx.degrade(error.code(), shape, error.to_string());
        }
        ShapeCloneError::Unsupported { shape, .. } => {
            ctx.report(
                Diagnostic::hint(error.to_string())
                    .with_code(error.code())
                    .with_shape(shape.as_str()),
            );
        }
    }
}

/// Clone the background and every shape of `source` onto `target`
pub fn clone_slide(
    source: &Slide,
    target: &mut Slide,
    ctx: &mut ConversionContext<'_>,
) -> CloneReport {
    let mut report = CloneReport::default();

    if let Some(background) = &source.background {
        target.background = Some(copy_background(background, ctx));
    }

    for shape in &source.shapes {
        match clone_shape(shape, target, ctx) {
            Ok(ClonedShape::Unmatched) => report.unmatched += 1,
            Ok(_) => report.cloned += 1,
            Err(e) => {
                record_failure(&e, ctx);
                report.failures.push(e);
            }
        }
    }

    debug!(
        cloned = report.cloned,
        unmatched = report.unmatched,
        failed = report.failures.len(),
        "slide cloned"
    );
    report
}

/// Append `copies` clones of the slide at `index`, returning the indices
/// of the new slides
pub fn duplicate_slide(
    deck: &mut Deck,
    index: usize,
    copies: usize,
    ctx: &mut ConversionContext<'_>,
) -> docdeck_model::Result<Vec<usize>> {
    let source = deck
        .slide(index)
        .cloned()
        .ok_or(docdeck_model::ModelError::SlideOutOfRange {
            index,
            count: deck.slide_count(),
        })?;

    let mut created = Vec::with_capacity(copies);
    for _ in 0..copies {
        let target = deck.add_slide(&source.layout);
        clone_slide(&source, target, ctx);
        created.push(deck.slide_count() - 1);
    }
    Ok(created)
}
