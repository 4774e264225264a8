//! Explicit per-run context
//!
//! Every component receives a [`ConversionContext`] instead of reaching
//! for global state. It carries the configuration (including the default
//! format), the diagnostics sink and the optional progress callback.

use std::fmt;

use docdeck_model::FormatDescriptor;
use tracing::{debug, error, info, trace, warn};

use crate::config::ConvertConfig;
use crate::diagnostics::{Diagnostic, Diagnostics, Severity};

/// Denominator of every progress event
pub const PROGRESS_TOTAL: f64 = 5.0;

/// Fixed pipeline checkpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parsing,
    Parsed,
    TemplateLoaded,
    Analyzed,
    Section,
    Saving,
}

impl Stage {
    /// Position of the checkpoint on the 0..=5 scale
    pub fn checkpoint(&self) -> f64 {
        match self {
            Self::Parsing => 0.0,
            Self::Parsed => 1.0,
            Self::TemplateLoaded => 2.0,
            Self::Analyzed => 3.0,
            Self::Section => 4.0,
            Self::Saving => 5.0,
        }
    }
}

/// One progress notification
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub stage: Stage,
    pub current: f64,
    pub total: f64,
    pub message: String,
}

impl ProgressEvent {
    /// Completion ratio in `0.0..=1.0`
    pub fn fraction(&self) -> f64 {
        (self.current / self.total).clamp(0.0, 1.0)
    }
}

type ProgressFn<'a> = Box<dyn FnMut(&ProgressEvent) + 'a>;

/// State shared by all components during one conversion
pub struct ConversionContext<'a> {
    config: ConvertConfig,
    diagnostics: Diagnostics,
    section: Option<u64>,
    progress: Option<ProgressFn<'a>>,
}

impl Default for ConversionContext<'_> {
    fn default() -> Self {
        Self::new(ConvertConfig::default())
    }
}

impl fmt::Debug for ConversionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionContext")
            .field("config", &self.config)
            .field("diagnostics", &self.diagnostics.len())
            .field("section", &self.section)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl<'a> ConversionContext<'a> {
    pub fn new(config: ConvertConfig) -> Self {
        Self {
            config,
            diagnostics: Diagnostics::new(),
            section: None,
            progress: None,
        }
    }

    /// Install a progress callback; it runs inline at each checkpoint
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&ProgressEvent) + 'a,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    pub fn default_format(&self) -> &FormatDescriptor {
        &self.config.default_format
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Move the collected diagnostics out, leaving the sink empty
    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }

    /// Section attached to subsequent diagnostics
    pub fn set_section(&mut self, number: Option<u64>) {
        self.section = number;
    }

    /// Record a diagnostic and mirror it to the log
    pub fn report(&mut self, mut diagnostic: Diagnostic) {
        if diagnostic.section.is_none() {
            diagnostic.section = self.section;
        }
        let code = diagnostic.code.as_deref().unwrap_or("-");
        match diagnostic.severity {
            Severity::Hint => trace!(code, "{}", diagnostic.message),
            Severity::Info => debug!(code, "{}", diagnostic.message),
            Severity::Warning => warn!(code, "{}", diagnostic.message),
            Severity::Error => error!(code, "{}", diagnostic.message),
        }
        self.diagnostics.push(diagnostic);
    }

    /// Record a format degradation on `shape`
    pub fn degrade(&mut self, code: &str, shape: &str, message: impl Into<String>) {
        self.report(
            Diagnostic::warning(message)
                .with_code(code)
                .with_shape(shape),
        );
    }

    /// Notify the progress callback
    pub fn progress(&mut self, stage: Stage, current: f64, message: impl Into<String>) {
        let event = ProgressEvent {
            stage,
            current,
            total: PROGRESS_TOTAL,
            message: message.into(),
        };
        info!(
            stage = ?event.stage,
            "[{:.1}/{}] {}",
            event.current,
            event.total,
            event.message
        );
        if let Some(callback) = self.progress.as_mut() {
            callback(&event);
        }
    }

    /// Notify a fixed checkpoint
    pub fn checkpoint(&mut self, stage: Stage, message: impl Into<String>) {
        self.progress(stage, stage.checkpoint(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_callback_receives_events() {
        let mut seen = Vec::new();
        {
            let mut ctx = ConversionContext::default().with_progress(|e| {
                seen.push((e.stage, e.current));
            });
            ctx.checkpoint(Stage::Parsing, "reading");
            ctx.progress(Stage::Section, 4.4, "section 1 of 2");
            ctx.checkpoint(Stage::Saving, "saving");
        }
        assert_eq!(
            seen,
            vec![
                (Stage::Parsing, 0.0),
                (Stage::Section, 4.4),
                (Stage::Saving, 5.0)
            ]
        );
    }

    #[test]
    fn test_report_attaches_current_section() {
        let mut ctx = ConversionContext::default();
        ctx.set_section(Some(7));
        ctx.degrade("FORMAT_FILL_DEGRADED", "Oval 3", "gradient fill dropped");
        ctx.set_section(None);
        ctx.report(Diagnostic::info("done"));

        let diags: Vec<_> = ctx.take_diagnostics().into_iter().collect();
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].section, Some(7));
        assert_eq!(diags[0].shape.as_deref(), Some("Oval 3"));
        assert_eq!(diags[1].section, None);
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn test_progress_fraction() {
        let event = ProgressEvent {
            stage: Stage::Analyzed,
            current: 3.0,
            total: PROGRESS_TOTAL,
            message: String::new(),
        };
        assert!((event.fraction() - 0.6).abs() < f64::EPSILON);
    }
}
