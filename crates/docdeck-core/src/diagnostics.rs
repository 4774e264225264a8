//! Conversion diagnostics
//!
//! Recoverable problems met during a conversion (degraded fills,
//! unreadable pictures, skipped sections) are collected here instead of
//! being raised. The result record is built from this collection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix shared by the codes of format-degradation diagnostics
pub const FORMAT_CODE_PREFIX: &str = "FORMAT_";

/// How much a diagnostic matters to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Logged at trace level, never surfaced in the result
    Hint,
    Info,
    /// Fidelity was lost or content was skipped
    Warning,
    Error,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Severity::Hint => "hint",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One recorded problem, pinned to the section and shape it came from
///
/// # Example
///
/// ```
/// use docdeck_core::diagnostics::Diagnostic;
///
/// let diag = Diagnostic::warning("gradient fill replaced by no fill")
///     .with_code("FORMAT_FILL_DEGRADED")
///     .with_shape("Rectangle 4")
///     .with_section(3);
/// assert!(diag.is_format_issue());
/// assert_eq!(
///     diag.to_string(),
///     "warning: section 3, shape 'Rectangle 4': gradient fill replaced by no fill [FORMAT_FILL_DEGRADED]"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Section being converted when the problem occurred
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<u64>,
    /// Template shape the problem concerns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            code: None,
            section: None,
            shape: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn hint(message: impl Into<String>) -> Self {
        Self::new(Severity::Hint, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_section(mut self, number: u64) -> Self {
        self.section = Some(number);
        self
    }

    pub fn with_shape(mut self, shape: impl Into<String>) -> Self {
        self.shape = Some(shape.into());
        self
    }

    /// True for warnings and above whose code marks a format degradation
    pub fn is_format_issue(&self) -> bool {
        self.severity >= Severity::Warning
            && self
                .code
                .as_deref()
                .is_some_and(|c| c.starts_with(FORMAT_CODE_PREFIX))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.severity)?;
        match (self.section, self.shape.as_deref()) {
            (Some(n), Some(shape)) => write!(f, "section {}, shape '{}': ", n, shape)?,
            (Some(n), None) => write!(f, "section {}: ", n)?,
            (None, Some(shape)) => write!(f, "shape '{}': ", shape)?,
            (None, None) => {}
        }
        f.write_str(&self.message)?;
        if let Some(code) = &self.code {
            write!(f, " [{}]", code)?;
        }
        Ok(())
    }
}

/// Diagnostics in the order they were reported
#[derive(Debug, Clone, Default)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    /// Number of diagnostics at exactly `severity`
    pub fn count(&self, severity: Severity) -> usize {
        self.0.iter().filter(|d| d.severity == severity).count()
    }

    /// Messages of every format-degradation diagnostic, in order
    pub fn format_issues(&self) -> Vec<String> {
        self.0
            .iter()
            .filter(|d| d.is_format_issue())
            .map(|d| d.message.clone())
            .collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_is_not_a_format_issue() {
        let diag = Diagnostic::hint("connector skipped").with_code("FORMAT_SHAPE_UNSUPPORTED");
        assert!(!diag.is_format_issue());

        let uncoded = Diagnostic::warning("something else");
        assert!(!uncoded.is_format_issue());

        let failed = Diagnostic::error("picture lost").with_code("FORMAT_IMAGE_UNREADABLE");
        assert!(failed.is_format_issue());
    }

    #[test]
    fn test_collection_counts_and_issues() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::warning("fill degraded").with_code("FORMAT_FILL_DEGRADED"));
        diags.push(Diagnostic::warning("section 3 skipped").with_code("SECTION_SKIPPED"));
        diags.push(Diagnostic::error("boom"));
        diags.push(Diagnostic::hint("ignored").with_code("FORMAT_SHAPE_UNSUPPORTED"));

        assert_eq!(diags.len(), 4);
        assert_eq!(diags.count(Severity::Warning), 2);
        assert_eq!(diags.count(Severity::Error), 1);
        assert_eq!(diags.count(Severity::Info), 0);
        assert_eq!(diags.format_issues(), vec!["fill degraded".to_string()]);
    }

    #[test]
    fn test_display_without_location() {
        let diag = Diagnostic::info("template analysed");
        assert_eq!(diag.to_string(), "info: template analysed");

        let shape_only = Diagnostic::warning("line dropped").with_shape("Connector 9");
        assert_eq!(shape_only.to_string(), "warning: shape 'Connector 9': line dropped");
    }

    #[test]
    fn test_serialized_form_omits_empty_location() {
        let diag = Diagnostic::info("analysed").with_code("TEMPLATE_ANALYZED");
        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("\"severity\":\"info\""));
        assert!(!json.contains("section"));
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back, diag);
    }
}
