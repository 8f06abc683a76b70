use std::fmt;
use std::io::{self, Write};

use serde::Serialize;

/// Category of a single diagnostic.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// File missing, unreadable, unparseable, or missing a required section. Halts the pass.
    Structural,
    /// A field is present but has the wrong type, value or range.
    Schema,
    /// Cross-field problem: out-of-grid or duplicate position, unknown enum value.
    Semantic,
    /// Informational; never blocks acceptance.
    Warning,
}

impl DiagnosticKind {
    pub fn is_error(self) -> bool {
        !matches!(self, DiagnosticKind::Warning)
    }
}

/// One message produced by a validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// 1-based button index when the message concerns a single button.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button: Option<usize>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Ordered errors and warnings of one validation pass.
///
/// Only the validator appends; everyone else gets a shared reference or owns a finished copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no error was recorded. Warnings never affect this.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    pub(crate) fn push(&mut self, kind: DiagnosticKind, button: Option<usize>, message: String) {
        let diagnostic = Diagnostic {
            kind,
            button,
            message,
        };
        if kind.is_error() {
            self.errors.push(diagnostic);
        } else {
            self.warnings.push(diagnostic);
        }
    }

    /// Write the human-readable report: errors first, then warnings, one bullet each.
    ///
    /// "Configuration is valid." is written only when both lists are empty.
    pub fn write_report<W: Write>(&self, mut out: W) -> io::Result<()> {
        if !self.errors.is_empty() {
            writeln!(out, "Configuration errors:")?;
            for error in &self.errors {
                writeln!(out, "  - {error}")?;
            }
        }
        if !self.warnings.is_empty() {
            writeln!(out, "Configuration warnings:")?;
            for warning in &self.warnings {
                writeln!(out, "  - {warning}")?;
            }
        }
        if self.is_empty() {
            writeln!(out, "Configuration is valid.")?;
        }
        Ok(())
    }

    /// Render the report into a `String`.
    pub fn report(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_report(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}
