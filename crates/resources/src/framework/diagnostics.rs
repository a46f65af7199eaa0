use serde::Serialize;
use warden_core::AppError;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The operation failed.
    Error,
    /// The operation succeeded with a caveat.
    Warning,
}

/// One diagnostic reported back to Terraform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity.
    pub severity: Severity,
    /// Short summary line.
    pub summary: String,
    /// Detailed explanation.
    pub detail: String,
}

/// Diagnostics accumulated during one lifecycle call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Records an error.
    pub fn add_error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.entries.push(Diagnostic {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
        });
    }

    /// Records a warning.
    pub fn add_warning(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.entries.push(Diagnostic {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
        });
    }

    /// Records an application error raised while running `operation` on the
    /// resource identified by `subject`.
    pub fn add_app_error(&mut self, operation: &str, subject: &str, error: &AppError) {
        self.add_error(
            format!("Unable to {operation} {subject}"),
            format!("Could not {operation} {subject}: {error}"),
        );
    }

    /// Returns true when at least one error was recorded.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.severity == Severity::Error)
    }

    /// Returns the recorded entries in order.
    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        self.entries.as_slice()
    }

    /// Returns true when nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
