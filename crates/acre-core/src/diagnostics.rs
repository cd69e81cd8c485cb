//! Diagnostics infrastructure for tracking issues during planning runs.
//!
//! The optimizer never logs; anything a caller should know about (dropped
//! candidates, weather gaps, deadline expiry) is collected here and carried
//! on the optimization result. It supports:
//!
//! - Severity levels (Warning, Error)
//! - Categories for grouping issues (see [`codes`])
//! - Optional entity references (e.g. "Field north-40", "Crop tomato")
//! - Serialization for JSON output
//!
//! # Example
//!
//! ```
//! use acre_core::diagnostics::{codes, Diagnostics, Severity};
//!
//! let mut diag = Diagnostics::new();
//! diag.add_warning_with_entity(codes::WEATHER_GAP, "12 start dates dropped", "Field north-40");
//! diag.add_warning(codes::NO_VIABLE_CANDIDATES, "no candidate completes before horizon end");
//!
//! assert_eq!(diag.warning_count(), 2);
//! assert!(!diag.has_errors());
//! ```

use serde::Serialize;

/// Well-known diagnostic categories surfaced on optimization results.
pub mod codes {
    /// The candidate generator produced an empty pool.
    pub const NO_VIABLE_CANDIDATES: &str = "no_viable_candidates";
    /// The weather series lacked entries for required dates.
    pub const WEATHER_GAP: &str = "weather_gap";
    /// The computation time budget expired before convergence.
    pub const DEADLINE: &str = "deadline";
    /// Request or configuration problems found during validation.
    pub const VALIDATION: &str = "validation";
}

/// Severity level for diagnostic issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Unusual but the run continued (e.g. candidates dropped)
    Warning,
    /// The run could not complete an element or operation
    Error,
}

/// A single diagnostic issue encountered during a run
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    /// Severity of the issue
    pub severity: Severity,
    /// Category for grouping (see [`codes`])
    pub category: String,
    /// Human-readable description of the issue
    pub message: String,
    /// Optional entity reference (e.g. "Field north-40")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl DiagnosticIssue {
    /// Create a new diagnostic issue
    pub fn new(severity: Severity, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            entity: None,
        }
    }

    /// Add an entity reference to the issue
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };

        write!(f, "[{}:{}] {}", severity, self.category, self.message)?;

        if let Some(entity) = &self.entity {
            write!(f, " ({})", entity)?;
        }

        Ok(())
    }
}

/// Collection of diagnostic issues for a planning run
///
/// This is the primary container for tracking warnings and errors during
/// candidate generation, optimization, and result assembly.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    /// All collected issues
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    /// Create new empty diagnostics
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw issue directly
    pub fn add(&mut self, issue: DiagnosticIssue) {
        self.issues.push(issue);
    }

    /// Add a warning with category and message
    pub fn add_warning(&mut self, category: &str, message: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message));
    }

    /// Add a warning with an entity reference
    pub fn add_warning_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message).with_entity(entity));
    }

    /// Add an error with category and message
    pub fn add_error(&mut self, category: &str, message: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Error, category, message));
    }

    /// Add an error with an entity reference
    pub fn add_error_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Error, category, message).with_entity(entity));
    }

    /// Merge another diagnostics collection into this one
    pub fn extend(&mut self, other: Diagnostics) {
        self.issues.extend(other.issues);
    }

    /// Number of warnings collected
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Number of errors collected
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    /// True if any error-severity issue was collected
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    /// True if any issue in the given category was collected
    pub fn has_category(&self, category: &str) -> bool {
        self.issues.iter().any(|i| i.category == category)
    }

    /// True if nothing was collected
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for issue in &self.issues {
            writeln!(f, "{}", issue)?;
        }
        Ok(())
    }
}
