//! Diagnostic codes and error reporting
//!
//! Resolution never fails outright. Every degradation (unparseable query,
//! unsupported FROM construct, ambiguous projection) is reported as a
//! structured diagnostic instead.
//!
//! IMPORTANT: Diagnostic codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Diagnostic code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    /// Failed to parse the resource query
    SqlParseError,

    /// The statement is not a single plain SELECT
    SqlUnsupportedSyntax,

    /// A FROM-clause construct outside base tables and outer joins
    SqlUnsupportedFrom,

    /// Two projected columns share the same folded output name
    SqlAmbiguousProjection,

    /// A column qualifier names neither an alias nor a declared table
    SqlDanglingCorrelation,

    /// Catalog columns or primary keys could not be fetched for a table
    CatalogFetchFailed,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SqlParseError => "SQL_PARSE_ERROR",
            Self::SqlUnsupportedSyntax => "SQL_UNSUPPORTED_SYNTAX",
            Self::SqlUnsupportedFrom => "SQL_UNSUPPORTED_FROM",
            Self::SqlAmbiguousProjection => "SQL_AMBIGUOUS_PROJECTION",
            Self::SqlDanglingCorrelation => "SQL_DANGLING_CORRELATION",
            Self::CatalogFetchFailed => "CATALOG_FETCH_FAILED",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning - attribution quality is reduced
    Warn,

    /// Error - the query could not be analysed at all
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message with structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Resource the diagnostic was raised for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Offending construct: a FROM node kind, a column name or a table name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with minimal fields
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            context: None,
            subject: None,
        }
    }

    /// Set the resource context
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Set the offending construct
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.severity, self.code)?;
        if let Some(context) = &self.context {
            write!(f, " {}:", context)?;
        }
        write!(f, " {}", self.message)
    }
}
