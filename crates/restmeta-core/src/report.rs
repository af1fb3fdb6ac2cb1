//! Resolution report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::config::DialectConfig;
use crate::diagnostic::{Diagnostic, Severity};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total number of diagnostics
    pub total: usize,

    /// Number of errors
    pub errors: usize,

    /// Number of warnings
    pub warnings: usize,

    /// Number of info messages
    pub info: usize,

    /// Number of resources resolved
    pub resources: usize,
}

/// Resolution outcome for one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceReport {
    pub name: String,

    /// Fallback table for columns with no known origin
    pub default_table: String,

    /// Correlation name -> base table
    pub aliases: BTreeMap<String, String>,

    /// Projected column -> declared origin
    pub origins: BTreeMap<String, String>,

    pub diagnostics: Vec<Diagnostic>,
}

/// Resolution report (report.json v1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version
    pub version: ReportVersion,

    /// Dialect the resources were resolved with
    pub dialect: DialectConfig,

    /// Summary statistics
    pub summary: ReportSummary,

    /// Per-resource results, in configuration order
    pub resources: Vec<ResourceReport>,
}

impl Report {
    /// Create a new empty report
    pub fn new(dialect: DialectConfig) -> Self {
        Self {
            version: ReportVersion::CURRENT,
            dialect,
            summary: ReportSummary::default(),
            resources: Vec::new(),
        }
    }

    /// Add a resource result, counting its diagnostics
    pub fn add_resource(&mut self, resource: ResourceReport) {
        for diagnostic in &resource.diagnostics {
            match diagnostic.severity {
                Severity::Error => self.summary.errors += 1,
                Severity::Warn => self.summary.warnings += 1,
                Severity::Info => self.summary.info += 1,
            }
            self.summary.total += 1;
        }

        self.summary.resources += 1;
        self.resources.push(resource);
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{Diagnostic, DiagnosticCode, Severity};

    fn resource(diagnostics: Vec<Diagnostic>) -> ResourceReport {
        ResourceReport {
            name: "films".to_string(),
            default_table: "FILM".to_string(),
            aliases: BTreeMap::from([("F".to_string(), "FILM".to_string())]),
            origins: BTreeMap::from([("TITLE".to_string(), "F".to_string())]),
            diagnostics,
        }
    }

    #[test]
    fn empty_report() {
        let report = Report::new(DialectConfig::Oracle);
        assert_eq!(report.version, ReportVersion::CURRENT);
        assert_eq!(report.summary.total, 0);
        assert!(!report.has_errors());
    }

    #[test]
    fn report_counts_diagnostics() {
        let mut report = Report::new(DialectConfig::Oracle);
        report.add_resource(resource(vec![
            Diagnostic::new(DiagnosticCode::SqlParseError, Severity::Error, "bad query"),
            Diagnostic::new(DiagnosticCode::SqlUnsupportedFrom, Severity::Warn, "subquery"),
        ]));
        report.add_resource(resource(Vec::new()));

        assert_eq!(report.summary.resources, 2);
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.summary.warnings, 1);
        assert!(report.has_errors());
    }

    #[test]
    fn report_serialization() {
        let mut report = Report::new(DialectConfig::Postgres);
        report.add_resource(resource(Vec::new()));

        let json = report.to_json().unwrap();
        assert!(json.contains("\"version\""));
        assert!(json.contains("\"postgres\""));
        assert!(json.contains("\"TITLE\": \"F\""));
    }
}
