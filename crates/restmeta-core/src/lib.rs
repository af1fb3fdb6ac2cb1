//! restmeta core
//!
//! Shared domain model: diagnostics, configuration, dialect strategies and
//! per-column metadata records.
//! Never rename diagnostic codes - they are part of the public API.

pub mod diagnostic;
pub mod config;
pub mod dialect;
pub mod metadata;
pub mod report;

pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use config::{Config, ConfigError, DialectConfig, ResourceDefinition, SeverityThreshold};
pub use dialect::{CaseFolding, Dialect, SequenceDefault};
pub use metadata::ResolvedColumnMetadata;
pub use report::{Report, ReportVersion, ResourceReport};
