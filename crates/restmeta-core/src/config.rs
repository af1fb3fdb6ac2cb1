//! Configuration schema (restmeta.toml)

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use crate::diagnostic::{DiagnosticCode, Severity};

/// SQL dialect configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectConfig {
    /// Oracle Database
    Oracle,

    /// PostgreSQL
    Postgres,

    /// MySQL / MariaDB
    MySql,

    /// Generic ANSI SQL
    #[default]
    Ansi,
}

/// Severity threshold overrides for specific diagnostic codes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityThreshold {
    /// Map of diagnostic code to severity override
    pub overrides: HashMap<String, Severity>,
}

impl SeverityThreshold {
    /// Get severity for a diagnostic code, or default
    pub fn get_severity(&self, code: DiagnosticCode, default: Severity) -> Severity {
        self.overrides
            .get(code.as_str())
            .copied()
            .unwrap_or(default)
    }
}

/// A SQL-backed resource: a query plus the table writes default to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    /// Resource name, unique within a config
    pub name: String,

    /// SELECT statement backing the resource
    pub query: String,

    /// Primary table, used when a column's origin cannot be determined
    pub table: String,

    /// Schema or owner the tables live in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

impl ResourceDefinition {
    pub fn new(name: impl Into<String>, query: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
            table: table.into(),
            database: None,
        }
    }

    /// Set the schema/owner
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// The fallback target for columns with no known origin
    pub fn default_table(&self) -> &str {
        &self.table
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SQL dialect
    #[serde(default)]
    pub dialect: DialectConfig,

    /// Severity thresholds
    #[serde(default)]
    pub severity: SeverityThreshold,

    /// Resource definitions
    #[serde(default)]
    pub resources: Vec<ResourceDefinition>,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find a resource definition by name
    pub fn resource(&self, name: &str) -> Option<&ResourceDefinition> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Reject duplicate resource names and resources without a table
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();

        for resource in &self.resources {
            if !seen.insert(resource.name.as_str()) {
                return Err(ConfigError::InvalidResource {
                    name: resource.name.clone(),
                    reason: "duplicate resource name".to_string(),
                });
            }

            if resource.table.trim().is_empty() {
                return Err(ConfigError::InvalidResource {
                    name: resource.name.clone(),
                    reason: "table must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid resource '{name}': {reason}")]
    InvalidResource { name: String, reason: String },
}
