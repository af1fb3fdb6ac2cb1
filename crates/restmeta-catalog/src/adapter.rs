//! Catalog adapter trait for enumerating table columns and primary keys

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a table in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableIdentifier {
    /// Schema/owner name, when known
    pub schema: Option<String>,

    /// Table name
    pub table: String,
}

impl TableIdentifier {
    /// Create a new table identifier
    pub fn new(schema: Option<String>, table: impl Into<String>) -> Self {
        Self {
            schema,
            table: table.into(),
        }
    }

    /// Create a schema-qualified identifier
    pub fn qualified(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self::new(Some(schema.into()), table)
    }

    /// Get fully qualified name
    pub fn fqn(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.table),
            None => self.table.clone(),
        }
    }
}

impl fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}

/// One row of a dialect's columns query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogColumn {
    pub name: String,

    pub data_type: String,

    /// Captured default-value text
    pub default_value: Option<String>,

    /// MySQL `extra` attribute, e.g. `auto_increment`
    pub extra: Option<String>,
}

impl CatalogColumn {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            default_value: None,
            extra: None,
        }
    }

    /// Set the captured default
    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }
}

/// Errors that can occur when querying the catalog
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Query failed: {0}")]
    QueryError(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Trait for driver-level catalog introspection
///
/// Implementations run the active dialect's `columns_query` and
/// `primary_key_query` with the table's schema and name as parameters.
#[async_trait::async_trait]
pub trait CatalogAdapter: Send + Sync {
    /// Get the adapter name (e.g., "Oracle", "PostgreSQL")
    fn name(&self) -> &'static str;

    /// Enumerate the columns of a table
    async fn fetch_columns(&self, table: &TableIdentifier) -> Result<Vec<CatalogColumn>, FetchError>;

    /// Enumerate the primary-key column names of a table
    async fn fetch_primary_keys(&self, table: &TableIdentifier) -> Result<Vec<String>, FetchError>;

    /// Test the connection to the database
    async fn test_connection(&self) -> Result<(), FetchError>;
}
