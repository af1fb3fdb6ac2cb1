//! Mock catalog adapter for testing
//!
//! Returns predefined catalog rows without connecting to any database.
//! Useful for unit testing metadata assembly, for demos, and for
//! simulating catalog failures.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use restmeta_catalog::{CatalogColumn, MockAdapter, TableIdentifier};
//!
//! let adapter = MockAdapter::new();
//! let film = TableIdentifier::qualified("SAKILA", "FILM");
//! adapter.add_table(film.clone(), vec![CatalogColumn::new("FILM_ID", "NUMBER")], vec!["FILM_ID".into()]).await;
//!
//! let columns = adapter.fetch_columns(&film).await?;
//! ```

use crate::adapter::{CatalogAdapter, CatalogColumn, FetchError, TableIdentifier};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A table's catalog rows
#[derive(Debug, Clone, Default)]
struct MockTable {
    columns: Vec<CatalogColumn>,
    primary_keys: Vec<String>,
}

/// Mock catalog adapter for testing
///
/// Tables are keyed by fully qualified name. Clones share state.
#[derive(Clone)]
pub struct MockAdapter {
    /// Catalog rows by table FQN
    tables: Arc<RwLock<HashMap<String, MockTable>>>,

    /// Errors to return for specific tables
    errors: Arc<RwLock<HashMap<String, FetchError>>>,

    /// Simulate connection failure
    fail_connection: bool,

    /// Simulate query latency (milliseconds)
    latency_ms: u64,

    /// Name to return from name() method
    adapter_name: &'static str,
}

impl MockAdapter {
    /// Create a new mock adapter with no tables
    pub fn new() -> Self {
        MockAdapterBuilder::new().build()
    }

    /// Add catalog rows for a table
    pub async fn add_table(
        &self,
        table: TableIdentifier,
        columns: Vec<CatalogColumn>,
        primary_keys: Vec<String>,
    ) {
        self.tables.write().await.insert(
            table.fqn(),
            MockTable {
                columns,
                primary_keys,
            },
        );
    }

    /// Configure an error to be returned for a specific table
    pub async fn add_error_for_table(&self, table: TableIdentifier, error: FetchError) {
        self.errors.write().await.insert(table.fqn(), error);
    }

    /// Configure to fail all connection tests
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Configure simulated latency for all operations
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Set a custom adapter name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.adapter_name = name;
        self
    }

    /// Get the number of tables stored in the adapter
    pub async fn table_count(&self) -> usize {
        self.tables.read().await.len()
    }

    /// Check if catalog rows exist for a table
    pub async fn has_table(&self, table: &TableIdentifier) -> bool {
        self.tables.read().await.contains_key(&table.fqn())
    }

    async fn lookup(&self, table: &TableIdentifier) -> Result<MockTable, FetchError> {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }

        // Check for configured errors first
        if let Some(error) = self.errors.read().await.get(&table.fqn()) {
            return Err(error.clone());
        }

        self.tables
            .read()
            .await
            .get(&table.fqn())
            .cloned()
            .ok_or_else(|| FetchError::TableNotFound(table.fqn()))
    }
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CatalogAdapter for MockAdapter {
    fn name(&self) -> &'static str {
        self.adapter_name
    }

    async fn fetch_columns(&self, table: &TableIdentifier) -> Result<Vec<CatalogColumn>, FetchError> {
        Ok(self.lookup(table).await?.columns)
    }

    async fn fetch_primary_keys(&self, table: &TableIdentifier) -> Result<Vec<String>, FetchError> {
        Ok(self.lookup(table).await?.primary_keys)
    }

    async fn test_connection(&self) -> Result<(), FetchError> {
        if self.fail_connection {
            Err(FetchError::NetworkError(
                "Simulated connection failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

/// Builder for creating MockAdapter with multiple tables
///
/// # Example
///
/// ```rust,ignore
/// let adapter = MockAdapterBuilder::new()
///     .with_table(TableIdentifier::qualified("SAKILA", "FILM"), film_columns, vec!["FILM_ID".into()])
///     .with_latency(50)
///     .build();
/// ```
pub struct MockAdapterBuilder {
    tables: HashMap<String, MockTable>,
    errors: HashMap<String, FetchError>,
    fail_connection: bool,
    latency_ms: u64,
    adapter_name: &'static str,
}

impl MockAdapterBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
            errors: HashMap::new(),
            fail_connection: false,
            latency_ms: 0,
            adapter_name: "Mock",
        }
    }

    /// Add catalog rows for a table
    pub fn with_table(
        mut self,
        table: TableIdentifier,
        columns: Vec<CatalogColumn>,
        primary_keys: Vec<String>,
    ) -> Self {
        self.tables.insert(
            table.fqn(),
            MockTable {
                columns,
                primary_keys,
            },
        );
        self
    }

    /// Add an error for a table
    pub fn with_error(mut self, table: TableIdentifier, error: FetchError) -> Self {
        self.errors.insert(table.fqn(), error);
        self
    }

    /// Enable connection failure simulation
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Set simulated latency
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Set adapter name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.adapter_name = name;
        self
    }

    /// Build the mock adapter
    pub fn build(self) -> MockAdapter {
        MockAdapter {
            tables: Arc::new(RwLock::new(self.tables)),
            errors: Arc::new(RwLock::new(self.errors)),
            fail_connection: self.fail_connection,
            latency_ms: self.latency_ms,
            adapter_name: self.adapter_name,
        }
    }
}

impl Default for MockAdapterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
