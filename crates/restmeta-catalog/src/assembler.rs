//! Column metadata assembly
//!
//! Stamps every driver-reported column with the base table it was resolved
//! to, then fills in catalog details (default, sequence, primary key) for
//! that table. Each distinct table is fetched from the catalog once.

use std::collections::{HashMap, HashSet};
use restmeta_core::{
    Diagnostic, DiagnosticCode, Dialect, ResolvedColumnMetadata, ResourceDefinition, Severity,
};
use restmeta_sql::ColumnOriginResolver;

use crate::adapter::{CatalogAdapter, CatalogColumn, FetchError, TableIdentifier};

/// Column as described by the driver's result-set metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverColumn {
    pub name: String,
    pub label: String,
    pub type_name: String,
    pub read_only: bool,
}

impl DriverColumn {
    /// A writable column whose label equals its name
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            type_name: type_name.into(),
            read_only: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// Assembled columns plus catalog diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledMetadata {
    pub columns: Vec<ResolvedColumnMetadata>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AssembledMetadata {
    /// Distinct tables targeted by writable columns, in column order
    pub fn writable_tables(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.columns
            .iter()
            .filter(|c| c.is_writable())
            .map(|c| c.qualified_table_name.as_str())
            .filter(|t| seen.insert(*t))
            .collect()
    }
}

/// Catalog rows for one table, keyed by folded column name
struct TableCatalog {
    columns: HashMap<String, CatalogColumn>,
    primary_keys: HashSet<String>,
}

/// Builds [`ResolvedColumnMetadata`] for a resource
pub struct MetadataAssembler<'a, A: CatalogAdapter + ?Sized> {
    adapter: &'a A,
    dialect: &'a Dialect,
}

impl<'a, A: CatalogAdapter + ?Sized> MetadataAssembler<'a, A> {
    pub fn new(adapter: &'a A, dialect: &'a Dialect) -> Self {
        Self { adapter, dialect }
    }

    /// Assemble metadata for the driver's columns, in driver order
    ///
    /// Catalog failures are not fatal: affected columns keep their driver
    /// fields and resolved table, and a `CATALOG_FETCH_FAILED` diagnostic is
    /// recorded once per table.
    pub async fn assemble(
        &self,
        definition: &ResourceDefinition,
        resolver: &ColumnOriginResolver,
        driver_columns: &[DriverColumn],
    ) -> AssembledMetadata {
        let mut catalogs: HashMap<String, Option<TableCatalog>> = HashMap::new();
        let mut diagnostics = Vec::new();
        let mut columns = Vec::with_capacity(driver_columns.len());

        for (index, driver) in driver_columns.iter().enumerate() {
            let table = resolver.resolve_table(&driver.name);
            let qualified = self
                .dialect
                .qualified_table_name(definition.database.as_deref(), table);
            let label = self
                .dialect
                .qualified_column_label(table, &qualified, driver.read_only, &driver.label);

            let mut column = ResolvedColumnMetadata::new(
                index + 1,
                driver.name.clone(),
                label,
                driver.type_name.clone(),
                table,
            );
            column.qualified_table_name = qualified;
            column.read_only = driver.read_only;

            if !catalogs.contains_key(table) {
                let identifier = TableIdentifier::new(definition.database.clone(), table);
                let catalog = match self.fetch_table(&identifier).await {
                    Ok(catalog) => Some(catalog),
                    Err(error) => {
                        tracing::warn!(
                            resource = %definition.name,
                            table = %identifier,
                            adapter = self.adapter.name(),
                            "catalog lookup failed: {}",
                            error
                        );
                        diagnostics.push(
                            Diagnostic::new(
                                DiagnosticCode::CatalogFetchFailed,
                                Severity::Warn,
                                format!("Failed to read catalog for {}: {}", identifier, error),
                            )
                            .with_context(definition.name.clone())
                            .with_subject(identifier.fqn()),
                        );
                        None
                    }
                };
                catalogs.insert(table.to_string(), catalog);
            }

            if let Some(Some(catalog)) = catalogs.get(table) {
                self.stamp_catalog_fields(&mut column, catalog);
            }

            columns.push(column);
        }

        AssembledMetadata {
            columns,
            diagnostics,
        }
    }

    async fn fetch_table(&self, table: &TableIdentifier) -> Result<TableCatalog, FetchError> {
        let columns = self.adapter.fetch_columns(table).await?;
        let primary_keys = self.adapter.fetch_primary_keys(table).await?;

        Ok(TableCatalog {
            columns: columns
                .into_iter()
                .map(|c| (self.dialect.fold(&c.name), c))
                .collect(),
            primary_keys: primary_keys
                .iter()
                .map(|k| self.dialect.fold(k))
                .collect(),
        })
    }

    fn stamp_catalog_fields(&self, column: &mut ResolvedColumnMetadata, catalog: &TableCatalog) {
        let key = self.dialect.fold(&column.name);
        column.primary_key = catalog.primary_keys.contains(&key);

        let Some(row) = catalog.columns.get(&key) else {
            return;
        };

        column.default_value = row.default_value.clone();
        if let Some(sequence) = [row.default_value.as_deref(), row.extra.as_deref()]
            .into_iter()
            .flatten()
            .find_map(|text| self.dialect.detect_sequence(text))
        {
            column.set_sequence(sequence);
        }
    }
}
