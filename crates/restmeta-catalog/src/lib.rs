//! Catalog introspection and column metadata assembly
//!
//! Resource metadata combines three sources: the driver's result-set
//! metadata, the base table each column was resolved to, and the catalog
//! rows (data type, default, primary key) for that table.
//!
//! ## Example
//!
//! ```rust,ignore
//! use restmeta_catalog::{DriverColumn, MetadataAssembler, MockAdapter};
//! use restmeta_core::Dialect;
//! use restmeta_sql::ColumnOriginResolver;
//!
//! let resolver = ColumnOriginResolver::from_definition(&definition, &Dialect::ORACLE);
//! let assembler = MetadataAssembler::new(&adapter, &Dialect::ORACLE);
//! let metadata = assembler.assemble(&definition, &resolver, &driver_columns).await;
//! ```

pub mod adapter;
pub mod mock;
pub mod assembler;

pub use adapter::{CatalogAdapter, CatalogColumn, TableIdentifier, FetchError};
pub use mock::{MockAdapter, MockAdapterBuilder};
pub use assembler::{AssembledMetadata, DriverColumn, MetadataAssembler};
