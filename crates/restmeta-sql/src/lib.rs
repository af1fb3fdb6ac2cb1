//! SQL analysis for resource queries
//!
//! This crate handles:
//! - Parsing resource queries using datafusion-sqlparser-rs
//! - Mapping the AST onto a small FROM-node model
//! - Resolving correlation names (aliases) to base tables
//! - Resolving projected columns to their declared origin
//! - Answering which base table a driver-reported column belongs to

pub mod parser;
pub mod statement;
pub mod correlation;
pub mod origin;
pub mod resolver;

pub use parser::{SqlParser, ParsedSql, ParseError};
pub use statement::{FromNode, ResultColumn, SelectShape};
pub use correlation::{resolve_correlations, AliasMap, Correlations};
pub use origin::{resolve_column_origins, ColumnOriginMap};
pub use resolver::{resolve_table, ColumnOriginResolver};
