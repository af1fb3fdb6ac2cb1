//! Per-dialect strategy values
//!
//! A [`Dialect`] bundles everything that differs between databases when
//! building resource metadata: how identifiers are case-folded, the catalog
//! queries used to enumerate columns and primary keys, how sequence-backed
//! defaults are recognised, and how table names are qualified.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::config::DialectConfig;

/// `nextval('film_film_id_seq'::regclass)`
static NEXTVAL_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*nextval\s*\(\s*'([^']+)'").expect("valid nextval pattern")
});

/// `"SAKILA"."ISEQ$$_74581".nextval` or `film_seq.NEXTVAL`
static ORACLE_NEXTVAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s*(?:"?[\w$#]+"?\.)?"?([\w$#]+)"?\.nextval\s*$"#)
        .expect("valid oracle sequence pattern")
});

/// MySQL reports `auto_increment` in `information_schema.columns.extra`
static AUTO_INCREMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bauto_increment\b").expect("valid auto_increment pattern")
});

/// How identifiers are normalised before alias and column lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseFolding {
    /// Fold to upper case (Oracle, ANSI)
    Upper,

    /// Fold to lower case (PostgreSQL)
    Lower,

    /// Keep identifiers as written
    Preserve,
}

impl CaseFolding {
    /// Fold a name. Folding is idempotent.
    pub fn fold(&self, name: &str) -> String {
        match self {
            Self::Upper => name.to_uppercase(),
            Self::Lower => name.to_lowercase(),
            Self::Preserve => name.to_string(),
        }
    }
}

/// How a captured column default is recognised as sequence-backed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceStyle {
    /// `nextval('name'::regclass)`
    NextvalCall,

    /// `nextval('name')` or `"OWNER"."NAME".nextval`
    OracleNextval,

    /// `auto_increment` column attribute; no named sequence exists
    AutoIncrement,
}

/// A column default recognised as sequence-backed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceDefault {
    /// Sequence name, when the database exposes one
    pub name: Option<String>,
}

impl SequenceDefault {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self { name: None }
    }
}

/// How a table name is qualified in generated statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableQualification {
    /// Use the table name as-is
    Bare,

    /// Prefix with the schema when one is known
    SchemaDotTable,
}

/// Row-limiting clause syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationStyle {
    /// `LIMIT n OFFSET m`
    LimitOffset,

    /// `OFFSET m ROWS FETCH NEXT n ROWS ONLY`
    OffsetFetch,
}

/// Dialect strategy value, selected once from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dialect {
    /// Configured dialect this strategy was built for
    pub config: DialectConfig,

    /// Identifier folding policy for alias and column keys
    pub case_folding: CaseFolding,

    /// Catalog query returning `(column_name, data_type, default)` rows,
    /// plus `extra` for MySQL. Parameters: schema/owner, table name.
    pub columns_query: &'static str,

    /// Catalog query returning primary-key column names.
    /// Parameters: schema/owner, table name.
    pub primary_key_query: &'static str,

    pub sequence_style: SequenceStyle,

    pub qualification: TableQualification,

    pub pagination: PaginationStyle,
}

impl Dialect {
    pub const ORACLE: Dialect = Dialect {
        config: DialectConfig::Oracle,
        case_folding: CaseFolding::Upper,
        columns_query: "select column_name, data_type, data_default from all_tab_columns \
                        where owner = ? and table_name = ?",
        primary_key_query: "SELECT cols.column_name FROM all_constraints cons, all_cons_columns cols \
                            WHERE cons.owner = ? AND cols.table_name = ? \
                            AND cons.constraint_type = 'P' AND cons.constraint_name = cols.constraint_name",
        sequence_style: SequenceStyle::OracleNextval,
        qualification: TableQualification::Bare,
        pagination: PaginationStyle::OffsetFetch,
    };

    pub const POSTGRES: Dialect = Dialect {
        config: DialectConfig::Postgres,
        case_folding: CaseFolding::Lower,
        columns_query: "select column_name, data_type, column_default from information_schema.columns \
                        where table_schema = ? and table_name = ?",
        primary_key_query: "select kcu.column_name from information_schema.table_constraints tc, \
                            information_schema.key_column_usage kcu \
                            where tc.table_schema = ? and tc.table_name = ? \
                            and tc.constraint_type = 'PRIMARY KEY' \
                            and tc.constraint_name = kcu.constraint_name",
        sequence_style: SequenceStyle::NextvalCall,
        qualification: TableQualification::SchemaDotTable,
        pagination: PaginationStyle::LimitOffset,
    };

    pub const MYSQL: Dialect = Dialect {
        config: DialectConfig::MySql,
        case_folding: CaseFolding::Preserve,
        columns_query: "select column_name, data_type, column_default, extra from information_schema.columns \
                        where table_schema = ? and table_name = ?",
        primary_key_query: "select column_name from information_schema.key_column_usage \
                            where table_schema = ? and table_name = ? and constraint_name = 'PRIMARY'",
        sequence_style: SequenceStyle::AutoIncrement,
        qualification: TableQualification::SchemaDotTable,
        pagination: PaginationStyle::LimitOffset,
    };

    pub const ANSI: Dialect = Dialect {
        config: DialectConfig::Ansi,
        case_folding: CaseFolding::Upper,
        columns_query: "select column_name, data_type, column_default from information_schema.columns \
                        where table_schema = ? and table_name = ?",
        primary_key_query: "select kcu.column_name from information_schema.table_constraints tc, \
                            information_schema.key_column_usage kcu \
                            where tc.table_schema = ? and tc.table_name = ? \
                            and tc.constraint_type = 'PRIMARY KEY' \
                            and tc.constraint_name = kcu.constraint_name",
        sequence_style: SequenceStyle::NextvalCall,
        qualification: TableQualification::SchemaDotTable,
        pagination: PaginationStyle::LimitOffset,
    };

    /// Select the strategy for a configured dialect
    pub fn for_config(config: DialectConfig) -> Self {
        match config {
            DialectConfig::Oracle => Self::ORACLE,
            DialectConfig::Postgres => Self::POSTGRES,
            DialectConfig::MySql => Self::MYSQL,
            DialectConfig::Ansi => Self::ANSI,
        }
    }

    /// Fold an identifier with this dialect's policy
    pub fn fold(&self, name: &str) -> String {
        self.case_folding.fold(name)
    }

    /// Whether catalog metadata is reported in upper case
    pub fn metadata_is_upper_case(&self) -> bool {
        self.case_folding == CaseFolding::Upper
    }

    /// Detect a sequence-backed default and extract the sequence name
    ///
    /// `column_default` is the captured default text, or for MySQL the
    /// `extra` attribute. Returns `None` when it is not sequence-backed.
    pub fn detect_sequence(&self, column_default: &str) -> Option<SequenceDefault> {
        let captures = match self.sequence_style {
            SequenceStyle::NextvalCall => NEXTVAL_CALL.captures(column_default),
            SequenceStyle::OracleNextval => NEXTVAL_CALL
                .captures(column_default)
                .or_else(|| ORACLE_NEXTVAL.captures(column_default)),
            SequenceStyle::AutoIncrement => {
                return AUTO_INCREMENT
                    .is_match(column_default)
                    .then(SequenceDefault::anonymous);
            }
        }?;

        captures.get(1).map(|m| SequenceDefault::named(m.as_str()))
    }

    /// Table name as used in generated SQL statements
    pub fn qualified_table_name(&self, schema: Option<&str>, table: &str) -> String {
        match (self.qualification, schema) {
            (TableQualification::SchemaDotTable, Some(schema)) if !schema.is_empty() => {
                format!("{}.{}", schema, table)
            }
            _ => table.to_string(),
        }
    }

    /// Column label exposed to resource consumers
    pub fn qualified_column_label(
        &self,
        _table: &str,
        _qualified_table: &str,
        _read_only: bool,
        label: &str,
    ) -> String {
        label.to_string()
    }

    /// Row-limiting clause appended to a SELECT
    pub fn limit_clause(&self, limit: u64, offset: u64) -> String {
        match self.pagination {
            PaginationStyle::LimitOffset => format!(" LIMIT {} OFFSET {}", limit, offset),
            PaginationStyle::OffsetFetch => {
                format!(" OFFSET {} ROWS FETCH NEXT {} ROWS ONLY", offset, limit)
            }
        }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::for_config(DialectConfig::default())
    }
}
