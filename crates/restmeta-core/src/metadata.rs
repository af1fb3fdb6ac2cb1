//! Per-column metadata produced for a resource

use serde::{Deserialize, Serialize};

use crate::dialect::SequenceDefault;

/// Metadata for one output column of a resource query
///
/// `table_name` and `qualified_table_name` come from column-origin
/// resolution; the remaining fields come from the driver's result metadata
/// and the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedColumnMetadata {
    /// 1-indexed position in the result set
    pub number: usize,

    /// Column name as reported by the driver
    pub name: String,

    /// Label exposed to resource consumers
    pub label: String,

    /// Driver type name
    pub data_type: String,

    /// Captured default-value text, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    /// Base table the column originates from
    pub table_name: String,

    /// Table name as used in generated SQL
    pub qualified_table_name: String,

    pub read_only: bool,

    pub primary_key: bool,

    /// Default value is drawn from a sequence
    pub sequence: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_name: Option<String>,
}

impl ResolvedColumnMetadata {
    /// Create a record with only driver-level fields populated
    pub fn new(
        number: usize,
        name: impl Into<String>,
        label: impl Into<String>,
        data_type: impl Into<String>,
        table_name: impl Into<String>,
    ) -> Self {
        let table_name = table_name.into();
        Self {
            number,
            name: name.into(),
            label: label.into(),
            data_type: data_type.into(),
            default_value: None,
            qualified_table_name: table_name.clone(),
            table_name,
            read_only: false,
            primary_key: false,
            sequence: false,
            sequence_name: None,
        }
    }

    /// Record a sequence-backed default
    pub fn set_sequence(&mut self, sequence: SequenceDefault) {
        self.sequence = true;
        self.sequence_name = sequence.name;
    }

    /// Whether generated INSERT/UPDATE statements may target this column
    pub fn is_writable(&self) -> bool {
        !self.read_only && !self.sequence
    }
}
