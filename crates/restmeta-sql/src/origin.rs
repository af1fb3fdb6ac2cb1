//! Column-origin resolution for the SELECT list

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use restmeta_core::{CaseFolding, Diagnostic, DiagnosticCode, Severity};

use crate::statement::ResultColumn;

/// Projected column name -> declared origin (table or correlation name)
///
/// Columns with no declared origin are absent; absence is what triggers the
/// default-table fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColumnOriginMap(BTreeMap<String, String>);

impl ColumnOriginMap {
    /// Declared origin for a folded column name
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    /// Drop entries whose origin is one of `origins`
    pub fn without_origins(mut self, origins: &BTreeSet<String>) -> Self {
        self.0.retain(|_, origin| !origins.contains(origin));
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ColumnOriginMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Map every qualified projected column to its folded origin
///
/// When two columns fold to the same output name the later one wins and a
/// `SQL_AMBIGUOUS_PROJECTION` diagnostic is produced.
pub fn resolve_column_origins(
    columns: &[ResultColumn],
    folding: CaseFolding,
) -> (ColumnOriginMap, Vec<Diagnostic>) {
    let mut origins = BTreeMap::new();
    let mut seen = BTreeSet::new();
    let mut diagnostics = Vec::new();

    for column in columns {
        let name = folding.fold(&column.name);

        if !seen.insert(name.clone()) {
            tracing::warn!(column = %name, "projected column name appears more than once");
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::SqlAmbiguousProjection,
                    Severity::Warn,
                    format!("Column '{}' is projected more than once; the last occurrence is used", name),
                )
                .with_subject(name.clone()),
            );
        }

        match &column.table {
            Some(table) => {
                origins.insert(name, folding.fold(table));
            }
            // A later unqualified duplicate shadows an earlier origin
            None => {
                origins.remove(&name);
            }
        }
    }

    (ColumnOriginMap(origins), diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unqualified_columns_are_absent() {
        let columns = vec![ResultColumn::new("a", None), ResultColumn::new("b", None)];

        let (origins, diagnostics) = resolve_column_origins(&columns, CaseFolding::Upper);

        assert!(origins.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn qualified_columns_are_folded() {
        let columns = vec![ResultColumn::new("a", Some("t")), ResultColumn::new("B", Some("t"))];

        let (origins, _) = resolve_column_origins(&columns, CaseFolding::Upper);

        assert_eq!(origins, ColumnOriginMap::from_iter([("A", "T"), ("B", "T")]));
    }

    #[test]
    fn duplicate_name_last_wins() {
        let columns = vec![ResultColumn::new("id", Some("a")), ResultColumn::new("ID", Some("b"))];

        let (origins, diagnostics) = resolve_column_origins(&columns, CaseFolding::Lower);

        assert_eq!(origins.get("id"), Some("b"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::SqlAmbiguousProjection);
    }

    #[test]
    fn unqualified_duplicate_clears_origin() {
        let columns = vec![ResultColumn::new("id", Some("a")), ResultColumn::new("id", None)];

        let (origins, diagnostics) = resolve_column_origins(&columns, CaseFolding::Upper);

        assert!(origins.get("ID").is_none());
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn without_origins_drops_matching_entries() {
        let origins = ColumnOriginMap::from_iter([("X", "A"), ("Y", "D")]);
        let unresolved = BTreeSet::from(["D".to_string()]);

        let filtered = origins.without_origins(&unresolved);

        assert_eq!(filtered, ColumnOriginMap::from_iter([("X", "A")]));
    }
}
