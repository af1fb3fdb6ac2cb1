//! Correlation-name resolution for the FROM clause
//!
//! Walks the [`FromNode`] tree and records which base table every
//! correlation name stands for. Only base tables and left/right outer joins
//! are understood; any other construct is skipped with a diagnostic so its
//! columns fall back to the resource's default table.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use restmeta_core::{CaseFolding, Diagnostic, DiagnosticCode, Severity};

use crate::statement::FromNode;

/// Correlation name -> base table name, both case-folded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AliasMap(BTreeMap<String, String>);

impl AliasMap {
    /// Base table for a folded correlation name
    pub fn get(&self, alias: &str) -> Option<&str> {
        self.0.get(alias).map(String::as_str)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.0.contains_key(alias)
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
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AliasMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Result of walking a FROM clause
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Correlations {
    pub aliases: AliasMap,

    /// Folded names declared inside unsupported subtrees
    pub unresolved: BTreeSet<String>,

    pub diagnostics: Vec<Diagnostic>,
}

/// Resolve correlation names for every item of a FROM clause
pub fn resolve_correlations(from: &[FromNode], folding: CaseFolding) -> Correlations {
    let mut builder = Builder {
        folding,
        aliases: BTreeMap::new(),
        unresolved: BTreeSet::new(),
        diagnostics: Vec::new(),
    };

    for node in from {
        builder.visit(node);
    }

    Correlations {
        aliases: AliasMap(builder.aliases),
        unresolved: builder.unresolved,
        diagnostics: builder.diagnostics,
    }
}

struct Builder {
    folding: CaseFolding,
    aliases: BTreeMap<String, String>,
    unresolved: BTreeSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl Builder {
    fn visit(&mut self, node: &FromNode) {
        let folding = self.folding;

        match node {
            FromNode::BaseTable { table, alias } => {
                let correlation = alias.as_deref().unwrap_or(table);
                // Last declaration wins
                self.aliases.insert(folding.fold(correlation), folding.fold(table));
            }
            FromNode::OuterJoin { left, right } => {
                self.visit(right);
                self.visit(left);
            }
            FromNode::Unsupported { kind, declared } => {
                tracing::warn!(node_kind = %kind, "skipping unsupported FROM construct");

                self.unresolved
                    .extend(declared.iter().map(|name| folding.fold(name)));
                self.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::SqlUnsupportedFrom,
                        Severity::Warn,
                        format!(
                            "Unsupported {} in FROM clause; its columns resolve to the default table",
                            kind
                        ),
                    )
                    .with_subject(kind.clone()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base(table: &str, alias: Option<&str>) -> FromNode {
        FromNode::BaseTable {
            table: table.to_string(),
            alias: alias.map(str::to_string),
        }
    }

    fn outer(left: FromNode, right: FromNode) -> FromNode {
        FromNode::OuterJoin {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[test]
    fn table_without_alias_maps_to_itself() {
        let result = resolve_correlations(&[base("t", None)], CaseFolding::Upper);

        assert_eq!(result.aliases, AliasMap::from_iter([("T", "T")]));
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn alias_maps_to_table() {
        let result = resolve_correlations(&[base("foo", Some("t"))], CaseFolding::Upper);

        assert_eq!(result.aliases.get("T"), Some("FOO"));
        assert!(!result.aliases.contains("FOO"));
    }

    #[test]
    fn outer_join_chain() {
        let tree = outer(
            outer(base("t1", Some("a")), base("t2", Some("b"))),
            base("t3", None),
        );

        let result = resolve_correlations(&[tree], CaseFolding::Lower);

        assert_eq!(
            result.aliases,
            AliasMap::from_iter([("a", "t1"), ("b", "t2"), ("t3", "t3")])
        );
    }

    #[test]
    fn redeclared_alias_last_writer_wins() {
        // Right child is visited before the left one
        let tree = outer(base("t1", Some("x")), base("t2", Some("x")));

        let result = resolve_correlations(&[tree], CaseFolding::Upper);

        assert_eq!(result.aliases.get("X"), Some("T1"));
        assert_eq!(result.aliases.len(), 1);
    }

    #[test]
    fn unsupported_subtree_is_skipped_with_diagnostic() {
        let tree = outer(
            base("t1", Some("a")),
            FromNode::Unsupported {
                kind: "derived table".to_string(),
                declared: vec!["d".to_string()],
            },
        );

        let result = resolve_correlations(&[tree], CaseFolding::Upper);

        assert_eq!(result.aliases, AliasMap::from_iter([("A", "T1")]));
        assert!(result.unresolved.contains("D"));
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code, DiagnosticCode::SqlUnsupportedFrom);
        assert_eq!(result.diagnostics[0].subject.as_deref(), Some("derived table"));
    }

    #[test]
    fn empty_from_clause() {
        let result = resolve_correlations(&[], CaseFolding::Upper);

        assert!(result.aliases.is_empty());
        assert!(result.unresolved.is_empty());
    }
}
