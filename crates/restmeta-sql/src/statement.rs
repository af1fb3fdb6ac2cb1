//! Structural view of a resource query
//!
//! Resolution only needs two things from a parsed SELECT: the FROM clause
//! as a tree of [`FromNode`]s and the projected columns. This module maps
//! the sqlparser AST onto that closed model so the resolvers never match on
//! parser types directly.

use sqlparser::ast::{
    Expr, Ident, JoinOperator, Query, SelectItem, SetExpr, Statement, TableFactor,
    TableWithJoins,
};
use restmeta_core::{Diagnostic, DiagnosticCode, Severity};

use crate::parser::ParsedSql;

/// A node of the FROM clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FromNode {
    /// A real table, optionally with a correlation name
    BaseTable {
        /// Unqualified table name
        table: String,
        alias: Option<String>,
    },

    /// `left LEFT|RIGHT [OUTER] JOIN right`
    OuterJoin {
        left: Box<FromNode>,
        right: Box<FromNode>,
    },

    /// Anything else: inner/cross joins, derived tables, table functions
    Unsupported {
        /// Human-readable construct name, e.g. "inner join"
        kind: String,
        /// Correlation names declared somewhere inside the subtree
        declared: Vec<String>,
    },
}

impl FromNode {
    /// Correlation names this subtree makes visible to the SELECT list
    pub fn declared_names(&self) -> Vec<String> {
        match self {
            Self::BaseTable { table, alias } => {
                vec![alias.clone().unwrap_or_else(|| table.clone())]
            }
            Self::OuterJoin { left, right } => {
                let mut names = left.declared_names();
                names.extend(right.declared_names());
                names
            }
            Self::Unsupported { declared, .. } => declared.clone(),
        }
    }

    fn unsupported(kind: impl Into<String>, declared: Vec<String>) -> Self {
        Self::Unsupported {
            kind: kind.into(),
            declared,
        }
    }
}

/// A projected column of the SELECT list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultColumn {
    /// Output name: the alias, or the referenced column's name
    pub name: String,

    /// Qualifier of the referenced column (`t` in `t.a`), if any
    pub table: Option<String>,
}

impl ResultColumn {
    pub fn new(name: impl Into<String>, table: Option<&str>) -> Self {
        Self {
            name: name.into(),
            table: table.map(str::to_string),
        }
    }
}

/// FROM tree and projection of a single plain SELECT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectShape {
    /// One tree per comma-separated FROM item
    pub from: Vec<FromNode>,

    pub columns: Vec<ResultColumn>,

    /// Qualifiers of `t.*` items, whose columns are not known until the
    /// driver reports them
    pub qualified_wildcards: Vec<String>,
}

impl SelectShape {
    /// Extract the shape from parsed SQL
    ///
    /// Fails with a `SQL_UNSUPPORTED_SYNTAX` diagnostic when the text is not
    /// exactly one plain SELECT.
    pub fn from_parsed(parsed: &ParsedSql) -> Result<Self, Diagnostic> {
        if parsed.statement_count() != 1 {
            return Err(unsupported_syntax(format!(
                "Expected a single statement, found {}",
                parsed.statement_count()
            )));
        }

        match parsed.first_statement() {
            Some(Statement::Query(query)) => Self::from_query(query),
            _ => Err(unsupported_syntax("Resource query is not a SELECT statement")),
        }
    }

    fn from_query(query: &Query) -> Result<Self, Diagnostic> {
        if query.with.is_some() {
            return Err(unsupported_syntax("Common table expressions are not supported"));
        }

        let select = match query.body.as_ref() {
            SetExpr::Select(select) => select,
            SetExpr::Query(inner) => return Self::from_query(inner),
            _ => {
                return Err(unsupported_syntax(
                    "Set operations and VALUES bodies are not supported",
                ))
            }
        };

        let qualified_wildcards = select
            .projection
            .iter()
            .filter_map(|item| match item {
                SelectItem::QualifiedWildcard(prefix, _) => {
                    prefix.0.last().map(|ident| ident.value.clone())
                }
                _ => None,
            })
            .collect();

        Ok(Self {
            from: select.from.iter().map(map_table_with_joins).collect(),
            columns: select.projection.iter().filter_map(map_select_item).collect(),
            qualified_wildcards,
        })
    }
}

fn unsupported_syntax(message: impl Into<String>) -> Diagnostic {
    Diagnostic::new(DiagnosticCode::SqlUnsupportedSyntax, Severity::Warn, message)
}

/// Fold a `relation JOIN ... JOIN ...` chain into a left-deep tree
fn map_table_with_joins(table: &TableWithJoins) -> FromNode {
    let mut node = map_table_factor(&table.relation);

    for join in &table.joins {
        let right = map_table_factor(&join.relation);

        node = match &join.join_operator {
            JoinOperator::LeftOuter { .. } | JoinOperator::RightOuter { .. } => FromNode::OuterJoin {
                left: Box::new(node),
                right: Box::new(right),
            },
            other => {
                let mut declared = node.declared_names();
                declared.extend(right.declared_names());
                FromNode::unsupported(join_kind(other), declared)
            }
        };
    }

    node
}

fn map_table_factor(factor: &TableFactor) -> FromNode {
    match factor {
        TableFactor::Table { name, alias, .. } => match name.0.last() {
            Some(table) => FromNode::BaseTable {
                table: table.value.clone(),
                alias: alias.as_ref().map(|a| a.name.value.clone()),
            },
            None => FromNode::unsupported("empty table name", Vec::new()),
        },
        // `(a LEFT JOIN b)` behaves like the bare join when it has no alias
        TableFactor::NestedJoin { table_with_joins, alias: None, .. } => {
            map_table_with_joins(table_with_joins)
        }
        other => FromNode::unsupported(factor_kind(other), factor_alias(other)),
    }
}

fn factor_alias(factor: &TableFactor) -> Vec<String> {
    let alias = match factor {
        TableFactor::Derived { alias, .. }
        | TableFactor::TableFunction { alias, .. }
        | TableFactor::UNNEST { alias, .. }
        | TableFactor::NestedJoin { alias, .. } => alias.as_ref(),
        _ => None,
    };

    alias.map(|a| vec![a.name.value.clone()]).unwrap_or_default()
}

fn factor_kind(factor: &TableFactor) -> &'static str {
    match factor {
        TableFactor::Derived { .. } => "derived table",
        TableFactor::TableFunction { .. } => "table function",
        TableFactor::UNNEST { .. } => "unnest",
        TableFactor::NestedJoin { .. } => "aliased nested join",
        _ => "table factor",
    }
}

fn join_kind(operator: &JoinOperator) -> &'static str {
    match operator {
        JoinOperator::Inner { .. } => "inner join",
        JoinOperator::FullOuter { .. } => "full outer join",
        JoinOperator::CrossJoin { .. } => "cross join",
        _ => "join",
    }
}

fn map_select_item(item: &SelectItem) -> Option<ResultColumn> {
    match item {
        SelectItem::UnnamedExpr(expr) => column_reference(expr)
            .map(|(name, table)| ResultColumn::new(&name.value, table.map(|t| t.value.as_str()))),
        SelectItem::ExprWithAlias { expr, alias } => {
            let table = column_reference(expr).and_then(|(_, table)| table);
            Some(ResultColumn::new(&alias.value, table.map(|t| t.value.as_str())))
        }
        // Wildcards expand to columns only the driver knows
        _ => None,
    }
}

/// Split a column reference into (column, qualifier)
fn column_reference(expr: &Expr) -> Option<(&Ident, Option<&Ident>)> {
    match expr {
        Expr::Identifier(ident) => Some((ident, None)),
        Expr::CompoundIdentifier(parts) => match parts.as_slice() {
            [.., table, column] => Some((column, Some(table))),
            [column] => Some((column, None)),
            [] => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SqlParser;
    use pretty_assertions::assert_eq;

    fn shape(sql: &str) -> SelectShape {
        let parsed = SqlParser::new().parse(sql).unwrap();
        SelectShape::from_parsed(&parsed).unwrap()
    }

    fn base(table: &str, alias: Option<&str>) -> FromNode {
        FromNode::BaseTable {
            table: table.to_string(),
            alias: alias.map(str::to_string),
        }
    }

    #[test]
    fn single_table_without_alias() {
        let shape = shape("SELECT a, b FROM t");

        assert_eq!(shape.from, vec![base("t", None)]);
        assert_eq!(
            shape.columns,
            vec![ResultColumn::new("a", None), ResultColumn::new("b", None)]
        );
    }

    #[test]
    fn schema_qualified_table_keeps_table_part() {
        let shape = shape("SELECT f.title FROM sakila.film f");

        assert_eq!(shape.from, vec![base("film", Some("f"))]);
        assert_eq!(shape.columns, vec![ResultColumn::new("title", Some("f"))]);
    }

    #[test]
    fn left_join_chain_is_left_deep() {
        let shape = shape(
            "SELECT a.x, b.y, c.z FROM t1 a \
             LEFT JOIN t2 b ON a.id = b.id \
             RIGHT OUTER JOIN t3 c ON b.id = c.id",
        );

        let expected = FromNode::OuterJoin {
            left: Box::new(FromNode::OuterJoin {
                left: Box::new(base("t1", Some("a"))),
                right: Box::new(base("t2", Some("b"))),
            }),
            right: Box::new(base("t3", Some("c"))),
        };
        assert_eq!(shape.from, vec![expected]);
    }

    #[test]
    fn inner_join_is_unsupported_and_records_declared_names() {
        let shape = shape("SELECT a.x FROM t1 a JOIN t2 b ON a.id = b.id");

        assert_eq!(
            shape.from,
            vec![FromNode::Unsupported {
                kind: "inner join".to_string(),
                declared: vec!["a".to_string(), "b".to_string()],
            }]
        );
    }

    #[test]
    fn derived_table_is_unsupported() {
        let shape = shape("SELECT d.x FROM (SELECT x FROM t) d");

        assert_eq!(
            shape.from,
            vec![FromNode::Unsupported {
                kind: "derived table".to_string(),
                declared: vec!["d".to_string()],
            }]
        );
    }

    #[test]
    fn parenthesized_join_is_transparent() {
        let shape = shape("SELECT a.x FROM (t1 a LEFT JOIN t2 b ON a.id = b.id)");

        assert!(matches!(shape.from.as_slice(), [FromNode::OuterJoin { .. }]));
    }

    #[test]
    fn projection_aliases_and_expressions() {
        let shape = shape("SELECT f.title AS name, count(*) AS total, 1 + 1, * FROM film f");

        assert_eq!(
            shape.columns,
            vec![
                ResultColumn::new("name", Some("f")),
                ResultColumn::new("total", None),
            ]
        );
    }

    #[test]
    fn qualified_wildcards_are_collected() {
        let shape = shape(
            "SELECT f.title, l.* FROM film f LEFT JOIN language l ON f.language_id = l.language_id",
        );

        assert_eq!(shape.columns, vec![ResultColumn::new("title", Some("f"))]);
        assert_eq!(shape.qualified_wildcards, vec!["l".to_string()]);
        assert!(self::shape("SELECT * FROM film").qualified_wildcards.is_empty());
    }

    #[test]
    fn fully_qualified_column_uses_table_part() {
        let shape = shape("SELECT sakila.film.title FROM sakila.film");

        assert_eq!(shape.columns, vec![ResultColumn::new("title", Some("film"))]);
    }

    #[test]
    fn comma_separated_from_list() {
        let shape = shape("SELECT a.x, b.y FROM t1 a, t2 b");

        assert_eq!(shape.from, vec![base("t1", Some("a")), base("t2", Some("b"))]);
    }

    #[test]
    fn rejects_non_select_shapes() {
        let parser = SqlParser::new();

        for sql in [
            "WITH c AS (SELECT 1 AS x) SELECT x FROM c",
            "SELECT a FROM t UNION SELECT b FROM u",
            "UPDATE t SET a = 1",
            "SELECT a FROM t; SELECT b FROM u",
        ] {
            let parsed = parser.parse(sql).unwrap();
            let diag = SelectShape::from_parsed(&parsed).unwrap_err();
            assert_eq!(diag.code, DiagnosticCode::SqlUnsupportedSyntax, "{}", sql);
        }
    }
}
