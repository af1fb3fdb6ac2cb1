//! Qualified table-name resolution for resource columns
//!
//! [`ColumnOriginResolver`] is built once per resource definition when it is
//! loaded. It owns the alias and column-origin maps for the resource's query
//! and answers, for any column name the driver reports at runtime, which base
//! table that column belongs to.

use std::collections::BTreeSet;
use restmeta_core::{
    CaseFolding, Diagnostic, DiagnosticCode, Dialect, ResourceDefinition, ResourceReport,
    Severity,
};

use crate::correlation::{resolve_correlations, AliasMap};
use crate::origin::{resolve_column_origins, ColumnOriginMap};
use crate::parser::SqlParser;
use crate::statement::SelectShape;

/// Resolve the base table a driver-reported column belongs to
///
/// Never fails: columns without a known origin resolve to `default_table`.
/// Only one alias hop is followed.
pub fn resolve_table<'a>(
    column: &str,
    aliases: &'a AliasMap,
    origins: &'a ColumnOriginMap,
    default_table: &'a str,
    folding: CaseFolding,
) -> &'a str {
    match origins.get(&folding.fold(column)) {
        Some(origin) => aliases.get(origin).unwrap_or(origin),
        None => default_table,
    }
}

/// Immutable per-resource column-origin state
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnOriginResolver {
    resource: String,
    default_table: String,
    folding: CaseFolding,
    aliases: AliasMap,
    origins: ColumnOriginMap,
    diagnostics: Vec<Diagnostic>,
}

impl ColumnOriginResolver {
    /// Analyse a resource definition's query
    ///
    /// Parse failures and unsupported statements are not errors: they are
    /// recorded as diagnostics and leave both maps empty, so every column
    /// resolves to the definition's default table.
    pub fn from_definition(definition: &ResourceDefinition, dialect: &Dialect) -> Self {
        let folding = dialect.case_folding;
        let mut resolver = Self {
            resource: definition.name.clone(),
            default_table: definition.default_table().to_string(),
            folding,
            aliases: AliasMap::default(),
            origins: ColumnOriginMap::default(),
            diagnostics: Vec::new(),
        };

        let shape = SqlParser::from_dialect(dialect.config)
            .parse_with_diagnostic(&definition.query)
            .and_then(|parsed| SelectShape::from_parsed(&parsed));

        let shape = match shape {
            Ok(shape) => shape,
            Err(diagnostic) => {
                tracing::warn!(
                    resource = %definition.name,
                    code = %diagnostic.code,
                    "{}; all columns resolve to {}",
                    diagnostic.message,
                    resolver.default_table,
                );
                resolver.push(diagnostic);
                return resolver;
            }
        };

        let correlations = resolve_correlations(&shape.from, folding);
        let (origins, projection_diagnostics) = resolve_column_origins(&shape.columns, folding);

        for diagnostic in correlations.diagnostics.into_iter().chain(projection_diagnostics) {
            resolver.push(diagnostic);
        }

        // Columns declared by unsupported FROM constructs fall back to the default table
        let origins = origins.without_origins(&correlations.unresolved);
        resolver.report_dangling(&correlations.aliases, &origins, &correlations.unresolved);
        resolver.report_qualified_wildcards(&shape.qualified_wildcards);

        tracing::debug!(
            resource = %definition.name,
            aliases = correlations.aliases.len(),
            origins = origins.len(),
            "resolved column origins"
        );

        resolver.aliases = correlations.aliases;
        resolver.origins = origins;
        resolver
    }

    /// Base table for a driver-reported column name
    pub fn resolve_table(&self, column: &str) -> &str {
        resolve_table(column, &self.aliases, &self.origins, &self.default_table, self.folding)
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn default_table(&self) -> &str {
        &self.default_table
    }

    pub fn case_folding(&self) -> CaseFolding {
        self.folding
    }

    pub fn aliases(&self) -> &AliasMap {
        &self.aliases
    }

    pub fn origins(&self) -> &ColumnOriginMap {
        &self.origins
    }

    /// Diagnostics raised while analysing the query
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Snapshot for reporting
    pub fn to_report(&self) -> ResourceReport {
        ResourceReport {
            name: self.resource.clone(),
            default_table: self.default_table.clone(),
            aliases: self.aliases.as_map().clone(),
            origins: self.origins.as_map().clone(),
            diagnostics: self.diagnostics.clone(),
        }
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic.with_context(self.resource.clone()));
    }

    fn report_qualified_wildcards(&mut self, qualifiers: &[String]) {
        for qualifier in qualifiers {
            tracing::warn!(resource = %self.resource, qualifier = %qualifier, "qualified wildcard not expanded");
            let subject = self.folding.fold(qualifier);
            self.push(
                Diagnostic::new(
                    DiagnosticCode::SqlUnsupportedSyntax,
                    Severity::Warn,
                    format!(
                        "Wildcard '{}.*' is not expanded; its columns resolve to the default table",
                        qualifier
                    ),
                )
                .with_subject(subject),
            );
        }
    }

    fn report_dangling(
        &mut self,
        aliases: &AliasMap,
        origins: &ColumnOriginMap,
        unresolved: &BTreeSet<String>,
    ) {
        if aliases.is_empty() {
            return;
        }

        let dangling: BTreeSet<&str> = origins
            .iter()
            .map(|(_, origin)| origin)
            .filter(|origin| !aliases.contains(origin) && !unresolved.contains(*origin))
            .collect();

        for origin in dangling {
            self.push(
                Diagnostic::new(
                    DiagnosticCode::SqlDanglingCorrelation,
                    Severity::Info,
                    format!("Qualifier '{}' is not declared in the FROM clause; used as a table name", origin),
                )
                .with_subject(origin),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resolver(sql: &str) -> ColumnOriginResolver {
        let definition = ResourceDefinition::new("test", sql, "DEFAULT_T");
        ColumnOriginResolver::from_definition(&definition, &Dialect::ORACLE)
    }

    #[test]
    fn resolve_table_follows_one_alias_hop() {
        let aliases = AliasMap::from_iter([("T", "FOO")]);
        let origins = ColumnOriginMap::from_iter([("A", "T"), ("B", "BAR")]);

        assert_eq!(resolve_table("a", &aliases, &origins, "DEF", CaseFolding::Upper), "FOO");
        assert_eq!(resolve_table("B", &aliases, &origins, "DEF", CaseFolding::Upper), "BAR");
        assert_eq!(resolve_table("c", &aliases, &origins, "DEF", CaseFolding::Upper), "DEF");
    }

    #[test]
    fn no_aliases_resolves_to_default() {
        let r = resolver("SELECT a, b FROM t");

        assert_eq!(r.aliases(), &AliasMap::from_iter([("T", "T")]));
        assert!(r.origins().is_empty());
        assert_eq!(r.resolve_table("A"), "DEFAULT_T");
        assert_eq!(r.resolve_table("B"), "DEFAULT_T");
        assert!(r.diagnostics().is_empty());
    }

    #[test]
    fn aliased_single_table() {
        let r = resolver("SELECT t.a, t.b FROM foo t");

        assert_eq!(r.aliases(), &AliasMap::from_iter([("T", "FOO")]));
        assert_eq!(r.origins(), &ColumnOriginMap::from_iter([("A", "T"), ("B", "T")]));
        assert_eq!(r.resolve_table("A"), "FOO");
    }

    #[test]
    fn left_join() {
        let r = resolver("SELECT a.x, b.y FROM t1 a LEFT JOIN t2 b ON a.id = b.id");

        assert_eq!(r.aliases(), &AliasMap::from_iter([("A", "T1"), ("B", "T2")]));
        assert_eq!(r.resolve_table("X"), "T1");
        assert_eq!(r.resolve_table("Y"), "T2");
    }

    #[test]
    fn malformed_sql_yields_empty_maps() {
        let r = resolver("SELECT a.x, b.y FROM t1 a LEFT JOIN");

        assert!(r.aliases().is_empty());
        assert!(r.origins().is_empty());
        assert_eq!(r.resolve_table("X"), "DEFAULT_T");
        assert_eq!(r.diagnostics().len(), 1);
        assert_eq!(r.diagnostics()[0].code, DiagnosticCode::SqlParseError);
        assert_eq!(r.diagnostics()[0].context.as_deref(), Some("test"));
    }

    #[test]
    fn columns_under_unsupported_construct_use_default() {
        let r = resolver(
            "SELECT a.x, d.y FROM t1 a LEFT JOIN (SELECT id, y FROM t2) d ON a.id = d.id",
        );

        assert_eq!(r.resolve_table("X"), "T1");
        assert_eq!(r.resolve_table("Y"), "DEFAULT_T");
        assert!(r
            .diagnostics()
            .iter()
            .any(|d| d.code == DiagnosticCode::SqlUnsupportedFrom));
    }

    #[test]
    fn inner_join_falls_back_to_default() {
        let r = resolver("SELECT a.x, b.y FROM t1 a JOIN t2 b ON a.id = b.id");

        assert!(r.aliases().is_empty());
        assert_eq!(r.resolve_table("X"), "DEFAULT_T");
        assert_eq!(r.resolve_table("Y"), "DEFAULT_T");
    }

    #[test]
    fn dangling_qualifier_is_returned_as_is() {
        let r = resolver("SELECT other.x FROM t1 a");

        assert_eq!(r.resolve_table("X"), "OTHER");
        assert!(r
            .diagnostics()
            .iter()
            .any(|d| d.code == DiagnosticCode::SqlDanglingCorrelation && d.severity == Severity::Info));
    }

    #[test]
    fn qualified_wildcard_falls_back_with_warning() {
        let r = resolver(
            "SELECT f.title, l.* FROM film f LEFT JOIN language l ON f.language_id = l.language_id",
        );

        assert_eq!(r.resolve_table("TITLE"), "FILM");
        assert_eq!(r.resolve_table("NAME"), "DEFAULT_T");

        let wildcard: Vec<_> = r
            .diagnostics()
            .iter()
            .filter(|d| d.code == DiagnosticCode::SqlUnsupportedSyntax)
            .collect();
        assert_eq!(wildcard.len(), 1);
        assert_eq!(wildcard[0].severity, Severity::Warn);
        assert_eq!(wildcard[0].subject.as_deref(), Some("L"));
        assert_eq!(wildcard[0].context.as_deref(), Some("test"));
    }

    #[test]
    fn bare_wildcard_is_silent() {
        assert!(resolver("SELECT * FROM film").diagnostics().is_empty());
    }

    #[test]
    fn resolution_is_idempotent() {
        let sql = "SELECT a.x, b.y, c.z FROM t1 a LEFT JOIN t2 b ON a.id = b.id RIGHT JOIN t3 c ON c.id = a.id";

        assert_eq!(resolver(sql), resolver(sql));
    }

    #[test]
    fn lookups_are_folding_stable() {
        let r = resolver("SELECT f.Title, f.release_year FROM Film f");
        let folding = r.case_folding();

        for name in ["title", "Title", "TITLE", "release_year", "missing"] {
            let twice = folding.fold(&folding.fold(name));
            assert_eq!(r.resolve_table(name), r.resolve_table(&twice));
        }
        assert_eq!(r.resolve_table("title"), "FILM");
    }

    #[test]
    fn postgres_folds_to_lower_case() {
        let definition = ResourceDefinition::new("films", "SELECT F.TITLE FROM FILM F", "film");
        let r = ColumnOriginResolver::from_definition(&definition, &Dialect::POSTGRES);

        assert_eq!(r.aliases(), &AliasMap::from_iter([("f", "film")]));
        assert_eq!(r.resolve_table("title"), "film");
    }

    #[test]
    fn report_snapshot() {
        let report = resolver("SELECT t.a FROM foo t").to_report();

        assert_eq!(report.name, "test");
        assert_eq!(report.default_table, "DEFAULT_T");
        assert_eq!(report.aliases.get("T").map(String::as_str), Some("FOO"));
        assert_eq!(report.origins.get("A").map(String::as_str), Some("T"));
    }
}
