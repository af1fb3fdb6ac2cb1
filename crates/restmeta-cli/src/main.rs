use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use restmeta_core::{Config, Diagnostic, Dialect, Report, ResourceDefinition, Severity};
use restmeta_sql::ColumnOriginResolver;

/// restmeta - resolve which base table each column of a SQL resource comes from
#[derive(Parser)]
#[command(name = "restmeta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: restmeta.toml)
    #[arg(short, long, global = true, env = "RESTMETA_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve alias and column-origin maps for configured resources
    Resolve {
        /// Resource to resolve (all resources if omitted)
        resource: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Also write the JSON report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the base table each named column resolves to
    Columns {
        /// Resource name
        resource: String,

        /// Column names as reported by the database
        #[arg(required = true)]
        columns: Vec<String>,
    },

    /// Show the configured dialect's catalog queries and folding policy
    Dialect,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "restmeta=debug,warn" } else { "error" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    let config = load_config(cli.config.as_deref(), cli.verbose)?;

    if cli.verbose {
        eprintln!("{} dialect: {:?}", "Using".cyan(), config.dialect);
    }

    match cli.command {
        Commands::Resolve { resource, format, output } => {
            resolve_command(&config, resource.as_deref(), format, output.as_deref())
        }
        Commands::Columns { resource, columns } => columns_command(&config, &resource, &columns),
        Commands::Dialect => dialect_command(&config),
    }
}

fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    if let Some(path) = path {
        return Ok(Config::from_file(path)?);
    }

    let default_path = Path::new("restmeta.toml");
    if default_path.exists() {
        return Ok(Config::from_file(default_path)?);
    }

    if verbose {
        eprintln!("{}", "No config file found, using defaults".yellow());
    }
    Ok(Config::default())
}

fn find_resource<'a>(config: &'a Config, name: &str) -> Result<&'a ResourceDefinition> {
    config.resource(name).ok_or_else(|| {
        let known: Vec<&str> = config.resources.iter().map(|r| r.name.as_str()).collect();
        anyhow::anyhow!(
            "Resource '{}' not found in config. Known resources: {}",
            name,
            if known.is_empty() { "(none)".to_string() } else { known.join(", ") }
        )
    })
}

/// Resolve command - build and print the maps for one or all resources
fn resolve_command(
    config: &Config,
    resource: Option<&str>,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let dialect = Dialect::for_config(config.dialect);

    let definitions: Vec<&ResourceDefinition> = match resource {
        Some(name) => vec![find_resource(config, name)?],
        None => config.resources.iter().collect(),
    };

    tracing::debug!(count = definitions.len(), dialect = ?config.dialect, "resolving resources");

    let mut report = Report::new(config.dialect);
    for definition in definitions {
        let mut resource_report =
            ColumnOriginResolver::from_definition(definition, &dialect).to_report();
        apply_severity_overrides(config, &mut resource_report.diagnostics);
        report.add_resource(resource_report);
    }

    if let Some(path) = output {
        std::fs::write(path, report.to_json()?)?;
        eprintln!("{} {}", "Report saved to:".green(), path.display());
    }

    match format {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => print_report(&report),
    }

    if report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

/// Columns command - resolve individual driver column names
fn columns_command(config: &Config, resource: &str, columns: &[String]) -> Result<()> {
    let dialect = Dialect::for_config(config.dialect);
    let definition = find_resource(config, resource)?;
    let resolver = ColumnOriginResolver::from_definition(definition, &dialect);

    for column in columns {
        let table = resolver.resolve_table(column);
        let qualified = dialect.qualified_table_name(definition.database.as_deref(), table);
        let marker = if table == resolver.default_table()
            && resolver.origins().get(&dialect.fold(column)).is_none()
        {
            " (default)".dimmed().to_string()
        } else {
            String::new()
        };

        println!("{} -> {}{}", column.bold(), qualified.green(), marker);
    }

    for diagnostic in resolver.diagnostics() {
        eprintln!("{}", diagnostic.to_string().yellow());
    }

    Ok(())
}

/// Dialect command - print the active dialect strategy
fn dialect_command(config: &Config) -> Result<()> {
    let dialect = Dialect::for_config(config.dialect);

    println!("{} {:?}", "Dialect:".bold(), dialect.config);
    println!("{} {:?}", "Case folding:".bold(), dialect.case_folding);
    println!("{} {:?}", "Sequence defaults:".bold(), dialect.sequence_style);
    println!("{} {:?}", "Table qualification:".bold(), dialect.qualification);
    println!("{}{}", "Pagination:".bold(), dialect.limit_clause(10, 0));
    println!();
    println!("{}", "Columns query:".bold());
    println!("  {}", dialect.columns_query);
    println!("{}", "Primary key query:".bold());
    println!("  {}", dialect.primary_key_query);

    Ok(())
}

fn apply_severity_overrides(config: &Config, diagnostics: &mut [Diagnostic]) {
    for diagnostic in diagnostics {
        diagnostic.severity = config.severity.get_severity(diagnostic.code, diagnostic.severity);
    }
}

fn print_report(report: &Report) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Column Origin Resolution Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());

    for resource in &report.resources {
        println!();
        println!("{} {} (default table: {})", "Resource:".bold(), resource.name.green(), resource.default_table);

        if resource.aliases.is_empty() {
            println!("  {}", "No aliases resolved".yellow());
        } else {
            println!("  {}", "Aliases:".bold());
            for (alias, table) in &resource.aliases {
                println!("    {} -> {}", alias, table);
            }
        }

        if !resource.origins.is_empty() {
            println!("  {}", "Column origins:".bold());
            for (column, origin) in &resource.origins {
                match resource.aliases.get(origin) {
                    Some(table) if table != origin => {
                        println!("    {} -> {} ({})", column, origin, table)
                    }
                    _ => println!("    {} -> {}", column, origin),
                }
            }
        }

        for diag in &resource.diagnostics {
            let severity = match diag.severity {
                Severity::Error => "ERROR".red().bold(),
                Severity::Warn => "WARN".yellow().bold(),
                Severity::Info => "INFO".blue(),
            };
            println!("  [{}] {}: {}", severity, diag.code, diag.message);
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  Resources: {}", report.summary.resources);
    if report.summary.errors > 0 {
        println!("  Errors:   {}", format!("{}", report.summary.errors).red().bold());
    } else {
        println!("  Errors:   {}", format!("{}", report.summary.errors).green());
    }
    if report.summary.warnings > 0 {
        println!("  Warnings: {}", format!("{}", report.summary.warnings).yellow());
    } else {
        println!("  Warnings: {}", format!("{}", report.summary.warnings).green());
    }
    println!("  Info:     {}", report.summary.info);
    println!("{}", "=".repeat(60).bright_blue());
}
