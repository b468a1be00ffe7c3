//! CLI entry point for mapper-codegen

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mapper_codegen::config::CodegenConfig;
use mapper_codegen::writer::WriteOutcome;
use mapper_codegen::Generator;

#[derive(Parser)]
#[command(name = "mapper-codegen")]
#[command(about = "Generate MyBatis records, query conditions, mappers and mapper XML from MySQL schema DDL")]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to SQL schema file (overrides config)
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Output root (overrides config; Java goes to OUTPUT/java, XML to OUTPUT/resources)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dry run - show what would be generated without writing files
    #[arg(long)]
    dry_run: bool,

    /// Overwrite existing files that are not merged
    #[arg(long)]
    overwrite: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate every artifact for every configured table
    Generate,
    /// Inspect schema (show introspected tables for debugging)
    Inspect,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (before logging, so we can use config.log_level)
    let mut config = if let Some(config_path) = &cli.config {
        CodegenConfig::load(Some(config_path.as_path()))?
    } else {
        CodegenConfig::default()
    };

    // Priority: RUST_LOG env var > config.log_level > default (debug for dev, info for release)
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let log_level = config.log_level.as_deref().unwrap_or(default_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();

    // Apply CLI overrides
    if let Some(schema) = cli.schema {
        config.schema_file = schema;
    }
    if let Some(output) = cli.output {
        config.target_project = output.join("java");
        config.sqlmap_target_project = output.join("resources");
    }
    if cli.dry_run {
        config.dry_run = true;
    }
    if cli.overwrite {
        config.overwrite = true;
    }

    if let Some(Commands::Inspect) = &cli.command {
        return inspect_schema(&config);
    }

    info!("Generating code from schema: {:?}", config.schema_file);
    let report = Generator::new(&config).run()?;

    if config.dry_run {
        println!("Dry run mode - would generate:");
    }
    for file in &report.files {
        let action = match file {
            WriteOutcome::Created(_) => "created",
            WriteOutcome::Merged(_) => "merged",
            WriteOutcome::Overwritten(_) => "overwritten",
            WriteOutcome::Renamed(_) => "renamed",
            WriteOutcome::Planned(_) => "planned",
            WriteOutcome::Skipped(_) => "skipped",
        };
        println!("  {:<11} {}", action, file.path().display());
    }
    print_warnings(&report.warnings);

    info!("Code generation completed successfully");
    Ok(())
}

fn inspect_schema(config: &CodegenConfig) -> Result<()> {
    let report = Generator::new(config).inspect()?;

    println!("Introspected {} tables:\n", report.tables.len());
    for table in &report.tables {
        let names = table.names();
        println!("Table: {}", table.table());
        if let Some(remarks) = table.remarks() {
            println!("  Remarks: {}", remarks);
        }
        println!("  Record: {}", names.record_type.qualified_name());
        println!("  Mapper: {}", names.mapper_type.qualified_name());
        println!(
            "  Columns ({} key, {} base, {} large object):",
            table.primary_key_columns().len(),
            table.base_columns().count(),
            table.large_object_columns().count()
        );
        for col in table.columns() {
            let nullable = if col.nullable { "NULL" } else { "NOT NULL" };
            let key = if col.primary_key { " PK" } else { "" };
            let lob = if col.large_object { " LOB" } else { "" };
            println!(
                "    - {} {} {} -> {} {}{}{}",
                col.actual_name,
                col.jdbc_type,
                nullable,
                col.java_type.short_name(),
                col.property,
                key,
                lob
            );
        }
        let fields: Vec<&str> = table.query_fields().iter().map(|f| f.property.as_str()).collect();
        if !fields.is_empty() {
            println!("  Query fields: {}", fields.join(", "));
        }
        println!();
    }
    print_warnings(&report.warnings);

    Ok(())
}

fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    println!("\n{} warning(s):", warnings.len());
    for warning in warnings {
        println!("  - {}", warning);
    }
}
