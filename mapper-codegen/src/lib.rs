//! mapper-codegen: Generate MyBatis records, query conditions, mapper
//! interfaces and mapper XML from MySQL schema DDL
//!
//! This crate provides both a CLI tool and a library. For every configured
//! table it reads column metadata (parsed from DDL with `sqlparser-rs`, no
//! live database needed), builds a table model, and emits:
//!
//! - a record class with one property per column
//! - a query-condition class (`OrdersQC`) with filter and paging fields
//! - a mapper interface with `insert`, `batchInsert`, `count`, `getByQc`, `list`
//! - a mapper XML document implementing those statements plus `update` and `batchUpdate`
//!
//! Regenerating merges into existing files: members and fragments the
//! generator owns are replaced, hand-written ones are kept.
//!
//! # Usage in build.rs
//!
//! Configure in your `Cargo.toml`:
//!
//! ```toml
//! [package.metadata.mapper-codegen]
//! schema_file = "schema.sql"
//! config_file = "mapper-codegen.toml"
//! ```
//!
//! Then use a minimal `build.rs`:
//!
//! ```rust,ignore
//! fn main() {
//!     mapper_codegen::generate_from_cargo_metadata()
//!         .expect("Failed to generate mapper code");
//! }
//! ```
//!
//! # Programmatic Configuration
//!
//! ```rust,ignore
//! let report = mapper_codegen::CodegenBuilder::new("schema.sql")
//!     .output_dir("src/main")
//!     .model_package("com.acme.model")
//!     .plugin("lombok")
//!     .generate()?;
//! for warning in &report.warnings {
//!     println!("cargo:warning={}", warning);
//! }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! mapper-codegen --config mapper-codegen.toml --output ./src/main generate
//! ```

pub mod codegen;
pub mod config;
pub mod context;
pub mod dom;
pub mod error;
pub mod introspect;
pub mod merge;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod plugin;
pub mod writer;

use std::path::{Path, PathBuf};

pub use config::{CodegenConfig, TableSpec};
pub use context::ProgressCallback;
pub use error::{CodegenError, Result};
pub use pipeline::{GenerationReport, Generator, InspectReport};

/// Main entry point for code generation
pub fn generate(config: &CodegenConfig) -> Result<GenerationReport> {
    Generator::new(config).run()
}

/// Builder pattern for easy configuration in build.rs
pub struct CodegenBuilder {
    config: CodegenConfig,
}

impl CodegenBuilder {
    /// Create a new builder with the given schema file
    pub fn new(schema_file: impl AsRef<Path>) -> Self {
        Self {
            config: CodegenConfig::default_with_schema(schema_file.as_ref().to_path_buf()),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: CodegenConfig) -> Self {
        Self { config }
    }

    /// Java sources go to `dir/java`, mapper XML to `dir/resources`
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.config.target_project = dir.join("java");
        self.config.sqlmap_target_project = dir.join("resources");
        self
    }

    pub fn target_project(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.target_project = dir.as_ref().to_path_buf();
        self
    }

    pub fn sqlmap_target_project(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.sqlmap_target_project = dir.as_ref().to_path_buf();
        self
    }

    pub fn model_package(mut self, package: &str) -> Self {
        self.config.model_package = package.to_string();
        self
    }

    pub fn query_package(mut self, package: &str) -> Self {
        self.config.query_package = package.to_string();
        self
    }

    pub fn client_package(mut self, package: &str) -> Self {
        self.config.client_package = package.to_string();
        self
    }

    /// Add a table configuration; with none, every table is generated
    pub fn table(mut self, spec: TableSpec) -> Self {
        self.config.tables.push(spec);
        self
    }

    /// Enable a built-in plugin by name
    pub fn plugin(mut self, name: &str) -> Self {
        self.config.plugins.push(name.to_string());
        self
    }

    /// Replace existing files instead of writing `name.N` when not merging
    pub fn overwrite(mut self) -> Self {
        self.config.overwrite = true;
        self
    }

    /// Never merge into existing files
    pub fn no_merge(mut self) -> Self {
        self.config.merge = false;
        self
    }

    /// Enable dry run mode (preview without writing files)
    pub fn dry_run(mut self) -> Self {
        self.config.dry_run = true;
        self
    }

    pub fn config(&self) -> &CodegenConfig {
        &self.config
    }

    /// Generate the code
    pub fn generate(self) -> Result<GenerationReport> {
        generate(&self.config)
    }
}

/// Configuration for `[package.metadata.mapper-codegen]` in Cargo.toml
#[derive(Debug, Clone, Default, serde::Deserialize)]
struct CargoMetadataConfig {
    /// Path to the SQL schema file (required)
    schema_file: Option<String>,

    /// Full configuration file; its output paths are replaced by OUT_DIR
    /// unless `output_dir` is set
    config_file: Option<String>,

    /// Output root, relative to the manifest directory
    output_dir: Option<String>,

    /// Tables to generate (optional, defaults to all)
    #[serde(default)]
    tables: Vec<String>,
}

#[derive(Debug, serde::Deserialize)]
struct CargoToml {
    package: Option<CargoPackage>,
}

#[derive(Debug, serde::Deserialize)]
struct CargoPackage {
    metadata: Option<CargoPackageMetadata>,
}

#[derive(Debug, serde::Deserialize)]
struct CargoPackageMetadata {
    #[serde(rename = "mapper-codegen")]
    mapper_codegen: Option<CargoMetadataConfig>,
}

/// Generate code from `[package.metadata.mapper-codegen]` in Cargo.toml
///
/// Warnings are forwarded to cargo as `cargo:warning` lines.
pub fn generate_from_cargo_metadata() -> Result<GenerationReport> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").map_err(|_| {
        CodegenError::ConfigError(
            "CARGO_MANIFEST_DIR not set - are you running from build.rs?".into(),
        )
    })?;
    let manifest_dir = PathBuf::from(manifest_dir);

    let cargo_toml_path = manifest_dir.join("Cargo.toml");
    let cargo_toml_content = std::fs::read_to_string(&cargo_toml_path)?;

    let cargo_toml: CargoToml = toml::from_str(&cargo_toml_content).map_err(|e| {
        CodegenError::ConfigError(format!(
            "Failed to parse {}: {}",
            cargo_toml_path.display(),
            e
        ))
    })?;

    let metadata_config = cargo_toml
        .package
        .and_then(|p| p.metadata)
        .and_then(|m| m.mapper_codegen)
        .ok_or_else(|| {
            CodegenError::ConfigError(
                "Missing [package.metadata.mapper-codegen] section in Cargo.toml".into(),
            )
        })?;

    let schema_file = metadata_config.schema_file.ok_or_else(|| {
        CodegenError::ConfigError(
            "schema_file is required in [package.metadata.mapper-codegen]".into(),
        )
    })?;
    let schema_path = manifest_dir.join(&schema_file);

    let mut config = match &metadata_config.config_file {
        Some(file) => {
            let path = manifest_dir.join(file);
            println!("cargo:rerun-if-changed={}", path.display());
            CodegenConfig::from_file(&path)?
        }
        None => CodegenConfig::default(),
    };
    config.schema_file = schema_path.clone();
    for table in &metadata_config.tables {
        config.tables.push(TableSpec::new(table.as_str()));
    }

    let output_dir = match metadata_config.output_dir {
        Some(dir) => manifest_dir.join(dir),
        None => std::env::var("OUT_DIR").map(PathBuf::from).map_err(|_| {
            CodegenError::ConfigError("OUT_DIR not set - are you running from build.rs?".into())
        })?,
    };

    println!("cargo:rerun-if-changed={}", schema_path.display());
    println!("cargo:rerun-if-changed={}", cargo_toml_path.display());

    let report = CodegenBuilder::from_config(config)
        .output_dir(output_dir)
        .generate()?;
    for warning in &report.warnings {
        println!("cargo:warning={}", warning);
    }
    Ok(report)
}
