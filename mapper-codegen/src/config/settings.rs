//! Configuration settings for mapper-codegen

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::defaults;
use super::table::TableSpec;
use crate::error::{CodegenError, Result};

/// Main configuration struct for code generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Path to the SQL schema file
    #[serde(default)]
    pub schema_file: PathBuf,

    /// Root directory for generated Java sources
    #[serde(default = "default_target_project")]
    pub target_project: PathBuf,

    /// Root directory for generated mapper XML
    #[serde(default = "default_sqlmap_target_project")]
    pub sqlmap_target_project: PathBuf,

    /// Package of record classes
    #[serde(default = "default_model_package")]
    pub model_package: String,

    /// Package of query-condition classes
    #[serde(default = "default_query_package")]
    pub query_package: String,

    /// Package of mapper interfaces
    #[serde(default = "default_client_package")]
    pub client_package: String,

    /// Package (directory path) of mapper XML documents
    #[serde(default = "default_sqlmap_package")]
    pub sqlmap_package: String,

    /// Merge into existing files, keeping hand-written members
    #[serde(default = "default_merge")]
    pub merge: bool,

    /// Overwrite existing files when they cannot be merged
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,

    /// Generate an all-args constructor on record classes
    #[serde(default)]
    pub constructor_based: bool,

    /// Records expose getters only (implies constructor_based)
    #[serde(default)]
    pub immutable: bool,

    /// Records implement `java.io.Serializable`
    #[serde(default)]
    pub serializable: bool,

    /// Shared superclass of record classes
    #[serde(default)]
    pub record_root_class: Option<RootClass>,

    /// Shared superclass of query-condition classes (usually holding paging fields)
    #[serde(default)]
    pub query_root_class: Option<String>,

    /// Map temporal columns to `java.time` types
    #[serde(default)]
    pub use_java_time: bool,

    /// Map every DECIMAL/NUMERIC column to `BigDecimal`
    #[serde(default)]
    pub force_big_decimals: bool,

    /// Built-in plugins to enable, in order (`lombok`, `mapper-annotation`)
    #[serde(default)]
    pub plugins: Vec<String>,

    /// Tables to generate; every table in the schema when empty
    #[serde(default)]
    pub tables: Vec<TableSpec>,

    /// Dry run mode - preview without writing files
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    /// Can be overridden by RUST_LOG env var
    #[serde(default)]
    pub log_level: Option<String>,
}

/// Superclass shared by generated records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootClass {
    /// Fully-qualified class name
    #[serde(rename = "type")]
    pub type_name: String,

    /// Properties the root class already declares
    #[serde(default)]
    pub properties: Vec<String>,
}

// Default value functions for serde
fn default_target_project() -> PathBuf {
    PathBuf::from(defaults::TARGET_PROJECT)
}
fn default_sqlmap_target_project() -> PathBuf {
    PathBuf::from(defaults::SQLMAP_TARGET_PROJECT)
}
fn default_model_package() -> String {
    defaults::MODEL_PACKAGE.to_string()
}
fn default_query_package() -> String {
    defaults::QUERY_PACKAGE.to_string()
}
fn default_client_package() -> String {
    defaults::CLIENT_PACKAGE.to_string()
}
fn default_sqlmap_package() -> String {
    defaults::SQLMAP_PACKAGE.to_string()
}
fn default_merge() -> bool {
    defaults::MERGE
}
fn default_overwrite() -> bool {
    defaults::OVERWRITE
}
fn default_dry_run() -> bool {
    defaults::DRY_RUN
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            schema_file: PathBuf::new(),
            target_project: default_target_project(),
            sqlmap_target_project: default_sqlmap_target_project(),
            model_package: default_model_package(),
            query_package: default_query_package(),
            client_package: default_client_package(),
            sqlmap_package: default_sqlmap_package(),
            merge: default_merge(),
            overwrite: default_overwrite(),
            constructor_based: false,
            immutable: false,
            serializable: false,
            record_root_class: None,
            query_root_class: None,
            use_java_time: false,
            force_big_decimals: false,
            plugins: Vec::new(),
            tables: Vec::new(),
            dry_run: default_dry_run(),
            log_level: None,
        }
    }
}

impl CodegenConfig {
    /// Create a default config with the given schema file
    pub fn default_with_schema(schema_file: PathBuf) -> Self {
        Self {
            schema_file,
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CodegenConfig = toml::from_str(&content).map_err(|e| {
            CodegenError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Load configuration using config-rs (file + environment variables)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        } else {
            builder = builder.add_source(File::with_name("mapper-codegen").required(false));
        }

        // Override with environment variables (MAPPER_CODEGEN_*)
        builder = builder.add_source(Environment::with_prefix("MAPPER_CODEGEN").separator("__"));

        let config: CodegenConfig = builder.build()?.try_deserialize()?;

        Ok(config)
    }

    /// Whether records get an all-args constructor
    pub fn constructor_based(&self) -> bool {
        self.constructor_based || self.immutable
    }

    /// Validate the configuration, reporting every problem at once
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.schema_file.as_os_str().is_empty() {
            errors.push("schema_file is required".to_string());
        } else if !self.schema_file.exists() {
            errors.push(format!(
                "Schema file not found: {}",
                self.schema_file.display()
            ));
        }

        self.check_settings(&mut errors);
        into_result(errors)
    }

    /// Validate everything except the schema file, for runs that bring
    /// their own metadata source
    pub fn validate_settings(&self) -> Result<()> {
        let mut errors = Vec::new();
        self.check_settings(&mut errors);
        into_result(errors)
    }

    fn check_settings(&self, errors: &mut Vec<String>) {
        for (key, value) in [
            ("model_package", &self.model_package),
            ("query_package", &self.query_package),
            ("client_package", &self.client_package),
        ] {
            if value.trim().is_empty() {
                errors.push(format!("{} is required", key));
            } else if !is_valid_package(value) {
                errors.push(format!("{} is not a valid Java package: {}", key, value));
            }
        }

        if let Some(root) = &self.record_root_class {
            if root.type_name.trim().is_empty() {
                errors.push("record_root_class.type is required".to_string());
            }
        }

        for plugin in &self.plugins {
            if crate::plugin::builtin(plugin).is_none() {
                errors.push(format!("Unknown plugin: {}", plugin));
            }
        }

        for table in &self.tables {
            table.validate(errors);
        }
    }
}

fn into_result(errors: Vec<String>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CodegenError::ValidationError(errors))
    }
}

fn is_valid_package(package: &str) -> bool {
    package.split('.').all(|part| {
        let mut chars = part.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CodegenConfig::default();
        assert_eq!(config.model_package, "com.example.model");
        assert!(config.merge);
        assert!(!config.overwrite);
        assert!(config.tables.is_empty());
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_validation_missing_schema() {
        let config = CodegenConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = CodegenConfig::default();
        config.model_package = "com..bad".into();
        config.plugins.push("nope".into());
        let mut table = TableSpec::new("orders");
        table.column_renaming_rule = Some(crate::config::RenamingRule {
            search: "[".into(),
            replace: String::new(),
        });
        config.tables.push(table);

        match config.validate() {
            Err(CodegenError::ValidationError(errors)) => {
                assert_eq!(errors.len(), 4);
                assert!(errors[0].contains("schema_file"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_package_names() {
        assert!(is_valid_package("com.example.model"));
        assert!(is_valid_package("_x.y1"));
        assert!(!is_valid_package("com.1x"));
        assert!(!is_valid_package("com-example"));
    }

    #[test]
    fn test_config_from_toml() {
        let toml_content = r#"
            schema_file = "test.sql"
            log_level = "debug"
            plugins = ["lombok"]

            [record_root_class]
            type = "com.example.BaseDO"
            properties = ["id"]

            [[tables]]
            table_name = "orders"
            offset_field = "offset"
            limit_field = "limit"
        "#;
        let config: CodegenConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.log_level, Some("debug".to_string()));
        assert_eq!(config.tables.len(), 1);
        assert!(config.tables[0].pagination_enabled());
        assert_eq!(
            config.record_root_class.unwrap().type_name,
            "com.example.BaseDO"
        );
    }
}
