//! The generation run: validate, introspect, generate, write
//!
//! Each phase finishes for every table before the next one starts, so a
//! configuration problem never leaves a half-written output tree. The
//! progress callback is polled between tables and between files.

use tracing::{debug, info};

use crate::codegen::{
    default_generators, generate_table, ArtifactGenerator, GeneratedArtifact, GenerationContext,
};
use crate::config::{CodegenConfig, TableSpec};
use crate::context::{ProgressCallback, RunContext};
use crate::error::{CodegenError, Result};
use crate::introspect::Introspector;
use crate::model::TableModel;
use crate::parser::{DatabaseMetadata, DdlMetadata};
use crate::plugin::{builtin, ArtifactPlugin, PluginChain};
use crate::writer::{ArtifactWriter, WriteOutcome};

/// Result of one run
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Every non-fatal problem, in the order it was found
    pub warnings: Vec<String>,
    /// One entry per artifact
    pub files: Vec<WriteOutcome>,
}

impl GenerationReport {
    pub fn written(&self) -> impl Iterator<Item = &WriteOutcome> {
        self.files.iter().filter(|f| f.is_written())
    }
}

/// Tables found by an introspection-only run
#[derive(Debug, Default)]
pub struct InspectReport {
    pub tables: Vec<TableModel>,
    pub warnings: Vec<String>,
}

/// One configured generation run
pub struct Generator<'a> {
    config: &'a CodegenConfig,
    metadata: Option<Box<dyn DatabaseMetadata + 'a>>,
    plugins: Vec<Box<dyn ArtifactPlugin>>,
    generators: Vec<Box<dyn ArtifactGenerator>>,
    progress: Option<Box<dyn ProgressCallback>>,
}

impl<'a> Generator<'a> {
    pub fn new(config: &'a CodegenConfig) -> Self {
        Self {
            config,
            metadata: None,
            plugins: Vec::new(),
            generators: default_generators(),
            progress: None,
        }
    }

    /// Use `metadata` instead of parsing `schema_file`
    pub fn with_metadata(mut self, metadata: impl DatabaseMetadata + 'a) -> Self {
        self.metadata = Some(Box::new(metadata));
        self
    }

    /// Append a plugin after the built-ins named in the configuration
    pub fn with_plugin(mut self, plugin: impl ArtifactPlugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Replace the default generator set
    pub fn with_generators(mut self, generators: Vec<Box<dyn ArtifactGenerator>>) -> Self {
        self.generators = generators;
        self
    }

    pub fn with_progress(mut self, progress: impl ProgressCallback + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Run every phase and write the artifacts.
    /// A cancelled run still reports its warnings and the files already written.
    pub fn run(mut self) -> Result<GenerationReport> {
        let (metadata, mut ctx) = self.prepare()?;
        let plugins = self.plugin_chain()?;

        let mut files = Vec::new();
        if let Err(err) = self.run_phases(metadata.as_ref(), &plugins, &mut files, &mut ctx) {
            return Err(match err {
                CodegenError::Cancelled(_) => {
                    info!("Code generation cancelled after {} file(s)", files.len());
                    CodegenError::Cancelled(Box::new(GenerationReport {
                        warnings: ctx.into_warnings(),
                        files,
                    }))
                }
                other => other,
            });
        }

        ctx.progress().done();
        info!(
            "Code generation complete: {} file(s), {} warning(s)",
            files.iter().filter(|f| f.is_written()).count(),
            ctx.warnings().len()
        );
        Ok(GenerationReport {
            warnings: ctx.into_warnings(),
            files,
        })
    }

    /// Validate and introspect without generating anything
    pub fn inspect(mut self) -> Result<InspectReport> {
        let (metadata, mut ctx) = self.prepare()?;
        let tables = match introspect_all(self.config, metadata.as_ref(), &mut ctx) {
            Ok(tables) => tables,
            Err(CodegenError::Cancelled(_)) => {
                return Err(CodegenError::Cancelled(Box::new(GenerationReport {
                    warnings: ctx.into_warnings(),
                    files: Vec::new(),
                })))
            }
            Err(err) => return Err(err),
        };
        ctx.progress().done();
        Ok(InspectReport {
            tables,
            warnings: ctx.into_warnings(),
        })
    }

    fn prepare(&mut self) -> Result<(Box<dyn DatabaseMetadata + 'a>, RunContext)> {
        let metadata: Box<dyn DatabaseMetadata + 'a> = match self.metadata.take() {
            Some(metadata) => {
                self.config.validate_settings()?;
                metadata
            }
            None => {
                self.config.validate()?;
                info!("Parsing schema: {}", self.config.schema_file.display());
                Box::new(DdlMetadata::from_file(&self.config.schema_file)?)
            }
        };
        let ctx = match self.progress.take() {
            Some(progress) => RunContext::new(progress),
            None => RunContext::default(),
        };
        Ok((metadata, ctx))
    }

    fn plugin_chain(&mut self) -> Result<PluginChain> {
        let mut chain = PluginChain::new();
        for name in &self.config.plugins {
            let plugin = builtin(name)
                .ok_or_else(|| CodegenError::ConfigError(format!("Unknown plugin: {}", name)))?;
            chain.push(plugin);
        }
        for plugin in self.plugins.drain(..) {
            chain.push(plugin);
        }
        debug!("Plugin chain has {} plugin(s)", chain.len());
        Ok(chain)
    }

    fn run_phases(
        &self,
        metadata: &dyn DatabaseMetadata,
        plugins: &PluginChain,
        files: &mut Vec<WriteOutcome>,
        ctx: &mut RunContext,
    ) -> Result<()> {
        let tables = introspect_all(self.config, metadata, ctx)?;
        let artifacts = self.generate_all(&tables, plugins, ctx)?;
        write_all(self.config, &artifacts, files, ctx)
    }

    fn generate_all(
        &self,
        tables: &[TableModel],
        plugins: &PluginChain,
        ctx: &mut RunContext,
    ) -> Result<Vec<GeneratedArtifact>> {
        info!("Generating artifacts for {} table(s)", tables.len());
        ctx.progress().generation_started(tables.len());
        let mut artifacts = Vec::new();
        for table in tables {
            if ctx.is_cancelled() {
                return Err(CodegenError::Cancelled(Box::default()));
            }
            ctx.progress()
                .start_task(&format!("Generating files for table {}", table.table()));
            let mut gen_ctx = GenerationContext::new(self.config, plugins, ctx);
            artifacts.extend(generate_table(&self.generators, table, &mut gen_ctx));
        }
        Ok(artifacts)
    }
}

/// Table specs to run: the configured ones, or every table when none are
pub fn effective_specs(config: &CodegenConfig) -> Vec<TableSpec> {
    if config.tables.is_empty() {
        vec![TableSpec::new("%")]
    } else {
        config.tables.clone()
    }
}

fn introspect_all(
    config: &CodegenConfig,
    metadata: &dyn DatabaseMetadata,
    ctx: &mut RunContext,
) -> Result<Vec<TableModel>> {
    let specs = effective_specs(config);
    info!("Introspecting {} table configuration(s)", specs.len());
    ctx.progress().introspection_started(specs.len());

    let introspector = Introspector::new(config, metadata);
    let mut tables = Vec::new();
    for spec in &specs {
        if ctx.is_cancelled() {
            return Err(CodegenError::Cancelled(Box::default()));
        }
        ctx.progress()
            .start_task(&format!("Introspecting table {}", spec.table_name));
        tables.extend(introspector.introspect(spec, ctx)?);
    }
    info!("Found {} table(s)", tables.len());
    Ok(tables)
}

/// Outcomes are pushed as files are written, so `files` is complete up to a cancel
fn write_all(
    config: &CodegenConfig,
    artifacts: &[GeneratedArtifact],
    files: &mut Vec<WriteOutcome>,
    ctx: &mut RunContext,
) -> Result<()> {
    info!("Writing {} file(s)", artifacts.len());
    ctx.progress().save_started(artifacts.len());

    let writer = ArtifactWriter::new(config);
    for artifact in artifacts {
        if ctx.is_cancelled() {
            return Err(CodegenError::Cancelled(Box::default()));
        }
        ctx.progress()
            .start_task(&format!("Saving file {}", artifact.file_name));
        files.push(writer.write(artifact, ctx)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FilterColumn, SoftDelete};
    use crate::plugin::{ArtifactEvent, Verdict};
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::TempDir;

    const SCHEMA: &str = r#"
        CREATE TABLE orders (
            id BIGINT NOT NULL AUTO_INCREMENT,
            order_code VARCHAR(32) NOT NULL COMMENT 'business code',
            status INT NOT NULL,
            is_deleted TINYINT NOT NULL DEFAULT 0,
            creator VARCHAR(64),
            PRIMARY KEY (id)
        ) COMMENT='customer orders';

        CREATE TABLE attachments (
            body LONGBLOB
        );
    "#;

    fn config_in(dir: &TempDir) -> CodegenConfig {
        CodegenConfig {
            target_project: dir.path().join("java"),
            sqlmap_target_project: dir.path().join("resources"),
            ..Default::default()
        }
    }

    fn metadata() -> DdlMetadata {
        DdlMetadata::parse(SCHEMA).unwrap()
    }

    struct CancelAfter(Rc<Cell<usize>>);

    impl ProgressCallback for CancelAfter {
        fn check_cancel(&mut self) -> bool {
            let left = self.0.get();
            if left == 0 {
                return true;
            }
            self.0.set(left - 1);
            false
        }
    }

    #[test]
    fn test_every_table_by_default() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let report = Generator::new(&config).with_metadata(metadata()).run().unwrap();

        // attachments has only a LOB column and no key
        assert_eq!(report.files.len(), 4);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("attachments"));
        assert!(dir.path().join("java/com/example/model/Orders.java").is_file());
        assert!(!dir.path().join("java/com/example/model/Attachments.java").exists());
    }

    #[test]
    fn test_configured_table() {
        let dir = TempDir::new().unwrap();
        let mut spec = TableSpec::new("orders");
        spec.soft_delete = Some(SoftDelete {
            column: "is_deleted".into(),
            alive_value: "0".into(),
        });
        spec.filters = vec![FilterColumn {
            column: "status".into(),
            multi_value: true,
        }];
        let config = CodegenConfig {
            tables: vec![spec],
            ..config_in(&dir)
        };
        let report = Generator::new(&config).with_metadata(metadata()).run().unwrap();
        assert!(report.warnings.is_empty());
        assert_eq!(report.written().count(), 4);

        let xml = std::fs::read_to_string(dir.path().join("resources/mapper/OrdersMapper.xml")).unwrap();
        assert!(xml.contains("is_deleted = 0"));
        assert!(xml.contains("statusList != null and statusList.size() &gt; 0"));
    }

    #[test]
    fn test_regeneration_is_stable() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        Generator::new(&config).with_metadata(metadata()).run().unwrap();
        let path = dir.path().join("java/com/example/query/OrdersQC.java");
        let first = std::fs::read_to_string(&path).unwrap();

        let report = Generator::new(&config).with_metadata(metadata()).run().unwrap();
        assert!(report
            .files
            .iter()
            .all(|f| matches!(f, WriteOutcome::Merged(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    }

    #[test]
    fn test_custom_plugin_veto() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let report = Generator::new(&config)
            .with_metadata(metadata())
            .with_plugin(|event: &mut ArtifactEvent<'_>, _: &TableModel| match event {
                ArtifactEvent::ClientInterface { .. } => Verdict::Veto,
                _ => Verdict::Keep,
            })
            .run()
            .unwrap();
        assert_eq!(report.files.len(), 3);
        assert!(!dir.path().join("java/com/example/mapper/OrdersMapper.java").exists());
    }

    #[test]
    fn test_builtin_plugins_from_config() {
        let dir = TempDir::new().unwrap();
        let config = CodegenConfig {
            plugins: vec!["lombok".into()],
            ..config_in(&dir)
        };
        Generator::new(&config).with_metadata(metadata()).run().unwrap();
        let record = std::fs::read_to_string(dir.path().join("java/com/example/model/Orders.java")).unwrap();
        assert!(record.contains("@Data\npublic class Orders"));
        assert!(!record.contains("getOrderCode"));
    }

    #[test]
    fn test_invalid_config_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let config = CodegenConfig {
            model_package: String::new(),
            ..config_in(&dir)
        };
        let err = Generator::new(&config).with_metadata(metadata()).run().unwrap_err();
        assert!(matches!(err, CodegenError::ValidationError(_)));
        assert!(!dir.path().join("java").exists());
    }

    #[test]
    fn test_cancel_between_files() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        // one check while introspecting, one while generating, two files
        let budget = Rc::new(Cell::new(4));
        let err = Generator::new(&config)
            .with_metadata(metadata())
            .with_progress(CancelAfter(budget))
            .run()
            .unwrap_err();
        let CodegenError::Cancelled(report) = err else {
            panic!("expected cancellation, got {:?}", err);
        };
        assert_eq!(report.files.len(), 2);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("attachments"));
        assert!(dir.path().join("java/com/example/model/Orders.java").is_file());
        assert!(!dir.path().join("java/com/example/mapper/OrdersMapper.java").exists());
    }

    #[test]
    fn test_cancel_during_introspection_keeps_warnings() {
        let config = CodegenConfig {
            tables: vec![TableSpec::new("attachments"), TableSpec::new("orders")],
            ..CodegenConfig::default()
        };
        let err = Generator::new(&config)
            .with_metadata(metadata())
            .with_progress(CancelAfter(Rc::new(Cell::new(1))))
            .inspect()
            .unwrap_err();
        let CodegenError::Cancelled(report) = err else {
            panic!("expected cancellation, got {:?}", err);
        };
        assert!(report.files.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_inspect() {
        let config = CodegenConfig::default();
        let report = Generator::new(&config).with_metadata(metadata()).inspect().unwrap();
        assert_eq!(report.tables.len(), 1);
        assert_eq!(report.tables[0].names().domain_object, "Orders");
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_default_specs() {
        let config = CodegenConfig::default();
        let specs = effective_specs(&config);
        assert_eq!(specs.len(), 1);
        assert!(specs[0].matches_table("anything"));
    }
}
