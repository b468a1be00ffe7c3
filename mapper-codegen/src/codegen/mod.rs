//! Artifact generators
//!
//! Each [`ArtifactGenerator`] reads one [`TableModel`] and produces finished
//! artifact trees. Generators keep no state between tables; everything a run
//! shares lives in the [`GenerationContext`].

pub mod java;
pub mod xml;

use std::path::{Path, PathBuf};

use crate::config::CodegenConfig;
use crate::context::RunContext;
use crate::dom::{CompilationUnit, XmlDocument};
use crate::model::TableModel;
use crate::plugin::{ArtifactEvent, PluginChain};

pub use java::{MapperInterfaceGenerator, QueryConditionGenerator, RecordGenerator};
pub use xml::{FragmentGenerator, SqlMapGenerator};

/// What a generated file is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Record,
    QueryCondition,
    MapperInterface,
    SqlMap,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactBody {
    Java(CompilationUnit),
    Xml(XmlDocument),
}

/// One file-to-be, still as a tree
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedArtifact {
    pub kind: ArtifactKind,
    pub target_project: PathBuf,
    /// Dotted package; becomes nested directories under the project
    pub package: String,
    pub file_name: String,
    pub body: ArtifactBody,
}

impl GeneratedArtifact {
    pub fn java(kind: ArtifactKind, target_project: &Path, unit: CompilationUnit) -> Self {
        Self {
            kind,
            target_project: target_project.to_path_buf(),
            package: unit.ty.package().unwrap_or_default().to_string(),
            file_name: unit.file_name(),
            body: ArtifactBody::Java(unit),
        }
    }

    pub fn xml(
        target_project: &Path,
        package: &str,
        file_name: &str,
        document: XmlDocument,
    ) -> Self {
        Self {
            kind: ArtifactKind::SqlMap,
            target_project: target_project.to_path_buf(),
            package: package.to_string(),
            file_name: file_name.to_string(),
            body: ArtifactBody::Xml(document),
        }
    }

    pub fn render(&self) -> String {
        match &self.body {
            ArtifactBody::Java(unit) => unit.render(),
            ArtifactBody::Xml(document) => document.render(),
        }
    }

    /// Path relative to the target project
    pub fn relative_path(&self) -> PathBuf {
        let mut path: PathBuf = self
            .package
            .split('.')
            .filter(|segment| !segment.is_empty())
            .collect();
        path.push(&self.file_name);
        path
    }
}

/// Everything a generator may read or record during one run
pub struct GenerationContext<'a> {
    pub config: &'a CodegenConfig,
    pub plugins: &'a PluginChain,
    pub run: &'a mut RunContext,
}

impl<'a> GenerationContext<'a> {
    pub fn new(config: &'a CodegenConfig, plugins: &'a PluginChain, run: &'a mut RunContext) -> Self {
        Self {
            config,
            plugins,
            run,
        }
    }

    /// Offer an artifact to the plugin chain
    pub fn approve(&self, event: ArtifactEvent<'_>, table: &TableModel) -> bool {
        self.plugins.approve(event, table)
    }
}

/// A strategy turning a table model into artifacts
pub trait ArtifactGenerator {
    fn name(&self) -> &'static str;

    fn generate(&self, table: &TableModel, ctx: &mut GenerationContext<'_>) -> Vec<GeneratedArtifact>;
}

/// The generators every table runs through, in output order
pub fn default_generators() -> Vec<Box<dyn ArtifactGenerator>> {
    vec![
        Box::new(RecordGenerator),
        Box::new(QueryConditionGenerator),
        Box::new(MapperInterfaceGenerator),
        Box::new(SqlMapGenerator::default()),
    ]
}

/// Run every generator over one table
pub fn generate_table(
    generators: &[Box<dyn ArtifactGenerator>],
    table: &TableModel,
    ctx: &mut GenerationContext<'_>,
) -> Vec<GeneratedArtifact> {
    let mut artifacts = Vec::new();
    for generator in generators {
        let produced = generator.generate(table, ctx);
        tracing::debug!(
            "{} produced {} artifact(s) for {}",
            generator.name(),
            produced.len(),
            table.table()
        );
        artifacts.extend(produced);
    }
    artifacts
}


#[cfg(test)]
mod tests {
    use super::test_support::generate_with;
    use super::*;
    use crate::model::test_support::orders_table;

    #[test]
    fn test_default_generators_cover_every_kind() {
        let (artifacts, warnings) =
            generate_with(&orders_table(), &CodegenConfig::default(), &PluginChain::new());
        let kinds: Vec<ArtifactKind> = artifacts.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ArtifactKind::Record,
                ArtifactKind::QueryCondition,
                ArtifactKind::MapperInterface,
                ArtifactKind::SqlMap
            ]
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_relative_paths() {
        let (artifacts, _) =
            generate_with(&orders_table(), &CodegenConfig::default(), &PluginChain::new());
        let paths: Vec<PathBuf> = artifacts.iter().map(|a| a.relative_path()).collect();
        assert_eq!(paths[0], PathBuf::from("com/example/model/Orders.java"));
        assert_eq!(paths[1], PathBuf::from("com/example/query/OrdersQC.java"));
        assert_eq!(paths[2], PathBuf::from("com/example/mapper/OrdersMapper.java"));
        assert_eq!(paths[3], PathBuf::from("mapper/OrdersMapper.xml"));
    }
}
