//! Plugins selectable by name from the configuration file

use crate::dom::JavaType;
use crate::model::TableModel;

use super::{ArtifactEvent, ArtifactPlugin, Verdict};

/// Names accepted in the `plugins` configuration list
pub const BUILTIN_PLUGINS: &[&str] = &[LombokPlugin::NAME, MapperAnnotationPlugin::NAME];

/// Look up a built-in plugin by its configuration name
pub fn builtin(name: &str) -> Option<Box<dyn ArtifactPlugin>> {
    match name {
        LombokPlugin::NAME => Some(Box::new(LombokPlugin)),
        MapperAnnotationPlugin::NAME => Some(Box::new(MapperAnnotationPlugin)),
        _ => None,
    }
}

/// Annotates record classes with `@Data` and drops the accessors it replaces
#[derive(Debug, Default)]
pub struct LombokPlugin;

impl LombokPlugin {
    pub const NAME: &'static str = "lombok";
}

impl ArtifactPlugin for LombokPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn on_artifact(&self, event: &mut ArtifactEvent<'_>, _table: &TableModel) -> Verdict {
        match event {
            ArtifactEvent::ModelClass { unit, .. } => {
                unit.add_import(&JavaType::new("lombok.Data"));
                unit.add_annotation("@Data");
                Verdict::Changed
            }
            ArtifactEvent::ModelGetter { .. } | ArtifactEvent::ModelSetter { .. } => Verdict::Veto,
            _ => Verdict::Keep,
        }
    }
}

/// Marks mapper interfaces with MyBatis' `@Mapper`
#[derive(Debug, Default)]
pub struct MapperAnnotationPlugin;

impl MapperAnnotationPlugin {
    pub const NAME: &'static str = "mapper-annotation";
}

impl ArtifactPlugin for MapperAnnotationPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn on_artifact(&self, event: &mut ArtifactEvent<'_>, _table: &TableModel) -> Verdict {
        if let ArtifactEvent::ClientInterface { unit } = event {
            unit.add_import(&JavaType::new("org.apache.ibatis.annotations.Mapper"));
            unit.add_annotation("@Mapper");
            return Verdict::Changed;
        }
        Verdict::Keep
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{CompilationUnit, Method, TypeKind};
    use crate::model::test_support::orders_table;
    use crate::plugin::ModelKind;

    #[test]
    fn test_lookup() {
        assert!(builtin("lombok").is_some());
        assert!(builtin("mapper-annotation").is_some());
        assert!(builtin("unknown").is_none());
        assert_eq!(BUILTIN_PLUGINS.len(), 2);
    }

    #[test]
    fn test_lombok_annotates_and_vetoes_accessors() {
        let table = orders_table();
        let plugin = LombokPlugin;

        let mut unit = CompilationUnit::new(TypeKind::Class, table.names().record_type.clone());
        let verdict = plugin.on_artifact(
            &mut ArtifactEvent::ModelClass {
                kind: ModelKind::Record,
                unit: &mut unit,
            },
            &table,
        );
        assert_eq!(verdict, Verdict::Changed);
        assert_eq!(unit.annotations, vec!["@Data"]);
        assert!(unit.imports.contains("lombok.Data"));

        let mut getter = Method::new("getId");
        let verdict = plugin.on_artifact(
            &mut ArtifactEvent::ModelGetter {
                kind: ModelKind::Record,
                method: &mut getter,
                column: table.columns().first(),
            },
            &table,
        );
        assert_eq!(verdict, Verdict::Veto);
    }

    #[test]
    fn test_mapper_annotation() {
        let table = orders_table();
        let mut unit = CompilationUnit::new(TypeKind::Interface, table.names().mapper_type.clone());
        let verdict = MapperAnnotationPlugin.on_artifact(
            &mut ArtifactEvent::ClientInterface { unit: &mut unit },
            &table,
        );
        assert_eq!(verdict, Verdict::Changed);
        assert!(unit.render().contains("@Mapper\npublic interface OrdersMapper {"));
    }
}
