//! Record class generator

use std::collections::BTreeSet;

use crate::codegen::{ArtifactGenerator, ArtifactKind, GeneratedArtifact, GenerationContext};
use crate::dom::{CompilationUnit, Field, JavaType, Method, Parameter, TypeKind, Visibility};
use crate::model::TableModel;
use crate::plugin::{ArtifactEvent, ModelKind};

use super::{add_accessors, add_fields, tagged_javadoc, type_javadoc, BeanProperty};

/// One class per table with a property for every column the root class lacks
#[derive(Debug, Default)]
pub struct RecordGenerator;

impl ArtifactGenerator for RecordGenerator {
    fn name(&self) -> &'static str {
        "record"
    }

    fn generate(&self, table: &TableModel, ctx: &mut GenerationContext<'_>) -> Vec<GeneratedArtifact> {
        let config = ctx.config;
        let mut unit = CompilationUnit::new(TypeKind::Class, table.names().record_type.clone());
        unit.javadoc = type_javadoc(table);

        let inherited: BTreeSet<String> = match &config.record_root_class {
            Some(root) => {
                let superclass = JavaType::new(&root.type_name);
                unit.add_import(&superclass);
                unit.superclass = Some(superclass);
                ctx.run.root_class_properties(root).clone()
            }
            None => BTreeSet::new(),
        };

        if config.serializable {
            unit.add_super_interface(JavaType::new("java.io.Serializable"));
            let mut uid = Field::new("serialVersionUID", JavaType::long());
            uid.is_static = true;
            uid.is_final = true;
            uid.initializer = Some("1L".to_string());
            uid.javadoc = tagged_javadoc(Vec::<String>::new());
            unit.fields.push(uid);
        }

        let properties: Vec<BeanProperty<'_>> = table
            .columns()
            .iter()
            .filter(|c| !inherited.contains(&c.property))
            .map(|c| BeanProperty::for_column(table, c))
            .collect();

        add_fields(&mut unit, ModelKind::Record, &properties, table, ctx);

        if config.constructor_based() {
            unit.methods.push(all_args_constructor(&unit, &properties));
            if !config.immutable {
                let mut default_ctor = Method::new(unit.ty.short_name());
                default_ctor.return_type = None;
                default_ctor.body = Some(vec!["super();".to_string()]);
                default_ctor.javadoc = tagged_javadoc(Vec::<String>::new());
                unit.methods.push(default_ctor);
            }
        }

        add_accessors(
            &mut unit,
            ModelKind::Record,
            &properties,
            config.immutable,
            table,
            ctx,
        );

        let approved = ctx.approve(
            ArtifactEvent::ModelClass {
                kind: ModelKind::Record,
                unit: &mut unit,
            },
            table,
        );
        if !approved {
            return Vec::new();
        }
        vec![GeneratedArtifact::java(
            ArtifactKind::Record,
            &config.target_project,
            unit,
        )]
    }
}

/// Constructor over the properties whose fields survived the plugin chain
fn all_args_constructor(unit: &CompilationUnit, properties: &[BeanProperty<'_>]) -> Method {
    let mut ctor = Method::new(unit.ty.short_name());
    ctor.return_type = None;
    ctor.visibility = Visibility::Public;
    let mut body = Vec::new();
    if unit.superclass.is_some() {
        body.push("super();".to_string());
    }
    for property in properties {
        if !unit.fields.iter().any(|f| f.name == property.name) {
            continue;
        }
        ctor.parameters
            .push(Parameter::new(&property.name, property.ty.clone()));
        body.push(format!("this.{0} = {0};", property.name));
    }
    ctor.body = Some(body);
    ctor.javadoc = tagged_javadoc(Vec::<String>::new());
    ctor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::ArtifactBody;
    use crate::config::{CodegenConfig, RootClass};
    use crate::context::RunContext;
    use crate::model::test_support::orders_table;
    use crate::plugin::{PluginChain, Verdict};

    fn record_with(config: &CodegenConfig, plugins: &PluginChain) -> Option<CompilationUnit> {
        let mut run = RunContext::default();
        let mut ctx = GenerationContext::new(config, plugins, &mut run);
        RecordGenerator
            .generate(&orders_table(), &mut ctx)
            .into_iter()
            .next()
            .map(|a| match a.body {
                ArtifactBody::Java(unit) => unit,
                ArtifactBody::Xml(_) => panic!("record must be Java"),
            })
    }

    #[test]
    fn test_orders_record() {
        let unit = record_with(&CodegenConfig::default(), &PluginChain::new()).unwrap();
        let fields: Vec<&str> = unit.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(fields, vec!["id", "orderCode", "status", "isDeleted", "creator"]);
        assert_eq!(unit.methods.len(), 10);

        let text = unit.render();
        assert!(text.contains("public class Orders {"));
        assert!(text.contains("     * Column: orders.order_code\n"));
        assert!(text.contains("    public void setOrderCode(String orderCode) {\n        this.orderCode = orderCode;\n    }\n"));
        assert!(text.contains(" * customer orders\n"));
    }

    #[test]
    fn test_root_class_properties_skipped() {
        let mut config = CodegenConfig::default();
        config.record_root_class = Some(RootClass {
            type_name: "com.example.base.BaseDO".into(),
            properties: vec!["id".into(), "creator".into()],
        });
        let unit = record_with(&config, &PluginChain::new()).unwrap();
        assert_eq!(unit.fields.len(), 3);
        assert!(unit.imports.contains("com.example.base.BaseDO"));
        assert!(unit.render().contains("public class Orders extends BaseDO {"));
    }

    #[test]
    fn test_serializable_and_constructors() {
        let mut config = CodegenConfig::default();
        config.serializable = true;
        config.constructor_based = true;
        let unit = record_with(&config, &PluginChain::new()).unwrap();
        let text = unit.render();
        assert!(text.contains("public class Orders implements Serializable {"));
        assert!(text.contains("    private static final long serialVersionUID = 1L;\n"));
        assert!(text.contains("    public Orders(Long id, String orderCode, Integer status, Integer isDeleted, String creator) {\n"));
        assert!(text.contains("    public Orders() {\n        super();\n    }\n"));
    }

    #[test]
    fn test_immutable_has_no_setters() {
        let mut config = CodegenConfig::default();
        config.immutable = true;
        let unit = record_with(&config, &PluginChain::new()).unwrap();
        assert!(unit.methods.iter().all(|m| !m.name.starts_with("set")));
        let constructors = unit.methods.iter().filter(|m| m.is_constructor()).count();
        assert_eq!(constructors, 1);
    }

    #[test]
    fn test_vetoed_field_and_class() {
        let mut plugins = PluginChain::new();
        plugins.push(Box::new(|event: &mut ArtifactEvent<'_>, _: &TableModel| match event {
            ArtifactEvent::ModelField { field, .. } if field.name == "creator" => Verdict::Veto,
            _ => Verdict::Keep,
        }));
        let unit = record_with(&CodegenConfig::default(), &plugins).unwrap();
        assert!(unit.fields.iter().all(|f| f.name != "creator"));
        assert!(unit.methods.iter().any(|m| m.name == "getCreator"));

        let mut plugins = PluginChain::new();
        plugins.push(Box::new(|event: &mut ArtifactEvent<'_>, _: &TableModel| match event {
            ArtifactEvent::ModelClass { .. } => Verdict::Veto,
            _ => Verdict::Keep,
        }));
        assert!(record_with(&CodegenConfig::default(), &plugins).is_none());
    }
}
