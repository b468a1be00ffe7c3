//! Query-condition class generator

use crate::codegen::{ArtifactGenerator, ArtifactKind, GeneratedArtifact, GenerationContext};
use crate::dom::{CompilationUnit, JavaType, TypeKind};
use crate::model::TableModel;
use crate::plugin::{ArtifactEvent, ModelKind};

use super::{add_accessors, add_fields, type_javadoc, BeanProperty};

/// The `{Domain}QC` class passed to `count`, `getByQc` and `list`.
///
/// Carries one property per filter column. Without a configured query root
/// class it also declares the order-by and paging fields the mapper XML reads.
#[derive(Debug, Default)]
pub struct QueryConditionGenerator;

impl ArtifactGenerator for QueryConditionGenerator {
    fn name(&self) -> &'static str {
        "query-condition"
    }

    fn generate(&self, table: &TableModel, ctx: &mut GenerationContext<'_>) -> Vec<GeneratedArtifact> {
        let config = ctx.config;
        let mut unit = CompilationUnit::new(TypeKind::Class, table.names().query_type.clone());
        unit.javadoc = type_javadoc(table);

        let mut properties: Vec<BeanProperty<'_>> = table
            .query_fields()
            .iter()
            .map(|f| {
                let mut property = BeanProperty::for_column(table, &f.column);
                property.name = f.property.clone();
                property.ty = f.java_type.clone();
                property
            })
            .collect();

        match &config.query_root_class {
            Some(root) => {
                let superclass = JavaType::new(root);
                unit.add_import(&superclass);
                unit.superclass = Some(superclass);
            }
            None => {
                let spec = table.spec();
                let paging = [
                    (&spec.order_by_field, "java.lang.String", "Order-by clause"),
                    (&spec.offset_field, "java.lang.Integer", "Row offset"),
                    (&spec.limit_field, "java.lang.Integer", "Maximum rows"),
                ];
                for (name, ty, doc) in paging {
                    if let Some(name) = name {
                        properties.push(BeanProperty {
                            name: name.clone(),
                            ty: JavaType::new(ty),
                            column: None,
                            doc: vec![doc.to_string()],
                        });
                    }
                }
            }
        }

        add_fields(&mut unit, ModelKind::QueryCondition, &properties, table, ctx);
        add_accessors(&mut unit, ModelKind::QueryCondition, &properties, false, table, ctx);

        let approved = ctx.approve(
            ArtifactEvent::ModelClass {
                kind: ModelKind::QueryCondition,
                unit: &mut unit,
            },
            table,
        );
        if !approved {
            return Vec::new();
        }
        vec![GeneratedArtifact::java(
            ArtifactKind::QueryCondition,
            &config.target_project,
            unit,
        )]
    }
}
