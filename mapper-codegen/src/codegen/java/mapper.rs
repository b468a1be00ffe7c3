//! Mapper interface generator

use crate::codegen::{ArtifactGenerator, ArtifactKind, GeneratedArtifact, GenerationContext};
use crate::dom::{CompilationUnit, JavaType, Method, Parameter, TypeKind};
use crate::model::{FragmentId, TableModel};
use crate::plugin::ArtifactEvent;

use super::{tagged_javadoc, type_javadoc};

/// The `{Domain}Mapper` interface bound to the mapper XML namespace
#[derive(Debug, Default)]
pub struct MapperInterfaceGenerator;

impl MapperInterfaceGenerator {
    fn methods(table: &TableModel) -> Vec<(FragmentId, Method)> {
        let names = table.names();
        let rules = table.rules();
        let record = names.record_type.clone();
        let query = names.query_type.clone();
        let records = JavaType::list_of(record.clone());

        let statement = |name: &str, ret: JavaType, param: &str, ty: &JavaType| {
            let mut method = Method::declaration(name, ret);
            method.parameters.push(Parameter::new(param, ty.clone()));
            method.javadoc = tagged_javadoc(Vec::<String>::new());
            method
        };

        let mut methods = Vec::new();
        if rules.insert {
            methods.push((
                FragmentId::Insert,
                statement("insert", JavaType::int(), "record", &record),
            ));
        }
        if rules.batch_insert {
            methods.push((
                FragmentId::BatchInsert,
                statement("batchInsert", JavaType::int(), "list", &records),
            ));
        }
        if rules.count {
            methods.push((
                FragmentId::Count,
                statement("count", JavaType::long(), "qc", &query),
            ));
        }
        if rules.get_by_qc {
            methods.push((
                FragmentId::GetByQc,
                statement("getByQc", record.clone(), "qc", &query),
            ));
        }
        if rules.list {
            methods.push((
                FragmentId::List,
                statement("list", records.clone(), "qc", &query),
            ));
        }
        methods
    }
}

impl ArtifactGenerator for MapperInterfaceGenerator {
    fn name(&self) -> &'static str {
        "mapper-interface"
    }

    fn generate(&self, table: &TableModel, ctx: &mut GenerationContext<'_>) -> Vec<GeneratedArtifact> {
        let mut unit = CompilationUnit::new(TypeKind::Interface, table.names().mapper_type.clone());
        unit.javadoc = type_javadoc(table);

        for (statement, mut method) in Self::methods(table) {
            let approved = ctx.approve(
                ArtifactEvent::ClientMethod {
                    statement,
                    method: &mut method,
                },
                table,
            );
            if !approved {
                continue;
            }
            if let Some(ret) = &method.return_type {
                unit.add_import(ret);
            }
            for param in &method.parameters {
                unit.add_import(&param.ty);
            }
            unit.methods.push(method);
        }

        if !ctx.approve(ArtifactEvent::ClientInterface { unit: &mut unit }, table) {
            return Vec::new();
        }
        vec![GeneratedArtifact::java(
            ArtifactKind::MapperInterface,
            &ctx.config.target_project,
            unit,
        )]
    }
}
