//! Java source generators: record, query condition and mapper interface

mod mapper;
mod query;
mod record;

pub use mapper::*;
pub use query::*;
pub use record::*;

use crate::config::defaults;
use crate::dom::{CompilationUnit, Field, JavaType, Method, Parameter};
use crate::introspect::naming;
use crate::model::{ColumnModel, TableModel};
use crate::plugin::{ArtifactEvent, ModelKind};

use super::GenerationContext;

/// Javadoc lines ending with the retention tag that marks a member as regenerable
pub fn tagged_javadoc<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut doc: Vec<String> = lines.into_iter().map(Into::into).collect();
    if !doc.is_empty() {
        doc.push(String::new());
    }
    doc.push(defaults::RETENTION_TAG.to_string());
    doc
}

fn remark_lines(remarks: Option<&str>) -> Vec<String> {
    remarks
        .map(|r| {
            r.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// One bean property of a generated class
pub(crate) struct BeanProperty<'a> {
    pub name: String,
    pub ty: JavaType,
    pub column: Option<&'a ColumnModel>,
    pub doc: Vec<String>,
}

impl<'a> BeanProperty<'a> {
    pub fn for_column(table: &TableModel, column: &'a ColumnModel) -> Self {
        let mut doc = vec![format!("Column: {}.{}", table.table(), column.actual_name)];
        doc.extend(remark_lines(column.remarks.as_deref()));
        Self {
            name: column.property.clone(),
            ty: column.java_type.clone(),
            column: Some(column),
            doc,
        }
    }

    fn field(&self) -> Field {
        let mut field = Field::new(&self.name, self.ty.clone());
        field.javadoc = tagged_javadoc(self.doc.clone());
        field
    }

    fn getter(&self) -> Method {
        let primitive_boolean = self.ty.qualified_name() == "boolean";
        let mut method = Method::new(naming::getter_name(&self.name, primitive_boolean));
        method.return_type = Some(self.ty.clone());
        method.body = Some(vec![format!("return {};", self.name)]);
        method.javadoc = tagged_javadoc(Vec::<String>::new());
        method
    }

    fn setter(&self) -> Method {
        let mut method = Method::new(naming::setter_name(&self.name));
        method.return_type = Some(JavaType::new("void"));
        method
            .parameters
            .push(Parameter::new(&self.name, self.ty.clone()));
        method.body = Some(vec![format!("this.{0} = {0};", self.name)]);
        method.javadoc = tagged_javadoc(Vec::<String>::new());
        method
    }
}

/// Add one field per property, each offered to the plugin chain
pub(crate) fn add_fields(
    unit: &mut CompilationUnit,
    kind: ModelKind,
    properties: &[BeanProperty<'_>],
    table: &TableModel,
    ctx: &GenerationContext<'_>,
) {
    for property in properties {
        let mut field = property.field();
        let approved = ctx.approve(
            ArtifactEvent::ModelField {
                kind,
                field: &mut field,
                column: property.column,
            },
            table,
        );
        if approved {
            unit.add_import(&field.ty);
            unit.fields.push(field);
        }
    }
}

/// Add getters, and setters unless `getters_only`
pub(crate) fn add_accessors(
    unit: &mut CompilationUnit,
    kind: ModelKind,
    properties: &[BeanProperty<'_>],
    getters_only: bool,
    table: &TableModel,
    ctx: &GenerationContext<'_>,
) {
    for property in properties {
        let mut getter = property.getter();
        if ctx.approve(
            ArtifactEvent::ModelGetter {
                kind,
                method: &mut getter,
                column: property.column,
            },
            table,
        ) {
            if let Some(ty) = &getter.return_type {
                unit.add_import(ty);
            }
            unit.methods.push(getter);
        }

        if getters_only {
            continue;
        }
        let mut setter = property.setter();
        if ctx.approve(
            ArtifactEvent::ModelSetter {
                kind,
                method: &mut setter,
                column: property.column,
            },
            table,
        ) {
            for param in &setter.parameters {
                unit.add_import(&param.ty);
            }
            unit.methods.push(setter);
        }
    }
}

/// Javadoc of a generated top-level type
pub(crate) fn type_javadoc(table: &TableModel) -> Vec<String> {
    let mut doc = vec![format!("Table: {}", table.table())];
    doc.extend(remark_lines(table.remarks()));
    tagged_javadoc(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_javadoc() {
        assert_eq!(tagged_javadoc(Vec::<String>::new()), vec!["@mapper.generated"]);
        assert_eq!(
            tagged_javadoc(["Column: orders.id"]),
            vec!["Column: orders.id", "", "@mapper.generated"]
        );
    }

    #[test]
    fn test_remark_lines() {
        assert_eq!(remark_lines(Some(" first \n\nsecond")), vec!["first", "second"]);
        assert!(remark_lines(None).is_empty());
    }
}
